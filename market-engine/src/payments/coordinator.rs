//! PaymentCoordinator - card intents, COD confirmations and webhook ingestion
//!
//! # Card Intent Flow
//!
//! ```text
//! create_stripe_intent(order, key)
//!     ├─ 1. Validate order / payability / key
//!     ├─ 2. Replay or attach to the order's live intent (write lock)
//!     ├─ 3. Gateway call (no lock held)
//!     └─ 4. Re-check replay/attach, then commit (write lock)
//! ```
//!
//! # Webhook Flow
//!
//! ```text
//! handle_stripe_webhook(payload, header)
//!     ├─ 1. Verify signature, parse envelope + intent
//!     ├─ 2. Resolve provider ref -> payment
//!     ├─ 3. Claim event id: unseen -> processing   (write lock)
//!     ├─ 4. OrderStatusSink callback               (no lock held)
//!     └─ 5. Update payment, processing -> processed (write lock)
//! ```
//!
//! A claim is released if step 4 or 5 fails, so a redelivery of the same
//! event can be processed again.

use super::error::{PaymentError, PaymentResult};
use super::gateway::PaymentGateway;
use super::sink::OrderStatusSink;
use super::webhook::{IntentEventKind, parse_event, verify_signature};
use crate::core::config::EngineConfig;
use parking_lot::RwLock;
use shared::order::{Order, OrderStatus};
use shared::payment::{
    CodPayment, Payment, PaymentMethod, PaymentSettings, PaymentSettingsUpdate, PaymentStatus,
    StripeIntent, WebhookResult,
};
use shared::util::{now_millis, now_secs, prefixed_id};
use std::collections::HashMap;
use std::sync::Arc;

const PROVIDER_STRIPE: &str = "stripe";
const PROVIDER_COD: &str = "cod";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventState {
    Processing,
    Processed,
}

#[derive(Debug)]
struct PaymentState {
    settings: PaymentSettings,
    stripe_intents: HashMap<String, StripeIntent>,
    /// "<order id>::<key>" -> payment id
    stripe_by_request: HashMap<String, String>,
    /// order id -> latest payment id
    stripe_by_order: HashMap<String, String>,
    /// provider ref -> payment id
    stripe_by_provider_ref: HashMap<String, String>,
    cod_payments: HashMap<String, CodPayment>,
    cod_by_request: HashMap<String, String>,
    cod_by_order: HashMap<String, String>,
    events: HashMap<String, EventState>,
}

impl PaymentState {
    fn new(stripe_enabled: bool, cod_enabled: bool) -> Self {
        Self {
            settings: PaymentSettings {
                stripe_enabled,
                cod_enabled,
                updated_at: now_millis(),
            },
            stripe_intents: HashMap::new(),
            stripe_by_request: HashMap::new(),
            stripe_by_order: HashMap::new(),
            stripe_by_provider_ref: HashMap::new(),
            cod_payments: HashMap::new(),
            cod_by_request: HashMap::new(),
            cod_by_order: HashMap::new(),
            events: HashMap::new(),
        }
    }

    /// Exact replay, or the order's live intent with this key attached.
    /// `None` means a new intent must be created.
    fn existing_intent(&mut self, order: &Order, request_key: &str) -> Option<StripeIntent> {
        if let Some(intent) = self
            .stripe_by_request
            .get(request_key)
            .and_then(|id| self.stripe_intents.get(id))
        {
            return Some(intent.clone());
        }

        let payment_id = self.stripe_by_order.get(&order.id)?.clone();
        let intent = self.stripe_intents.get(&payment_id)?.clone();
        if is_retry_after_failure(order, intent.status) {
            return None;
        }
        self.stripe_by_request
            .insert(request_key.to_string(), payment_id);
        Some(intent)
    }

    fn existing_cod(&mut self, order: &Order, request_key: &str) -> Option<CodPayment> {
        if let Some(payment) = self
            .cod_by_request
            .get(request_key)
            .and_then(|id| self.cod_payments.get(id))
        {
            return Some(payment.clone());
        }

        let payment_id = self.cod_by_order.get(&order.id)?.clone();
        let payment = self.cod_payments.get(&payment_id)?.clone();
        if is_retry_after_failure(order, payment.status) {
            return None;
        }
        self.cod_by_request.insert(request_key.to_string(), payment_id);
        Some(payment)
    }

    fn remove_cod(&mut self, payment_id: &str) {
        if let Some(payment) = self.cod_payments.remove(payment_id) {
            if self.cod_by_order.get(&payment.order_id).map(String::as_str) == Some(payment_id) {
                self.cod_by_order.remove(&payment.order_id);
            }
        }
        self.cod_by_request.retain(|_, id| id != payment_id);
    }
}

fn is_retry_after_failure(order: &Order, existing: PaymentStatus) -> bool {
    order.status == OrderStatus::PaymentFailed && existing == PaymentStatus::Failed
}

/// Reject orders that cannot carry a payment
fn validate_order(order: &Order) -> PaymentResult<()> {
    if order.id.trim().is_empty() || order.currency.trim().is_empty() || order.total_cents <= 0 {
        return Err(PaymentError::InvalidOrder);
    }
    Ok(())
}

fn normalize_key(idempotency_key: &str) -> PaymentResult<&str> {
    let key = idempotency_key.trim();
    if key.is_empty() {
        return Err(PaymentError::IdempotencyKey);
    }
    Ok(key)
}

/// Payment Coordinator
pub struct PaymentCoordinator {
    state: RwLock<PaymentState>,
    gateway: Arc<dyn PaymentGateway>,
    sink: Arc<dyn OrderStatusSink>,
    webhook_secret: Option<String>,
    webhook_tolerance_secs: i64,
}

impl std::fmt::Debug for PaymentCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("PaymentCoordinator")
            .field("settings", &state.settings)
            .field("stripe_intents", &state.stripe_intents.len())
            .field("cod_payments", &state.cod_payments.len())
            .field("webhook_secret_set", &self.webhook_secret.is_some())
            .finish()
    }
}

impl PaymentCoordinator {
    pub fn new(
        config: &EngineConfig,
        gateway: Arc<dyn PaymentGateway>,
        sink: Arc<dyn OrderStatusSink>,
    ) -> Self {
        Self {
            state: RwLock::new(PaymentState::new(config.stripe_enabled, config.cod_enabled)),
            gateway,
            sink,
            webhook_secret: config
                .stripe_webhook_secret
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            webhook_tolerance_secs: config.webhook_tolerance_secs,
        }
    }

    // ========================================================================
    // Card intents
    // ========================================================================

    /// Create (or replay) a card payment intent for an order
    pub async fn create_stripe_intent(
        &self,
        order: &Order,
        idempotency_key: &str,
    ) -> PaymentResult<StripeIntent> {
        validate_order(order)?;
        if !matches!(
            order.status,
            OrderStatus::PendingPayment | OrderStatus::PaymentFailed
        ) {
            return Err(PaymentError::OrderNotPayable);
        }
        let key = normalize_key(idempotency_key)?;
        let request_key = format!("{}::{}", order.id, key);

        // 1. Replay / attach before touching the gateway
        {
            let mut state = self.state.write();
            if let Some(intent) = state.existing_intent(order, &request_key) {
                tracing::debug!(order_id = %order.id, payment_id = %intent.id, "Reusing stripe intent");
                return Ok(intent);
            }
            if !state.settings.stripe_enabled {
                tracing::warn!(order_id = %order.id, "Stripe payment rejected: disabled");
                return Err(PaymentError::StripeDisabled);
            }
        }

        // 2. Gateway round-trip without any lock
        let gateway_intent = self
            .gateway
            .create_payment_intent(&order.id, order.total_cents, &order.currency, key)
            .await?;
        let provider_ref = gateway_intent.provider_ref.trim().to_string();
        if provider_ref.is_empty() {
            return Err(PaymentError::InvalidPayload);
        }

        // 3. Commit, unless a concurrent caller got there first
        let mut state = self.state.write();
        if let Some(intent) = state.existing_intent(order, &request_key) {
            tracing::debug!(order_id = %order.id, payment_id = %intent.id, "Concurrent stripe intent won the commit");
            return Ok(intent);
        }

        let now = now_millis();
        let intent = StripeIntent {
            id: prefixed_id("pay"),
            order_id: order.id.clone(),
            method: PaymentMethod::Stripe,
            status: PaymentStatus::Pending,
            provider: PROVIDER_STRIPE.to_string(),
            provider_ref: provider_ref.clone(),
            client_secret: gateway_intent.client_secret.trim().to_string(),
            amount_cents: order.total_cents,
            currency: order.currency.clone(),
            created_at: now,
            updated_at: now,
        };
        state
            .stripe_by_request
            .insert(request_key, intent.id.clone());
        state
            .stripe_by_order
            .insert(order.id.clone(), intent.id.clone());
        state
            .stripe_by_provider_ref
            .insert(provider_ref, intent.id.clone());
        state.stripe_intents.insert(intent.id.clone(), intent.clone());

        tracing::info!(
            order_id = %order.id,
            payment_id = %intent.id,
            provider_ref = %intent.provider_ref,
            amount_cents = intent.amount_cents,
            "Stripe intent created"
        );
        Ok(intent)
    }

    // ========================================================================
    // Cash on delivery
    // ========================================================================

    /// Confirm (or replay) a cash-on-delivery payment for an order
    ///
    /// The order is marked `cod_confirmed` synchronously. If the order sink
    /// does not know the order, the new payment is rolled back.
    pub fn confirm_cod_payment(
        &self,
        order: &Order,
        idempotency_key: &str,
    ) -> PaymentResult<CodPayment> {
        validate_order(order)?;
        if !matches!(
            order.status,
            OrderStatus::PendingPayment | OrderStatus::PaymentFailed | OrderStatus::CodConfirmed
        ) {
            return Err(PaymentError::OrderNotPayable);
        }
        let key = normalize_key(idempotency_key)?;
        let request_key = format!("{}::{}", order.id, key);

        let payment = {
            let mut state = self.state.write();
            if let Some(payment) = state.existing_cod(order, &request_key) {
                tracing::debug!(order_id = %order.id, payment_id = %payment.id, "Reusing cod payment");
                return Ok(payment);
            }
            if !state.settings.cod_enabled {
                tracing::warn!(order_id = %order.id, "COD payment rejected: disabled");
                return Err(PaymentError::CodDisabled);
            }

            let now = now_millis();
            let payment = CodPayment {
                id: prefixed_id("pay"),
                order_id: order.id.clone(),
                method: PaymentMethod::Cod,
                status: PaymentStatus::PendingCollection,
                provider: PROVIDER_COD.to_string(),
                provider_ref: prefixed_id("cod"),
                amount_cents: order.total_cents,
                currency: order.currency.clone(),
                created_at: now,
                updated_at: now,
            };
            state.cod_by_request.insert(request_key, payment.id.clone());
            state
                .cod_by_order
                .insert(order.id.clone(), payment.id.clone());
            state.cod_payments.insert(payment.id.clone(), payment.clone());
            payment
        };

        if !self.sink.mark_order_cod_confirmed(&order.id) {
            self.state.write().remove_cod(&payment.id);
            tracing::error!(order_id = %order.id, payment_id = %payment.id, "COD confirmation could not update order");
            return Err(PaymentError::OrderSyncFailed(order.id.clone()));
        }

        tracing::info!(
            order_id = %order.id,
            payment_id = %payment.id,
            amount_cents = payment.amount_cents,
            "COD payment confirmed"
        );
        Ok(payment)
    }

    // ========================================================================
    // Webhooks
    // ========================================================================

    /// Apply one signed gateway event, exactly once per event id
    pub fn handle_stripe_webhook(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> PaymentResult<WebhookResult> {
        let secret = self
            .webhook_secret
            .as_deref()
            .ok_or(PaymentError::WebhookSecretRequired)?;
        verify_signature(
            payload,
            signature_header,
            secret,
            self.webhook_tolerance_secs,
            now_secs(),
        )
        .inspect_err(|_| tracing::warn!("Rejected stripe webhook: bad signature"))?;
        let event = parse_event(payload)?;

        if self.state.read().events.contains_key(&event.id) {
            return Ok(duplicate_result(&event.id));
        }

        // Unknown event types are acknowledged and remembered
        let Some((kind, provider_ref)) = event.intent else {
            let mut state = self.state.write();
            if state.events.contains_key(&event.id) {
                return Ok(duplicate_result(&event.id));
            }
            state.events.insert(event.id.clone(), EventState::Processed);
            tracing::debug!(event_id = %event.id, event_type = %event.event_type, "Ignored stripe event type");
            return Ok(WebhookResult {
                event_id: event.id,
                ..Default::default()
            });
        };

        // 1. Resolve + claim
        let (payment_id, order_id) = {
            let mut state = self.state.write();
            if state.events.contains_key(&event.id) {
                tracing::debug!(event_id = %event.id, "Duplicate stripe event");
                return Ok(duplicate_result(&event.id));
            }
            let intent = state
                .stripe_by_provider_ref
                .get(&provider_ref)
                .and_then(|id| state.stripe_intents.get(id))
                .ok_or(PaymentError::PaymentNotFound)?;
            let resolved = (intent.id.clone(), intent.order_id.clone());
            state.events.insert(event.id.clone(), EventState::Processing);
            resolved
        };
        let claim = EventClaim::new(&self.state, &event.id);

        // 2. Order callback, no lock held
        let synced = match kind {
            IntentEventKind::Succeeded => self.sink.mark_order_paid(&order_id),
            IntentEventKind::Failed => self.sink.mark_order_payment_failed(&order_id),
        };
        if !synced {
            tracing::error!(event_id = %event.id, order_id = %order_id, "Stripe event could not update order");
            return Err(PaymentError::OrderSyncFailed(order_id));
        }

        // 3. Commit payment status + mark processed
        let mut state = self.state.write();
        let intent = state
            .stripe_intents
            .get_mut(&payment_id)
            .ok_or(PaymentError::PaymentNotFound)?;
        let target = match kind {
            IntentEventKind::Succeeded => PaymentStatus::Succeeded,
            IntentEventKind::Failed => PaymentStatus::Failed,
        };
        // succeeded is final
        if intent.status != PaymentStatus::Succeeded && intent.status != target {
            intent.status = target;
            intent.updated_at = now_millis();
        }
        let payment_status = intent.status;
        state.events.insert(event.id.clone(), EventState::Processed);
        claim.commit();

        tracing::info!(
            event_id = %event.id,
            payment_id = %payment_id,
            order_id = %order_id,
            status = %payment_status,
            "Stripe event processed"
        );
        Ok(WebhookResult {
            event_id: event.id,
            processed: true,
            duplicate: false,
            payment_id: Some(payment_id),
            order_id: Some(order_id),
            payment_status: Some(payment_status),
        })
    }

    // ========================================================================
    // Settings & lookups
    // ========================================================================

    pub fn get_settings(&self) -> PaymentSettings {
        self.state.read().settings
    }

    /// Apply a partial update; `updated_at` moves only when a field is set
    pub fn update_settings(&self, update: PaymentSettingsUpdate) -> PaymentSettings {
        let mut state = self.state.write();
        let mut changed = false;
        if let Some(enabled) = update.stripe_enabled {
            state.settings.stripe_enabled = enabled;
            changed = true;
        }
        if let Some(enabled) = update.cod_enabled {
            state.settings.cod_enabled = enabled;
            changed = true;
        }
        if changed {
            state.settings.updated_at = now_millis();
            tracing::info!(
                stripe_enabled = state.settings.stripe_enabled,
                cod_enabled = state.settings.cod_enabled,
                "Payment settings updated"
            );
        }
        state.settings
    }

    /// Look up a card or COD payment by id
    pub fn get_payment(&self, payment_id: &str) -> Option<Payment> {
        let payment_id = payment_id.trim();
        let state = self.state.read();
        state
            .stripe_intents
            .get(payment_id)
            .cloned()
            .map(Payment::Stripe)
            .or_else(|| state.cod_payments.get(payment_id).cloned().map(Payment::Cod))
    }
}

fn duplicate_result(event_id: &str) -> WebhookResult {
    WebhookResult {
        event_id: event_id.to_string(),
        processed: false,
        duplicate: true,
        ..Default::default()
    }
}

/// Releases a `processing` claim on drop unless committed
struct EventClaim<'a> {
    state: &'a RwLock<PaymentState>,
    event_id: &'a str,
    committed: bool,
}

impl<'a> EventClaim<'a> {
    fn new(state: &'a RwLock<PaymentState>, event_id: &'a str) -> Self {
        Self {
            state,
            event_id,
            committed: false,
        }
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for EventClaim<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        let mut state = self.state.write();
        if state.events.get(self.event_id) == Some(&EventState::Processing) {
            state.events.remove(self.event_id);
            tracing::warn!(event_id = %self.event_id, "Released stripe event claim");
        }
    }
}
