//! Marketplace - service wiring and entry points
//!
//! # Wiring
//!
//! ```text
//! EngineConfig ─┬─→ CartStore ──→ OrderLedger ←── LedgerStatusSink ←── PaymentCoordinator
//!               │                      ↑                                    ↑
//!               │              RefundWorkflow (orders resolved here)   PaymentGateway
//!               └─→ ProductCatalog / VendorDirectory / AuditSink
//! ```
//!
//! Buyer entry points resolve orders through the actor-scoped ledger lookup,
//! so a foreign order id is indistinguishable from a missing one. Each
//! successful mutating call emits one [`ChangeRecord`].

use super::config::EngineConfig;
use super::error::{CommerceError, CommerceResult, MarketResult};
use crate::audit::{AuditAction, AuditSink, ChangeRecord, snapshot};
use crate::cart::{CartStore, actor_key};
use crate::orders::{OrderFinancials, OrderLedger, settled_order_financials};
use crate::payments::{
    MockGateway, OrderStatusSink, PaymentCoordinator, PaymentGateway, PaymentResult,
    StripeGateway,
};
use crate::ports::{ProductCatalog, VendorDirectory};
use crate::refunds::{RefundResult, RefundWorkflow};
use serde::Serialize;
use shared::models::Actor;
use shared::order::{Cart, CheckoutQuote, Order, VendorShipment};
use shared::payment::{
    CodPayment, Payment, PaymentSettings, PaymentSettingsUpdate, StripeIntent, WebhookResult,
};
use shared::refund::RefundRequest;
use std::sync::Arc;

const ACTOR_ADMIN: &str = "admin";
const ACTOR_STRIPE: &str = "stripe";

/// Payment callbacks into the order ledger
struct LedgerStatusSink {
    ledger: Arc<OrderLedger>,
}

impl OrderStatusSink for LedgerStatusSink {
    fn mark_order_paid(&self, order_id: &str) -> bool {
        self.ledger.mark_order_paid(order_id)
    }

    fn mark_order_payment_failed(&self, order_id: &str) -> bool {
        self.ledger.mark_order_payment_failed(order_id)
    }

    fn mark_order_cod_confirmed(&self, order_id: &str) -> bool {
        self.ledger.mark_order_cod_confirmed(order_id)
    }
}

/// Marketplace engine
pub struct Marketplace {
    config: EngineConfig,
    catalog: Arc<dyn ProductCatalog>,
    vendors: Arc<dyn VendorDirectory>,
    carts: Arc<CartStore>,
    ledger: Arc<OrderLedger>,
    payments: PaymentCoordinator,
    refunds: RefundWorkflow,
    audit: Arc<dyn AuditSink>,
}

impl std::fmt::Debug for Marketplace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Marketplace")
            .field("environment", &self.config.environment)
            .field("carts", &self.carts)
            .field("ledger", &self.ledger)
            .field("payments", &self.payments)
            .field("refunds", &self.refunds)
            .finish_non_exhaustive()
    }
}

impl Marketplace {
    /// Build the engine; a configured Stripe secret selects the live gateway
    pub fn new(
        config: EngineConfig,
        catalog: Arc<dyn ProductCatalog>,
        vendors: Arc<dyn VendorDirectory>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        let gateway: Arc<dyn PaymentGateway> = match config.stripe_secret_key.as_deref() {
            Some(secret) => {
                tracing::info!("Using Stripe payment gateway");
                Arc::new(StripeGateway::new(secret))
            }
            None => {
                if config.is_production() {
                    tracing::warn!("STRIPE_SECRET_KEY not set in production, using mock gateway");
                }
                Arc::new(MockGateway::new())
            }
        };
        Self::with_gateway(config, catalog, vendors, gateway, audit)
    }

    pub fn with_gateway(
        config: EngineConfig,
        catalog: Arc<dyn ProductCatalog>,
        vendors: Arc<dyn VendorDirectory>,
        gateway: Arc<dyn PaymentGateway>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        let carts = Arc::new(CartStore::new(
            config.currency.clone(),
            config.shipping_fee_cents,
        ));
        let ledger = Arc::new(OrderLedger::new(carts.clone()));
        let sink = Arc::new(LedgerStatusSink {
            ledger: ledger.clone(),
        });
        let payments = PaymentCoordinator::new(&config, gateway, sink);

        tracing::info!(
            environment = %config.environment,
            currency = %config.currency,
            shipping_fee_cents = config.shipping_fee_cents,
            "Marketplace engine ready"
        );

        Self {
            config,
            catalog,
            vendors,
            carts,
            ledger,
            payments,
            refunds: RefundWorkflow::new(),
            audit,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn carts(&self) -> &CartStore {
        &self.carts
    }

    pub fn ledger(&self) -> &OrderLedger {
        &self.ledger
    }

    pub fn payments(&self) -> &PaymentCoordinator {
        &self.payments
    }

    pub fn refunds(&self) -> &RefundWorkflow {
        &self.refunds
    }

    fn emit<B: Serialize, A: Serialize>(
        &self,
        action: AuditAction,
        actor: &str,
        resource_type: &str,
        resource_id: &str,
        before: Option<&B>,
        after: Option<&A>,
    ) {
        self.audit.record(ChangeRecord::new(
            action,
            actor,
            resource_type,
            resource_id,
            before.map(|b| snapshot(b, resource_type)),
            after.map(|a| snapshot(a, resource_type)),
        ));
    }

    // ========================================================================
    // Cart
    // ========================================================================

    pub fn get_cart(&self, actor: &Actor) -> CommerceResult<Cart> {
        self.carts.get_cart(actor)
    }

    /// Add a catalog product to the cart
    ///
    /// Products of unknown or unverified vendors are reported as not found.
    pub fn add_to_cart(&self, actor: &Actor, product_id: &str, qty: i64) -> CommerceResult<Cart> {
        let key = actor_key(actor)?;
        let product_id = product_id.trim();
        let product = self
            .catalog
            .product_snapshot(product_id)
            .filter(|p| {
                self.vendors
                    .vendor(&p.vendor_id)
                    .is_some_and(|v| v.is_verified())
            })
            .ok_or_else(|| CommerceError::ProductNotFound(product_id.to_string()))?;

        let before = self.carts.get_cart(actor)?;
        let after = self.carts.upsert_item(actor, &product, qty)?;
        self.emit(
            AuditAction::CartItemUpserted,
            key.as_str(),
            "cart",
            key.as_str(),
            Some(&before),
            Some(&after),
        );
        Ok(after)
    }

    pub fn update_cart_item(&self, actor: &Actor, item_id: &str, qty: i64) -> CommerceResult<Cart> {
        let key = actor_key(actor)?;
        let before = self.carts.get_cart(actor)?;
        let after = self.carts.update_item_qty(actor, item_id, qty)?;
        self.emit(
            AuditAction::CartItemQtyUpdated,
            key.as_str(),
            "cart",
            key.as_str(),
            Some(&before),
            Some(&after),
        );
        Ok(after)
    }

    pub fn remove_cart_item(&self, actor: &Actor, item_id: &str) -> CommerceResult<Cart> {
        let key = actor_key(actor)?;
        let before = self.carts.get_cart(actor)?;
        let after = self.carts.remove_item(actor, item_id)?;
        self.emit(
            AuditAction::CartItemRemoved,
            key.as_str(),
            "cart",
            key.as_str(),
            Some(&before),
            Some(&after),
        );
        Ok(after)
    }

    pub fn quote(&self, actor: &Actor) -> CommerceResult<CheckoutQuote> {
        self.carts.quote(actor)
    }

    // ========================================================================
    // Orders (buyer)
    // ========================================================================

    pub fn place_order(&self, actor: &Actor, idempotency_key: &str) -> CommerceResult<Order> {
        let key = actor_key(actor)?;
        let order = self.ledger.place_order(actor, idempotency_key)?;
        self.emit(
            AuditAction::OrderPlaced,
            key.as_str(),
            "order",
            &order.id,
            None::<&Order>,
            Some(&order),
        );
        Ok(order)
    }

    pub fn get_order(&self, actor: &Actor, order_id: &str) -> CommerceResult<Option<Order>> {
        self.ledger.get_order(actor, order_id)
    }

    fn owned_order(&self, actor: &Actor, order_id: &str) -> CommerceResult<Order> {
        self.ledger
            .get_order(actor, order_id)?
            .ok_or_else(|| CommerceError::OrderNotFound(order_id.trim().to_string()))
    }

    // ========================================================================
    // Payments
    // ========================================================================

    /// Create (or replay) a card payment intent for one of the actor's orders
    pub async fn pay_with_card(
        &self,
        actor: &Actor,
        order_id: &str,
        idempotency_key: &str,
    ) -> MarketResult<StripeIntent> {
        let order = self.owned_order(actor, order_id)?;
        let intent = self
            .payments
            .create_stripe_intent(&order, idempotency_key)
            .await?;
        self.emit(
            AuditAction::StripeIntentCreated,
            &actor_label(actor),
            "payment",
            &intent.id,
            None::<&StripeIntent>,
            Some(&intent),
        );
        Ok(intent)
    }

    /// Confirm cash on delivery for one of the actor's orders
    pub fn pay_with_cod(
        &self,
        actor: &Actor,
        order_id: &str,
        idempotency_key: &str,
    ) -> MarketResult<CodPayment> {
        let order = self.owned_order(actor, order_id)?;
        let payment = self.payments.confirm_cod_payment(&order, idempotency_key)?;
        self.emit(
            AuditAction::CodPaymentConfirmed,
            &actor_label(actor),
            "payment",
            &payment.id,
            None::<&CodPayment>,
            Some(&payment),
        );
        Ok(payment)
    }

    pub fn handle_stripe_webhook(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> PaymentResult<WebhookResult> {
        let result = self
            .payments
            .handle_stripe_webhook(payload, signature_header)?;
        if result.processed {
            if let Some(payment) = result
                .payment_id
                .as_deref()
                .and_then(|id| self.payments.get_payment(id))
            {
                self.emit(
                    AuditAction::PaymentWebhookApplied,
                    ACTOR_STRIPE,
                    "payment",
                    payment.id(),
                    None::<&Payment>,
                    Some(&payment),
                );
            }
        }
        Ok(result)
    }

    pub fn get_payment(&self, payment_id: &str) -> Option<Payment> {
        self.payments.get_payment(payment_id)
    }

    pub fn payment_settings(&self) -> PaymentSettings {
        self.payments.get_settings()
    }

    pub fn update_payment_settings(&self, update: PaymentSettingsUpdate) -> PaymentSettings {
        let before = self.payments.get_settings();
        let after = self.payments.update_settings(update);
        if after != before {
            self.emit(
                AuditAction::PaymentSettingsUpdated,
                ACTOR_ADMIN,
                "payment_settings",
                "payment_settings",
                Some(&before),
                Some(&after),
            );
        }
        after
    }

    // ========================================================================
    // Refunds
    // ========================================================================

    /// File a refund request against a shipment of one of the actor's orders
    pub fn request_refund(
        &self,
        actor: &Actor,
        order_id: &str,
        shipment_id: &str,
        reason: &str,
        requested_amount_cents: i64,
    ) -> MarketResult<RefundRequest> {
        let order = self.owned_order(actor, order_id)?;
        let request =
            self.refunds
                .create_request(actor, &order, shipment_id, reason, requested_amount_cents)?;
        self.emit(
            AuditAction::RefundRequested,
            &actor_label(actor),
            "refund_request",
            &request.id,
            None::<&RefundRequest>,
            Some(&request),
        );
        Ok(request)
    }

    pub fn decide_refund(
        &self,
        vendor_id: &str,
        request_id: &str,
        decision: &str,
        decision_reason: &str,
        actor_user_id: &str,
    ) -> RefundResult<RefundRequest> {
        let before = self.refunds.get_request(request_id);
        let decided = self.refunds.decide_request(
            vendor_id,
            request_id,
            decision,
            decision_reason,
            actor_user_id,
        )?;
        self.emit(
            AuditAction::RefundDecided,
            &vendor_label(vendor_id, actor_user_id),
            "refund_request",
            &decided.id,
            before.as_ref(),
            Some(&decided),
        );
        Ok(decided)
    }

    pub fn list_vendor_refunds(
        &self,
        vendor_id: &str,
        status_filter: Option<&str>,
    ) -> RefundResult<Vec<RefundRequest>> {
        self.refunds.list_vendor_requests(vendor_id, status_filter)
    }

    // ========================================================================
    // Vendor shipments
    // ========================================================================

    pub fn list_vendor_shipments(&self, vendor_id: &str) -> CommerceResult<Vec<VendorShipment>> {
        self.ledger.list_vendor_shipments(vendor_id)
    }

    pub fn get_vendor_shipment(
        &self,
        vendor_id: &str,
        shipment_id: &str,
    ) -> CommerceResult<Option<VendorShipment>> {
        self.ledger.get_vendor_shipment(vendor_id, shipment_id)
    }

    pub fn update_vendor_shipment_status(
        &self,
        vendor_id: &str,
        shipment_id: &str,
        status: &str,
        actor_user_id: &str,
    ) -> CommerceResult<VendorShipment> {
        let before = self.ledger.get_vendor_shipment(vendor_id, shipment_id)?;
        let after =
            self.ledger
                .update_vendor_shipment_status(vendor_id, shipment_id, status, actor_user_id)?;
        if before.as_ref() != Some(&after) {
            self.emit(
                AuditAction::ShipmentStatusUpdated,
                &vendor_label(vendor_id, actor_user_id),
                "shipment",
                &after.id,
                before.as_ref(),
                Some(&after),
            );
        }
        Ok(after)
    }

    // ========================================================================
    // Admin
    // ========================================================================

    pub fn list_orders(&self, status_filter: Option<&str>) -> CommerceResult<Vec<Order>> {
        self.ledger.list_orders(status_filter)
    }

    pub fn get_order_for_admin(&self, order_id: &str) -> Option<Order> {
        self.ledger.get_order_for_admin(order_id)
    }

    pub fn update_order_status(&self, order_id: &str, status: &str) -> CommerceResult<Order> {
        let before = self.ledger.get_order_for_admin(order_id);
        let after = self.ledger.update_order_status(order_id, status)?;
        if before.as_ref() != Some(&after) {
            self.emit(
                AuditAction::OrderStatusUpdated,
                ACTOR_ADMIN,
                "order",
                &after.id,
                before.as_ref(),
                Some(&after),
            );
        }
        Ok(after)
    }

    /// Gross and commission of a settled order (zero while unsettled)
    pub fn order_financials(&self, order_id: &str) -> CommerceResult<OrderFinancials> {
        let order = self
            .ledger
            .get_order_for_admin(order_id)
            .ok_or_else(|| CommerceError::OrderNotFound(order_id.trim().to_string()))?;
        Ok(settled_order_financials(
            &order,
            self.vendors.as_ref(),
            self.config.default_commission_bps,
        ))
    }
}

fn actor_label(actor: &Actor) -> String {
    actor
        .key()
        .map(|key| key.to_string())
        .unwrap_or_default()
}

fn vendor_label(vendor_id: &str, actor_user_id: &str) -> String {
    let actor_user_id = actor_user_id.trim();
    if actor_user_id.is_empty() {
        format!("vendor:{}", vendor_id.trim())
    } else {
        format!("vendor:{}/user:{}", vendor_id.trim(), actor_user_id)
    }
}
