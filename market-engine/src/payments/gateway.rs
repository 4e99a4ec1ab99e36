//! Card payment gateway port
//!
//! [`StripeGateway`] talks to the Stripe REST API directly (no SDK);
//! [`MockGateway`] mints deterministic-looking refs for local runs and tests.

use super::error::{PaymentError, PaymentResult};
use async_trait::async_trait;
use shared::util::prefixed_id;

const STRIPE_API_BASE: &str = "https://api.stripe.com";

/// What the gateway hands back for a new intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayIntent {
    pub provider_ref: String,
    pub client_secret: String,
}

/// Payment intent creation
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment_intent(
        &self,
        order_id: &str,
        amount_cents: i64,
        currency: &str,
        idempotency_key: &str,
    ) -> PaymentResult<GatewayIntent>;
}

/// In-process gateway returning `pi_*` refs
#[derive(Debug, Default)]
pub struct MockGateway;

impl MockGateway {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_payment_intent(
        &self,
        order_id: &str,
        amount_cents: i64,
        _currency: &str,
        _idempotency_key: &str,
    ) -> PaymentResult<GatewayIntent> {
        let provider_ref = prefixed_id("pi");
        let client_secret = format!("{}_secret_{}", provider_ref, prefixed_id("sec"));
        tracing::debug!(order_id = %order_id, amount_cents, provider_ref = %provider_ref, "Mock payment intent created");
        Ok(GatewayIntent {
            provider_ref,
            client_secret,
        })
    }
}

/// Stripe REST gateway
pub struct StripeGateway {
    secret_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for StripeGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeGateway")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl StripeGateway {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self::with_base_url(secret_key, STRIPE_API_BASE)
    }

    /// Point the gateway at another API host (stripe-mock, proxies)
    pub fn with_base_url(secret_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into().trim().to_string(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_payment_intent(
        &self,
        order_id: &str,
        amount_cents: i64,
        currency: &str,
        idempotency_key: &str,
    ) -> PaymentResult<GatewayIntent> {
        if self.secret_key.is_empty() {
            return Err(PaymentError::Gateway("stripe secret key is required".into()));
        }

        let amount = amount_cents.to_string();
        let currency = currency.trim().to_ascii_lowercase();
        let resp = self
            .client
            .post(format!("{}/v1/payment_intents", self.base_url))
            .basic_auth(&self.secret_key, None::<&str>)
            .header("Idempotency-Key", idempotency_key.trim())
            .form(&[
                ("amount", amount.as_str()),
                ("currency", currency.as_str()),
                ("metadata[order_id]", order_id.trim()),
                ("automatic_payment_methods[enabled]", "true"),
            ])
            .send()
            .await
            .map_err(|e| PaymentError::Gateway(format!("stripe connection failed: {}", e)))?;

        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| PaymentError::Gateway(format!("invalid stripe response: {}", e)))?;

        if !status.is_success() {
            let message = body["error"]["message"]
                .as_str()
                .unwrap_or("unknown error")
                .to_string();
            tracing::warn!(order_id = %order_id, status = %status, error = %message, "Stripe rejected payment intent");
            return Err(PaymentError::Gateway(format!("{} - {}", status, message)));
        }

        Ok(GatewayIntent {
            provider_ref: body["id"].as_str().unwrap_or_default().trim().to_string(),
            client_secret: body["client_secret"]
                .as_str()
                .unwrap_or_default()
                .trim()
                .to_string(),
        })
    }
}
