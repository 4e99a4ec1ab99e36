/// Default cart currency
pub const DEFAULT_CURRENCY: &str = "USD";
/// Default flat fee per shipment, in cents
pub const DEFAULT_SHIPPING_FEE_CENTS: i64 = 500;
/// Default platform commission in basis points (1000 = 10%)
pub const DEFAULT_COMMISSION_BPS: u32 = 1000;
/// Webhook signature timestamp tolerance, in seconds
pub const DEFAULT_WEBHOOK_TOLERANCE_SECS: i64 = 300;
/// Audit channel capacity
pub const DEFAULT_AUDIT_BUFFER_SIZE: usize = 1024;

/// Engine configuration
///
/// # Environment variables
///
/// Every setting can be overridden from the environment:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | MARKET_ENVIRONMENT | development | runtime environment |
/// | MARKET_CURRENCY | USD | cart currency |
/// | MARKET_SHIPPING_FEE_CENTS | 500 | flat fee per shipment (≤0 falls back to default) |
/// | MARKET_DEFAULT_COMMISSION_BPS | 1000 | commission when a vendor has no override |
/// | STRIPE_SECRET_KEY | - | real gateway when set, mock otherwise |
/// | STRIPE_WEBHOOK_SECRET | - | webhook signing secret |
/// | STRIPE_WEBHOOK_TOLERANCE_SECS | 300 | signature timestamp tolerance |
/// | MARKET_STRIPE_ENABLED | true | initial card payment switch |
/// | MARKET_COD_ENABLED | true | initial cash-on-delivery switch |
/// | AUDIT_BUFFER_SIZE | 1024 | audit channel capacity |
/// | LOG_LEVEL | info | log level |
/// | LOG_DIR | - | log directory |
///
/// # Example
///
/// ```ignore
/// MARKET_SHIPPING_FEE_CENTS=700 STRIPE_WEBHOOK_SECRET=whsec_x cargo run
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// development | staging | production
    pub environment: String,
    /// Currency fixed on every cart at creation
    pub currency: String,
    /// Flat fee charged once per vendor shipment
    pub shipping_fee_cents: i64,
    /// Default commission (basis points)
    pub default_commission_bps: u32,
    /// Stripe API key
    pub stripe_secret_key: Option<String>,
    /// Stripe webhook signing secret
    pub stripe_webhook_secret: Option<String>,
    /// Webhook timestamp tolerance (seconds, 0 disables the check)
    pub webhook_tolerance_secs: i64,
    pub stripe_enabled: bool,
    pub cod_enabled: bool,
    pub audit_buffer_size: usize,
    pub log_level: String,
    pub log_dir: Option<String>,
}

impl EngineConfig {
    /// Load configuration from the environment
    ///
    /// Reads `.env` first when present; unset variables keep their defaults
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        Self {
            environment: std::env::var("MARKET_ENVIRONMENT")
                .unwrap_or_else(|_| "development".into()),
            currency: std::env::var("MARKET_CURRENCY")
                .ok()
                .map(|c| c.trim().to_ascii_uppercase())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_CURRENCY.into()),
            shipping_fee_cents: std::env::var("MARKET_SHIPPING_FEE_CENTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|fee| *fee > 0)
                .unwrap_or(DEFAULT_SHIPPING_FEE_CENTS),
            default_commission_bps: std::env::var("MARKET_DEFAULT_COMMISSION_BPS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_COMMISSION_BPS),
            stripe_secret_key: non_blank_var("STRIPE_SECRET_KEY"),
            stripe_webhook_secret: non_blank_var("STRIPE_WEBHOOK_SECRET"),
            webhook_tolerance_secs: std::env::var("STRIPE_WEBHOOK_TOLERANCE_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_WEBHOOK_TOLERANCE_SECS),
            stripe_enabled: std::env::var("MARKET_STRIPE_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            cod_enabled: std::env::var("MARKET_COD_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            audit_buffer_size: std::env::var("AUDIT_BUFFER_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|size| *size > 0)
                .unwrap_or(DEFAULT_AUDIT_BUFFER_SIZE),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: non_blank_var("LOG_DIR"),
        }
    }

    /// Defaults plus a fixed webhook secret
    pub fn with_webhook_secret(secret: impl Into<String>) -> Self {
        Self {
            stripe_webhook_secret: Some(secret.into()),
            ..Self::default()
        }
    }

    /// Running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Running in development
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for EngineConfig {
    /// Does not read the environment
    fn default() -> Self {
        Self {
            environment: "development".into(),
            currency: DEFAULT_CURRENCY.into(),
            shipping_fee_cents: DEFAULT_SHIPPING_FEE_CENTS,
            default_commission_bps: DEFAULT_COMMISSION_BPS,
            stripe_secret_key: None,
            stripe_webhook_secret: None,
            webhook_tolerance_secs: DEFAULT_WEBHOOK_TOLERANCE_SECS,
            stripe_enabled: true,
            cod_enabled: true,
            audit_buffer_size: DEFAULT_AUDIT_BUFFER_SIZE,
            log_level: "info".into(),
            log_dir: None,
        }
    }
}

fn non_blank_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
