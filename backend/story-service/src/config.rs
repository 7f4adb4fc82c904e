/// Configuration management for Story Service
///
/// Configuration is read from environment variables. `main` loads a `.env`
/// file first when one exists.
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Record store configuration
    pub storage: StorageConfig,
    /// Payment processor configuration
    pub stripe: StripeConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
    /// Public base URL of the site, used for checkout redirects
    pub site_url: String,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Record store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the JSON collections
    pub data_dir: PathBuf,
}

/// Stripe settings. Secret values are skipped when the config is serialized.
#[derive(Clone, Serialize, Deserialize)]
pub struct StripeConfig {
    #[serde(skip_serializing)]
    pub secret_key: String,
    pub publishable_key: String,
    #[serde(skip_serializing)]
    pub webhook_secret: String,
    pub api_base: String,
    /// Boost price in the currency's smallest unit
    pub boost_amount_cents: u64,
    pub currency: String,
    /// Maximum age of a webhook signature timestamp
    pub webhook_tolerance_secs: i64,
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &redact(&self.secret_key))
            .field("publishable_key", &self.publishable_key)
            .field("webhook_secret", &redact(&self.webhook_secret))
            .field("api_base", &self.api_base)
            .field("boost_amount_cents", &self.boost_amount_cents)
            .field("currency", &self.currency)
            .field("webhook_tolerance_secs", &self.webhook_tolerance_secs)
            .finish()
    }
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            publishable_key: String::new(),
            webhook_secret: String::new(),
            api_base: "https://api.stripe.com".to_string(),
            boost_amount_cents: 200,
            currency: "usd".to_string(),
            webhook_tolerance_secs: 300,
        }
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let production = app_env.eq_ignore_ascii_case("production");
        let defaults = StripeConfig::default();

        let config = Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("STORY_SERVICE_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or_default("PORT", 3000)?,
                site_url: std::env::var("SITE_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if production => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => "*".to_string(),
                };

                if production && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            storage: StorageConfig {
                data_dir: std::env::var("DATA_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("data")),
            },
            stripe: StripeConfig {
                secret_key: std::env::var("STRIPE_SECRET_KEY").unwrap_or_default(),
                publishable_key: std::env::var("STRIPE_PUBLISHABLE_KEY").unwrap_or_default(),
                webhook_secret: std::env::var("STRIPE_WEBHOOK_SECRET").unwrap_or_default(),
                api_base: std::env::var("STRIPE_API_BASE")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or(defaults.api_base),
                boost_amount_cents: parse_env_or_default(
                    "BOOST_AMOUNT_CENTS",
                    defaults.boost_amount_cents,
                )?,
                currency: std::env::var("BOOST_CURRENCY").unwrap_or(defaults.currency),
                webhook_tolerance_secs: parse_env_or_default(
                    "STRIPE_WEBHOOK_TOLERANCE_SECS",
                    defaults.webhook_tolerance_secs,
                )?,
            },
        };

        if production {
            if config.stripe.secret_key.trim().is_empty() {
                return Err("STRIPE_SECRET_KEY must be set in production".to_string());
            }
            if config.stripe.webhook_secret.trim().is_empty() {
                return Err("STRIPE_WEBHOOK_SECRET must be set in production".to_string());
            }
        }

        Ok(config)
    }
}

fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}
