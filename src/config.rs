//! Runtime configuration
//!
//! Read once at startup from `MEALPLAN_*` environment variables.

use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const DEFAULT_PAGE_URL: &str = "http://localhost:3000/";
pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";
pub const DEFAULT_PRICE_LABEL: &str = "$9.99";
pub const DEFAULT_STRIPE_TIMEOUT_SECS: u64 = 30;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid URL in {var}: {source}")]
    InvalidUrl {
        var: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid {var}: '{value}' is not a positive whole number of seconds")]
    InvalidSeconds { var: &'static str, value: String },
}

/// Stripe credentials and product reference
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub secret_key: String,
    pub price_id: String,
    pub api_base: Url,
    /// Upper bound on one session request
    pub timeout: Duration,
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Page the checkout provider returns to
    pub page_url: Url,
    /// Price shown in the locked view
    pub price_label: String,
    /// `None` when the Stripe key or price is not set
    pub checkout: Option<CheckoutConfig>,
}

impl Config {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let page_url = parse_url(
            "MEALPLAN_PAGE_URL",
            get("MEALPLAN_PAGE_URL").as_deref().unwrap_or(DEFAULT_PAGE_URL),
        )?;

        let price_label = get("MEALPLAN_UNLOCK_PRICE_LABEL")
            .unwrap_or_else(|| DEFAULT_PRICE_LABEL.to_string());

        let checkout = match (
            get("MEALPLAN_STRIPE_SECRET_KEY"),
            get("MEALPLAN_STRIPE_PRICE_ID"),
        ) {
            (Some(secret_key), Some(price_id)) => {
                let api_base = parse_url(
                    "MEALPLAN_STRIPE_API_BASE",
                    get("MEALPLAN_STRIPE_API_BASE")
                        .as_deref()
                        .unwrap_or(DEFAULT_STRIPE_API_BASE),
                )?;
                let timeout = match get("MEALPLAN_STRIPE_TIMEOUT_SECS") {
                    Some(raw) => parse_seconds("MEALPLAN_STRIPE_TIMEOUT_SECS", &raw)?,
                    None => Duration::from_secs(DEFAULT_STRIPE_TIMEOUT_SECS),
                };
                Some(CheckoutConfig {
                    secret_key,
                    price_id,
                    api_base,
                    timeout,
                })
            }
            _ => None,
        };

        Ok(Self {
            page_url,
            price_label,
            checkout,
        })
    }
}

fn parse_url(var: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl { var, source })
}

fn parse_seconds(var: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidSeconds {
            var,
            value: raw.to_string(),
        }),
    }
}
