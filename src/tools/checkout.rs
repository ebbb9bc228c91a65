//! Checkout redirect
//!
//! Builds the one-time payment request, hands it to a checkout provider and
//! recognizes the unlock marker on the return URL.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::config::CheckoutConfig;

/// Query key set on the success return URL
pub const UNLOCK_PARAM: &str = "unlocked";
/// Value of `UNLOCK_PARAM` that unlocks the plan
pub const UNLOCK_VALUE: &str = "true";
/// Query key carrying the purchaser's email on return
pub const EMAIL_PARAM: &str = "email";

/// Connect timeout for the provider API
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Checkout error types
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Checkout is not configured (set MEALPLAN_STRIPE_SECRET_KEY and MEALPLAN_STRIPE_PRICE_ID)")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider rejected checkout ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Provider returned no redirect URL for session {0}")]
    MissingRedirect(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Checkout mode; only one-time payments are sold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutMode {
    Payment,
}

impl CheckoutMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutMode::Payment => "payment",
        }
    }
}

/// Request handed to the checkout provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutRequest {
    pub email: String,
    pub price_id: String,
    pub quantity: u32,
    pub mode: CheckoutMode,
    pub success_url: String,
    pub cancel_url: String,
}

impl CheckoutRequest {
    /// Build a single-item payment request returning to `page_url`
    pub fn new(email: &str, price_id: &str, page_url: &Url) -> Self {
        Self {
            email: email.to_string(),
            price_id: price_id.to_string(),
            quantity: 1,
            mode: CheckoutMode::Payment,
            success_url: success_url(page_url, email).to_string(),
            cancel_url: strip_return_params(page_url).to_string(),
        }
    }
}

/// Session created by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// Where the caller should navigate to pay
    pub url: String,
}

/// A prepared request together with the session the provider opened for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutHandoff {
    pub request: CheckoutRequest,
    pub session: CheckoutSession,
}

/// What the return URL says about the checkout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckoutReturn {
    pub unlocked: bool,
    pub email: Option<String>,
}

/// Something that can open a hosted checkout session
#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    async fn create_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, CheckoutError>;
}

/// Open a session for an already prepared request.
///
/// Takes the request by value so callers can release any plan state before
/// waiting on the provider.
pub async fn open_session(
    provider: &dyn CheckoutProvider,
    request: CheckoutRequest,
) -> Result<CheckoutHandoff, CheckoutError> {
    match provider.create_session(&request).await {
        Ok(session) => {
            tracing::info!(session_id = %session.id, "Checkout session created");
            Ok(CheckoutHandoff { request, session })
        }
        Err(e) => {
            tracing::warn!(error = %e, "Checkout session failed");
            Err(e)
        }
    }
}

// ============================================================================
// Return URLs
// ============================================================================

/// Page URL with any previous return markers removed
fn strip_return_params(page_url: &Url) -> Url {
    let kept: Vec<(String, String)> = page_url
        .query_pairs()
        .filter(|(k, _)| k != UNLOCK_PARAM && k != EMAIL_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut url = page_url.clone();
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
    url
}

/// Current page plus `unlocked=true` and the URL-encoded email
pub fn success_url(page_url: &Url, email: &str) -> Url {
    let mut url = strip_return_params(page_url);
    url.query_pairs_mut()
        .append_pair(UNLOCK_PARAM, UNLOCK_VALUE)
        .append_pair(EMAIL_PARAM, email);
    url
}

/// Read the unlock marker from a return location.
///
/// Accepts a full URL, a relative path with a query, or a bare query string
/// with or without the leading `?`. Only the first `unlocked` value counts.
pub fn parse_checkout_return(location: &str) -> CheckoutReturn {
    let location = location.trim();
    let query = match Url::parse(location) {
        Ok(url) => url.query().unwrap_or_default().to_string(),
        Err(_) => {
            let without_fragment = location.split('#').next().unwrap_or_default();
            match without_fragment.split_once('?') {
                Some((_, query)) => query.to_string(),
                None if without_fragment.contains('=') => without_fragment.to_string(),
                None => String::new(),
            }
        }
    };

    let mut result = CheckoutReturn::default();
    let mut seen_unlock = false;
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        if key == UNLOCK_PARAM && !seen_unlock {
            seen_unlock = true;
            result.unlocked = value == UNLOCK_VALUE;
        } else if key == EMAIL_PARAM && result.email.is_none() {
            result.email = Some(value.into_owned());
        }
    }
    result
}

/// True when the return location carries `unlocked=true`
pub fn detect_unlock_marker(location: &str) -> bool {
    parse_checkout_return(location).unlocked
}

// ============================================================================
// Stripe
// ============================================================================

#[derive(Debug, Deserialize)]
struct StripeSession {
    id: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

/// Stripe Checkout Sessions API
pub struct StripeCheckout {
    client: reqwest::Client,
    secret_key: String,
    endpoint: Url,
}

impl StripeCheckout {
    pub fn new(config: &CheckoutConfig) -> Result<Self, CheckoutError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            secret_key: config.secret_key.clone(),
            endpoint: config.api_base.join("/v1/checkout/sessions")?,
        })
    }
}

#[async_trait]
impl CheckoutProvider for StripeCheckout {
    async fn create_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, CheckoutError> {
        let form = [
            ("mode", request.mode.as_str().to_string()),
            ("success_url", request.success_url.clone()),
            ("cancel_url", request.cancel_url.clone()),
            ("customer_email", request.email.clone()),
            ("line_items[0][price]", request.price_id.clone()),
            ("line_items[0][quantity]", request.quantity.to_string()),
        ];

        tracing::debug!(endpoint = %self.endpoint, "Creating checkout session");

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<StripeErrorBody>(&body)
                .ok()
                .and_then(|b| b.error.message)
                .unwrap_or(body);
            return Err(CheckoutError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let session: StripeSession = response.json().await?;
        let url = session
            .url
            .ok_or_else(|| CheckoutError::MissingRedirect(session.id.clone()))?;

        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }
}
