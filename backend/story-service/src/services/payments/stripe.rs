//! Stripe Checkout client.
//!
//! Only the one call this service needs: create a checkout session for a
//! story boost. Requests are form encoded with bracketed keys, as the Stripe
//! REST API expects.

use super::{CheckoutSession, GatewayError, PaymentGateway};
use crate::config::StripeConfig;
use crate::services::payments::webhook::STORY_ID_METADATA_KEY;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Product name shown on the checkout page
pub const BOOST_PRODUCT_NAME: &str = "Story Boost";

#[derive(Clone)]
pub struct StripeClient {
    http: Client,
    config: StripeConfig,
    site_url: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

impl StripeClient {
    pub fn new(config: StripeConfig, site_url: impl Into<String>) -> Result<Self, GatewayError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            config,
            site_url: site_url.into(),
        })
    }

    /// Form fields for a one-item card payment carrying the story id.
    fn session_form(&self, story_id: &str) -> Vec<(String, String)> {
        let metadata_key = format!("metadata[{STORY_ID_METADATA_KEY}]");
        vec![
            ("payment_method_types[0]".into(), "card".into()),
            (
                "line_items[0][price_data][currency]".into(),
                self.config.currency.clone(),
            ),
            (
                "line_items[0][price_data][product_data][name]".into(),
                BOOST_PRODUCT_NAME.into(),
            ),
            (
                "line_items[0][price_data][product_data][description]".into(),
                format!("Boost story ID: {story_id}"),
            ),
            (
                "line_items[0][price_data][unit_amount]".into(),
                self.config.boost_amount_cents.to_string(),
            ),
            ("line_items[0][quantity]".into(), "1".into()),
            ("mode".into(), "payment".into()),
            (
                "success_url".into(),
                format!(
                    "{}/success.html?session_id={{CHECKOUT_SESSION_ID}}",
                    self.site_url
                ),
            ),
            ("cancel_url".into(), format!("{}/cancel.html", self.site_url)),
            (metadata_key, story_id.to_string()),
        ]
    }
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_boost_session(&self, story_id: &str) -> Result<CheckoutSession, GatewayError> {
        if self.config.secret_key.trim().is_empty() {
            return Err(GatewayError::NotConfigured);
        }

        let url = format!("{}/v1/checkout/sessions", self.config.api_base);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.secret_key)
            .form(&self.session_form(story_id))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<StripeErrorBody>(&body)
                .ok()
                .and_then(|err| err.error.message)
                .unwrap_or_else(|| "no error message".to_string());
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let session: CheckoutSession = response.json().await?;
        tracing::info!(story_id = %story_id, session_id = %session.id, "checkout session created");
        Ok(session)
    }
}
