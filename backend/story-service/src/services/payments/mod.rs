/// Payment processor integration
///
/// - `stripe`: Checkout session client used to start a boost purchase
/// - `webhook`: signature verification for processor callbacks
pub mod stripe;
pub mod webhook;

pub use stripe::StripeClient;
pub use webhook::{verify_event, SignatureError, WebhookEvent, CHECKOUT_SESSION_COMPLETED};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A checkout session opened with the processor. The browser redirects to
/// it by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
}

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("payment processor is not configured")]
    NotConfigured,

    #[error("request to payment processor failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("payment processor returned {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// Opens boost checkout sessions with a payment processor.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_boost_session(&self, story_id: &str) -> Result<CheckoutSession, GatewayError>;
}
