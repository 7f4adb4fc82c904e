use crate::config::StripeConfig;
use crate::error::Result;
use crate::services::payments::{
    verify_event, CheckoutSession, PaymentGateway, CHECKOUT_SESSION_COMPLETED,
};
use crate::services::stories::StoryService;
use std::sync::Arc;
use tracing::{info, warn};

/// What a verified webhook delivery did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// The story was flagged as boosted
    Boosted(String),
    /// Completed checkout for a story that was already boosted or is unknown
    Unchanged(String),
    /// Completed checkout with no story id in its metadata
    MissingStoryId,
    /// Event type this service does not act on
    Ignored(String),
}

/// Paid boosts: opening checkout sessions and applying confirmed payments.
pub struct BoostService {
    stories: Arc<StoryService>,
    gateway: Arc<dyn PaymentGateway>,
    stripe: StripeConfig,
}

impl BoostService {
    pub fn new(
        stories: Arc<StoryService>,
        gateway: Arc<dyn PaymentGateway>,
        stripe: StripeConfig,
    ) -> Self {
        Self {
            stories,
            gateway,
            stripe,
        }
    }

    /// Public key handed to the browser checkout
    pub fn publishable_key(&self) -> &str {
        &self.stripe.publishable_key
    }

    /// Open a checkout session for an existing story.
    pub async fn start_checkout(&self, story_id: &str) -> Result<CheckoutSession> {
        let story = self.stories.get(story_id).await?;
        let session = self.gateway.create_boost_session(&story.id).await?;

        info!(story_id = %story.id, session_id = %session.id, "boost checkout started");
        Ok(session)
    }

    /// Verify a processor callback and apply it.
    pub async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<WebhookOutcome> {
        let event = verify_event(
            payload,
            signature,
            &self.stripe.webhook_secret,
            self.stripe.webhook_tolerance_secs,
            chrono::Utc::now().timestamp(),
        )
        .map_err(|err| {
            warn!(error = %err, "webhook rejected");
            err
        })?;

        if event.event_type != CHECKOUT_SESSION_COMPLETED {
            info!(event_id = %event.id, event_type = %event.event_type, "unhandled event type");
            return Ok(WebhookOutcome::Ignored(event.event_type));
        }

        let Some(story_id) = event.boosted_story_id() else {
            warn!(event_id = %event.id, "completed checkout without storyId metadata");
            return Ok(WebhookOutcome::MissingStoryId);
        };

        if self.stories.mark_boosted(&story_id).await? {
            Ok(WebhookOutcome::Boosted(story_id))
        } else {
            Ok(WebhookOutcome::Unchanged(story_id))
        }
    }
}
