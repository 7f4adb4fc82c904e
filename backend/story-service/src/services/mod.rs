/// Business logic layer for story-service
///
/// This module provides high-level operations:
/// - Story service: listing, submission, voting, boost flag
/// - Boost service: checkout sessions and payment callbacks
/// - Subscription service: newsletter sign-ups
///
/// Payment processor plumbing lives in `payments`.
pub mod boost;
pub mod newsletter;
pub mod payments;
pub mod stories;

// Re-export commonly used services
pub use boost::{BoostService, WebhookOutcome};
pub use newsletter::SubscriptionService;
pub use payments::{PaymentGateway, StripeClient};
pub use stories::StoryService;
