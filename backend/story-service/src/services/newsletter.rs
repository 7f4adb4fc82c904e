use crate::db::Store;
use crate::error::{AppError, Result};
use std::sync::Arc;
use tracing::info;

/// Newsletter subscriber list. Emails are stored as given after trimming.
pub struct SubscriptionService {
    store: Arc<Store>,
}

impl SubscriptionService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub async fn subscribe(&self, email: Option<&str>) -> Result<()> {
        let email = email
            .map(str::trim)
            .filter(|email| !email.is_empty() && email.contains('@'))
            .ok_or_else(|| AppError::ValidationError("A valid email is required.".into()))?;

        let guard = self.store.subscribers.lock().await;
        let mut subscribers = guard.load().await?;
        if subscribers.iter().any(|existing| existing == email) {
            return Err(AppError::Conflict(
                "This email is already subscribed.".into(),
            ));
        }

        subscribers.push(email.to_string());
        guard.save(&subscribers).await?;

        info!(subscribers = subscribers.len(), "newsletter subscription added");
        Ok(())
    }
}
