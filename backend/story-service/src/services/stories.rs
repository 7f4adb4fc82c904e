use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::Story;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Page size when the caller does not ask for one
pub const DEFAULT_LIST_LIMIT: usize = 10;

/// Tag value that disables filtering
pub const ALL_TAGS: &str = "all";

pub const STORY_NOT_FOUND: &str = "Story not found.";

/// Story lifecycle: submit, list, vote, boost.
///
/// Every mutation holds the lock of each collection it touches for the whole
/// read-modify-write, stories before votes.
pub struct StoryService {
    store: Arc<Store>,
}

impl StoryService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Most recent first, optionally restricted to one tag.
    pub async fn list(&self, tag: Option<&str>, limit: Option<usize>) -> Result<Vec<Story>> {
        let stories = self.store.stories.load_all().await?;
        let tag = tag.map(str::trim).filter(|t| !t.is_empty() && *t != ALL_TAGS);

        Ok(stories
            .into_iter()
            .filter(|story| tag.map_or(true, |tag| story.tag == tag))
            .take(limit.unwrap_or(DEFAULT_LIST_LIMIT))
            .collect())
    }

    pub async fn get(&self, id: &str) -> Result<Story> {
        self.store
            .stories
            .load_all()
            .await?
            .into_iter()
            .find(|story| story.id == id)
            .ok_or_else(|| AppError::NotFound(STORY_NOT_FOUND.into()))
    }

    pub async fn submit(
        &self,
        name: &str,
        email: &str,
        title: &str,
        tag: &str,
        body: &str,
    ) -> Result<Story> {
        let fields = [name, email, title, tag, body].map(str::trim);
        if fields.iter().any(|field| field.is_empty()) {
            return Err(AppError::ValidationError("All fields are required.".into()));
        }
        let [name, email, title, tag, body] = fields;

        let story = Story::new(name, email, title, tag, body);

        let stories_guard = self.store.stories.lock().await;
        let mut stories = stories_guard.load().await?;
        stories.insert(0, story.clone());
        stories_guard.save(&stories).await?;

        info!(story_id = %story.id, tag = %story.tag, "story submitted");
        Ok(story)
    }

    /// Record one vote per email per story. Returns the new vote count.
    pub async fn vote(&self, id: &str, email: Option<&str>) -> Result<u64> {
        let email = email
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .ok_or_else(|| AppError::ValidationError("Email is required to vote.".into()))?;

        let stories_guard = self.store.stories.lock().await;
        let votes_guard = self.store.votes.lock().await;

        let mut stories = stories_guard.load().await?;
        let index = stories
            .iter()
            .position(|story| story.id == id)
            .ok_or_else(|| AppError::NotFound(STORY_NOT_FOUND.into()))?;

        let mut ledger = votes_guard.load().await?;
        if ledger.has_voted(id, email) {
            return Err(AppError::Forbidden(
                "You have already voted for this story.".into(),
            ));
        }

        let previous = stories.clone();
        let new_count = ledger.record(id, email) as u64;
        stories[index].votes = new_count;

        // Ledger last: while it lacks the email, a retry recounts from it
        stories_guard.save(&stories).await?;
        if let Err(err) = votes_guard.save(&ledger).await {
            if let Err(restore_err) = stories_guard.save(&previous).await {
                warn!(story_id = %id, error = %restore_err, "failed to restore vote count");
            }
            return Err(err.into());
        }

        info!(story_id = %id, votes = new_count, "vote recorded");
        Ok(new_count)
    }

    /// Flag a story as boosted. Safe to repeat; unknown ids are ignored.
    /// Returns whether anything changed.
    pub async fn mark_boosted(&self, id: &str) -> Result<bool> {
        let stories_guard = self.store.stories.lock().await;
        let mut stories = stories_guard.load().await?;

        let Some(index) = stories.iter().position(|story| story.id == id) else {
            warn!(story_id = %id, "boost confirmed for unknown story, ignoring");
            return Ok(false);
        };

        if stories[index].boosted {
            debug!(story_id = %id, "story already boosted");
            return Ok(false);
        }

        stories[index].boosted = true;
        stories_guard.save(&stories).await?;

        info!(story_id = %id, "story boosted");
        Ok(true)
    }
}
