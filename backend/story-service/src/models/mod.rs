/// Data models for story-service
///
/// These are the records persisted by the record store and returned over HTTP.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Excerpt length in characters
pub const EXCERPT_LEN: usize = 120;

/// Appended to an excerpt when the body was cut
pub const EXCERPT_MARKER: &str = "...";

/// A submitted story
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: String,
    pub name: String,
    pub email: String,
    pub title: String,
    pub tag: String,
    /// Full text. Named `story` on the wire, matching the submission payload.
    #[serde(rename = "story")]
    pub body: String,
    pub votes: u64,
    pub boosted: bool,
    pub created_at: DateTime<Utc>,
    pub excerpt: String,
}

impl Story {
    /// Build a fresh story. Inputs are expected to be trimmed already.
    pub fn new(name: &str, email: &str, title: &str, tag: &str, body: &str) -> Self {
        Self {
            id: format!("story-{}", Uuid::new_v4().simple()),
            name: name.to_string(),
            email: email.to_string(),
            title: title.to_string(),
            tag: tag.to_string(),
            body: body.to_string(),
            votes: 0,
            boosted: false,
            created_at: Utc::now(),
            excerpt: excerpt_of(body),
        }
    }
}

/// First [`EXCERPT_LEN`] characters of `body`, marked when truncated.
pub fn excerpt_of(body: &str) -> String {
    let mut chars = body.chars();
    let mut excerpt: String = chars.by_ref().take(EXCERPT_LEN).collect();
    if chars.next().is_some() {
        excerpt.push_str(EXCERPT_MARKER);
    }
    excerpt
}

/// Emails that have voted, keyed by story id.
///
/// Serialized as a plain JSON object of arrays. An email appears at most once
/// per story.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoteLedger(BTreeMap<String, Vec<String>>);

impl VoteLedger {
    pub fn has_voted(&self, story_id: &str, email: &str) -> bool {
        self.0
            .get(story_id)
            .map(|emails| emails.iter().any(|e| e == email))
            .unwrap_or(false)
    }

    /// Record a vote and return the number of distinct voters for the story.
    /// Recording an email twice leaves the entry unchanged.
    pub fn record(&mut self, story_id: &str, email: &str) -> usize {
        let emails = self.0.entry(story_id.to_string()).or_default();
        if !emails.iter().any(|e| e == email) {
            emails.push(email.to_string());
        }
        emails.len()
    }

    pub fn count(&self, story_id: &str) -> usize {
        self.0.get(story_id).map(Vec::len).unwrap_or(0)
    }
}
