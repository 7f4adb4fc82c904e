/// Record store for story-service
///
/// Three independent JSON documents live in the data directory:
/// - `stories.json`: sequence of stories, most recent first
/// - `votes.json`: story id to the emails that voted for it
/// - `subscribers.json`: newsletter emails
///
/// When a caller needs more than one collection it locks them in field order
/// (stories, votes, subscribers).
pub mod collection;

pub use collection::{JsonCollection, StoreError, StoreResult};

use crate::models::{Story, VoteLedger};
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const STORIES_COLLECTION: &str = "stories";
pub const VOTES_COLLECTION: &str = "votes";
pub const SUBSCRIBERS_COLLECTION: &str = "subscribers";

pub struct Store {
    data_dir: PathBuf,
    pub stories: JsonCollection<Vec<Story>>,
    pub votes: JsonCollection<VoteLedger>,
    pub subscribers: JsonCollection<Vec<String>>,
}

impl Store {
    pub fn open(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref().to_path_buf();
        Self {
            stories: JsonCollection::new(&data_dir, STORIES_COLLECTION),
            votes: JsonCollection::new(&data_dir, VOTES_COLLECTION),
            subscribers: JsonCollection::new(&data_dir, SUBSCRIBERS_COLLECTION),
            data_dir,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Create any missing collection files. Called once at start-up so a
    /// misconfigured data directory fails fast.
    pub async fn initialize(&self) -> StoreResult<()> {
        self.stories.load_all().await?;
        self.votes.load_all().await?;
        self.subscribers.load_all().await?;
        Ok(())
    }

    /// Check that the data directory exists and this process can create files
    /// in it, by writing and removing a scratch file.
    pub async fn check_writable(&self) -> StoreResult<()> {
        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|err| StoreError::io("create directory", &self.data_dir, err))?;

        let scratch = self
            .data_dir
            .join(format!(".write-check-{}.tmp", Uuid::new_v4().simple()));
        tokio::fs::write(&scratch, b"ok")
            .await
            .map_err(|err| StoreError::io("write", &scratch, err))?;
        tokio::fs::remove_file(&scratch)
            .await
            .map_err(|err| StoreError::io("remove", &scratch, err))?;

        Ok(())
    }
}
