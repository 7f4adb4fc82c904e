//! JSON-file backed collections.
//!
//! Each collection is a single JSON document on disk (`<data_dir>/<name>.json`)
//! read and written whole. A collection owns an async mutex; every read and
//! write goes through it, and callers that need read-modify-write take a
//! [`CollectionGuard`] and keep it for the whole sequence.
//!
//! Writes land in a temporary sibling file which is then renamed over the
//! target, so readers never see a partially written document.

use serde::{de::DeserializeOwned, Serialize};
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode collection {collection}: {source}")]
    Encode {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub(crate) fn io(action: &'static str, path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A named collection holding one document of type `T`.
///
/// `T::default()` is the empty document written on first access.
pub struct JsonCollection<T> {
    name: &'static str,
    path: PathBuf,
    lock: Mutex<()>,
    _document: PhantomData<fn() -> T>,
    #[cfg(test)]
    fail_next_write: std::sync::atomic::AtomicBool,
}

/// Exclusive access to a collection until dropped.
pub struct CollectionGuard<'a, T> {
    collection: &'a JsonCollection<T>,
    _guard: MutexGuard<'a, ()>,
}

impl<T> JsonCollection<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(data_dir: &Path, name: &'static str) -> Self {
        Self {
            name,
            path: data_dir.join(format!("{name}.json")),
            lock: Mutex::new(()),
            _document: PhantomData,
            #[cfg(test)]
            fail_next_write: std::sync::atomic::AtomicBool::new(false),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wait for exclusive access.
    pub async fn lock(&self) -> CollectionGuard<'_, T> {
        CollectionGuard {
            collection: self,
            _guard: self.lock.lock().await,
        }
    }

    /// Read the whole document. A missing file is created holding the empty
    /// document.
    pub async fn load_all(&self) -> StoreResult<T> {
        self.lock().await.load().await
    }

    /// Replace the whole document.
    pub async fn save_all(&self, document: &T) -> StoreResult<()> {
        self.lock().await.save(document).await
    }

    async fn read(&self) -> StoreResult<T> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(
                    collection = self.name,
                    path = %self.path.display(),
                    "collection missing, initializing empty document"
                );
                let empty = T::default();
                self.write(&empty).await?;
                return Ok(empty);
            }
            Err(err) => return Err(StoreError::io("read", &self.path, err)),
        };

        serde_json::from_slice(&raw).map_err(|source| StoreError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    /// Make the next write fail as a disk error would.
    #[cfg(test)]
    pub(crate) fn fail_next_write(&self) {
        self.fail_next_write
            .store(true, std::sync::atomic::Ordering::SeqCst);
    }

    async fn write(&self, document: &T) -> StoreResult<()> {
        #[cfg(test)]
        if self
            .fail_next_write
            .swap(false, std::sync::atomic::Ordering::SeqCst)
        {
            return Err(StoreError::io(
                "replace",
                &self.path,
                std::io::Error::new(ErrorKind::Other, "simulated write failure"),
            ));
        }

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| StoreError::io("create directory", parent, err))?;
        }

        let payload =
            serde_json::to_vec_pretty(document).map_err(|source| StoreError::Encode {
                collection: self.name,
                source,
            })?;

        let temp_path = self
            .path
            .with_extension(format!("json.{}.tmp", Uuid::new_v4().simple()));
        tokio::fs::write(&temp_path, payload)
            .await
            .map_err(|err| StoreError::io("write", &temp_path, err))?;

        if let Err(err) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(StoreError::io("replace", &self.path, err));
        }

        Ok(())
    }
}

impl<T> CollectionGuard<'_, T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub async fn load(&self) -> StoreResult<T> {
        self.collection.read().await
    }

    pub async fn save(&self, document: &T) -> StoreResult<()> {
        self.collection.write(document).await
    }
}
