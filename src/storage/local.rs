//! Local filesystem storage implementation.
//!
//! Writes go to a sibling `.tmp` file which is then renamed over the target,
//! so a crash mid-write never leaves a truncated seen-set behind.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::SeenSet;
use crate::storage::SeenStorage;

/// Seen-set stored as a JSON file.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    /// Create a LocalStorage backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.ensure_dir().await?;

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[async_trait]
impl SeenStorage for LocalStorage {
    async fn load(&self) -> Result<SeenSet> {
        match self.read_bytes().await? {
            Some(bytes) => {
                let seen: SeenSet = serde_json::from_slice(&bytes)?;
                log::debug!(
                    "Loaded {} seen ids from {}",
                    seen.len(),
                    self.path.display()
                );
                Ok(seen)
            }
            None => {
                log::info!(
                    "No seen-set at {}, starting empty",
                    self.path.display()
                );
                Ok(SeenSet::new())
            }
        }
    }

    async fn save(&self, seen: &SeenSet) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(seen)?;
        self.write_bytes(&bytes).await?;
        log::debug!("Saved {} seen ids to {}", seen.len(), self.path.display());
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
