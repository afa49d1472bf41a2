//! Flat-file store for the client snapshot: `users.json` and `predictions.json`.
//!
//! Every save rewrites both documents in full. There is no locking; concurrent
//! saves are last-writer-wins.

use crate::errors::{AppError, ResultExt};
use crate::models::{SnapshotCounts, SnapshotPaths};
use serde_json::Value;
use std::path::{Path, PathBuf};

pub const USERS_FILE: &str = "users.json";
pub const PREDICTIONS_FILE: &str = "predictions.json";

/// Handle on the snapshot documents under one data directory.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    data_dir: PathBuf,
    users_path: PathBuf,
    predictions_path: PathBuf,
}

impl SnapshotStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            users_path: data_dir.join(USERS_FILE),
            predictions_path: data_dir.join(PREDICTIONS_FILE),
            data_dir,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn users_path(&self) -> &Path {
        &self.users_path
    }

    pub fn predictions_path(&self) -> &Path {
        &self.predictions_path
    }

    /// Creates the data directory and any missing document as `[]`.
    ///
    /// Existing documents are never touched.
    pub async fn ensure(&self) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .with_context(|| format!("creating {}", self.data_dir.display()))?;

        for path in [&self.users_path, &self.predictions_path] {
            let exists = tokio::fs::try_exists(path)
                .await
                .with_context(|| format!("checking {}", path.display()))?;
            if !exists {
                tokio::fs::write(path, "[]")
                    .await
                    .with_context(|| format!("initializing {}", path.display()))?;
                tracing::debug!("Initialized empty document {}", path.display());
            }
        }

        Ok(())
    }

    /// Replaces both documents and returns how many records each now holds.
    pub async fn save(
        &self,
        users: &[Value],
        predictions: &[Value],
    ) -> Result<(usize, usize), AppError> {
        write_document(&self.users_path, users).await?;
        write_document(&self.predictions_path, predictions).await?;

        tracing::info!(
            "Snapshot saved: users={} predictions={}",
            users.len(),
            predictions.len()
        );

        Ok((users.len(), predictions.len()))
    }

    /// Record counts of both documents together with their paths.
    pub async fn read_counts(&self) -> Result<SnapshotCounts, AppError> {
        let users = read_document(&self.users_path).await?;
        let predictions = read_document(&self.predictions_path).await?;

        Ok(SnapshotCounts {
            users_count: users.len(),
            predictions_count: predictions.len(),
            paths: SnapshotPaths {
                users: self.users_path.display().to_string(),
                predictions: self.predictions_path.display().to_string(),
            },
        })
    }
}

async fn write_document(path: &Path, records: &[Value]) -> Result<(), AppError> {
    // serde_json writes non-ASCII as UTF-8, so names survive unescaped.
    let body = serde_json::to_string_pretty(records)
        .with_context(|| format!("serializing {}", path.display()))?;
    tokio::fs::write(path, body)
        .await
        .with_context(|| format!("writing {}", path.display()))
}

async fn read_document(path: &Path) -> Result<Vec<Value>, AppError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}
