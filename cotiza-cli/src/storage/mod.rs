//! Object storage collaborator
//!
//! The batch flow hands the consolidated workbook to an object store and
//! records the returned retrieval URL. The store is a trait so deployments
//! can swap the backend; the default implementation keeps files on the local
//! filesystem under a `reports/` prefix.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;

/// Stores report artifacts and hands back retrieval URLs.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Upload a local file under `destination_name` and return its public
    /// retrieval URL.
    async fn upload_file(&self, local_path: &Path, destination_name: &str) -> Result<String>;

    /// Delete a previously uploaded object by its storage name.
    async fn delete_file(&self, object_name: &str) -> Result<()>;
}

/// Filesystem-backed store: objects live under `<root>/reports/` and resolve
/// to `file://` URLs.
#[derive(Debug, Clone)]
pub struct LocalObjectStorage {
    root: PathBuf,
}

impl LocalObjectStorage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn object_path(&self, object_name: &str) -> PathBuf {
        self.root.join("reports").join(object_name)
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn upload_file(&self, local_path: &Path, destination_name: &str) -> Result<String> {
        let target = self.object_path(destination_name);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create storage dir: {}", parent.display()))?;
        }
        tokio::fs::copy(local_path, &target)
            .await
            .with_context(|| format!("Failed to store {}", local_path.display()))?;
        debug!("stored report object at {}", target.display());
        Ok(format!("file://{}", target.display()))
    }

    async fn delete_file(&self, object_name: &str) -> Result<()> {
        let target = self.root.join(object_name);
        tokio::fs::remove_file(&target)
            .await
            .with_context(|| format!("Failed to delete {}", target.display()))?;
        Ok(())
    }
}
