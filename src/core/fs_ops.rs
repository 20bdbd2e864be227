// src/core/fs_ops.rs
//! File helpers for the locally persisted session and job lists

use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;
use tracing::debug;

pub struct FsOps;

impl FsOps {
    pub async fn ensure_dir_exists(path: &Path) -> Result<()> {
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)
                .await
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
            debug!("Created directory: {}", path.display());
        }
        Ok(())
    }

    pub async fn read_file_safe(path: &Path) -> Result<String> {
        fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read file: {}", path.display()))
    }

    /// Write through a sibling temp file so readers never see a partial file
    pub async fn write_file_safe(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            Self::ensure_dir_exists(parent).await?;
        }

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, content)
            .await
            .with_context(|| format!("Failed to write file: {}", tmp.display()))?;
        fs::rename(&tmp, path)
            .await
            .with_context(|| format!("Failed to replace file: {}", path.display()))?;

        debug!("Written file: {}", path.display());
        Ok(())
    }

    pub async fn remove_file_if_exists(path: &Path) -> Result<()> {
        if path.exists() {
            fs::remove_file(path)
                .await
                .with_context(|| format!("Failed to remove file: {}", path.display()))?;
            debug!("Removed file: {}", path.display());
        }
        Ok(())
    }
}
