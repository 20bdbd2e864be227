// src/job_cache.rs
//! Saved and applied job ids for the current session

use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::core::FsOps;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobLists {
    #[serde(default)]
    pub saved: Vec<String>,
    #[serde(default)]
    pub applied: Vec<String>,
}

impl JobLists {
    pub fn is_empty(&self) -> bool {
        self.saved.is_empty() && self.applied.is_empty()
    }
}

pub struct JobListCache {
    lists: Mutex<JobLists>,
    path: Option<PathBuf>,
}

impl JobListCache {
    pub fn in_memory() -> Self {
        Self {
            lists: Mutex::new(JobLists::default()),
            path: None,
        }
    }

    /// Load lists persisted at `path`; a missing or unreadable file starts empty
    pub async fn load(path: &Path) -> Self {
        let lists = match FsOps::read_file_safe(path).await {
            Ok(content) => serde_json::from_str::<JobLists>(&content).unwrap_or_else(|e| {
                warn!("Ignoring corrupt job list cache {}: {}", path.display(), e);
                JobLists::default()
            }),
            Err(_) => JobLists::default(),
        };

        Self {
            lists: Mutex::new(dedup(lists)),
            path: Some(path.to_path_buf()),
        }
    }

    pub fn snapshot(&self) -> JobLists {
        self.lists.lock().clone()
    }

    pub fn saved_ids(&self) -> Vec<String> {
        self.lists.lock().saved.clone()
    }

    pub fn applied_ids(&self) -> Vec<String> {
        self.lists.lock().applied.clone()
    }

    pub fn is_saved(&self, job_id: &str) -> bool {
        self.lists.lock().saved.iter().any(|id| id == job_id)
    }

    pub fn is_applied(&self, job_id: &str) -> bool {
        self.lists.lock().applied.iter().any(|id| id == job_id)
    }

    /// Flip the saved flag for `job_id`; returns the new state
    pub async fn toggle_saved(&self, job_id: &str) -> Result<bool> {
        let now_saved = {
            let mut lists = self.lists.lock();
            if let Some(pos) = lists.saved.iter().position(|id| id == job_id) {
                lists.saved.remove(pos);
                false
            } else {
                lists.saved.push(job_id.to_string());
                true
            }
        };
        self.persist().await?;
        Ok(now_saved)
    }

    /// Record an application; returns false if it was already recorded
    pub async fn mark_applied(&self, job_id: &str) -> Result<bool> {
        let added = {
            let mut lists = self.lists.lock();
            if lists.applied.iter().any(|id| id == job_id) {
                false
            } else {
                lists.applied.push(job_id.to_string());
                true
            }
        };
        if added {
            self.persist().await?;
        }
        Ok(added)
    }

    /// Empty both lists. Memory is cleared before the file is touched, so a
    /// failed write still leaves the in-process view empty.
    pub async fn clear(&self) -> Result<()> {
        self.clear_in_memory();

        if let Some(path) = &self.path {
            FsOps::remove_file_if_exists(path)
                .await
                .context("Failed to remove job cache")?;
            info!("Cleared session job lists at {}", path.display());
        }
        Ok(())
    }

    /// Empty both lists without touching the file; true if anything was dropped
    pub fn clear_in_memory(&self) -> bool {
        let previous = std::mem::take(&mut *self.lists.lock());
        !previous.is_empty()
    }

    pub(crate) async fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let content = serde_json::to_string_pretty(&self.snapshot())
            .context("Failed to serialize job lists")?;
        FsOps::write_file_safe(path, &content).await
    }
}

fn dedup(mut lists: JobLists) -> JobLists {
    for ids in [&mut lists.saved, &mut lists.applied] {
        let mut seen = std::collections::HashSet::new();
        ids.retain(|id| seen.insert(id.clone()));
    }
    lists
}
