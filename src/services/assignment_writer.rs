//! Assignment writers: the hand-off point to external persistence
//!
//! The engine issues no writes of its own. Commit passes the final assignment
//! list to an [`AssignmentWriter`], which is responsible for applying it to
//! channel records.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::errors::{AppError, AppResult};
use crate::models::EpgAssignment;

#[async_trait]
pub trait AssignmentWriter: Send + Sync {
    /// Short label used in logs and error messages
    fn name(&self) -> &str;

    /// Persist one committed batch, returning the number of entries written
    async fn write_assignments(&self, assignments: &[EpgAssignment]) -> AppResult<usize>;
}

/// Writes each committed batch as a pretty-printed JSON array
#[derive(Debug, Clone)]
pub struct JsonFileAssignmentWriter {
    path: PathBuf,
}

impl JsonFileAssignmentWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AssignmentWriter for JsonFileAssignmentWriter {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn write_assignments(&self, assignments: &[EpgAssignment]) -> AppResult<usize> {
        let contents = serde_json::to_string_pretty(assignments)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, contents).await.map_err(|e| {
            AppError::writer(
                self.name(),
                format!("failed to write {}: {}", self.path.display(), e),
            )
        })?;

        info!(
            "Wrote {} EPG assignments to {}",
            assignments.len(),
            self.path.display()
        );
        Ok(assignments.len())
    }
}

/// Keeps committed batches in memory; used for dry runs and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryAssignmentWriter {
    batches: Arc<Mutex<Vec<Vec<EpgAssignment>>>>,
}

impl MemoryAssignmentWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn batches(&self) -> Vec<Vec<EpgAssignment>> {
        self.batches.lock().await.clone()
    }

    pub async fn last_batch(&self) -> Option<Vec<EpgAssignment>> {
        self.batches.lock().await.last().cloned()
    }
}

#[async_trait]
impl AssignmentWriter for MemoryAssignmentWriter {
    fn name(&self) -> &str {
        "memory"
    }

    async fn write_assignments(&self, assignments: &[EpgAssignment]) -> AppResult<usize> {
        debug!("Recording {} EPG assignments in memory", assignments.len());
        self.batches.lock().await.push(assignments.to_vec());
        Ok(assignments.len())
    }
}
