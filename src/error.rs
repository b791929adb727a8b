use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced to whoever submits, polls or fetches tasks.
///
/// Faults inside a running pipeline never show up here: they move the owning
/// task to its error state and are read back through a poll.
#[derive(Error, Debug)]
pub enum SiftError {
    #[error("Invalid or corrupted gz file: {0}")]
    CorruptInput(String),

    #[error("Task not found: {0}")]
    NotFound(Uuid),

    #[error("File not ready for download: task {0} has not completed")]
    NotReady(Uuid),

    #[error("Processed file not found: {}", .0.display())]
    ArtifactMissing(PathBuf),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Failed to start processing: {0}")]
    Spawn(String),
}

impl SiftError {
    /// True for lookups that did not mutate any task state.
    pub fn is_lookup_error(&self) -> bool {
        matches!(
            self,
            SiftError::NotFound(_) | SiftError::NotReady(_) | SiftError::ArtifactMissing(_)
        )
    }
}

pub type SiftResult<T> = std::result::Result<T, SiftError>;
