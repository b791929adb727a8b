use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;
use crate::constants::PROGRESS_COMPLETE;
use crate::error::{SiftError, SiftResult};
use crate::pipeline::PipelineSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Processing,
    Completed,
    Error,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, TaskState::Processing)
    }
}

/// Point-in-time view of a task, as returned to pollers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub task_id: Uuid,
    pub status: TaskState,
    pub message: String,
    pub progress: u8,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<PipelineSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time_mins: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskSnapshot {
    fn new(task_id: Uuid) -> Self {
        Self {
            task_id,
            status: TaskState::Processing,
            message: "File uploaded successfully, processing started".to_string(),
            progress: 0,
            start_time: Utc::now(),
            summary: None,
            output_file: None,
            processing_time_mins: None,
            error: None,
        }
    }
}

/// In-memory map from task id to its latest snapshot.
///
/// Readers take a shared lock and clone the snapshot. Mutation goes through
/// the [`TaskHandle`] returned by [`TaskRegistry::create`], so each task has a
/// single writer. Terminal snapshots are never changed again.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: RwLock<HashMap<Uuid, TaskSnapshot>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `id` in the processing state, replacing any previous entry.
    pub fn create(self: &Arc<Self>, id: Uuid) -> TaskHandle {
        self.tasks.write().insert(id, TaskSnapshot::new(id));
        TaskHandle {
            id,
            registry: Arc::clone(self),
        }
    }

    pub fn get(&self, id: Uuid) -> SiftResult<TaskSnapshot> {
        self.tasks
            .read()
            .get(&id)
            .cloned()
            .ok_or(SiftError::NotFound(id))
    }

    pub fn len(&self) -> usize {
        self.tasks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.read().is_empty()
    }

    /// Overwrites message and progress of a running task. Progress never moves
    /// backwards. Returns `false` when the task is unknown or already terminal.
    pub(crate) fn update(&self, id: Uuid, message: &str, progress: u8) -> bool {
        self.with_running(id, |task| {
            task.message = message.to_string();
            task.progress = task.progress.max(progress.min(PROGRESS_COMPLETE - 1));
        })
    }

    pub(crate) fn complete(
        &self,
        id: Uuid,
        message: &str,
        summary: PipelineSummary,
        output_file: PathBuf,
        processing_time_mins: f64,
    ) -> bool {
        self.with_running(id, |task| {
            task.status = TaskState::Completed;
            task.message = message.to_string();
            task.progress = PROGRESS_COMPLETE;
            task.summary = Some(summary);
            task.output_file = Some(output_file);
            task.processing_time_mins = Some(processing_time_mins);
        })
    }

    /// Moves a running task to the error state. The last published progress is kept.
    pub(crate) fn fail(&self, id: Uuid, error: &str) -> bool {
        self.with_running(id, |task| {
            task.status = TaskState::Error;
            task.message = error.to_string();
            task.error = Some(error.to_string());
        })
    }

    fn with_running(&self, id: Uuid, mutate: impl FnOnce(&mut TaskSnapshot)) -> bool {
        let mut tasks = self.tasks.write();
        match tasks.get_mut(&id) {
            Some(task) if !task.status.is_terminal() => {
                mutate(task);
                true
            }
            Some(task) => {
                debug!(task_id = %id, status = ?task.status, "Ignoring update to terminal task");
                false
            }
            None => {
                debug!(task_id = %id, "Ignoring update to unknown task");
                false
            }
        }
    }
}

/// Write access to one task's registry entry.
///
/// Not `Clone`: whoever holds the handle is the only writer. Terminal
/// transitions consume it.
#[derive(Debug)]
pub struct TaskHandle {
    id: Uuid,
    registry: Arc<TaskRegistry>,
}

impl TaskHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn update(&self, message: &str, progress: u8) {
        self.registry.update(self.id, message, progress);
    }

    pub fn complete(
        self,
        message: &str,
        summary: PipelineSummary,
        output_file: PathBuf,
        processing_time_mins: f64,
    ) {
        self.registry
            .complete(self.id, message, summary, output_file, processing_time_mins);
    }

    pub fn fail(self, error: &str) {
        self.registry.fail(self.id, error);
    }

    pub fn snapshot(&self) -> SiftResult<TaskSnapshot> {
        self.registry.get(self.id)
    }
}
