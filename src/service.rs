use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;
use crate::config::Config;
use crate::error::{SiftError, SiftResult};
use crate::pipeline::{validate_archive, PipelineRunner};
use crate::storage::{ArtifactStore, TaskArtifacts};
use crate::tasks::{TaskHandle, TaskRegistry, TaskSnapshot, TaskState};

/// Where a submitted upload comes from.
#[derive(Debug)]
pub enum Upload {
    Bytes(Vec<u8>),
    File(PathBuf),
}

/// Submit, poll and fetch over the in-memory task registry.
///
/// Each accepted submission runs on the blocking pool and is never
/// cancelled. Tasks interrupted by a process shutdown stay in the
/// processing state forever; the registry does not survive restarts.
pub struct SiftService {
    registry: Arc<TaskRegistry>,
    store: ArtifactStore,
    runner: PipelineRunner,
    purge_previous_artifacts: bool,
}

impl SiftService {
    pub fn new(config: &Config) -> Self {
        Self {
            registry: Arc::new(TaskRegistry::new()),
            store: ArtifactStore::new(config.storage_root()),
            runner: PipelineRunner::from_config(&config.processing),
            purge_previous_artifacts: config.storage.purge_previous_artifacts,
        }
    }

    pub fn registry(&self) -> &Arc<TaskRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Stores and validates the upload, then starts processing in the
    /// background. A corrupt upload is rejected here and never gets a task.
    pub async fn submit(&self, upload_name: Option<&str>, upload: Upload) -> SiftResult<Uuid> {
        let id = Uuid::new_v4();
        let store = self.store.clone();
        let purge = self.purge_previous_artifacts;
        let upload_name = upload_name.map(str::to_string);

        let artifacts = tokio::task::spawn_blocking(move || {
            stage_upload(&store, id, upload_name.as_deref(), upload, purge)
        })
        .await
        .map_err(|e| SiftError::Spawn(e.to_string()))??;

        let task = self.registry.create(id);
        info!(task_id = %id, input = %artifacts.input.display(), "Submission accepted, processing started");
        self.launch(task, artifacts);

        Ok(id)
    }

    pub async fn submit_bytes(&self, upload_name: Option<&str>, payload: Vec<u8>) -> SiftResult<Uuid> {
        self.submit(upload_name, Upload::Bytes(payload)).await
    }

    pub async fn submit_path(&self, path: &Path) -> SiftResult<Uuid> {
        let name = path.file_name().and_then(|n| n.to_str()).map(str::to_string);
        self.submit(name.as_deref(), Upload::File(path.to_path_buf())).await
    }

    pub fn poll(&self, id: Uuid) -> SiftResult<TaskSnapshot> {
        self.registry.get(id)
    }

    /// Output location of a completed task, checked to exist.
    pub fn artifact_path(&self, id: Uuid) -> SiftResult<PathBuf> {
        let snapshot = self.registry.get(id)?;
        if snapshot.status != TaskState::Completed {
            return Err(SiftError::NotReady(id));
        }

        match snapshot.output_file {
            Some(path) if path.exists() => Ok(path),
            Some(path) => Err(SiftError::ArtifactMissing(path)),
            None => Err(SiftError::ArtifactMissing(self.store.task_dir(id))),
        }
    }

    pub async fn fetch(&self, id: Uuid) -> SiftResult<Vec<u8>> {
        let path = self.artifact_path(id)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(SiftError::ArtifactMissing(path)),
            Err(e) => Err(SiftError::Storage(e)),
        }
    }

    fn launch(&self, task: TaskHandle, artifacts: TaskArtifacts) {
        let id = task.id();
        let runner = self.runner.clone();
        let registry = Arc::clone(&self.registry);

        let worker = tokio::task::spawn_blocking(move || {
            runner.execute(task, &artifacts.input, &artifacts.output);
        });

        tokio::spawn(async move {
            if let Err(e) = worker.await {
                error!(task_id = %id, error = %e, "Processing worker aborted");
                registry.fail(id, &format!("Error during processing: {}", e));
            }
        });
    }
}

fn stage_upload(
    store: &ArtifactStore,
    id: Uuid,
    upload_name: Option<&str>,
    upload: Upload,
    purge_previous: bool,
) -> SiftResult<TaskArtifacts> {
    if purge_previous {
        if let Err(e) = store.purge_except(id) {
            warn!(error = %e, "Could not clean up previous artifacts");
        }
    }

    let artifacts = store.prepare(id, upload_name)?;
    let stored = match upload {
        Upload::Bytes(payload) => fs::write(&artifacts.input, payload),
        Upload::File(source) => fs::copy(&source, &artifacts.input).map(|_| ()),
    };

    let validated = stored
        .map_err(SiftError::from)
        .and_then(|()| validate_archive(&artifacts.input));

    match validated {
        Ok(header) => {
            info!(task_id = %id, header = %truncate(&header, 100), "Upload validated");
            Ok(artifacts)
        }
        Err(e) => {
            warn!(task_id = %id, error = %e, "Rejecting upload");
            if let Err(cleanup) = store.remove_task(id) {
                warn!(task_id = %id, error = %cleanup, "Could not remove rejected upload");
            }
            Err(e)
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
