use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::{debug, warn};
use uuid::Uuid;
use crate::constants::*;

/// Input and output locations owned by one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskArtifacts {
    pub directory: PathBuf,
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Per-task artifact directories under a common root (`<root>/<task_id>/`).
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn task_dir(&self, id: Uuid) -> PathBuf {
        self.root.join(id.to_string())
    }

    /// Creates the task directory and returns where the upload and the
    /// processed file go.
    pub fn prepare(&self, id: Uuid, upload_name: Option<&str>) -> io::Result<TaskArtifacts> {
        let directory = self.task_dir(id);
        fs::create_dir_all(&directory)?;

        let upload_name = upload_name
            .and_then(sanitize_file_name)
            .unwrap_or_else(|| DEFAULT_UPLOAD_NAME.to_string());
        let output_name = output_file_name(&upload_name);

        Ok(TaskArtifacts {
            input: directory.join(upload_name),
            output: directory.join(output_name),
            directory,
        })
    }

    pub fn remove_task(&self, id: Uuid) -> io::Result<()> {
        let directory = self.task_dir(id);
        if directory.exists() {
            fs::remove_dir_all(directory)?;
        }
        Ok(())
    }

    /// Deletes every task directory except `keep`. Entries that are not task
    /// directories are left alone. Returns how many directories were removed.
    pub fn purge_except(&self, keep: Uuid) -> io::Result<usize> {
        if !self.root.exists() {
            return Ok(0);
        }

        let mut removed = 0;
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(id) = name.to_str().and_then(|n| Uuid::parse_str(n).ok()) else {
                continue;
            };
            if id == keep || !entry.path().is_dir() {
                continue;
            }

            match fs::remove_dir_all(entry.path()) {
                Ok(()) => {
                    debug!(task_id = %id, "Removed previous task artifacts");
                    removed += 1;
                }
                Err(e) => warn!(task_id = %id, error = %e, "Could not remove previous task artifacts"),
            }
        }

        Ok(removed)
    }
}

/// Keeps `[A-Za-z0-9._-]`, maps whitespace to `_` and strips leading dots.
/// Returns `None` when nothing usable remains.
pub fn sanitize_file_name(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .filter_map(|ch| match ch {
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// `invoices.csv.gz` -> `processed_invoices.csv`
pub fn output_file_name(upload_name: &str) -> String {
    let stem = upload_name
        .strip_suffix(GZIP_EXTENSION)
        .unwrap_or(upload_name);
    let stem = stem.strip_suffix(CSV_EXTENSION).unwrap_or(stem);
    format!("{}{}{}", OUTPUT_FILE_PREFIX, stem, CSV_EXTENSION)
}
