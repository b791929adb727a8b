use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use crate::config::ProcessingConfig;
use crate::constants::*;
use crate::pipeline::codec::{write_records, RecordReader};
use crate::pipeline::duplicates::{flag_duplicates, DuplicateCounts};
use crate::pipeline::phase::{filtering_progress, ProcessingPhase};
use crate::pipeline::{filter, transform};
use crate::tasks::TaskHandle;
use crate::utils::{elapsed_minutes, format_count};

/// Result of a completed run, attached to the task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub total_input_lines: usize,
    pub lines_processed: usize,
    #[serde(flatten)]
    pub duplicates: DuplicateCounts,
}

/// Drives one task through read, filter, transform, detect and write,
/// publishing progress to the task's registry entry.
#[derive(Debug, Clone)]
pub struct PipelineRunner {
    progress_interval: usize,
}

impl Default for PipelineRunner {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_INTERVAL_RECORDS)
    }
}

impl PipelineRunner {
    pub fn new(progress_interval: usize) -> Self {
        Self {
            progress_interval: progress_interval.max(1),
        }
    }

    pub fn from_config(config: &ProcessingConfig) -> Self {
        Self::new(config.progress_interval_records)
    }

    /// Runs the pipeline and records the outcome on the task. Any fault ends
    /// in the error state; nothing is propagated to the caller.
    pub fn execute(&self, task: TaskHandle, input: &Path, output: &Path) {
        let start_time = Instant::now();
        let task_id = task.id();
        let mut phase = ProcessingPhase::Started;

        match self.run(&task, &mut phase, input, output) {
            Ok(summary) => {
                let minutes = elapsed_minutes(start_time.elapsed());
                info!(
                    task_id = %task_id,
                    total = summary.total_input_lines,
                    processed = summary.lines_processed,
                    key_a_duplicates = summary.duplicates.header_po_date_amount,
                    key_b_duplicates = summary.duplicates.vendor_year_amount,
                    key_c_duplicates = summary.duplicates.header_po_amount,
                    minutes,
                    "Processing completed"
                );
                task.complete(
                    &ProcessingPhase::Completed.message(),
                    summary,
                    output.to_path_buf(),
                    minutes,
                );
            }
            Err(e) => {
                let failed = ProcessingPhase::Failed(format!("{:#}", e));
                error!(task_id = %task_id, phase = ?phase, error = %format!("{:#}", e), "Processing failed");
                task.fail(&failed.message());
            }
        }
    }

    /// The pipeline proper. `phase` tracks the last phase entered so callers
    /// can tell where a failure happened.
    pub fn run(
        &self,
        task: &TaskHandle,
        phase: &mut ProcessingPhase,
        input: &Path,
        output: &Path,
    ) -> Result<PipelineSummary> {
        enter(task, phase, ProcessingPhase::Reading)?;
        let reader = RecordReader::open(input)?;

        task.update("Applying filters and processing data...", PROGRESS_FILTERING);
        let mut total_input_lines = 0;
        let mut records = Vec::new();
        for record in reader {
            let record = record.with_context(|| {
                format!("Malformed input near data row {}", total_input_lines + 1)
            })?;
            total_input_lines += 1;

            if filter::accept(&record) {
                records.push(record.project(&REQUIRED_FIELDS));
            }

            if total_input_lines % self.progress_interval == 0 {
                task.update(
                    &format!("Processed {} input lines...", format_count(total_input_lines)),
                    filtering_progress(total_input_lines),
                );
            }
        }
        let lines_processed = records.len();
        debug!(task_id = %task.id(), total_input_lines, lines_processed, "Filtering finished");

        enter(task, phase, ProcessingPhase::Transforming)?;
        records.par_iter_mut().for_each(transform::apply);

        enter(task, phase, ProcessingPhase::DuplicateDetection)?;
        let duplicates = flag_duplicates(&mut records);

        enter(task, phase, ProcessingPhase::Writing)?;
        if !write_records(&records, &OUTPUT_COLUMNS, output)? {
            warn!(task_id = %task.id(), "No records survived filtering, no output file written");
        }

        Ok(PipelineSummary {
            total_input_lines,
            lines_processed,
            duplicates,
        })
    }
}

fn enter(task: &TaskHandle, phase: &mut ProcessingPhase, next: ProcessingPhase) -> Result<()> {
    if !phase.can_transition_to(&next) {
        anyhow::bail!("Invalid phase transition from {:?} to {:?}", phase, next);
    }

    debug!(task_id = %task.id(), phase = ?next, "Entering phase");
    task.update(&next.message(), next.progress_percentage());
    *phase = next;
    Ok(())
}
