use serde::{Deserialize, Serialize};
use crate::constants::*;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingPhase {
    Started,
    Reading,
    Transforming,
    DuplicateDetection,
    Writing,
    Completed,
    Failed(String),
}

impl ProcessingPhase {
    /// Progress published when the phase is entered.
    pub fn progress_percentage(&self) -> u8 {
        match self {
            ProcessingPhase::Started => 0,
            ProcessingPhase::Reading => PROGRESS_READING,
            ProcessingPhase::Transforming => PROGRESS_TRANSFORMING,
            ProcessingPhase::DuplicateDetection => PROGRESS_DETECTING,
            ProcessingPhase::Writing => PROGRESS_WRITING,
            ProcessingPhase::Completed => PROGRESS_COMPLETE,
            ProcessingPhase::Failed(_) => 0,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ProcessingPhase::Started => "Queued for processing".to_string(),
            ProcessingPhase::Reading => "Reading and processing CSV file...".to_string(),
            ProcessingPhase::Transforming => {
                "Applying transformations and creating CONCAT patterns...".to_string()
            }
            ProcessingPhase::DuplicateDetection => "Detecting duplicates...".to_string(),
            ProcessingPhase::Writing => "Saving processed file...".to_string(),
            ProcessingPhase::Completed => "Processing completed successfully!".to_string(),
            ProcessingPhase::Failed(error) => format!("Error during processing: {}", error),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessingPhase::Completed | ProcessingPhase::Failed(_))
    }

    /// Whether the state machine allows moving from `self` to `next`.
    pub fn can_transition_to(&self, next: &ProcessingPhase) -> bool {
        use ProcessingPhase::*;
        match (self, next) {
            (_, Failed(_)) => !self.is_terminal(),
            (Started, Reading)
            | (Reading, Transforming)
            | (Transforming, DuplicateDetection)
            | (DuplicateDetection, Writing)
            | (Writing, Completed) => true,
            _ => false,
        }
    }
}

/// Progress while streaming rows through the filter: starts at
/// `PROGRESS_FILTERING` and approaches, without reaching, 70.
pub fn filtering_progress(rows_read: usize) -> u8 {
    let rows = rows_read as f64;
    let ramp = (rows / (rows + PROGRESS_RAMP_RECORDS)) * PROGRESS_FILTERING_SPAN;
    PROGRESS_FILTERING + ramp.min(PROGRESS_FILTERING_SPAN) as u8
}
