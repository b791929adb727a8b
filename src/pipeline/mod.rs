pub mod codec;
pub mod duplicates;
pub mod filter;
pub mod phase;
pub mod record;
pub mod runner;
pub mod transform;

#[cfg(test)]
mod tests;

pub use codec::{validate_archive, RecordReader};
pub use duplicates::{flag_duplicates, DuplicateCounts};
pub use phase::ProcessingPhase;
pub use record::Record;
pub use runner::{PipelineRunner, PipelineSummary};
pub use transform::CompositeKey;
