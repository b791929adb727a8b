// Constants shared across the pipeline, storage and server
pub mod constants;

pub mod config;
pub mod error;
pub mod pipeline;
pub mod server;
pub mod service;
pub mod storage;
pub mod tasks;
pub mod utils;

// Re-export main types for convenience
pub use config::Config;
pub use error::{SiftError, SiftResult};
pub use pipeline::{PipelineRunner, PipelineSummary};
pub use service::{SiftService, Upload};
pub use tasks::{TaskRegistry, TaskSnapshot, TaskState};
