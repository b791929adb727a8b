pub mod registry;

pub use registry::{TaskHandle, TaskRegistry, TaskSnapshot, TaskState};
