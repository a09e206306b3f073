//! Workload adapter implementations.

pub mod local;
pub mod memory;

pub use local::LocalWorkload;
pub use memory::{MemoryWorkload, WorkloadCall};
