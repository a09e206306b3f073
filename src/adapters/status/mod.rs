//! Status reporter implementations.

pub mod file;
pub mod memory;

pub use file::FileStatusReporter;
pub use memory::MemoryStatusReporter;
