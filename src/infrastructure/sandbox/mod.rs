//! Validation sandbox: contract host types, the in-process harness, and
//! the process-isolated executor.

pub mod contract;
pub mod executor;
pub mod harness;

pub use executor::IsolatedExecutor;
pub use harness::{strip_code_fences, validate_source, HarnessOptions};
