//! CLI subcommand implementations.

pub mod batch;
pub mod cost;
pub mod run;
pub mod validate;
