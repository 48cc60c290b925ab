//! Application-level configuration.
//!
//! - [`ExecutionParams`] - conversation loop control (iteration ceiling, timeouts)

pub mod execution_params;

pub use execution_params::ExecutionParams;
