//! Internal model
//!
//! Persisted shapes of operations and runtime configurations.

mod operation;
mod runtime;

// Re-exports
pub use operation::*;
pub use runtime::*;
