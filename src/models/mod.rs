//! Domain models
//!
//! This module contains the value types passed between the benchmark engine
//! and its callers.

pub mod benchmark;
pub mod environment;
pub mod language;

pub use benchmark::*;
pub use environment::*;
pub use language::*;
