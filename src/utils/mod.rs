//! Utility functions

pub mod time;
pub mod validation;

pub use time::{format_milliseconds, format_seconds};
pub use validation::{validate_function_name, validate_input_sizes, validate_source_code};
