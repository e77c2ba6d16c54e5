//! Input validation utilities

use crate::constants::{MAX_INPUT_SIZES_PER_REQUEST, MAX_SOURCE_CODE_BYTES};

/// Validate source code size (bytes)
pub fn validate_source_code(code: &str) -> Result<(), &'static str> {
    if code.trim().is_empty() {
        return Err("Source code cannot be empty");
    }
    if code.len() as u64 > MAX_SOURCE_CODE_BYTES {
        return Err("Source code exceeds maximum size (64KB)");
    }
    Ok(())
}

/// Validate an explicit function name.
///
/// The name is spliced into the harness as a call target, so it must be a
/// plain identifier in every supported language.
pub fn validate_function_name(name: &str) -> Result<(), &'static str> {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        Some(_) => return Err("Function name must start with a letter or underscore"),
        None => return Err("Function name cannot be empty"),
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$') {
        return Err("Function name can only contain letters, digits and underscores");
    }
    Ok(())
}

/// Validate requested input sizes against the configured ceiling
pub fn validate_input_sizes(sizes: &[usize], max_input_size: usize) -> Result<(), String> {
    if sizes.len() as u64 > MAX_INPUT_SIZES_PER_REQUEST {
        return Err(format!(
            "At most {} input sizes are allowed per request",
            MAX_INPUT_SIZES_PER_REQUEST
        ));
    }
    if let Some(size) = sizes
        .iter()
        .find(|size| **size == 0 || **size > max_input_size)
    {
        return Err(format!(
            "Input size {} is out of range (1..={})",
            size, max_input_size
        ));
    }
    Ok(())
}
