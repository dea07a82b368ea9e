//! Small helpers shared across the backend.
//!
//! Mostly string normalization used by request validation and the
//! configuration loader.

/// Trim `value`, returning `None` when nothing is left.
pub fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Present-and-non-empty variant for optional request fields.
pub fn non_empty_owned(value: Option<&str>) -> Option<String> {
    value.and_then(non_empty).map(str::to_string)
}
