//! Request input validation
//!
//! Names are trimmed before checking; the trimmed form is what gets stored.
//! Length is measured in UTF-16 code units, the unit browser clients count in.

use thiserror::Error;

pub const MIN_NAME_LENGTH: usize = 2;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name is required")]
    NameRequired,

    #[error("Name cannot contain only spaces")]
    NameBlank,

    #[error("Name must be at least 2 characters long")]
    NameTooShort,
}

/// Validate a node name from a request body
///
/// Returns the trimmed name.
pub fn validate_name(name: Option<&str>) -> Result<String, ValidationError> {
    let raw = match name {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Err(ValidationError::NameRequired),
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::NameBlank);
    }
    if trimmed.encode_utf16().count() < MIN_NAME_LENGTH {
        return Err(ValidationError::NameTooShort);
    }

    Ok(trimmed.to_string())
}
