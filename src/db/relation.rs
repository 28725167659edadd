//! Validated relation (table) names.

use std::fmt;

use crate::{DriveError, Result};

/// Maximum length of a relation name.
pub const MAX_RELATION_LENGTH: usize = 63;

/// Name of the relation that stores file records.
///
/// SQL cannot bind identifiers as parameters, so the name is spliced into
/// statement text. Only plain identifiers are accepted: ASCII letters, digits
/// and underscores, not starting with a digit and not in SQLite's reserved
/// `sqlite_` namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Relation(String);

impl Relation {
    /// Validate and wrap a relation name.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();

        if name.is_empty() || name.len() > MAX_RELATION_LENGTH {
            return Err(DriveError::Validation(format!(
                "relation name must be 1-{MAX_RELATION_LENGTH} characters"
            )));
        }
        if name.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(DriveError::Validation(format!(
                "relation name '{name}' starts with a digit"
            )));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(DriveError::Validation(format!(
                "relation name '{name}' contains invalid characters"
            )));
        }
        if name.to_ascii_lowercase().starts_with("sqlite_") {
            return Err(DriveError::Validation(format!(
                "relation name '{name}' is reserved"
            )));
        }

        Ok(Self(name))
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
