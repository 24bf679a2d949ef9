//! Option table validation.
//!
//! Checks the structural invariants of an option table before it is used for
//! matching: every row has a name and well-formed prefixes, multi-argument
//! options take at least one value, and no spelling is claimed by two
//! different options in the same driver mode.
//!
//! # Examples
//!
//! ```
//! use compile_command_core::*;
//!
//! assert!(validate_option_table(DRIVER_OPTIONS).is_empty());
//!
//! // Invalid: "-o" claimed by two unrelated options for the same driver.
//! let bad = [
//!     OptionSpec { group: "o", prefixes: &["-"], name: "o", kind: OptionKind::Separate, modes: ModeSet::GCC },
//!     OptionSpec { group: "out", prefixes: &["-"], name: "o", kind: OptionKind::Joined, modes: ModeSet::ALL },
//! ];
//! assert!(!validate_option_table(&bad).is_empty());
//! ```

use std::collections::HashMap;

use thiserror::Error;

use crate::{OptionKind, OptionSpec};

/// Option table validation errors.
///
/// Each variant describes a specific structural problem found during
/// validation. The `Display` impl provides a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Option name is empty.
    #[error("option in group {0} has an empty name")]
    EmptyName(String),
    /// Option row lists no prefixes.
    #[error("option {0} has no prefixes")]
    MissingPrefix(String),
    /// Prefix is not one of `-`, `--` or `/`.
    #[error("option {name} has invalid prefix: {prefix}")]
    InvalidPrefix { name: String, prefix: String },
    /// Option row is visible in no driver mode.
    #[error("option {0} is not visible in any driver mode")]
    NoModes(String),
    /// A multi-argument option declares zero values.
    #[error("multi-arg option {0} takes no values")]
    EmptyMultiArg(String),
    /// Two groups claim the same spelling in a shared driver mode.
    #[error("spelling {spelling} claimed by both {first} and {second}")]
    DuplicateSpelling {
        spelling: String,
        first: String,
        second: String,
    },
}

const VALID_PREFIXES: &[&str] = &["-", "--", "/"];

/// Validates an option table.
///
/// All row-level problems are reported; duplicate spellings are reported
/// once per offending pair.
pub fn validate_option_table(table: &[OptionSpec]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut claimed: HashMap<String, Vec<&OptionSpec>> = HashMap::new();

    for spec in table {
        if spec.name.is_empty() {
            errors.push(ValidationError::EmptyName(spec.group.to_string()));
            continue;
        }
        if spec.prefixes.is_empty() {
            errors.push(ValidationError::MissingPrefix(spec.name.to_string()));
        }
        for prefix in spec.prefixes {
            if !VALID_PREFIXES.contains(prefix) {
                errors.push(ValidationError::InvalidPrefix {
                    name: spec.name.to_string(),
                    prefix: prefix.to_string(),
                });
            }
        }
        if spec.modes.is_empty() {
            errors.push(ValidationError::NoModes(spec.name.to_string()));
        }
        if spec.kind == OptionKind::MultiArg(0) {
            errors.push(ValidationError::EmptyMultiArg(spec.name.to_string()));
        }

        for spelling in spec.spellings() {
            let owners = claimed.entry(spelling.clone()).or_default();
            if let Some(other) = owners
                .iter()
                .find(|other| other.group != spec.group && other.modes.intersects(spec.modes))
            {
                errors.push(ValidationError::DuplicateSpelling {
                    spelling,
                    first: other.group.to_string(),
                    second: spec.group.to_string(),
                });
            }
            owners.push(spec);
        }
    }

    errors
}
