//! Entry names
//!
//! Every entry is addressed by a canonical name: lowercase ASCII letters,
//! digits and underscores. Raw user input is normalized before any lookup:
//!
//! - letters are lowercased
//! - spaces become underscores
//! - every other character outside `[a-z0-9_]` is dropped
//!
//! Names that collapse to nothing, or that collide with a built-in command,
//! are rejected with [`NameError`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Names reserved for built-in commands
pub const RESERVED_NAMES: &[&str] = &[
    "add",
    "ls",
    "rm",
    "mv",
    "history",
    "search",
    "completion",
    "help",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("invalid name '{0}': use letters, numbers, or underscores")]
    Empty(String),

    #[error("invalid name '{raw}': '{name}' is a reserved command")]
    Reserved { raw: String, name: String },
}

/// Canonical entry name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntryName(String);

impl EntryName {
    /// Normalizes raw input into a canonical name
    pub fn normalize(raw: &str) -> Result<Self, NameError> {
        let name = to_snake(raw);

        if name.is_empty() {
            return Err(NameError::Empty(raw.to_string()));
        }

        if is_reserved(&name) {
            return Err(NameError::Reserved {
                raw: raw.to_string(),
                name,
            });
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name for this entry under the given extension (without the dot)
    pub fn file_name(&self, ext: &str) -> String {
        format!("{}.{}", self.0, ext)
    }
}

/// Returns true if `name` is one of the built-in command names
pub fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.contains(&name)
}

fn to_snake(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .collect()
}

impl fmt::Display for EntryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for EntryName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s)
    }
}

impl TryFrom<String> for EntryName {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::normalize(&value)
    }
}

impl From<EntryName> for String {
    fn from(name: EntryName) -> Self {
        name.0
    }
}
