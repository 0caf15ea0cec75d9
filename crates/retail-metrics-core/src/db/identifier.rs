use std::fmt;

use serde::Deserialize;
use thiserror::Error;

const MAX_IDENTIFIER_LEN: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid SQL identifier '{name}': {reason}")]
pub struct InvalidIdentifier {
    pub name: String,
    pub reason: &'static str,
}

/// A caller-supplied table name that is safe to splice into SQL text.
///
/// Only ASCII letters, digits and underscores are accepted, and the first
/// character may not be a digit. The name is always emitted double-quoted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Identifier(String);

impl Identifier {
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidIdentifier> {
        let name = name.into();
        let reason = if name.is_empty() {
            Some("identifier is empty")
        } else if name.len() > MAX_IDENTIFIER_LEN {
            Some("identifier is longer than 64 characters")
        } else if name.starts_with(|c: char| c.is_ascii_digit()) {
            Some("identifier starts with a digit")
        } else if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            Some("only ASCII letters, digits and '_' are allowed")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(InvalidIdentifier { name, reason }),
            None => Ok(Self(name)),
        }
    }

    /// Wraps one of the crate's own fixed table names without re-validating it.
    pub(crate) fn from_static(name: &'static str) -> Self {
        debug_assert!(
            Self::new(name).is_ok(),
            "invalid built-in identifier {name}"
        );
        Self(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier wrapped in double quotes, ready for SQL text.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl TryFrom<String> for Identifier {
    type Error = InvalidIdentifier;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Identifier {
    type Error = InvalidIdentifier;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
