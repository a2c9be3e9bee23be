use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of an exercise, used as its key by the upstream store.
///
/// Identifiers are derived from the display name with [`ExerciseId::from_name`],
/// but any string received from the upstream is accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
#[non_exhaustive]
pub struct ExerciseId(pub String);

impl ExerciseId {
    /// Creates an `ExerciseId` from any string-like value without normalising it.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derives the canonical identifier for an exercise name.
    ///
    /// The name is lowercased, every run of characters outside `[a-z0-9]`
    /// becomes a single hyphen, and hyphens at either end are dropped:
    /// `"Push-Up!! 2"` becomes `"push-up-2"`.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let mut out = String::with_capacity(name.len());
        let mut pending_hyphen = false;

        for ch in name.chars().flat_map(char::to_lowercase) {
            if ch.is_ascii_alphanumeric() {
                if pending_hyphen && !out.is_empty() {
                    out.push('-');
                }
                pending_hyphen = false;
                out.push(ch);
            } else {
                pending_hyphen = true;
            }
        }

        Self(out)
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the identifier is empty or whitespace only.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ExerciseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ExerciseId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for ExerciseId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
