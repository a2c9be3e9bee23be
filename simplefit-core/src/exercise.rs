use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::id::ExerciseId;

/// A named exercise as stored by the upstream exercise API.
///
/// Serialized with camelCase field names; optional fields are omitted when
/// unset. The gateway relays these payloads as opaque bytes, so this type is
/// for callers that build or read exercises.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Exercise {
    /// Key under which the upstream stores the exercise.
    pub id: ExerciseId,
    /// Display name.
    pub name: String,
    /// Muscle group worked, e.g. `"legs"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muscle_group: Option<String>,
    /// Movement pattern, e.g. `"push"` or `"pull"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl Exercise {
    /// Creates an exercise whose identifier is derived from `name`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: ExerciseId::from_name(&name),
            name,
            muscle_group: None,
            motion: None,
            sets: None,
            reps: None,
            weight: None,
        }
    }

    /// Checks the required fields.
    ///
    /// # Errors
    /// Returns [`CoreError::MissingField`] if `id` or `name` is blank.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::MissingField { field: "name" });
        }
        if self.id.is_blank() {
            return Err(CoreError::MissingField { field: "id" });
        }
        Ok(())
    }
}
