//! Exercise domain types for the SimpleFit gateway.
//!
//! Defines the exercise entity owned by the upstream store, its identifier
//! derivation, and the required-field checks applied before an upsert.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod exercise;
pub mod id;

pub use error::CoreError;
pub use exercise::Exercise;
pub use id::ExerciseId;
