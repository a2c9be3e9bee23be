/// Errors produced by the `simplefit-core` crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CoreError {
    /// A required exercise field was empty or whitespace only.
    #[error("required field '{field}' is missing")]
    MissingField { field: &'static str },
}
