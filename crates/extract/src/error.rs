use thiserror::Error;

/// Why a decoder declined a document. Consumed by the dispatcher, never surfaced to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeMismatch {
    #[error("document is not a JSON object")]
    NotAnObject,

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` is not {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("field `{0}` must be absent for this shape")]
    UnexpectedField(&'static str),

    #[error("no entry under `{0}` has the expected fields")]
    NoQualifyingEntries(&'static str),
}
