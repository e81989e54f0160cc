//! Errors reported by execution targets and the learner.

/// Caller errors. Search itself never produces one of these: a candidate
/// program that does something silly simply scores badly.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structured input named an element the collection does not have.
    #[error("invalid element name: {0}")]
    InvalidElement(String),

    /// Unstructured input was given to a collection without an input element.
    #[error("the collection has no input element and can't route the input data")]
    NoInputElement,

    /// The target can't make sense of the data it was fed.
    #[error("invalid input for {target}: {reason}")]
    InvalidInput {
        target: &'static str,
        reason: String,
    },

    /// Pointer movement along an axis the tape does not have.
    #[error("invalid axis {axis} for shape {shape:?}")]
    InvalidAxis { axis: usize, shape: Vec<usize> },

    /// A variable of an undeclared type was requested.
    #[error("unknown type: {0}")]
    UnknownType(String),

    /// A data sample record lacks one of its keys.
    #[error("a record must contain `input` and `output` keys, `{0}` is missing")]
    MissingKey(&'static str),

    #[error("can't fit without examples")]
    NoExamples,
}
