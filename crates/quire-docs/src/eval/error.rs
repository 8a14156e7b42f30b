use thiserror::Error;

pub type EvalResult<T> = std::result::Result<T, EvalError>;

/// Expression outside the grammar subset the evaluator understands.
///
/// Callers treat this as "no value" and carry on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("unknown node type: {0}")]
    UnknownNode(String),

    #[error("unable to handle operator: {0}")]
    UnsupportedOperator(String),

    #[error("unable to concatenate {left} and {right}")]
    UnsupportedOperands { left: String, right: String },

    #[error("unable to handle this member expression")]
    UnsupportedMemberAccess,

    #[error("unsupported object key: {0}")]
    UnsupportedKey(String),
}
