use thiserror::Error;

/// Failure to turn a filter expression into Overpass criteria.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("parse error: {0}")]
    Parse(String),

    /// A node kind or operator with no Overpass equivalent.
    #[error("{0} not supported")]
    UnsupportedNode(String),

    /// A negated non-boolean literal, such as `not 5`.
    #[error("inverted {0} not supported")]
    UnsupportedInversion(&'static str),
}
