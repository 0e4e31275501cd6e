use std::error::Error as StdError;
use std::fmt::{Display, Formatter};

/// Failure modes of the template pipeline.
#[derive(Debug)]
pub enum Error {
    /// The input was malformed (dimensions, buffer length, palette size).
    /// Reported before any processing begins.
    Validation(String),

    /// The cancellation token was observed set at a stage boundary.
    Cancelled,

    /// An internal precondition was violated partway through a stage.
    Internal(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Validation(msg) => write!(f, "invalid input: {}", msg),
            Error::Cancelled => write!(f, "processing was cancelled"),
            Error::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl StdError for Error {}
