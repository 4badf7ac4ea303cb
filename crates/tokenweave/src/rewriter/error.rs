use thiserror::Error;

use super::RewriteOp;
use crate::error::{ErrorKind, StreamError};

/// Error raised while recording or rendering rewrite programs.
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("replace: range invalid: {from}..{to}(size={size})")]
    InvalidRange { from: isize, to: isize, size: usize },
    #[error("invalid token index {0}")]
    InvalidIndex(isize),
    #[error("replace op boundaries of {op} overlap with previous {previous}")]
    ReplaceOverlap { op: RewriteOp, previous: RewriteOp },
    #[error("insert op {op} within boundaries of previous {previous}")]
    InsertWithinReplace { op: RewriteOp, previous: RewriteOp },
    #[error("should only be one op per index, found two at {0}")]
    DuplicateOperation(usize),
    #[error(transparent)]
    Stream(#[from] StreamError),
}

impl RewriteError {
    /// Returns the class this error belongs to.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            RewriteError::Stream(e) => e.kind(),
            _ => ErrorKind::Misuse,
        }
    }
}
