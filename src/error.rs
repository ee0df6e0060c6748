use thiserror::Error;

use crate::canonical::ExecutorId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("no canonicalization executor registered as {0:?}")]
    ExecutorNotFound(ExecutorId),

    #[error("no executor id given and no default executor registered")]
    NoDefaultExecutor,

    #[error("invalid permutation: expected {expected} entries, got {got}")]
    InvalidPermutation { expected: usize, got: usize },

    #[error("unknown element symbol '{0}'")]
    UnknownElement(String),

    #[error("atom index {0} out of range")]
    AtomOutOfRange(usize),

    #[error("no bond between atoms {0} and {1}")]
    BondNotFound(usize, usize),
}

pub type Result<T> = std::result::Result<T, Error>;
