//! Errors shared by the RNG and downstream crates (`spec.md` §4.1).

use thiserror::Error;

/// Raised when the RNG is asked to do something logically impossible given
/// its input, rather than anything I/O- or schema-related.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LogicError {
    #[error("cannot pick from an empty sequence")]
    EmptyPick,
}
