//! Kernel error taxonomy (`spec.md` §7).
//!
//! `InvariantViolation` deliberately does not appear as a `Result`-producing
//! variant here: per spec it is caught at the point of detection inside a
//! subsystem, turned into a skipped item plus a `system`/`warn` [`LogEntry`],
//! and never propagated. See [`crate::subsystems::invariant_warning`].

use thiserror::Error;

/// Errors that can abort startup or a save, as opposed to the
/// always-forward-progress handling subsystems use internally.
#[derive(Debug, Error)]
pub enum KernelError {
    /// Persistence or log sink failure. Policy: retry once at the call
    /// site; if still failing, emit a system warning log and continue.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted world document could not be parsed. Policy: refuse to
    /// start, do not overwrite the file, exit 1.
    #[error("world snapshot failed to parse: {0}")]
    Schema(#[from] serde_json::Error),

    /// Truly unrecoverable. Policy: best-effort snapshot, exit 1.
    #[error("fatal: {0}")]
    Fatal(String),
}

impl KernelError {
    /// The process exit code this error implies, per `spec.md` §6.
    pub fn exit_code(&self) -> i32 {
        match self {
            KernelError::Io(_) => 0,
            KernelError::Schema(_) | KernelError::Fatal(_) => 1,
        }
    }
}
