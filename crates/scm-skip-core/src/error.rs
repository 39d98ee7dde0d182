//! Error taxonomy for SCM Skip.

use thiserror::Error;

/// Message carried by the abort raised when a run cannot be halted.
pub const BUILD_ABORT_MESSAGE: &str = "SCM Skip: Build has been skipped due to SCM Skip Plugin!";

/// Errors reported by the host runtime's persistence layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// Saving a run or job failed
    #[error("failed to persist {entity}: {reason}")]
    Persist { entity: String, reason: String },

    /// Deleting a run record failed
    #[error("failed to delete run {run_id}: {reason}")]
    Delete { run_id: String, reason: String },
}

/// The run exposes no halt mechanism the gate recognizes.
///
/// Propagated unchanged to the build step so the host terminates the build.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct BuildAbortError {
    pub message: String,
}

impl Default for BuildAbortError {
    fn default() -> Self {
        Self {
            message: BUILD_ABORT_MESSAGE.to_string(),
        }
    }
}

/// A halt request the host rejected, typically because the run was
/// already finishing. Never surfaced past the gate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("halt via {mechanism} failed: {reason}")]
pub struct HaltRaceError {
    pub mechanism: String,
    pub reason: String,
}

/// Outcome of a failed stop request.
#[derive(Error, Debug)]
pub enum StopError {
    #[error(transparent)]
    Unrecognized(#[from] BuildAbortError),

    #[error("saving aborted run failed: {0}")]
    Persist(#[source] HostError),

    #[error(transparent)]
    Halt(#[from] HaltRaceError),
}

impl StopError {
    /// Only an unrecognized run terminates the caller; everything else is
    /// best-effort and may be logged and dropped.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StopError::Unrecognized(_))
    }
}

/// SCM Skip errors.
#[derive(Error, Debug)]
pub enum SkipError {
    #[error("invalid skip pattern {pattern:?}: {source}")]
    Configuration {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error(transparent)]
    BuildAbort(#[from] BuildAbortError),

    #[error("host error: {0}")]
    Host(#[from] HostError),

    #[error("configuration parse error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for SCM Skip operations.
pub type Result<T> = std::result::Result<T, SkipError>;
