//! Host runtime abstractions.
//!
//! The build orchestrator owns runs and jobs; the gate only sees them through
//! these traits. Mutating accessors take `&self` so hosts can share run
//! handles across their own lifecycle hooks; implementations synchronise
//! internally. In-memory implementations live in [`crate::fakes`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::changelog::ChangeSet;
use crate::error::{HaltRaceError, HostError};

/// Result type for host calls.
pub type HostResult<T> = std::result::Result<T, HostError>;

/// Description set on a run the gate stopped.
pub const SKIPPED_DESCRIPTION: &str = "SCM Skip - build skipped";

/// Outcome of a build run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunResult {
    Success,
    Unstable,
    Failure,
    NotBuilt,
    Aborted,
}

/// Marker attached to a run recording whether it should later be deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionMarker {
    pub delete_build: bool,
    pub tagged_at: DateTime<Utc>,
}

impl DeletionMarker {
    pub fn new(delete_build: bool) -> Self {
        Self {
            delete_build,
            tagged_at: Utc::now(),
        }
    }
}

/// A host-specific way of halting an in-flight run.
#[async_trait]
pub trait Halt: Send + Sync {
    /// Short name of the mechanism, for logging.
    fn mechanism(&self) -> &'static str;

    /// Ask the host to stop the run. Cooperative: returns once the request
    /// is accepted, not when execution has ended.
    async fn halt(&self) -> Result<(), HaltRaceError>;
}

/// The job that owns a sequence of runs.
#[async_trait]
pub trait BuildJob: Send + Sync {
    fn name(&self) -> String;

    fn next_build_number(&self) -> u64;

    fn update_next_build_number(&self, number: u64);

    async fn save(&self) -> HostResult<()>;
}

/// One execution of a build, as exposed by the host.
#[async_trait]
pub trait BuildRun: Send + Sync {
    /// Host identifier, e.g. `my-job#42`.
    fn id(&self) -> String;

    fn number(&self) -> u64;

    /// Change-set groups in the order the host's providers reported them.
    fn change_sets(&self) -> Vec<ChangeSet>;

    fn description(&self) -> Option<String>;

    fn set_description(&self, description: &str);

    fn result(&self) -> Option<RunResult>;

    fn set_result(&self, result: RunResult);

    fn deletion_marker(&self) -> Option<DeletionMarker>;

    /// Attach `marker`, replacing any marker already present.
    fn replace_deletion_marker(&self, marker: DeletionMarker);

    /// Halt capability, `None` when the host cannot stop this kind of run.
    fn halter(&self) -> Option<&dyn Halt>;

    fn job(&self) -> Arc<dyn BuildJob>;

    async fn save(&self) -> HostResult<()>;

    /// Remove the run's persisted record.
    async fn delete(&self) -> HostResult<()>;
}
