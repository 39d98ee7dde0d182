//! SCM Skip Core
//!
//! Decides whether a build should be skipped based on its change log:
//! - `matcher`: compiled commit-message pattern and head-only policy
//! - `inspect`: change-set inspection and build-log reporting
//! - `annotate`: deletion marker attached to a run
//! - `stop`: abort a run and ask the host to halt it
//! - `delete`: remove a skipped run and reuse its build number
//! - `gate`: per-run glue a host hooks into its build lifecycle
//!
//! The build orchestrator itself stays outside this crate, behind the
//! traits in [`host`].

pub mod annotate;
pub mod changelog;
pub mod config;
pub mod delete;
pub mod error;
pub mod fakes;
pub mod gate;
pub mod host;
pub mod inspect;
pub mod matcher;
pub mod obs;
pub mod stop;
pub mod telemetry;

pub use annotate::{is_marked_for_deletion, tag_for_deletion};
pub use changelog::{BuildLog, ChangeEntry, ChangeSet, WriterLog};
pub use config::{resolve_pattern, ConfigProvider, SkipConfig, SkipSettings, DEFAULT_PATTERN};
pub use delete::{delete_build, purge_if_marked};
pub use error::{
    BuildAbortError, HaltRaceError, HostError, Result, SkipError, StopError, BUILD_ABORT_MESSAGE,
};
pub use gate::{GateDecision, SkipGate};
pub use host::{
    BuildJob, BuildRun, DeletionMarker, Halt, HostResult, RunResult, SKIPPED_DESCRIPTION,
};
pub use inspect::{evaluate, inspect, Inspection};
pub use matcher::SkipMatcher;
pub use stop::stop_build;
pub use telemetry::{default_directive, init_tracing};

/// SCM Skip version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
