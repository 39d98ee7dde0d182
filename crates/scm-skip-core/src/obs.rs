//! Structured diagnostics for gate evaluations.
//!
//! This module provides:
//! - Run-scoped tracing spans via `run_span`
//! - Emission functions for inspection, tagging, stopping and deletion
//!
//! Decision details are emitted at `debug!`, build deletion at `info!`.
//! Filter with `RUST_LOG=scm_skip_core=debug`.

use tracing::{debug, info};

/// Span scoping every event of one gate evaluation to its run.
///
/// # Example
///
/// ```ignore
/// use tracing::Instrument;
/// gate.perform(run, log).instrument(run_span("my-job#42")).await
/// ```
pub fn run_span(run_id: &str) -> tracing::Span {
    tracing::info_span!("scm_skip.run", run_id = %run_id)
}

/// Emit event: the run has no change log to inspect.
pub fn emit_changelog_empty() {
    debug!(event = "changelog.empty", "Changelog is empty!");
}

/// Emit event: inspection finished.
pub fn emit_inspected(head_only: bool, pattern: &str, matched: bool, message: &str) {
    debug!(
        event = "changelog.inspected",
        head_only = head_only,
        pattern = %pattern,
        matched = matched,
        message = %message,
    );
}

/// Emit event: deletion marker written.
pub fn emit_run_tagged(run_id: &str, delete_build: bool) {
    debug!(event = "run.tagged", run_id = %run_id, delete_build = delete_build);
}

/// Emit event: halt requested through the given mechanism.
pub fn emit_build_stopping(run_id: &str, mechanism: &str) {
    debug!(event = "run.stopping", run_id = %run_id, mechanism = %mechanism);
}

/// Emit event: a non-fatal stop failure was dropped.
pub fn emit_stop_ignored(run_id: &str, error: &dyn std::fmt::Display) {
    debug!(event = "run.stop_ignored", run_id = %run_id, error = %error);
}

/// Emit event: run deleted and its number returned to the job.
pub fn emit_build_deleted(run_id: &str, job: &str, number: u64) {
    info!(event = "run.deleted", run_id = %run_id, job = %job, number = number);
}
