//! The skip gate: per-run glue between inspection and the stop/tag actions.
//!
//! A host calls [`SkipGate::perform`] once per run, from whichever hook it
//! offers (a build step or a wrapper around the whole build).

use serde::Serialize;
use tracing::Instrument;

use crate::annotate::tag_for_deletion;
use crate::changelog::BuildLog;
use crate::config::{ConfigProvider, SkipConfig, SkipSettings};
use crate::error::{Result, StopError};
use crate::host::BuildRun;
use crate::inspect::inspect;
use crate::matcher::SkipMatcher;
use crate::obs;
use crate::stop::stop_build;

/// What the gate decided for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GateDecision {
    /// The change log did not match; the build continues.
    Proceed,
    /// The build was stopped and tagged.
    Skipped { delete_build: bool },
}

impl GateDecision {
    pub fn is_skipped(&self) -> bool {
        matches!(self, GateDecision::Skipped { .. })
    }
}

/// A configured skip gate.
#[derive(Debug, Clone)]
pub struct SkipGate {
    settings: SkipSettings,
    config: SkipConfig,
    matcher: SkipMatcher,
}

impl SkipGate {
    /// Build a gate from a job's configuration. Fails if the configured
    /// pattern does not compile.
    pub fn new(settings: SkipSettings, provider: &dyn ConfigProvider) -> Result<Self> {
        let skip_pattern = normalize_pattern(&settings, provider.skip_pattern());
        let matcher = SkipMatcher::new(&settings, skip_pattern.as_deref())?
            .with_head_only(provider.head_only());
        let config = SkipConfig {
            delete_build: provider.delete_build(),
            skip_pattern,
            head_only: provider.head_only(),
        };
        Ok(Self {
            settings,
            config,
            matcher,
        })
    }

    pub fn config(&self) -> &SkipConfig {
        &self.config
    }

    pub fn matcher(&self) -> &SkipMatcher {
        &self.matcher
    }

    /// Change the skip pattern. A pattern equal to the settings default is
    /// stored as unset.
    pub fn set_skip_pattern(&mut self, pattern: Option<&str>) -> Result<()> {
        let pattern = normalize_pattern(&self.settings, pattern);
        self.matcher.set_pattern(pattern.as_deref())?;
        self.config.skip_pattern = pattern;
        Ok(())
    }

    pub fn set_head_only(&mut self, head_only: bool) {
        self.config.head_only = head_only;
        self.matcher.set_head_only(head_only);
    }

    pub fn set_delete_build(&mut self, delete_build: bool) {
        self.config.delete_build = delete_build;
    }

    /// Inspect `run`'s change log and, on a match, stop it.
    ///
    /// The run is always tagged: with the configured delete flag when it
    /// matched, with `false` otherwise, so a stale tag never survives.
    /// Errors: pattern matching cannot fail; a failed tag save and an
    /// unrecognized run propagate, other stop failures are logged and dropped.
    pub async fn perform(
        &self,
        run: &dyn BuildRun,
        log: &mut dyn BuildLog,
    ) -> Result<GateDecision> {
        let span = obs::run_span(&run.id());
        self.decide(run, log).instrument(span).await
    }

    async fn decide(&self, run: &dyn BuildRun, log: &mut dyn BuildLog) -> Result<GateDecision> {
        let change_sets = run.change_sets();

        if !inspect(&change_sets, &self.matcher, log) {
            tag_for_deletion(run, false).await?;
            return Ok(GateDecision::Proceed);
        }

        let delete_build = self.config.delete_build;
        tag_for_deletion(run, delete_build).await?;

        match stop_build(run).await {
            Ok(()) => {}
            Err(StopError::Unrecognized(abort)) => return Err(abort.into()),
            Err(e) => obs::emit_stop_ignored(&run.id(), &e),
        }

        Ok(GateDecision::Skipped { delete_build })
    }
}

fn normalize_pattern(settings: &SkipSettings, pattern: Option<&str>) -> Option<String> {
    pattern
        .filter(|p| !p.is_empty() && *p != settings.default_pattern)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::is_marked_for_deletion;
    use crate::changelog::ChangeSet;
    use crate::error::SkipError;
    use crate::fakes::{MemoryJob, MemoryRun};
    use crate::host::{RunResult, SKIPPED_DESCRIPTION};

    fn gate(config: SkipConfig) -> SkipGate {
        SkipGate::new(SkipSettings::default(), &config).expect("gate")
    }

    fn run_with(messages: &[&str]) -> MemoryRun {
        MemoryRun::pipeline(MemoryJob::new("demo"), 1)
            .with_change_sets(vec![ChangeSet::from_messages(messages.iter().copied())])
    }

    #[tokio::test]
    async fn test_match_stops_and_tags() {
        let gate = gate(SkipConfig::new(r"\[skip\]").with_delete_build(true));
        let run = run_with(&["fix bug", "release [skip] tag"]);
        let mut log: Vec<String> = Vec::new();

        let decision = gate.perform(&run, &mut log).await.expect("perform");

        assert_eq!(decision, GateDecision::Skipped { delete_build: true });
        assert!(is_marked_for_deletion(&run));
        assert_eq!(run.result(), Some(RunResult::Aborted));
        assert_eq!(run.description().as_deref(), Some(SKIPPED_DESCRIPTION));
        assert_eq!(run.halt_requests(), vec!["pipeline"]);
    }

    #[tokio::test]
    async fn test_no_match_resets_tag() {
        let gate = gate(SkipConfig::new(r"\[skip\]").with_delete_build(true));
        let run = run_with(&["ordinary change"]);
        tag_for_deletion(&run, true).await.expect("stale tag");

        let mut log: Vec<String> = Vec::new();
        let decision = gate.perform(&run, &mut log).await.expect("perform");

        assert_eq!(decision, GateDecision::Proceed);
        assert!(!is_marked_for_deletion(&run));
        assert!(run.deletion_marker().is_some());
        assert_eq!(run.result(), None);
        assert!(run.halt_requests().is_empty());
    }

    #[tokio::test]
    async fn test_unrecognized_run_propagates_abort() {
        let gate = gate(SkipConfig::default());
        let run = MemoryRun::detached(MemoryJob::new("demo"), 1)
            .with_change_sets(vec![ChangeSet::from_messages(["anything"])]);
        let mut log: Vec<String> = Vec::new();

        let err = gate.perform(&run, &mut log).await.unwrap_err();
        assert!(matches!(err, SkipError::BuildAbort(_)));
        assert_eq!(
            err.to_string(),
            "SCM Skip: Build has been skipped due to SCM Skip Plugin!"
        );
        assert_eq!(run.result(), Some(RunResult::Aborted));
    }

    #[tokio::test]
    async fn test_detached_run_is_still_inspected() {
        let gate = gate(SkipConfig::new(r"\[skip\]"));
        let run = MemoryRun::detached(MemoryJob::new("demo"), 3)
            .with_change_sets(vec![ChangeSet::from_messages(["ordinary change"])]);
        let mut log: Vec<String> = Vec::new();

        let decision = gate.perform(&run, &mut log).await.expect("perform");

        assert_eq!(decision, GateDecision::Proceed);
        assert_eq!(
            log,
            vec![r"SCM Skip: headOnly = false, Pattern \[skip\] NOT matched on message: ordinary change".to_string()]
        );
        assert!(run.deletion_marker().is_some());
        assert_eq!(run.result(), None);
    }

    #[tokio::test]
    async fn test_halt_race_is_swallowed() {
        let gate = gate(SkipConfig::default());
        let run = run_with(&["anything"]);
        run.fail_halts("already finishing");
        let mut log: Vec<String> = Vec::new();

        let decision = gate.perform(&run, &mut log).await.expect("perform");
        assert!(decision.is_skipped());
        assert_eq!(run.result(), Some(RunResult::Aborted));
    }

    #[tokio::test]
    async fn test_tag_save_failure_propagates() {
        let gate = gate(SkipConfig::new("nothing-matches-this"));
        let run = run_with(&["ordinary change"]);
        run.fail_saves("read-only");
        let mut log: Vec<String> = Vec::new();

        let err = gate.perform(&run, &mut log).await.unwrap_err();
        assert!(matches!(err, SkipError::Host(_)));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = SkipGate::new(SkipSettings::default(), &SkipConfig::new("(")).unwrap_err();
        assert!(matches!(err, SkipError::Configuration { .. }));
    }

    #[test]
    fn test_default_pattern_stored_as_unset() {
        let mut gate = gate(SkipConfig::new(".*"));
        assert!(gate.config().skip_pattern.is_none());

        gate.set_skip_pattern(Some("wip")).expect("set");
        assert_eq!(gate.config().skip_pattern.as_deref(), Some("wip"));
        assert_eq!(gate.matcher().pattern(), "wip");

        gate.set_skip_pattern(Some(".*")).expect("reset");
        assert!(gate.config().skip_pattern.is_none());
        assert_eq!(gate.matcher().pattern(), ".*");
    }

    #[test]
    fn test_head_only_setter_reaches_matcher() {
        let mut gate = gate(SkipConfig::default());
        gate.set_head_only(true);
        assert!(gate.matcher().head_only());
        assert!(gate.config().head_only);

        gate.set_delete_build(true);
        assert!(gate.config().delete_build);
    }

    #[tokio::test]
    async fn test_setter_changes_apply_to_next_perform() {
        let mut gate = gate(SkipConfig::new(r"\[skip\]"));
        let run = run_with(&["[skip] docs", "real change"]);
        let mut log: Vec<String> = Vec::new();

        gate.set_head_only(true);
        let decision = gate.perform(&run, &mut log).await.expect("perform");
        assert_eq!(decision, GateDecision::Proceed);
    }
}
