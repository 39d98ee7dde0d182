//! Change-set inspection.
//!
//! Only the last change-set group of a run is considered; earlier groups are
//! history and are not re-evaluated. Within that group the matcher's
//! head-only flag selects the policy:
//!
//! - head-only: only the positionally last entry is tested
//! - full history: entries are tested in order, the first match wins
//!
//! Every inspection writes one line to the build log and one debug event.

use serde::Serialize;

use crate::changelog::{BuildLog, ChangeSet};
use crate::matcher::SkipMatcher;
use crate::obs;

/// Result of inspecting a run's change sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inspection {
    pub matched: bool,
    pub head_only: bool,
    pub pattern: String,
    /// The head message (head-only) or all messages joined by a space.
    /// `None` when there was nothing to inspect.
    pub message: Option<String>,
}

/// Decide whether the run's change log matches. See [`evaluate`].
pub fn inspect(groups: &[ChangeSet], matcher: &SkipMatcher, log: &mut dyn BuildLog) -> bool {
    evaluate(groups, matcher, log).matched
}

/// Inspect the last change-set group and report the outcome in full.
pub fn evaluate(
    groups: &[ChangeSet],
    matcher: &SkipMatcher,
    log: &mut dyn BuildLog,
) -> Inspection {
    let head_only = matcher.head_only();
    let pattern = matcher.pattern().to_string();

    let Some(set) = groups.last() else {
        log_empty_changelog(log);
        return Inspection {
            matched: false,
            head_only,
            pattern,
            message: None,
        };
    };

    // An empty final group is reported but still runs through matching.
    if set.is_empty() {
        log_empty_changelog(log);
    }

    let (matched, message) = if head_only {
        match set.last() {
            Some(head) => (matcher.is_match(&head.message), Some(head.message.clone())),
            None => (false, None),
        }
    } else {
        let matched = set.entries.iter().any(|e| matcher.is_match(&e.message));
        (matched, Some(set.combined_message()))
    };

    let shown = message.as_deref().unwrap_or_default();
    let verdict = if matched { "matched" } else { "NOT matched" };
    log.println(&format!(
        "SCM Skip: headOnly = {head_only}, Pattern {pattern} {verdict} on message: {shown}"
    ));
    obs::emit_inspected(head_only, &pattern, matched, shown);

    Inspection {
        matched,
        head_only,
        pattern,
        message,
    }
}

fn log_empty_changelog(log: &mut dyn BuildLog) {
    log.println("SCM Skip: Changelog is empty!");
    obs::emit_changelog_empty();
}
