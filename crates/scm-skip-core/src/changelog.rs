//! Change-log data handed over by the host, and the live build log sink.

use std::io::Write;

use serde::{Deserialize, Serialize};

/// One recorded source-control change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEntry {
    /// Commit message.
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl ChangeEntry {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            commit_id: None,
            author: None,
        }
    }

    pub fn with_commit_id(mut self, commit_id: impl Into<String>) -> Self {
        self.commit_id = Some(commit_id.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }
}

/// Ordered batch of change entries reported by one change-log provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    /// Provider label, e.g. `git`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default)]
    pub entries: Vec<ChangeEntry>,
}

impl ChangeSet {
    pub fn new(entries: Vec<ChangeEntry>) -> Self {
        Self { kind: None, entries }
    }

    /// Build a change set from bare commit messages.
    pub fn from_messages<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(messages.into_iter().map(ChangeEntry::new).collect())
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Positionally last entry.
    pub fn last(&self) -> Option<&ChangeEntry> {
        self.entries.last()
    }

    /// Every message in order, joined by a single space.
    pub fn combined_message(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// User-visible output stream of a running build.
pub trait BuildLog: Send {
    fn println(&mut self, line: &str);
}

/// Collects lines in memory.
impl BuildLog for Vec<String> {
    fn println(&mut self, line: &str) {
        self.push(line.to_string());
    }
}

/// Adapter that writes log lines to any [`Write`] sink, e.g. stdout.
pub struct WriterLog<W: Write> {
    inner: W,
}

impl<W: Write> WriterLog<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write + Send> BuildLog for WriterLog<W> {
    fn println(&mut self, line: &str) {
        // A closed console must not fail the build.
        if let Err(e) = writeln!(self.inner, "{line}") {
            tracing::debug!(error = %e, "build log write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_message_joins_with_space() {
        let set = ChangeSet::from_messages(["fix bug", "release [skip] tag"]);
        assert_eq!(set.combined_message(), "fix bug release [skip] tag");
    }

    #[test]
    fn test_empty_set() {
        let set = ChangeSet::default();
        assert!(set.is_empty());
        assert!(set.last().is_none());
        assert_eq!(set.combined_message(), "");
    }

    #[test]
    fn test_deserialize_minimal_entries() {
        let sets: Vec<ChangeSet> = serde_json::from_str(
            r#"[{"kind": "git", "entries": [{"message": "a"}, {"message": "b", "author": "dev"}]}]"#,
        )
        .expect("parse");
        assert_eq!(sets[0].kind.as_deref(), Some("git"));
        assert_eq!(sets[0].last().map(|e| e.message.as_str()), Some("b"));
        assert_eq!(sets[0].entries[1].author.as_deref(), Some("dev"));
    }

    #[test]
    fn test_writer_log() {
        let mut log = WriterLog::new(Vec::<u8>::new());
        log.println("first");
        log.println("second");
        let out = String::from_utf8(log.into_inner()).expect("utf8");
        assert_eq!(out, "first\nsecond\n");
    }
}
