//! Gate configuration.
//!
//! [`SkipSettings`] holds process-wide defaults and is built once at start-up.
//! [`SkipConfig`] is the per-job configuration a host persists alongside its
//! build step; the gate reads it through [`ConfigProvider`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Pattern used when a job leaves its skip pattern unset. Matches everything.
pub const DEFAULT_PATTERN: &str = ".*";

fn default_pattern() -> String {
    DEFAULT_PATTERN.to_string()
}

/// Process-wide defaults shared by every gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipSettings {
    /// Pattern applied when a job configures none.
    #[serde(default = "default_pattern")]
    pub default_pattern: String,
}

impl Default for SkipSettings {
    fn default() -> Self {
        Self {
            default_pattern: default_pattern(),
        }
    }
}

impl SkipSettings {
    pub fn new(default_pattern: impl Into<String>) -> Self {
        Self {
            default_pattern: default_pattern.into(),
        }
    }
}

/// The pattern to compile: `pattern` when set and non-empty, otherwise
/// `fallback`.
pub fn resolve_pattern<'a>(pattern: Option<&'a str>, fallback: &'a str) -> &'a str {
    match pattern {
        Some(p) if !p.is_empty() => p,
        _ => fallback,
    }
}

/// Read access to a job's skip configuration.
pub trait ConfigProvider {
    /// Configured pattern, `None` when the job relies on the default.
    fn skip_pattern(&self) -> Option<&str>;

    /// Whether a skipped build is deleted after being stopped.
    fn delete_build(&self) -> bool;

    /// Restrict matching to the most recent change entry.
    fn head_only(&self) -> bool;
}

/// Per-job skip configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipConfig {
    #[serde(default)]
    pub delete_build: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_pattern: Option<String>,

    #[serde(default)]
    pub head_only: bool,
}

impl SkipConfig {
    pub fn new(skip_pattern: impl Into<String>) -> Self {
        Self {
            skip_pattern: Some(skip_pattern.into()),
            ..Self::default()
        }
    }

    pub fn with_delete_build(mut self, delete_build: bool) -> Self {
        self.delete_build = delete_build;
        self
    }

    pub fn with_head_only(mut self, head_only: bool) -> Self {
        self.head_only = head_only;
        self
    }

    /// Parse a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}

impl ConfigProvider for SkipConfig {
    fn skip_pattern(&self) -> Option<&str> {
        self.skip_pattern.as_deref()
    }

    fn delete_build(&self) -> bool {
        self.delete_build
    }

    fn head_only(&self) -> bool {
        self.head_only
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SkipConfig::default();
        assert!(!config.delete_build);
        assert!(!config.head_only);
        assert!(config.skip_pattern.is_none());
        assert_eq!(SkipSettings::default().default_pattern, ".*");
    }

    #[test]
    fn test_resolve_pattern_falls_back() {
        let fallback = "\\[ci skip\\]";
        assert_eq!(resolve_pattern(None, fallback), "\\[ci skip\\]");
        assert_eq!(resolve_pattern(Some(""), fallback), "\\[ci skip\\]");
        assert_eq!(resolve_pattern(Some("\\[skip\\]"), fallback), "\\[skip\\]");
    }

    #[test]
    fn test_from_json_partial_document() {
        let config = SkipConfig::from_json_str(r#"{"head_only": true}"#).expect("parse");
        assert!(config.head_only);
        assert!(!config.delete_build);
        assert!(config.skip_pattern.is_none());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(SkipConfig::from_json_str("{not json").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scm-skip.json");
        std::fs::write(
            &path,
            r#"{"delete_build": true, "skip_pattern": "\\[skip\\]"}"#,
        )
        .expect("write config");

        let config = SkipConfig::load(&path).expect("load");
        assert!(config.delete_build);
        assert_eq!(config.skip_pattern(), Some("\\[skip\\]"));
    }

    #[test]
    fn test_builder() {
        let config = SkipConfig::new("wip")
            .with_delete_build(true)
            .with_head_only(true);
        assert!(ConfigProvider::delete_build(&config));
        assert!(ConfigProvider::head_only(&config));
        assert_eq!(ConfigProvider::skip_pattern(&config), Some("wip"));
    }
}
