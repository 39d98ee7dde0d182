//! Commit-message pattern matching.

use regex::Regex;

use crate::config::{resolve_pattern, SkipSettings};
use crate::error::{Result, SkipError};

/// Compiled skip pattern plus the head-only policy flag.
#[derive(Debug, Clone)]
pub struct SkipMatcher {
    pattern: Regex,
    head_only: bool,
    fallback: String,
}

impl SkipMatcher {
    /// Compile `pattern`, falling back to the settings default when it is
    /// `None` or empty.
    pub fn new(settings: &SkipSettings, pattern: Option<&str>) -> Result<Self> {
        let fallback = settings.default_pattern.clone();
        let pattern = compile(resolve_pattern(pattern, &fallback))?;
        Ok(Self {
            pattern,
            head_only: false,
            fallback,
        })
    }

    /// True iff the pattern matches anywhere inside `message`.
    pub fn is_match(&self, message: &str) -> bool {
        self.pattern.is_match(message)
    }

    /// Recompile the held pattern. On error the previous pattern stays.
    pub fn set_pattern(&mut self, pattern: Option<&str>) -> Result<()> {
        self.pattern = compile(resolve_pattern(pattern, &self.fallback))?;
        Ok(())
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn head_only(&self) -> bool {
        self.head_only
    }

    pub fn set_head_only(&mut self, head_only: bool) {
        self.head_only = head_only;
    }

    pub fn with_head_only(mut self, head_only: bool) -> Self {
        self.head_only = head_only;
        self
    }
}

fn compile(text: &str) -> Result<Regex> {
    Regex::new(text).map_err(|source| SkipError::Configuration {
        pattern: text.to_string(),
        source,
    })
}
