use regex::Regex;
use std::collections::HashSet;

use crate::config::AnalysisConfig;

/// Per-call analysis state.
///
/// Built fresh for every analysis and dropped with it, so concurrent
/// analyses never share anything mutable.
pub struct AnalysisContext<'a> {
    config: &'a AnalysisConfig,
    null_tokens: HashSet<&'a str>,
    number_pattern: Regex,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self {
            config,
            null_tokens: config.null_tokens.iter().map(String::as_str).collect(),
            number_pattern: Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$")
                .expect("Invalid number regex"),
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        self.config
    }

    /// Trim a raw cell and map configured missing-value tokens to `None`
    pub fn normalize_cell(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if self.null_tokens.contains(trimmed) {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    pub fn is_number(&self, value: &str) -> bool {
        self.number_pattern.is_match(value.trim())
    }
}
