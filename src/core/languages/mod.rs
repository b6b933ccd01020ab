//! Language-specific declaration extractors
//!
//! Each language gets its own module behind a common interface that turns
//! source text into a code summary.

mod python;

pub use python::PythonAnalyzer;

use tracing::debug;

use super::model::CodeSummary;
use crate::error::Result;

/// Trait that all language analyzers must implement
pub trait LanguageAnalyzer {
    /// Extract the declarative surface of the source
    fn analyze(&mut self, source: &str) -> Result<CodeSummary>;

    /// Get the language name
    fn language_name(&self) -> &str;
}

/// Summarize Python source text
pub fn analyze_code(source: &str) -> Result<CodeSummary> {
    let mut analyzer = PythonAnalyzer::new()?;
    debug!("Extracting {} declarations", analyzer.language_name());
    analyzer.analyze(source)
}
