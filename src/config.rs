use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{FiledocError, Result};

/// File names probed, in order, when no configuration path is given
pub const CONFIG_CANDIDATES: [&str; 3] = ["Filedoc.toml", "filedoc.toml", ".filedoc.toml"];

/// Upper bound on example values kept per column
pub const MAX_EXAMPLES: usize = 5;
/// Upper bounds of the categorical threshold `max(min_distinct, ratio × count)`
pub const MAX_CATEGORICAL_MIN_DISTINCT: usize = 10;
pub const MAX_CATEGORICAL_RATIO: f64 = 0.05;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Type inference and sampling policy
    pub analysis: AnalysisConfig,

    /// Chart eligibility bounds
    pub charts: ChartConfig,

    /// Input limits
    pub input: InputConfig,

    /// Output settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Maximum number of example values kept per column
    pub max_examples: usize,

    /// Distinct-value floor below which a column is categorical
    pub categorical_min_distinct: usize,

    /// Distinct-value ratio (of the value count) below which a column is categorical
    pub categorical_ratio: f64,

    /// Cell texts treated as missing values
    pub null_tokens: Vec<String>,

    /// Column-name words that mark free text rather than categories
    pub text_name_hints: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Minimum distinct values for a numeric histogram
    pub numeric_min_distinct: usize,

    /// Minimum distinct values for a categorical bar chart
    pub categorical_min_distinct: usize,

    /// Maximum distinct values for a categorical bar chart
    pub categorical_max_distinct: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Maximum input size to analyze (in bytes)
    pub max_file_size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format (markdown or json)
    pub format: String,

    /// Default directory for batch output
    pub docs_dir: PathBuf,

    /// Include the chart plan in rendered documents
    pub include_charts: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let null_tokens = ["", "NA", "N/A", "n/a", "NULL", "null", "NaN", "nan", "None", "#N/A"];
        let text_name_hints = [
            "name", "title", "description", "comment", "comments", "notes", "email", "address",
            "url", "summary",
        ];

        Self {
            max_examples: 5,
            categorical_min_distinct: 10,
            categorical_ratio: 0.05,
            null_tokens: null_tokens.iter().map(|s| s.to_string()).collect(),
            text_name_hints: text_name_hints.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            numeric_min_distinct: 2,
            categorical_min_distinct: 2,
            categorical_max_distinct: 20,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024, // 50MB
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "markdown".to_string(),
            docs_dir: PathBuf::from("docs"),
            include_charts: true,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| FiledocError::Config(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| FiledocError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Ok(Self::default())
                }
            }
            None => {
                for candidate in &CONFIG_CANDIDATES {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    /// Reject values that would break the summary model's bounds
    pub fn check(&self) -> Result<()> {
        if !(1..=MAX_EXAMPLES).contains(&self.analysis.max_examples) {
            return Err(FiledocError::Config(format!(
                "analysis.max_examples must be within 1..={}, got {}",
                MAX_EXAMPLES, self.analysis.max_examples
            )));
        }
        if self.analysis.categorical_min_distinct > MAX_CATEGORICAL_MIN_DISTINCT {
            return Err(FiledocError::Config(format!(
                "analysis.categorical_min_distinct must be at most {}, got {}",
                MAX_CATEGORICAL_MIN_DISTINCT, self.analysis.categorical_min_distinct
            )));
        }
        if !(0.0..=MAX_CATEGORICAL_RATIO).contains(&self.analysis.categorical_ratio) {
            return Err(FiledocError::Config(format!(
                "analysis.categorical_ratio must be within 0.0..={}, got {}",
                MAX_CATEGORICAL_RATIO, self.analysis.categorical_ratio
            )));
        }
        if self.charts.categorical_min_distinct > self.charts.categorical_max_distinct {
            return Err(FiledocError::Config(
                "charts.categorical_min_distinct exceeds charts.categorical_max_distinct".to_string(),
            ));
        }
        match self.output.format.as_str() {
            "markdown" | "json" => Ok(()),
            other => Err(FiledocError::Config(format!("Unsupported output format: {}", other))),
        }
    }
}
