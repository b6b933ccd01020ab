// src/core/engine.rs
use anyhow::{anyhow, bail, Result};
use ignore::WalkBuilder;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::charts::chart_plan;
use super::classifier::FileKind;
use super::generator::{DocGenerator, GeneratedDoc, OutputFormat};
use super::model::{ChartSpec, DocumentationModel};
use super::pipeline;
use crate::config::{AnalysisConfig, Config};
use crate::error::FiledocError;

/// Default configuration file written by `init`
pub const DEFAULT_CONFIG_FILE: &str = "filedoc.toml";

/// Outcome of a batch run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BatchReport {
    /// Written documents, sorted
    pub written: Vec<PathBuf>,
    /// Inputs that failed with their error message, sorted by path
    pub failed: Vec<(PathBuf, String)>,
}

/// Main orchestration engine: file I/O around the pure analysis pipeline
pub struct Engine {
    config: Config,
    generator: DocGenerator,
}

impl Engine {
    /// Create a new engine instance
    pub async fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load_or_default(config_path)?;
        debug!("Loaded configuration: {:?}", config);
        Self::with_config(config)
    }

    pub fn with_config(config: Config) -> Result<Self> {
        config.check()?;
        let generator = DocGenerator::new(&config.output, &config.charts)?;
        Ok(Self { config, generator })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read and analyze one file
    pub async fn analyze_file(&self, path: &Path) -> crate::error::Result<DocumentationModel> {
        analyze_path(
            path,
            self.config.analysis.clone(),
            self.config.input.max_file_size,
        )
        .await
    }

    /// Analyze and render one file without writing it anywhere
    pub async fn document(&self, path: &Path, format: Option<&str>) -> Result<GeneratedDoc> {
        let format = self.resolve_format(format)?;
        let model = self.analyze_file(path).await?;
        Ok(self.generator.render(&model, format)?)
    }

    /// Document one file to `output`, or to stdout when no output is given
    pub async fn analyze(
        &self,
        path: &Path,
        format: Option<&str>,
        output: Option<PathBuf>,
    ) -> Result<()> {
        let doc = self.document(path, format).await?;

        match output {
            Some(target) => {
                let target = if target.is_dir() {
                    target.join(&doc.file_name)
                } else {
                    target
                };
                write_doc(&target, &doc).await?;
                info!("Wrote {}", target.display());
            }
            None => print!("{}", doc.content),
        }

        Ok(())
    }

    /// Chart recommendations for one file; empty for non-tabular inputs
    pub async fn chart_plan(&self, path: &Path) -> Result<Vec<ChartSpec>> {
        let model = self.analyze_file(path).await?;
        match model.table() {
            Some(table) => Ok(chart_plan(table, &self.config.charts)),
            None => {
                info!("{} is not tabular; no charts to plan", model.file_name);
                Ok(Vec::new())
            }
        }
    }

    /// Print the chart plan as JSON
    pub async fn charts(&self, path: &Path) -> Result<()> {
        let plan = self.chart_plan(path).await?;
        println!("{}", serde_json::to_string_pretty(&plan)?);
        Ok(())
    }

    /// Document every supported file below `dir`, mirroring its layout in `output`
    pub async fn batch(
        &self,
        dir: &Path,
        output: Option<PathBuf>,
        format: Option<&str>,
        fail_fast: bool,
    ) -> Result<BatchReport> {
        let format = self.resolve_format(format)?;
        let root = tokio::fs::canonicalize(dir)
            .await
            .map_err(|e| anyhow!("Cannot read directory {}: {}", dir.display(), e))?;
        let output_dir = output.unwrap_or_else(|| self.config.output.docs_dir.clone());
        tokio::fs::create_dir_all(&output_dir).await?;
        let output_dir = tokio::fs::canonicalize(&output_dir).await?;

        let files = supported_files(&root, &output_dir);
        info!("Documenting {} files from {}", files.len(), root.display());

        let mut tasks = JoinSet::new();
        for path in files {
            let analysis = self.config.analysis.clone();
            let limit = self.config.input.max_file_size;
            tasks.spawn(async move {
                let result = analyze_path(&path, analysis, limit).await;
                (path, result)
            });
        }

        let mut report = BatchReport::default();
        while let Some(joined) = tasks.join_next().await {
            let (path, result) = joined.map_err(|e| anyhow!("Analysis task failed: {}", e))?;
            let relative = path.strip_prefix(&root).unwrap_or(&path).to_path_buf();

            let written = match result {
                Ok(model) => {
                    let target = mirrored_path(&output_dir, &relative, format);
                    match self.generator.render(&model, format) {
                        Ok(doc) => write_doc(&target, &doc).await.map(|_| target),
                        Err(e) => Err(e),
                    }
                }
                Err(e) => Err(e),
            };

            match written {
                Ok(target) => {
                    debug!("Documented {} -> {}", relative.display(), target.display());
                    report.written.push(target);
                }
                Err(e) if fail_fast => {
                    tasks.abort_all();
                    bail!("Failed to document {}: {}", relative.display(), e);
                }
                Err(e) => {
                    warn!("Failed to document {}: {}", relative.display(), e);
                    report.failed.push((relative, e.to_string()));
                }
            }
        }

        report.written.sort();
        report.failed.sort();
        info!(
            "Batch complete: {} documented, {} failed",
            report.written.len(),
            report.failed.len()
        );
        Ok(report)
    }

    /// Write the default configuration file into `path` (or the current directory)
    pub async fn init(&self, path: Option<PathBuf>, force: bool) -> Result<PathBuf> {
        let target_dir = match path {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        let config_path = target_dir.join(DEFAULT_CONFIG_FILE);

        if config_path.exists() && !force {
            bail!(
                "{} already exists; use --force to overwrite",
                config_path.display()
            );
        }

        tokio::fs::create_dir_all(&target_dir).await?;
        Config::default().save(&config_path)?;
        info!("Wrote default configuration to {}", config_path.display());
        Ok(config_path)
    }

    fn resolve_format(&self, format: Option<&str>) -> crate::error::Result<OutputFormat> {
        format.unwrap_or(&self.config.output.format).parse()
    }
}

/// Size check, read and analysis for one path. Analysis runs on a blocking thread.
async fn analyze_path(
    path: &Path,
    config: AnalysisConfig,
    max_file_size: u64,
) -> crate::error::Result<DocumentationModel> {
    let size = tokio::fs::metadata(path).await?.len();
    if size > max_file_size {
        return Err(FiledocError::FileTooLarge {
            path: path.display().to_string(),
            size,
            limit: max_file_size,
        });
    }

    let content = tokio::fs::read(path).await?;
    let name = path.display().to_string();

    tokio::task::spawn_blocking(move || pipeline::analyze(&name, &content, &config))
        .await
        .map_err(|e| FiledocError::FileSystem(format!("analysis task failed: {}", e)))?
}

/// Supported files below `root`, skipping anything already inside `output_dir`
fn supported_files(root: &Path, output_dir: &Path) -> Vec<PathBuf> {
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .require_git(false)
        .build();

    let mut files: Vec<PathBuf> = walker
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().map_or(false, |t| t.is_file()))
        .map(|entry| entry.into_path())
        .filter(|path| !path.starts_with(output_dir))
        .filter(|path| FileKind::from_name(path).is_supported())
        .collect();

    files.sort();
    files
}

/// `<output_dir>/<relative>.<ext>`, e.g. `docs/sales/q1.csv.md`
fn mirrored_path(output_dir: &Path, relative: &Path, format: OutputFormat) -> PathBuf {
    let mut name = OsString::from(relative.as_os_str());
    name.push(".");
    name.push(format.extension());
    output_dir.join(name)
}

async fn write_doc(target: &Path, doc: &GeneratedDoc) -> crate::error::Result<()> {
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(target, &doc.content).await?;
    Ok(())
}
