use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use filedoc::Engine;

#[derive(Parser)]
#[command(name = "filedoc")]
#[command(about = "Summarize data and source files into documentation")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Document a single file
    Analyze {
        /// File to analyze
        file: PathBuf,

        /// Output format (markdown, json)
        #[arg(short, long)]
        format: Option<String>,

        /// Write the document here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the chart plan of a tabular file as JSON
    Charts {
        /// File to analyze
        file: PathBuf,
    },

    /// Document every supported file in a directory
    Batch {
        /// Directory to walk
        dir: PathBuf,

        /// Output directory for documentation
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (markdown, json)
        #[arg(short, long)]
        format: Option<String>,

        /// Stop at the first file that cannot be documented
        #[arg(long)]
        fail_fast: bool,
    },

    /// Write a default configuration file
    Init {
        /// Target directory (defaults to current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    pub async fn execute(self, engine: Engine) -> Result<()> {
        match self.command {
            Commands::Analyze { file, format, output } => {
                engine.analyze(&file, format.as_deref(), output).await
            }
            Commands::Charts { file } => engine.charts(&file).await,
            Commands::Batch {
                dir,
                output,
                format,
                fail_fast,
            } => {
                let report = engine
                    .batch(&dir, output, format.as_deref(), fail_fast)
                    .await?;

                if report.written.is_empty() && !report.failed.is_empty() {
                    bail!("No file in {} could be documented", dir.display());
                }
                Ok(())
            }
            Commands::Init { path, force } => {
                let written = engine.init(path, force).await?;
                info!("Edit {} to tune the analysis", written.display());
                Ok(())
            }
        }
    }
}
