//! Single-file analysis: classify, decode, summarize
//!
//! `analyze` is a pure function of its arguments. All intermediate state
//! lives in an `AnalysisContext` created for the call.

use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::{debug, info};

use super::classifier::{classify, extension_of, FileKind};
use super::context::AnalysisContext;
use super::languages::analyze_code;
use super::model::{DocumentationModel, SummaryBody};
use super::readers::{read_csv, read_excel, read_json};
use super::records::analyze_records;
use super::tabular::analyze_table;
use crate::config::AnalysisConfig;
use crate::error::{FiledocError, Result};

/// Analyze one input and build its documentation model
pub fn analyze(file_name: &str, content: &[u8], config: &AnalysisConfig) -> Result<DocumentationModel> {
    let kind = classify(file_name, content)?;
    let ctx = AnalysisContext::new(config);

    if content.is_empty() {
        debug!("{} is empty; producing an empty summary", file_name);
    }

    let body = match kind {
        FileKind::Csv => SummaryBody::Tabular(analyze_table(&read_csv(content, &ctx)?, &ctx)),
        FileKind::Excel => SummaryBody::Tabular(analyze_table(&read_excel(content, &ctx)?, &ctx)),
        FileKind::Json => analyze_records(&read_json(content)?, &ctx).into_body(),
        FileKind::Python => {
            let source = std::str::from_utf8(content).map_err(|e| {
                FiledocError::UnparsableSource(format!("source is not valid UTF-8: {}", e))
            })?;
            SummaryBody::Code(analyze_code(source)?)
        }
        FileKind::Unsupported => {
            return Err(FiledocError::UnsupportedFileKind {
                extension: extension_of(Path::new(file_name)),
            })
        }
    };

    let model = DocumentationModel {
        file_name: base_name(file_name),
        kind,
        content_hash: calculate_hash(content),
        body,
    };

    info!("Analyzed {} as {}", model.file_name, model.kind);
    Ok(model)
}

fn base_name(file_name: &str) -> String {
    Path::new(file_name)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| file_name.to_string())
}

/// Calculate SHA256 hash of content
fn calculate_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}
