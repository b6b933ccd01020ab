// Analysis pipeline
mod classifier;
mod context;
mod inference;
mod readers;
mod tabular;
mod records;
mod pipeline;

// Declaration extraction for source files
mod languages;

// Summary model and its consumers
mod model;
mod charts;
mod generator;
mod engine;

pub use classifier::{classify, FileKind};
pub use context::AnalysisContext;
pub use inference::{infer_type, TypeInference};
pub use readers::{read_csv, read_excel, read_json};
pub use tabular::{analyze_table, repair_header, RawTable};
pub use records::{analyze_records, RecordSummary, ITEMS_NAME, ROOT_NAME, VALUE_NAME};
pub use pipeline::analyze;
pub use languages::{analyze_code, LanguageAnalyzer, PythonAnalyzer};
pub use model::{
    ChartKind, ChartSpec, CodeEntityKind, CodeEntitySummary, CodeSummary, ColumnSummary,
    DocumentationModel, FieldNode, FieldRow, FieldTreeSummary, NumericStats, SemanticType,
    SummaryBody, TableNote, TableSummary,
};
pub use charts::chart_plan;
pub use generator::{DocGenerator, GeneratedDoc, OutputFormat};

// Export the main engine
pub use engine::{BatchReport, Engine, DEFAULT_CONFIG_FILE};
