//! The summary model shared by every analyzer and renderer
//!
//! All values are built fresh for one analysis call and never mutated once
//! handed out. The body is a closed tagged union, so renderers match on it
//! exhaustively.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::classifier::FileKind;

/// Inferred logical category of a column or field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SemanticType {
    Numeric,
    Categorical,
    Boolean,
    DateLike,
    Text,
    Unknown,
}

impl SemanticType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "Numeric",
            Self::Categorical => "Categorical",
            Self::Boolean => "Boolean",
            Self::DateLike => "DateLike",
            Self::Text => "Text",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    pub semantic_type: SemanticType,
    /// Up to the configured limit of distinct non-null values, first-seen order
    pub examples: Vec<String>,
    pub non_null_count: usize,
    pub total_count: usize,
    pub distinct_count: usize,
    /// Present only for numeric columns
    pub stats: Option<NumericStats>,
}

impl ColumnSummary {
    pub fn missing_count(&self) -> usize {
        self.total_count - self.non_null_count
    }

    pub fn missing_pct(&self) -> f64 {
        if self.total_count == 0 {
            0.0
        } else {
            (self.missing_count() as f64 / self.total_count as f64) * 100.0
        }
    }
}

/// Non-fatal repair made while reading a ragged table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "note", rename_all = "snake_case")]
pub enum TableNote {
    /// Row was shorter than the header; missing cells were read as null
    MissingCells { row: usize, expected: usize, found: usize },
    /// Row was longer than the header; trailing cells were dropped
    ExtraCells { row: usize, expected: usize, found: usize },
}

impl fmt::Display for TableNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCells { row, expected, found } => write!(
                f,
                "row {} has {} of {} cells; missing cells read as null",
                row, found, expected
            ),
            Self::ExtraCells { row, expected, found } => write!(
                f,
                "row {} has {} cells for {} columns; extra cells dropped",
                row, found, expected
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSummary {
    pub columns: Vec<ColumnSummary>,
    pub row_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<TableNote>,
}

impl TableSummary {
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            row_count: 0,
            notes: Vec::new(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Node of the structural union of non-homogeneous records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum FieldNode {
    Leaf {
        name: String,
        semantic_type: SemanticType,
        example: Option<String>,
    },
    Container {
        name: String,
        children: Vec<FieldNode>,
    },
}

impl FieldNode {
    pub fn name(&self) -> &str {
        match self {
            Self::Leaf { name, .. } | Self::Container { name, .. } => name,
        }
    }

    pub fn child(&self, name: &str) -> Option<&FieldNode> {
        match self {
            Self::Container { children, .. } => children.iter().find(|c| c.name() == name),
            Self::Leaf { .. } => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }
}

/// Flattened view of one tree node, for renderers that print lists
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldRow {
    pub name: String,
    pub path: String,
    pub depth: usize,
    pub semantic_type: Option<SemanticType>,
    pub example: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldTreeSummary {
    pub root: FieldNode,
}

impl FieldTreeSummary {
    /// Depth-first rows below the root, in child order
    pub fn rows(&self) -> Vec<FieldRow> {
        let mut rows = Vec::new();
        match &self.root {
            FieldNode::Container { children, .. } => {
                for child in children {
                    collect_rows(child, "", 0, &mut rows);
                }
            }
            leaf => collect_rows(leaf, "", 0, &mut rows),
        }
        rows
    }
}

fn collect_rows(node: &FieldNode, prefix: &str, depth: usize, rows: &mut Vec<FieldRow>) {
    let path = if prefix.is_empty() {
        node.name().to_string()
    } else {
        format!("{}.{}", prefix, node.name())
    };

    match node {
        FieldNode::Leaf { semantic_type, example, .. } => rows.push(FieldRow {
            name: node.name().to_string(),
            path,
            depth,
            semantic_type: Some(*semantic_type),
            example: example.clone(),
        }),
        FieldNode::Container { children, .. } => {
            rows.push(FieldRow {
                name: node.name().to_string(),
                path: path.clone(),
                depth,
                semantic_type: None,
                example: None,
            });
            for child in children {
                collect_rows(child, &path, depth + 1, rows);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodeEntityKind {
    Class,
    Function,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeEntitySummary {
    pub kind: CodeEntityKind,
    pub name: String,
    /// Formal parameter names; always empty for classes
    pub parameters: Vec<String>,
    pub documentation: Option<String>,
    /// Owning class for methods and nested classes
    pub nesting: Option<String>,
    /// 1-based line of the declaration header
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSummary {
    pub module_doc: Option<String>,
    pub entities: Vec<CodeEntitySummary>,
}

impl CodeSummary {
    pub fn classes(&self) -> impl Iterator<Item = &CodeEntitySummary> {
        self.entities.iter().filter(|e| e.kind == CodeEntityKind::Class)
    }

    pub fn members_of<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a CodeEntitySummary> {
        self.entities
            .iter()
            .filter(move |e| e.nesting.as_deref() == Some(class))
    }
}

/// The analyzed content, one case per input shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "summary", rename_all = "snake_case")]
pub enum SummaryBody {
    Tabular(TableSummary),
    Nested(FieldTreeSummary),
    Code(CodeSummary),
}

/// Everything a renderer needs; renderers never re-read the input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentationModel {
    pub file_name: String,
    pub kind: FileKind,
    /// SHA-256 of the input bytes, hex encoded
    pub content_hash: String,
    pub body: SummaryBody,
}

impl DocumentationModel {
    pub fn table(&self) -> Option<&TableSummary> {
        match &self.body {
            SummaryBody::Tabular(table) => Some(table),
            SummaryBody::Nested(_) | SummaryBody::Code(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Histogram,
    Bar,
}

/// Advisory recommendation for an external chart renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub column: String,
    pub kind: ChartKind,
}
