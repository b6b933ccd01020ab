//! Summaries for structured-record input (JSON)
//!
//! Flat records sharing one key set are handed to the tabular analyzer.
//! Anything else becomes a field tree: the structural union of every
//! record's shape, one inferred type and example per leaf path.

use serde_json::{Map, Value};
use std::collections::BTreeSet;
use tracing::debug;

use super::context::AnalysisContext;
use super::inference::infer_type;
use super::model::{FieldNode, FieldTreeSummary, SummaryBody, TableSummary};
use super::tabular::{analyze_table, RawTable};

/// Name of the tree root
pub const ROOT_NAME: &str = "$";
/// Child collecting the items of every sequence at a path
pub const ITEMS_NAME: &str = "[]";
/// Child keeping scalar observations at a path that is elsewhere a structure
pub const VALUE_NAME: &str = "$value";

#[derive(Debug, Clone, PartialEq)]
pub enum RecordSummary {
    Table(TableSummary),
    Tree(FieldTreeSummary),
}

impl RecordSummary {
    pub fn into_body(self) -> SummaryBody {
        match self {
            Self::Table(table) => SummaryBody::Tabular(table),
            Self::Tree(tree) => SummaryBody::Nested(tree),
        }
    }
}

/// Summarize a decoded record document (one object or an array of records)
pub fn analyze_records(document: &Value, ctx: &AnalysisContext<'_>) -> RecordSummary {
    let records: Vec<&Value> = match document {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    if records.is_empty() {
        return RecordSummary::Table(TableSummary::empty());
    }

    if let Some(flat) = as_homogeneous(&records) {
        debug!("{} homogeneous records, summarizing as a table", flat.len());
        let table = records_to_table(&flat, ctx);
        return RecordSummary::Table(analyze_table(&table, ctx));
    }

    debug!("{} heterogeneous records, building a field tree", records.len());
    let mut root = ShapeBuilder::default();
    for record in &records {
        root.absorb(record, ctx);
    }

    RecordSummary::Tree(FieldTreeSummary {
        root: root.finish(ROOT_NAME.to_string(), ctx),
    })
}

/// Records as flat maps when every one is flat and all key sets are equal
fn as_homogeneous<'v>(records: &[&'v Value]) -> Option<Vec<&'v Map<String, Value>>> {
    let mut maps = Vec::with_capacity(records.len());
    let mut expected: Option<BTreeSet<&str>> = None;

    for &record in records {
        let map = record.as_object()?;
        if map.values().any(|v| v.is_object() || v.is_array()) {
            return None;
        }

        let keys: BTreeSet<&str> = map.keys().map(String::as_str).collect();
        match &expected {
            Some(first) if *first != keys => return None,
            Some(_) => {}
            None => expected = Some(keys),
        }
        maps.push(map);
    }

    Some(maps)
}

fn records_to_table(records: &[&Map<String, Value>], ctx: &AnalysisContext<'_>) -> RawTable {
    let header: Vec<String> = records
        .first()
        .map(|first| first.keys().cloned().collect())
        .unwrap_or_default();

    let rows = records
        .iter()
        .map(|record| {
            header
                .iter()
                .map(|key| record.get(key).and_then(|v| scalar_text(v, ctx)))
                .collect()
        })
        .collect();

    RawTable { header, rows }
}

/// Stringified scalar, or `None` for nulls and structures
fn scalar_text(value: &Value, ctx: &AnalysisContext<'_>) -> Option<String> {
    match value {
        Value::Null | Value::Array(_) | Value::Object(_) => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => ctx.normalize_cell(s),
    }
}

/// Accumulated shape of one path across all records
#[derive(Default)]
struct ShapeBuilder {
    scalars: Vec<String>,
    structured: bool,
    children: Vec<(String, ShapeBuilder)>,
}

impl ShapeBuilder {
    fn absorb(&mut self, value: &Value, ctx: &AnalysisContext<'_>) {
        match value {
            Value::Object(map) => {
                self.structured = true;
                for (key, child) in map {
                    self.child(key).absorb(child, ctx);
                }
            }
            Value::Array(items) => {
                self.structured = true;
                let items_shape = self.child(ITEMS_NAME);
                for item in items {
                    items_shape.absorb(item, ctx);
                }
            }
            scalar => {
                if let Some(text) = scalar_text(scalar, ctx) {
                    self.scalars.push(text);
                }
            }
        }
    }

    fn child(&mut self, name: &str) -> &mut ShapeBuilder {
        let index = match self.children.iter().position(|(n, _)| n == name) {
            Some(index) => index,
            None => {
                self.children.push((name.to_string(), ShapeBuilder::default()));
                self.children.len() - 1
            }
        };
        &mut self.children[index].1
    }

    fn finish(self, name: String, ctx: &AnalysisContext<'_>) -> FieldNode {
        if !self.structured {
            return leaf(name, &self.scalars, ctx);
        }

        let mut children = Vec::with_capacity(self.children.len() + 1);
        if !self.scalars.is_empty() {
            children.push(leaf(VALUE_NAME.to_string(), &self.scalars, ctx));
        }
        children.extend(
            self.children
                .into_iter()
                .map(|(child_name, shape)| shape.finish(child_name, ctx)),
        );

        FieldNode::Container { name, children }
    }
}

fn leaf(name: String, scalars: &[String], ctx: &AnalysisContext<'_>) -> FieldNode {
    FieldNode::Leaf {
        name,
        semantic_type: infer_type(scalars, ctx).semantic_type,
        example: scalars.first().cloned(),
    }
}
