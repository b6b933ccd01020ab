use std::collections::HashSet;
use tracing::{debug, warn};

use super::context::AnalysisContext;
use super::inference::infer_type;
use super::model::{ColumnSummary, NumericStats, SemanticType, TableNote, TableSummary};

/// Decoded table as handed over by a reader.
///
/// Rows may be ragged; the analyzer repairs them. `None` cells are nulls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn new(header: Vec<String>) -> Self {
        Self {
            header,
            rows: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.header.len()
    }
}

/// Summarize every column of a decoded table
pub fn analyze_table(table: &RawTable, ctx: &AnalysisContext<'_>) -> TableSummary {
    let names = repair_header(&table.header);
    let width = names.len();
    let notes = ragged_row_notes(table);

    let columns = names
        .into_iter()
        .enumerate()
        .map(|(index, name)| {
            let values: Vec<String> = table
                .rows
                .iter()
                .filter_map(|row| row.get(index).cloned().flatten())
                .collect();
            summarize_column(name, values, table.rows.len(), ctx)
        })
        .collect();

    debug!("Analyzed table with {} columns and {} rows", width, table.rows.len());

    TableSummary {
        columns,
        row_count: table.rows.len(),
        notes,
    }
}

fn summarize_column(
    name: String,
    values: Vec<String>,
    total_count: usize,
    ctx: &AnalysisContext<'_>,
) -> ColumnSummary {
    let inference = infer_type(&values, ctx);

    let semantic_type = if inference.semantic_type == SemanticType::Categorical
        && names_free_text(&name, &ctx.config().text_name_hints)
    {
        debug!("Column '{}' reported as Text by name", name);
        SemanticType::Text
    } else {
        inference.semantic_type
    };

    let stats = if semantic_type == SemanticType::Numeric {
        numeric_stats(&values)
    } else {
        None
    };

    ColumnSummary {
        name,
        semantic_type,
        examples: inference.examples,
        non_null_count: values.len(),
        total_count,
        distinct_count: inference.distinct_count,
        stats,
    }
}

fn numeric_stats(values: &[String]) -> Option<NumericStats> {
    let numbers: Vec<f64> = values
        .iter()
        .filter_map(|v| v.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .collect();

    if numbers.is_empty() {
        return None;
    }

    let min = numbers.iter().copied().fold(f64::INFINITY, f64::min);
    let max = numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = numbers.iter().sum::<f64>() / numbers.len() as f64;

    Some(NumericStats { min, max, mean })
}

/// Whether any word of the column name is a free-text hint
fn names_free_text(name: &str, hints: &[String]) -> bool {
    name.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .any(|word| hints.iter().any(|hint| hint == word))
}

/// Give blank headers a positional name and suffix repeats with `.N`
pub fn repair_header(header: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::with_capacity(header.len());

    for (index, raw) in header.iter().enumerate() {
        let base = match raw.trim() {
            "" => format!("column_{}", index + 1),
            trimmed => trimmed.to_string(),
        };

        let mut name = base.clone();
        let mut repeat = 0;
        while seen.contains(&name) {
            repeat += 1;
            name = format!("{}.{}", base, repeat);
        }

        seen.insert(name.clone());
        names.push(name);
    }

    names
}

fn ragged_row_notes(table: &RawTable) -> Vec<TableNote> {
    let expected = table.width();
    let mut notes = Vec::new();

    for (index, row) in table.rows.iter().enumerate() {
        let row_number = index + 1;
        let found = row.len();
        if found < expected {
            notes.push(TableNote::MissingCells {
                row: row_number,
                expected,
                found,
            });
        } else if found > expected {
            notes.push(TableNote::ExtraCells {
                row: row_number,
                expected,
                found,
            });
        }
    }

    if !notes.is_empty() {
        warn!("Repaired {} ragged rows", notes.len());
    }

    notes
}
