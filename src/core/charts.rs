use super::model::{ChartKind, ChartSpec, SemanticType, TableSummary};
use crate::config::ChartConfig;

/// Recommend charts for the columns of a table.
///
/// Numeric columns with enough distinct values get a histogram, categorical
/// columns within the distinct-value band get a bar chart. Nothing is drawn.
pub fn chart_plan(table: &TableSummary, config: &ChartConfig) -> Vec<ChartSpec> {
    table
        .columns
        .iter()
        .filter_map(|column| {
            let kind = match column.semantic_type {
                SemanticType::Numeric if column.distinct_count >= config.numeric_min_distinct => {
                    ChartKind::Histogram
                }
                SemanticType::Categorical
                    if (config.categorical_min_distinct..=config.categorical_max_distinct)
                        .contains(&column.distinct_count) =>
                {
                    ChartKind::Bar
                }
                _ => return None,
            };

            Some(ChartSpec {
                column: column.name.clone(),
                kind,
            })
        })
        .collect()
}
