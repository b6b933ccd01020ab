//! Markdown and JSON rendering of documentation models
//!
//! Rendering only reads the model. Tabular, nested and code bodies are
//! turned into small view structs first so the template stays free of
//! arithmetic and formatting.

use serde::Serialize;
use std::str::FromStr;
use tera::{Context, Tera};

use super::charts::chart_plan;
use super::model::{
    ChartSpec, CodeEntityKind, CodeEntitySummary, CodeSummary, ColumnSummary, DocumentationModel,
    FieldTreeSummary, SummaryBody, TableSummary,
};
use crate::config::{ChartConfig, OutputConfig};
use crate::error::{FiledocError, Result};

const MARKDOWN_TEMPLATE_NAME: &str = "report.md";

const MARKDOWN_TEMPLATE: &str = r#"# AUTO GENERATED DOCUMENTATION

**File Name:** {{ file_name }}
**File Kind:** {{ kind }}
**Content Hash:** `{{ content_hash }}`
{% if table %}
**Total Rows:** {{ table.row_count }}
**Total Columns:** {{ table.column_count }}

## Column Insights
{% for col in table.columns %}
### {{ col.name }}

| Property | Value |
| --- | --- |
| Data Type | {{ col.semantic_type }} |
| Total Values | {{ col.total }} |
| Missing Values | {{ col.missing }} |
| Missing Percentage | {{ col.missing_pct }}% |
| Unique Values | {{ col.distinct }} |
| Sample Values | {{ col.samples }} |
{% if col.stats %}| Numeric Range | {{ col.stats }} |
{% endif %}{% endfor %}{% if table.notes %}
## Repaired Rows
{% for note in table.notes %}
- {{ note }}{% endfor %}
{% endif %}{% endif %}{% if fields %}
## Field Structure
{% for field in fields %}
{{ field.indent }}- `{{ field.name }}`{% if field.semantic_type %} ({{ field.semantic_type }}){% endif %}{% if field.example %}: e.g. {{ field.example }}{% endif %}{% endfor %}
{% endif %}{% if code %}{% if code.module_doc %}
## Module Overview

{{ code.module_doc }}
{% endif %}{% if code.classes %}
## Classes
{% for class in code.classes %}
### class {{ class.name }}{% if class.owner %} (in {{ class.owner }}){% endif %}

_Line {{ class.line }}_
{% if class.doc %}
{{ class.doc }}
{% endif %}{% if class.methods %}
{% for method in class.methods %}- `{{ method.signature }}`{% if method.summary %}: {{ method.summary }}{% endif %}
{% endfor %}{% endif %}{% endfor %}{% endif %}{% if code.functions %}
## Functions
{% for function in code.functions %}
### `{{ function.signature }}`

_Line {{ function.line }}_
{% if function.doc %}
{{ function.doc }}
{% endif %}{% endfor %}{% endif %}{% if not code.classes and not code.functions %}
_No classes or functions declared._
{% endif %}{% endif %}{% if charts %}
## Suggested Charts
{% for chart in charts %}
- {{ chart.column }}: {{ chart.kind }}{% endfor %}
{% endif %}"#;

/// Rendering target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Markdown,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = FiledocError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            other => Err(FiledocError::Config(format!("Unsupported output format: {}", other))),
        }
    }
}

/// A rendered document ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedDoc {
    /// Suggested output file name, e.g. `sales.csv.md`
    pub file_name: String,
    pub format: OutputFormat,
    pub content: String,
}

pub struct DocGenerator {
    tera: Tera,
    charts: ChartConfig,
    include_charts: bool,
}

impl DocGenerator {
    pub fn new(output: &OutputConfig, charts: &ChartConfig) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(MARKDOWN_TEMPLATE_NAME, MARKDOWN_TEMPLATE)?;

        Ok(Self {
            tera,
            charts: charts.clone(),
            include_charts: output.include_charts,
        })
    }

    /// Chart plan for the model, empty for non-tabular bodies or when disabled
    pub fn charts_for(&self, model: &DocumentationModel) -> Vec<ChartSpec> {
        match model.table() {
            Some(table) if self.include_charts => chart_plan(table, &self.charts),
            _ => Vec::new(),
        }
    }

    pub fn render(&self, model: &DocumentationModel, format: OutputFormat) -> Result<GeneratedDoc> {
        let content = match format {
            OutputFormat::Markdown => self.render_markdown(model)?,
            OutputFormat::Json => self.render_json(model)?,
        };

        Ok(GeneratedDoc {
            file_name: format!("{}.{}", model.file_name, format.extension()),
            format,
            content,
        })
    }

    fn render_markdown(&self, model: &DocumentationModel) -> Result<String> {
        let mut context = Context::new();
        context.insert("file_name", &model.file_name);
        context.insert("kind", model.kind.as_str());
        context.insert("content_hash", &model.content_hash);
        context.insert("charts", &self.charts_for(model));

        let (table, fields, code) = match &model.body {
            SummaryBody::Tabular(table) => (Some(TableView::from(table)), None, None),
            SummaryBody::Nested(tree) => (None, Some(field_views(tree)), None),
            SummaryBody::Code(summary) => (None, None, Some(CodeView::from(summary))),
        };
        context.insert("table", &table);
        context.insert("fields", &fields);
        context.insert("code", &code);

        Ok(self.tera.render(MARKDOWN_TEMPLATE_NAME, &context)?)
    }

    fn render_json(&self, model: &DocumentationModel) -> Result<String> {
        let report = JsonReport {
            model,
            charts: self.charts_for(model),
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    model: &'a DocumentationModel,
    charts: Vec<ChartSpec>,
}

#[derive(Serialize)]
struct TableView {
    row_count: usize,
    column_count: usize,
    columns: Vec<ColumnView>,
    notes: Vec<String>,
}

#[derive(Serialize)]
struct ColumnView {
    name: String,
    semantic_type: String,
    total: usize,
    missing: usize,
    missing_pct: String,
    distinct: usize,
    samples: String,
    stats: Option<String>,
}

impl From<&TableSummary> for TableView {
    fn from(table: &TableSummary) -> Self {
        Self {
            row_count: table.row_count,
            column_count: table.columns.len(),
            columns: table.columns.iter().map(ColumnView::from).collect(),
            notes: table.notes.iter().map(|note| note.to_string()).collect(),
        }
    }
}

impl From<&ColumnSummary> for ColumnView {
    fn from(column: &ColumnSummary) -> Self {
        Self {
            name: table_cell(&column.name),
            semantic_type: column.semantic_type.to_string(),
            total: column.total_count,
            missing: column.missing_count(),
            missing_pct: format!("{:.2}", column.missing_pct()),
            distinct: column.distinct_count,
            samples: table_cell(&column.examples.join(", ")),
            stats: column.stats.as_ref().map(|s| {
                format!("min {}, max {}, mean {:.2}", s.min, s.max, s.mean)
            }),
        }
    }
}

/// Make text safe for a single Markdown table cell or heading line
fn table_cell(text: &str) -> String {
    text.replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
        .replace('|', "\\|")
}

#[derive(Serialize)]
struct FieldView {
    indent: String,
    name: String,
    semantic_type: Option<String>,
    example: Option<String>,
}

fn field_views(tree: &FieldTreeSummary) -> Vec<FieldView> {
    tree.rows()
        .into_iter()
        .map(|row| FieldView {
            indent: "  ".repeat(row.depth),
            name: row.name,
            semantic_type: row.semantic_type.map(|t| t.to_string()),
            example: row.example,
        })
        .collect()
}

#[derive(Serialize)]
struct CodeView {
    module_doc: Option<String>,
    classes: Vec<ClassView>,
    functions: Vec<FunctionView>,
}

#[derive(Serialize)]
struct ClassView {
    name: String,
    owner: Option<String>,
    line: usize,
    doc: Option<String>,
    methods: Vec<FunctionView>,
}

#[derive(Serialize)]
struct FunctionView {
    signature: String,
    line: usize,
    doc: Option<String>,
    summary: Option<String>,
}

impl From<&CodeEntitySummary> for FunctionView {
    fn from(entity: &CodeEntitySummary) -> Self {
        Self {
            signature: format!("{}({})", entity.name, entity.parameters.join(", ")),
            line: entity.line,
            doc: entity.documentation.clone(),
            summary: entity
                .documentation
                .as_deref()
                .and_then(|doc| doc.lines().next())
                .map(str::to_string),
        }
    }
}

impl From<&CodeSummary> for CodeView {
    fn from(summary: &CodeSummary) -> Self {
        let classes = summary
            .classes()
            .map(|class| ClassView {
                name: class.name.clone(),
                owner: class.nesting.clone(),
                line: class.line,
                doc: class.documentation.clone(),
                methods: summary
                    .members_of(&class.name)
                    .filter(|member| member.kind == CodeEntityKind::Function)
                    .map(FunctionView::from)
                    .collect(),
            })
            .collect();

        let functions = summary
            .entities
            .iter()
            .filter(|e| e.kind == CodeEntityKind::Function && e.nesting.is_none())
            .map(FunctionView::from)
            .collect();

        Self {
            module_doc: summary.module_doc.clone(),
            classes,
            functions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::core::pipeline::analyze;

    fn generator() -> DocGenerator {
        DocGenerator::new(&OutputConfig::default(), &ChartConfig::default()).unwrap()
    }

    fn model(name: &str, content: &str) -> DocumentationModel {
        analyze(name, content.as_bytes(), &AnalysisConfig::default()).unwrap()
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("markdown".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("MD".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("pdf".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_markdown_for_table() {
        let model = model(
            "stock.csv",
            "Item,Category,Quantity\nHammer,tools,4\nSaw,tools,\nDrill,power,7\n",
        );
        let doc = generator().render(&model, OutputFormat::Markdown).unwrap();

        assert_eq!(doc.file_name, "stock.csv.md");
        assert!(doc.content.contains("**File Name:** stock.csv"));
        assert!(doc.content.contains("**Total Rows:** 3"));
        assert!(doc.content.contains("### Quantity"));
        assert!(doc.content.contains("| Data Type | Numeric |"));
        assert!(doc.content.contains("| Missing Values | 1 |"));
        assert!(doc.content.contains("| Missing Percentage | 33.33% |"));
        assert!(doc.content.contains("| Sample Values | Hammer, Saw, Drill |"));
        assert!(doc.content.contains("| Numeric Range | min 4, max 7, mean 5.50 |"));
        assert!(doc.content.contains("## Suggested Charts"));
        assert!(doc.content.contains("- Category: bar"));
        assert!(doc.content.contains("- Quantity: histogram"));
    }

    #[test]
    fn test_table_cells_are_escaped() {
        let model = model(
            "odd.csv",
            "\"a|b\",code\n\"x|y\",1\n\"line one\nline two\",2\n",
        );
        let doc = generator().render(&model, OutputFormat::Markdown).unwrap();

        assert!(doc.content.contains("### a\\|b"));
        assert!(doc.content.contains("| Sample Values | x\\|y, line one line two |"));
        assert!(!doc.content.contains("line one\nline two"));
    }

    #[test]
    fn test_markdown_for_field_tree() {
        let model = model("nested.json", r#"[{"id": 1, "owner": {"email": "a@b.c"}}, {"id": 2}]"#);
        let doc = generator().render(&model, OutputFormat::Markdown).unwrap();

        assert!(doc.content.contains("## Field Structure"));
        assert!(doc.content.contains("- `id` (Numeric): e.g. 1"));
        assert!(doc.content.contains("- `owner`"));
        assert!(doc.content.contains("  - `email` (Categorical): e.g. a@b.c"));
        assert!(!doc.content.contains("## Suggested Charts"));
    }

    #[test]
    fn test_markdown_for_code() {
        let source = "\"\"\"Shop helpers.\"\"\"\n\nclass Till:\n    \"\"\"Cash drawer.\"\"\"\n    def open(self, pin):\n        \"\"\"Open it.\n\n        Needs a pin.\"\"\"\n\ndef total(items):\n    pass\n";
        let model = model("shop.py", source);
        let doc = generator().render(&model, OutputFormat::Markdown).unwrap();

        assert!(doc.content.contains("## Module Overview\n\nShop helpers."));
        assert!(doc.content.contains("### class Till"));
        assert!(doc.content.contains("Cash drawer."));
        assert!(doc.content.contains("- `open(pin)`: Open it."));
        assert!(doc.content.contains("### `total(items)`"));
    }

    #[test]
    fn test_markdown_for_empty_code() {
        let model = model("empty.py", "");
        let doc = generator().render(&model, OutputFormat::Markdown).unwrap();
        assert!(doc.content.contains("_No classes or functions declared._"));
    }

    #[test]
    fn test_charts_can_be_disabled() {
        let output = OutputConfig {
            include_charts: false,
            ..OutputConfig::default()
        };
        let generator = DocGenerator::new(&output, &ChartConfig::default()).unwrap();
        let model = model("n.csv", "v\n1\n2\n3\n");

        assert!(generator.charts_for(&model).is_empty());
        let doc = generator.render(&model, OutputFormat::Markdown).unwrap();
        assert!(!doc.content.contains("## Suggested Charts"));
    }

    #[test]
    fn test_json_report() {
        let model = model("n.csv", "v\n1\n2\n3\n");
        let doc = generator().render(&model, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&doc.content).unwrap();

        assert_eq!(doc.file_name, "n.csv.json");
        assert_eq!(value["file_name"], "n.csv");
        assert_eq!(value["kind"], "Csv");
        assert_eq!(value["body"]["type"], "tabular");
        assert_eq!(value["body"]["summary"]["columns"][0]["semantic_type"], "Numeric");
        assert_eq!(value["charts"][0]["kind"], "histogram");
    }

    #[test]
    fn test_rendering_does_not_change_model() {
        let model = model("n.csv", "v\n1\n2\n");
        let before = model.clone();
        generator().render(&model, OutputFormat::Markdown).unwrap();
        assert_eq!(model, before);
    }
}
