use std::collections::HashSet;

use filedoc::config::AnalysisConfig;
use filedoc::core::{
    analyze, CodeEntityKind, DocumentationModel, FieldNode, FileKind, SemanticType, SummaryBody,
    TableNote, TableSummary,
};
use filedoc::FiledocError;

fn run(name: &str, content: &str) -> DocumentationModel {
    analyze(name, content.as_bytes(), &AnalysisConfig::default()).unwrap()
}

fn table(model: &DocumentationModel) -> &TableSummary {
    model.table().expect("expected a tabular summary")
}

#[test]
fn test_people_csv() {
    let model = run("people.csv", "Name,Age,Salary\nAnn,30,50000\nBo,41,62000\n");
    let table = table(&model);

    assert_eq!(model.kind, FileKind::Csv);
    assert_eq!(table.row_count, 2);
    assert_eq!(table.columns.len(), 3);

    let name = table.column("Name").unwrap();
    assert_eq!(name.semantic_type, SemanticType::Text);
    assert_eq!(name.examples, vec!["Ann", "Bo"]);

    let age = table.column("Age").unwrap();
    assert_eq!(age.semantic_type, SemanticType::Numeric);
    assert_eq!(age.examples, vec!["30", "41"]);

    let salary = table.column("Salary").unwrap();
    assert_eq!(salary.semantic_type, SemanticType::Numeric);
    assert_eq!(salary.examples, vec!["50000", "62000"]);
    let stats = salary.stats.as_ref().unwrap();
    assert_eq!(stats.min, 50000.0);
    assert_eq!(stats.max, 62000.0);
    assert_eq!(stats.mean, 56000.0);
}

#[test]
fn test_homogeneous_json_is_tabular() {
    let model = run("rows.json", r#"[{"a":1,"b":"x"},{"a":2,"b":"y"}]"#);
    let table = table(&model);

    assert_eq!(table.row_count, 2);
    assert_eq!(table.column("a").unwrap().semantic_type, SemanticType::Numeric);
    assert_eq!(table.column("b").unwrap().semantic_type, SemanticType::Categorical);
}

#[test]
fn test_shape_conflict_json_is_a_field_tree() {
    let model = run("mixed.json", r#"[{"a":1},{"a":{"nested":2}}]"#);

    let tree = match &model.body {
        SummaryBody::Nested(tree) => tree,
        other => panic!("expected a field tree, got {other:?}"),
    };
    let a = tree.root.child("a").unwrap();
    assert!(matches!(a, FieldNode::Container { .. }));
    assert!(a.child("nested").unwrap().is_leaf());
}

#[test]
fn test_python_declarations() {
    let source = r#"
class Ledger:
    def credit(self, amount):
        """Add money."""

    def debit(self, amount):
        pass

def audit(ledger):
    pass
"#;
    let model = run("ledger.py", source);
    let code = match &model.body {
        SummaryBody::Code(code) => code,
        other => panic!("expected a code summary, got {other:?}"),
    };

    let names: Vec<&str> = code.entities.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Ledger", "credit", "debit", "audit"]);
    assert_eq!(code.entities[0].kind, CodeEntityKind::Class);

    let methods: Vec<&str> = code.members_of("Ledger").map(|e| e.name.as_str()).collect();
    assert_eq!(methods, vec!["credit", "debit"]);
    assert_eq!(code.entities[1].documentation.as_deref(), Some("Add money."));
    assert_eq!(code.entities[3].nesting, None);
}

#[test]
fn test_header_only_csv() {
    let model = run("empty.csv", "id,label,when\n");
    let table = table(&model);

    assert_eq!(table.row_count, 0);
    assert_eq!(table.columns.len(), 3);
    for column in &table.columns {
        assert_eq!(column.semantic_type, SemanticType::Unknown);
        assert!(column.examples.is_empty());
        assert_eq!(column.total_count, 0);
    }
}

#[test]
fn test_counts_match_row_count() {
    let model = run(
        "ragged.csv",
        "a,b,c\n1,x,2020-01-01\n2,y\n3,z,2020-01-03,extra\n,,\n",
    );
    let table = table(&model);

    assert_eq!(table.row_count, 4);
    for column in &table.columns {
        assert_eq!(column.total_count, table.row_count, "{}", column.name);
        assert!(column.non_null_count <= column.total_count);
    }

    assert_eq!(table.column("c").unwrap().semantic_type, SemanticType::DateLike);
    assert_eq!(
        table.notes,
        vec![
            TableNote::MissingCells { row: 2, expected: 3, found: 2 },
            TableNote::ExtraCells { row: 3, expected: 3, found: 4 },
        ]
    );
}

#[test]
fn test_categorical_distinct_bound() {
    let mut csv = String::from("tier,code\n");
    for i in 0..60 {
        csv.push_str(&format!("t{},c{}\n", i % 8, i));
    }
    let model = run("tiers.csv", &csv);
    let table = table(&model);

    for column in &table.columns {
        if column.semantic_type == SemanticType::Categorical {
            let limit = 10f64.max(0.05 * column.total_count as f64);
            assert!(column.distinct_count as f64 <= limit, "{}", column.name);
        }
    }
    assert_eq!(table.column("tier").unwrap().semantic_type, SemanticType::Categorical);
    assert_eq!(table.column("code").unwrap().semantic_type, SemanticType::Text);
}

#[test]
fn test_examples_are_bounded_and_distinct() {
    let mut csv = String::from("city\n");
    for city in ["Oslo", "Oslo", "Lima", "Pune", "Lima", "Kyiv", "Rome", "Nice", "Bern"] {
        csv.push_str(city);
        csv.push('\n');
    }
    let model = run("cities.csv", &csv);
    let examples = &table(&model).columns[0].examples;

    assert_eq!(examples, &vec!["Oslo", "Lima", "Pune", "Kyiv", "Rome"]);
    let unique: HashSet<&String> = examples.iter().collect();
    assert_eq!(unique.len(), examples.len());
}

#[test]
fn test_analysis_is_repeatable() {
    let inputs = [
        ("a.csv", "x,y\n1,true\n2,false\n"),
        ("b.json", r#"[{"k": [1, 2]}, {"k": [3], "m": null}]"#),
        ("c.py", "def f(a, *rest):\n    \"\"\"Doc.\"\"\"\n"),
    ];

    for (name, content) in inputs {
        assert_eq!(run(name, content), run(name, content), "{name}");
    }
}

#[test]
fn test_numbers_win_over_dates() {
    let model = run("days.csv", "day\n20230101\n20230102\n");
    assert_eq!(table(&model).columns[0].semantic_type, SemanticType::Numeric);
}

#[test]
fn test_failures_are_values() {
    let config = AnalysisConfig::default();

    let err = analyze("slides.pptx", b"PK", &config).unwrap_err();
    assert!(matches!(err, FiledocError::UnsupportedFileKind { .. }));

    let err = analyze("broken.json", b"{\"a\": ", &config).unwrap_err();
    assert!(matches!(err, FiledocError::Decode { kind: "JSON", .. }));

    let err = analyze("broken.xlsx", b"not a workbook", &config).unwrap_err();
    assert!(matches!(err, FiledocError::Decode { kind: "Excel", .. }));
}

#[test]
fn test_model_serializes_with_tagged_body() {
    let model = run("rows.json", r#"[{"a":1}]"#);
    let value = serde_json::to_value(&model).unwrap();

    assert_eq!(value["kind"], "Json");
    assert_eq!(value["body"]["type"], "tabular");
    assert_eq!(value["body"]["summary"]["row_count"], 1);
}

#[test]
fn test_excel_workbook() {
    let content = include_bytes!("fixtures/stock.xlsx");
    let model = analyze("stock.xlsx", content, &AnalysisConfig::default()).unwrap();
    let table = table(&model);

    assert_eq!(model.kind, FileKind::Excel);
    assert_eq!(table.row_count, 4);
    let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Item", "Qty", "Received", "Checked"]);

    let item = table.column("Item").unwrap();
    assert_eq!(item.semantic_type, SemanticType::Categorical);
    assert_eq!(item.examples, vec!["Hammer", "Saw", "Drill", "Level"]);

    let qty = table.column("Qty").unwrap();
    assert_eq!(qty.semantic_type, SemanticType::Numeric);
    assert_eq!(qty.non_null_count, 3);
    assert_eq!(qty.total_count, 4);
    let stats = qty.stats.as_ref().unwrap();
    assert_eq!((stats.min, stats.max), (2.0, 7.0));

    let received = table.column("Received").unwrap();
    assert_eq!(received.semantic_type, SemanticType::DateLike);
    assert_eq!(received.non_null_count, 3);
    assert!(received.examples[0].starts_with("2024-01-15"));

    let checked = table.column("Checked").unwrap();
    assert_eq!(checked.semantic_type, SemanticType::Boolean);
    assert_eq!(checked.missing_count(), 1);
}
