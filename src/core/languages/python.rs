use tracing::debug;
use tree_sitter::{Node, Parser};

use super::LanguageAnalyzer;
use crate::core::model::{CodeEntityKind, CodeEntitySummary, CodeSummary};
use crate::error::{FiledocError, Result};

/// Python declaration extractor using Tree-sitter
pub struct PythonAnalyzer {
    parser: Parser,
}

impl PythonAnalyzer {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let python_language = tree_sitter_python::language();
        parser
            .set_language(&python_language)
            .map_err(|e| FiledocError::Parser(format!("Failed to set Python language: {}", e)))?;

        Ok(Self { parser })
    }
}

impl LanguageAnalyzer for PythonAnalyzer {
    fn analyze(&mut self, source: &str) -> Result<CodeSummary> {
        if source.contains('\0') {
            return Err(FiledocError::UnparsableSource(
                "source contains NUL bytes".to_string(),
            ));
        }

        let tree = self.parser.parse(source, None).ok_or_else(|| {
            FiledocError::UnparsableSource("Failed to parse Python code".to_string())
        })?;

        let root_node = tree.root_node();
        if root_node.has_error() {
            debug!("Python source has syntax errors; malformed declarations are skipped");
        }

        let mut entities = Vec::new();
        self.collect_declarations(root_node, source, &mut entities);

        Ok(CodeSummary {
            module_doc: leading_docstring(root_node, source),
            entities,
        })
    }

    fn language_name(&self) -> &str {
        "python"
    }
}

/// Statement nodes whose children may hold declarations
const STATEMENT_CONTAINERS: [&str; 14] = [
    "block",
    "if_statement",
    "elif_clause",
    "else_clause",
    "try_statement",
    "except_clause",
    "except_group_clause",
    "finally_clause",
    "with_statement",
    "for_statement",
    "while_statement",
    "match_statement",
    "case_clause",
    "ERROR",
];

impl PythonAnalyzer {
    /// Walk statements in source order with an explicit stack, descending into
    /// statement containers and class bodies but never into function bodies
    /// or expressions.
    fn collect_declarations(
        &self,
        root: Node,
        source: &str,
        entities: &mut Vec<CodeEntitySummary>,
    ) {
        let mut pending: Vec<(Node, Option<String>)> = Vec::new();
        push_children(root, None, &mut pending);

        while let Some((node, owner)) = pending.pop() {
            match node.kind() {
                "class_definition" => {
                    if let Some(name) = self.push_class(node, source, owner.as_deref(), entities) {
                        if let Some(body) = node.child_by_field_name("body") {
                            push_children(body, Some(name), &mut pending);
                        }
                    }
                }
                "function_definition" => {
                    self.push_function(node, &[], source, owner.as_deref(), entities)
                }
                "decorated_definition" => {
                    let decorators = decorator_names(node, source);
                    match node.child_by_field_name("definition") {
                        Some(def) if def.kind() == "class_definition" => {
                            if let Some(name) =
                                self.push_class(def, source, owner.as_deref(), entities)
                            {
                                if let Some(body) = def.child_by_field_name("body") {
                                    push_children(body, Some(name), &mut pending);
                                }
                            }
                        }
                        Some(def) if def.kind() == "function_definition" => {
                            self.push_function(def, &decorators, source, owner.as_deref(), entities)
                        }
                        _ => debug!(
                            "Skipping decorated statement without a definition at line {}",
                            node.start_position().row + 1
                        ),
                    }
                }
                kind if STATEMENT_CONTAINERS.contains(&kind) => {
                    push_children(node, owner, &mut pending)
                }
                _ => {}
            }
        }
    }

    /// Record a class and return its name for its members' nesting
    fn push_class(
        &self,
        node: Node,
        source: &str,
        owner: Option<&str>,
        entities: &mut Vec<CodeEntitySummary>,
    ) -> Option<String> {
        let name = self.declared_name(node, source)?;

        entities.push(CodeEntitySummary {
            kind: CodeEntityKind::Class,
            name: name.clone(),
            parameters: Vec::new(),
            documentation: node
                .child_by_field_name("body")
                .and_then(|body| leading_docstring(body, source)),
            nesting: owner.map(str::to_string),
            line: node.start_position().row + 1,
        });

        Some(name)
    }

    fn push_function(
        &self,
        node: Node,
        decorators: &[String],
        source: &str,
        owner: Option<&str>,
        entities: &mut Vec<CodeEntitySummary>,
    ) {
        let Some(name) = self.declared_name(node, source) else {
            return;
        };

        let parameters_node = match node.child_by_field_name("parameters") {
            Some(params) if !params.is_missing() && !params.is_error() => params,
            _ => {
                debug!(
                    "Skipping function '{}' with malformed parameters at line {}",
                    name,
                    node.start_position().row + 1
                );
                return;
            }
        };

        let mut parameters = parameter_names(parameters_node, source);

        // Methods drop their receiver unless declared static; splats are never receivers
        let is_static = decorators.iter().any(|d| d == "staticmethod");
        if owner.is_some() && !is_static && has_plain_first_parameter(parameters_node) {
            parameters.remove(0);
        }

        entities.push(CodeEntitySummary {
            kind: CodeEntityKind::Function,
            name,
            parameters,
            documentation: node
                .child_by_field_name("body")
                .and_then(|body| leading_docstring(body, source)),
            nesting: owner.map(str::to_string),
            line: node.start_position().row + 1,
        });
    }

    fn declared_name(&self, node: Node, source: &str) -> Option<String> {
        let name_node = node.child_by_field_name("name")?;
        if name_node.is_missing() {
            return None;
        }

        let name = node_text(name_node, source).trim();
        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    }
}

/// Queue the named children of `node` so they pop in source order
fn push_children<'t>(
    node: Node<'t>,
    owner: Option<String>,
    pending: &mut Vec<(Node<'t>, Option<String>)>,
) {
    let mut cursor = node.walk();
    let children: Vec<Node<'t>> = node.named_children(&mut cursor).collect();
    pending.extend(children.into_iter().rev().map(|child| (child, owner.clone())));
}

/// Whether the first parameter is a plain name that can act as a receiver
fn has_plain_first_parameter(parameters: Node) -> bool {
    let mut cursor = parameters.walk();
    let first = parameters
        .named_children(&mut cursor)
        .find(|param| param.kind() != "comment");

    match first {
        Some(param) if param.kind() == "identifier" => true,
        Some(param) if param.kind() == "typed_parameter" => param
            .named_child(0)
            .is_some_and(|name| name.kind() == "identifier"),
        _ => false,
    }
}

/// Extract text content of a node
fn node_text<'s>(node: Node, source: &'s str) -> &'s str {
    &source[node.byte_range()]
}

/// Decorator names without `@` or call arguments, e.g. `staticmethod`, `app.route`
fn decorator_names(node: Node, source: &str) -> Vec<String> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() == "decorator")
        .map(|decorator| {
            let text = node_text(decorator, source).trim_start_matches('@').trim();
            text.split('(').next().unwrap_or(text).trim().to_string()
        })
        .collect()
}

fn parameter_names(node: Node, source: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = node.walk();

    for param in node.named_children(&mut cursor) {
        let name = match param.kind() {
            "identifier" | "list_splat_pattern" | "dictionary_splat_pattern" => {
                Some(node_text(param, source))
            }
            "default_parameter" | "typed_default_parameter" => param
                .child_by_field_name("name")
                .map(|n| node_text(n, source)),
            "typed_parameter" => param.named_child(0).map(|n| node_text(n, source)),
            _ => None,
        };

        if let Some(name) = name {
            names.push(name.trim().to_string());
        }
    }

    names
}

/// Docstring of a module or block: a string literal as the first statement
fn leading_docstring(block: Node, source: &str) -> Option<String> {
    let mut cursor = block.walk();
    let first = block
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment")?;

    if first.kind() != "expression_statement" {
        return None;
    }

    let string = first.named_child(0).filter(|n| n.kind() == "string")?;
    clean_docstring(node_text(string, source))
}

/// Strip prefixes and quotes from a string literal and dedent its body
fn clean_docstring(literal: &str) -> Option<String> {
    let unprefixed = literal.trim_start_matches(|c: char| "rRuUbBfF".contains(c));

    let body = ["\"\"\"", "'''", "\"", "'"]
        .iter()
        .find_map(|quote| {
            unprefixed
                .strip_prefix(quote)
                .and_then(|rest| rest.strip_suffix(quote))
        })
        .unwrap_or(unprefixed);

    let lines: Vec<&str> = body.lines().collect();
    let indent = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| leading_whitespace(line))
        .min()
        .unwrap_or(0);

    let mut cleaned: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                line.trim()
            } else {
                strip_indent(line, indent).trim_end()
            }
        })
        .collect();

    while cleaned.first().is_some_and(|line| line.is_empty()) {
        cleaned.remove(0);
    }
    while cleaned.last().is_some_and(|line| line.is_empty()) {
        cleaned.pop();
    }

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.join("\n"))
    }
}

/// Leading whitespace measured in characters
fn leading_whitespace(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// Drop up to `indent` leading whitespace characters
fn strip_indent(line: &str, indent: usize) -> &str {
    let start = line
        .char_indices()
        .take_while(|(_, c)| c.is_whitespace())
        .take(indent)
        .last()
        .map_or(0, |(i, c)| i + c.len_utf8());
    &line[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(source: &str) -> CodeSummary {
        PythonAnalyzer::new().unwrap().analyze(source).unwrap()
    }

    fn names(summary: &CodeSummary) -> Vec<&str> {
        summary.entities.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_class_with_methods_and_free_function() {
        let source = r#"
class Inventory:
    """Tracks stock levels."""

    def add(self, sku, qty=1):
        """Add units."""
        pass

    def remove(self, sku):
        pass


def report(inventory, *, verbose=False):
    return inventory
"#;
        let summary = analyze(source);
        assert_eq!(names(&summary), vec!["Inventory", "add", "remove", "report"]);

        let class = &summary.entities[0];
        assert_eq!(class.kind, CodeEntityKind::Class);
        assert_eq!(class.documentation.as_deref(), Some("Tracks stock levels."));
        assert!(class.parameters.is_empty());
        assert_eq!(class.line, 2);

        let add = &summary.entities[1];
        assert_eq!(add.kind, CodeEntityKind::Function);
        assert_eq!(add.parameters, vec!["sku", "qty"]);
        assert_eq!(add.nesting.as_deref(), Some("Inventory"));
        assert_eq!(add.documentation.as_deref(), Some("Add units."));

        let remove = &summary.entities[2];
        assert_eq!(remove.parameters, vec!["sku"]);
        assert_eq!(remove.documentation, None);

        let report = &summary.entities[3];
        assert_eq!(report.parameters, vec!["inventory", "verbose"]);
        assert_eq!(report.nesting, None);
    }

    #[test]
    fn test_parameter_forms() {
        let source = "def f(a, b: int, c=3, d: str = 'x', *args, e, **kwargs):\n    pass\n";
        let summary = analyze(source);
        assert_eq!(
            summary.entities[0].parameters,
            vec!["a", "b", "c", "d", "*args", "e", "**kwargs"]
        );
    }

    #[test]
    fn test_decorated_and_async_definitions() {
        let source = r#"
import functools

class Service:
    @staticmethod
    def build(config):
        pass

    @classmethod
    def default(cls):
        pass

    @property
    async def status(self):
        pass

@functools.lru_cache(maxsize=None)
async def fetch(url, timeout=5):
    pass
"#;
        let summary = analyze(source);
        assert_eq!(names(&summary), vec!["Service", "build", "default", "status", "fetch"]);
        assert_eq!(summary.entities[1].parameters, vec!["config"]);
        assert!(summary.entities[2].parameters.is_empty());
        assert!(summary.entities[3].parameters.is_empty());
        assert_eq!(summary.entities[4].parameters, vec!["url", "timeout"]);
        assert_eq!(summary.entities[4].nesting, None);
    }

    #[test]
    fn test_function_bodies_are_not_descended() {
        let source = r#"
def outer(x):
    def inner(y):
        pass
    class Local:
        pass
    return inner
"#;
        let summary = analyze(source);
        assert_eq!(names(&summary), vec!["outer"]);
    }

    #[test]
    fn test_nested_class_is_owned_by_outer_class() {
        let source = r#"
class Outer:
    class Meta:
        def describe(self):
            pass
"#;
        let summary = analyze(source);
        assert_eq!(names(&summary), vec!["Outer", "Meta", "describe"]);
        assert_eq!(summary.entities[1].nesting.as_deref(), Some("Outer"));
        assert_eq!(summary.entities[2].nesting.as_deref(), Some("Meta"));
    }

    #[test]
    fn test_definitions_inside_module_level_conditionals() {
        let source = r#"
try:
    import numpy
except ImportError:
    def fallback(values):
        return values

if __name__ == "__main__":
    def main():
        pass
"#;
        let summary = analyze(source);
        assert_eq!(names(&summary), vec!["fallback", "main"]);
    }

    #[test]
    fn test_module_docstring() {
        let source = "# coding: utf-8\n\"\"\"Inventory helpers.\n\nMore detail.\n\"\"\"\n\nX = 1\n";
        let summary = analyze(source);
        assert_eq!(
            summary.module_doc.as_deref(),
            Some("Inventory helpers.\n\nMore detail.")
        );
        assert!(summary.entities.is_empty());
    }

    #[test]
    fn test_docstring_must_be_first_statement() {
        let source = "def f():\n    x = 1\n    \"\"\"not a docstring\"\"\"\n";
        let summary = analyze(source);
        assert_eq!(summary.entities[0].documentation, None);
    }

    #[test]
    fn test_malformed_input_degrades_gracefully() {
        let source = "def ok(a):\n    pass\n\ndef (:\n";
        let summary = PythonAnalyzer::new().unwrap().analyze(source).unwrap();
        assert!(summary.entities.iter().any(|e| e.name == "ok"));
    }

    #[test]
    fn test_empty_source() {
        let summary = analyze("");
        assert!(summary.entities.is_empty());
        assert_eq!(summary.module_doc, None);
    }

    #[test]
    fn test_nul_bytes_are_unparsable() {
        let err = PythonAnalyzer::new()
            .unwrap()
            .analyze("def f():\0\0 pass")
            .unwrap_err();
        assert!(matches!(err, FiledocError::UnparsableSource(_)));
    }

    #[test]
    fn test_clean_docstring() {
        assert_eq!(clean_docstring("\"\"\"One line.\"\"\"").as_deref(), Some("One line."));
        assert_eq!(clean_docstring("r'''raw'''").as_deref(), Some("raw"));
        assert_eq!(clean_docstring("'single'").as_deref(), Some("single"));
        assert_eq!(
            clean_docstring("\"\"\"Summary.\n\n        Indented body.\n          Deeper.\n    \"\"\"")
                .as_deref(),
            Some("Summary.\n\nIndented body.\n  Deeper.")
        );
        assert_eq!(clean_docstring("\"\"\"   \"\"\""), None);
    }

    #[test]
    fn test_deeply_nested_condition_does_not_exhaust_stack() {
        let depth = 50_000;
        let source = format!(
            "if {}1{}:\n    pass\n\ndef after(x):\n    pass\n",
            "(".repeat(depth),
            ")".repeat(depth)
        );

        // Same stack size as a tokio blocking thread
        let summary = std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(move || PythonAnalyzer::new().unwrap().analyze(&source))
            .unwrap()
            .join()
            .unwrap()
            .unwrap();

        assert_eq!(names(&summary), vec!["after"]);
    }

    #[test]
    fn test_splat_first_parameter_is_not_a_receiver() {
        let source = "class A:\n    def m(*args, **kw):\n        pass\n\n    def n(self: 'A', k):\n        pass\n";
        let summary = analyze(source);

        assert_eq!(summary.entities[1].parameters, vec!["*args", "**kw"]);
        assert_eq!(summary.entities[2].parameters, vec!["k"]);
    }

    #[test]
    fn test_clean_docstring_with_unicode_indent() {
        let literal = "\"\"\"Top.\n    body\n\u{3000}\u{3000}wide\n    \"\"\"";
        assert_eq!(
            clean_docstring(literal).as_deref(),
            Some("Top.\n  body\nwide")
        );
    }
}
