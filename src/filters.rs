// Source filters, applied to raw text before it is tokenized

use crate::error::ListingError;
use std::collections::BTreeSet;

/// A transformation of source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Drop lines, each given as `(line, count)` with 1-based line numbers
    /// of the unfiltered source.
    RemoveLines(Vec<(usize, usize)>),
    /// Collapse every run of blank lines into a single blank line.
    RemoveDoubleBlanks,
    /// Remove the indentation shared by every non-blank line.
    LeftJustify,
    /// Keep only the named Python function, class or assignment. Dotted
    /// names descend into classes and functions, e.g. `Foo.bar`.
    PythonExtract(String),
}

impl Filter {
    /// Remove single lines, given 1-based.
    pub fn remove_lines(lines: impl IntoIterator<Item = usize>) -> Self {
        Filter::RemoveLines(lines.into_iter().map(|line| (line, 1)).collect())
    }

    pub fn apply(&self, source: &str) -> Result<String, ListingError> {
        match self {
            Filter::RemoveLines(ranges) => remove_lines(source, ranges),
            Filter::RemoveDoubleBlanks => Ok(remove_double_blanks(source)),
            Filter::LeftJustify => Ok(left_justify(source)),
            Filter::PythonExtract(name) => python_extract(source, name),
        }
    }
}

fn remove_lines(source: &str, ranges: &[(usize, usize)]) -> Result<String, ListingError> {
    let lines: Vec<&str> = source.split('\n').collect();
    let mut dropped = BTreeSet::new();
    for &(line, count) in ranges {
        if line == 0 || count > lines.len().saturating_sub(line - 1) {
            return Err(ListingError::range(line, count, lines.len()));
        }
        dropped.extend(line - 1..line - 1 + count);
    }

    let kept: Vec<&str> = lines
        .iter()
        .enumerate()
        .filter(|(index, _)| !dropped.contains(index))
        .map(|(_, line)| *line)
        .collect();
    Ok(kept.join("\n"))
}

fn remove_double_blanks(source: &str) -> String {
    let mut output: Vec<&str> = Vec::new();
    let mut previous_blank = false;
    for line in source.split('\n') {
        let blank = line.trim().is_empty();
        if !(blank && previous_blank) {
            output.push(line);
        }
        previous_blank = blank;
    }
    output.join("\n")
}

fn left_justify(source: &str) -> String {
    let lead = source
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min();
    let Some(lead) = lead else {
        return source.to_string();
    };

    source
        .split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                line
            } else {
                line.get(lead..).unwrap_or_else(|| line.trim_start())
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(feature = "python")]
fn python_extract(source: &str, name: &str) -> Result<String, ListingError> {
    use tree_sitter::{Node, Parser};

    fn node_name<'a>(node: Node, source: &'a str) -> Option<&'a str> {
        match node.kind() {
            "function_definition" | "class_definition" => node
                .child_by_field_name("name")
                .and_then(|name| name.utf8_text(source.as_bytes()).ok()),
            "decorated_definition" => node
                .child_by_field_name("definition")
                .and_then(|definition| node_name(definition, source)),
            _ => None,
        }
    }

    fn assigned_name<'a>(node: Node, source: &'a str) -> Option<&'a str> {
        if node.kind() != "expression_statement" {
            return None;
        }
        let assignment = node.named_child(0).filter(|child| child.kind() == "assignment")?;
        assignment
            .child_by_field_name("left")
            .and_then(|left| left.utf8_text(source.as_bytes()).ok())
    }

    fn body(node: Node) -> Option<Node> {
        match node.kind() {
            "decorated_definition" => node.child_by_field_name("definition").and_then(body),
            _ => node.child_by_field_name("body"),
        }
    }

    fn descend<'t>(parent: Node<'t>, source: &str, parts: &[&str]) -> Option<Node<'t>> {
        let (local, rest) = parts.split_first()?;
        let mut cursor = parent.walk();
        for node in parent.named_children(&mut cursor) {
            if node_name(node, source) == Some(*local) {
                if rest.is_empty() {
                    return Some(node);
                }
                return descend(body(node)?, source, rest);
            }
            if rest.is_empty() && assigned_name(node, source) == Some(*local) {
                return Some(node);
            }
        }
        None
    }

    let mut parser = Parser::new();
    parser
        .set_language(tree_sitter_python::language())
        .map_err(|e| ListingError::Grammar(e.to_string()))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ListingError::Grammar("python parser produced no tree".to_string()))?;

    let parts: Vec<&str> = name.split('.').collect();
    let node = descend(tree.root_node(), source, &parts)
        .ok_or_else(|| ListingError::Filter(format!("'{}' not found in source", name)))?;

    // start at the beginning of the line so indentation stays consistent
    let start = source[..node.start_byte()].rfind('\n').map_or(0, |at| at + 1);
    Ok(format!("{}\n", &source[start..node.end_byte()]))
}

#[cfg(not(feature = "python"))]
fn python_extract(_source: &str, name: &str) -> Result<String, ListingError> {
    Err(ListingError::Grammar(format!(
        "cannot extract '{}': python grammar not compiled in",
        name
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_lines() {
        let source = "1\n2\n3\n4\n5\n6";
        let filter = Filter::RemoveLines(vec![(2, 1), (4, 2)]);
        assert_eq!(filter.apply(source).unwrap(), "1\n3\n6");
        assert_eq!(Filter::remove_lines([1, 6]).apply(source).unwrap(), "2\n3\n4\n5");
        assert!(matches!(
            Filter::RemoveLines(vec![(6, 2)]).apply(source),
            Err(ListingError::Range { .. })
        ));
        assert!(Filter::remove_lines([0]).apply(source).is_err());
        assert!(Filter::RemoveLines(vec![(usize::MAX, 2)]).apply(source).is_err());
    }

    #[test]
    fn test_remove_double_blanks() {
        let source = "a\n\n\n  \nb\n\nc\n";
        assert_eq!(Filter::RemoveDoubleBlanks.apply(source).unwrap(), "a\n\nb\n\nc\n");
        assert_eq!(Filter::RemoveDoubleBlanks.apply("x").unwrap(), "x");
    }

    #[test]
    fn test_left_justify() {
        let source = "    def f():\n        pass\n\n    x = 1";
        assert_eq!(
            Filter::LeftJustify.apply(source).unwrap(),
            "def f():\n    pass\n\nx = 1"
        );
        assert_eq!(Filter::LeftJustify.apply("  \n ").unwrap(), "  \n ");
    }

    #[cfg(feature = "python")]
    #[test]
    fn test_python_extract() {
        let source = "import os\n\nclass Foo:\n    x = 1\n\n    def bar(self):\n        return 2\n\ndef baz():\n    pass\n\nLIMIT = 10\n";
        assert_eq!(
            Filter::PythonExtract("baz".into()).apply(source).unwrap(),
            "def baz():\n    pass\n"
        );
        assert_eq!(
            Filter::PythonExtract("Foo.bar".into()).apply(source).unwrap(),
            "    def bar(self):\n        return 2\n"
        );
        assert_eq!(
            Filter::PythonExtract("Foo.x".into()).apply(source).unwrap(),
            "    x = 1\n"
        );
        assert_eq!(
            Filter::PythonExtract("LIMIT".into()).apply(source).unwrap(),
            "LIMIT = 10\n"
        );
        assert!(matches!(
            Filter::PythonExtract("Missing".into()).apply(source),
            Err(ListingError::Filter(_))
        ));
    }
}
