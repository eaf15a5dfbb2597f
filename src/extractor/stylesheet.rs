use super::{syntax, Collector, FeatureExtractor, SourceKind};
use crate::model::FeatureOccurrence;
use std::path::Path;
use tracing::{debug, warn};
use tree_sitter::{Node, Parser};

/// Extracts selectors, properties, value functions, and at-rules from CSS.
///
/// Three independent passes run over one syntax tree: pseudo selectors,
/// declarations (each followed by the functions in its value), then at-rules.
/// A rule whose selector list does not parse contributes no selector
/// occurrences; its declarations are still visited. A declaration with a
/// malformed value still reports its property but none of its functions.
/// Recovery is per item: stray text between rules never discards the
/// occurrences found elsewhere in the file.
pub struct StylesheetExtractor;

impl FeatureExtractor for StylesheetExtractor {
    fn name(&self) -> &'static str {
        "CSS"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Stylesheet
    }

    fn extensions(&self) -> &[&'static str] {
        &["css", "scss", "less"]
    }

    fn extract(&self, content: &str, path: &Path) -> Vec<FeatureOccurrence> {
        let mut parser = Parser::new();
        if let Err(e) = parser.set_language(&tree_sitter_css::LANGUAGE.into()) {
            warn!(path = %path.display(), error = %e, "Failed to load stylesheet grammar");
            return Vec::new();
        }

        let tree = match parser.parse(content, None) {
            Some(tree) => tree,
            None => {
                warn!(path = %path.display(), "Failed to parse stylesheet");
                return Vec::new();
            }
        };

        let root = tree.root_node();
        if root.is_error() {
            warn!(path = %path.display(), "Stylesheet could not be parsed, skipping");
            return Vec::new();
        }

        let mut collector = Collector::default();
        collect_selectors(root, content, path, &mut collector);
        collect_declarations(root, content, &mut collector);
        collect_at_rules(root, content, &mut collector);
        collector.finish()
    }
}

fn child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find(|c| c.kind() == kind);
    found
}

fn collect_selectors(root: Node<'_>, source: &str, path: &Path, collector: &mut Collector) {
    syntax::walk(root, |node| {
        if node.kind() != "rule_set" {
            return;
        }
        let Some(selectors) = child_of_kind(node, "selectors") else {
            return;
        };
        if selectors.has_error() {
            let (line, _) = syntax::position(selectors);
            debug!(path = %path.display(), line, "Skipping unparsable selector");
            return;
        }

        syntax::walk(selectors, |selector| {
            if !matches!(
                selector.kind(),
                "pseudo_class_selector" | "pseudo_element_selector"
            ) {
                return;
            }
            if let Some((marker, name)) = pseudo_name(selector, source) {
                let (line, column) = syntax::position(marker);
                collector.push(
                    FeatureOccurrence::new(format!("css-pseudo-{}", name))
                        .at(line, column)
                        .with_context(format!("{}{}", syntax::text(marker, source), name)),
                );
            }
        });
    });
}

/// The `:`/`::` token of a pseudo selector and the name that follows it.
fn pseudo_name<'t, 'a>(node: Node<'t>, source: &'a str) -> Option<(Node<'t>, &'a str)> {
    let mut cursor = node.walk();
    let children: Vec<Node<'t>> = node.children(&mut cursor).collect();
    let marker = children
        .iter()
        .position(|c| matches!(c.kind(), ":" | "::"))?;
    let name = children[marker + 1..].iter().find(|c| c.is_named())?;
    let name = syntax::text(*name, source).trim();

    if name.is_empty() {
        None
    } else {
        Some((children[marker], name))
    }
}

fn collect_declarations(root: Node<'_>, source: &str, collector: &mut Collector) {
    syntax::walk(root, |node| {
        if node.kind() != "declaration" {
            return;
        }
        let Some(property) = child_of_kind(node, "property_name") else {
            return;
        };
        let property = syntax::text(property, source).trim();
        if property.is_empty() {
            return;
        }

        let (line, column) = syntax::position(node);
        collector.push(
            FeatureOccurrence::new(format!("css-property-{}", property))
                .at(line, column)
                .with_context(format!("{}: {}", property, declaration_value(node, source))),
        );

        if node.has_error() {
            return;
        }
        syntax::walk(node, |value| {
            if value.kind() != "call_expression" {
                return;
            }
            if let Some(function) = child_of_kind(value, "function_name") {
                let function = syntax::text(function, source);
                let (line, column) = syntax::position(value);
                collector.push(
                    FeatureOccurrence::new(format!("css-function-{}", function))
                        .at(line, column)
                        .with_context(format!("{}()", function)),
                );
            }
        });
    });
}

/// Value text between the `:` and the optional trailing `;`.
fn declaration_value<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    let mut cursor = node.walk();
    let mut start = None;
    let mut end = None;

    for child in node.children(&mut cursor) {
        match child.kind() {
            ":" if start.is_none() => start = Some(child.end_byte()),
            ";" => {}
            _ if start.is_some() => end = Some(child.end_byte()),
            _ => {}
        }
    }

    match (start, end) {
        (Some(start), Some(end)) => source.get(start..end).unwrap_or("").trim(),
        _ => "",
    }
}

fn collect_at_rules(root: Node<'_>, source: &str, collector: &mut Collector) {
    syntax::walk(root, |node| {
        let kind = node.kind();
        if kind != "at_rule" && !kind.ends_with("_statement") {
            return;
        }

        let mut cursor = node.walk();
        let keyword = node.children(&mut cursor).next();
        let Some(name) = keyword.and_then(|k| syntax::text(k, source).strip_prefix('@')) else {
            return;
        };
        if name.is_empty() {
            return;
        }

        let (line, column) = syntax::position(node);
        collector.push(
            FeatureOccurrence::new(format!("css-at-rule-{}", name))
                .at(line, column)
                .with_context(format!("@{}", name)),
        );
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str) -> Vec<FeatureOccurrence> {
        StylesheetExtractor.extract(source, Path::new("style.css"))
    }

    fn ids_with_prefix<'a>(found: &'a [FeatureOccurrence], prefix: &str) -> Vec<&'a str> {
        found
            .iter()
            .map(|o| o.identifier.as_str())
            .filter(|id| id.starts_with(prefix))
            .collect()
    }

    #[test]
    fn test_single_property() {
        let found = extract(".foo { gap: 1rem; }");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].identifier, "css-property-gap");
        assert_eq!((found[0].line, found[0].column), (Some(1), Some(8)));
        assert_eq!(found[0].context.as_deref(), Some("gap: 1rem"));
    }

    #[test]
    fn test_pseudo_selectors_come_first() {
        let found = extract("a:hover, li::marker { color: red; }");
        let ids: Vec<&str> = found.iter().map(|o| o.identifier.as_str()).collect();
        assert_eq!(
            ids,
            vec!["css-pseudo-hover", "css-pseudo-marker", "css-property-color"]
        );
        assert_eq!(found[0].context.as_deref(), Some(":hover"));
        assert_eq!(found[1].context.as_deref(), Some("::marker"));
        assert_eq!(found[0].column, Some(2));
    }

    #[test]
    fn test_functions_follow_their_declaration() {
        let found = extract(".x {\n  width: clamp(1rem, calc(100% - 2rem), 3rem);\n}");
        let ids: Vec<&str> = found.iter().map(|o| o.identifier.as_str()).collect();
        assert_eq!(
            ids,
            vec!["css-property-width", "css-function-clamp", "css-function-calc"]
        );
        assert_eq!(found[1].line, Some(2));
        assert_eq!(found[1].context.as_deref(), Some("clamp()"));
    }

    #[test]
    fn test_at_rules() {
        let source = "@media (min-width: 600px) {\n  .a { display: grid; }\n}\n\
                      @supports (display: grid) {}\n\
                      @font-face { font-family: X; }\n";
        let found = extract(source);

        assert_eq!(
            ids_with_prefix(&found, "css-at-rule-"),
            vec!["css-at-rule-media", "css-at-rule-supports", "css-at-rule-font-face"]
        );
        assert_eq!(
            ids_with_prefix(&found, "css-property-"),
            vec!["css-property-display", "css-property-font-family"]
        );
        let media = found
            .iter()
            .find(|o| o.identifier == "css-at-rule-media")
            .unwrap();
        assert_eq!(media.context.as_deref(), Some("@media"));
        assert_eq!((media.line, media.column), (Some(1), Some(1)));
    }

    #[test]
    fn test_garbage_after_valid_rule_keeps_earlier_matches() {
        let found = extract(".ok:focus-visible { color: red; }\n}}} %%% {");
        let ids: Vec<&str> = found.iter().map(|o| o.identifier.as_str()).collect();
        assert_eq!(ids, vec!["css-pseudo-focus-visible", "css-property-color"]);
    }

    #[test]
    fn test_malformed_value_keeps_property() {
        let found = extract(".a { width: calc(100% - ); }");
        assert_eq!(ids_with_prefix(&found, "css-property-"), vec!["css-property-width"]);
        assert!(ids_with_prefix(&found, "css-function-").is_empty());

        let found = extract(".a { color: red !!; }");
        assert_eq!(ids_with_prefix(&found, "css-property-"), vec!["css-property-color"]);
    }

    #[test]
    fn test_empty_stylesheet() {
        assert!(extract("").is_empty());
        assert!(extract("/* nothing here */").is_empty());
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let source = "main:has(> img) { aspect-ratio: 16 / 9; }\n@container (min-width: 1px) {}";
        assert_eq!(extract(source), extract(source));
    }
}
