use super::{syntax, Collector, FeatureExtractor, SourceKind};
use crate::model::FeatureOccurrence;
use crate::tables;
use std::path::Path;
use tracing::warn;
use tree_sitter::{Language, Node, Parser};

/// Extracts web API usages from JavaScript and TypeScript, including JSX.
pub struct ScriptExtractor;

impl ScriptExtractor {
    /// Plain `.ts` files use the TypeScript grammar so `<T>expr` assertions
    /// parse; everything else goes through TSX, which also covers JS and JSX.
    fn language_for(path: &Path) -> Language {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("ts") | Some("mts") | Some("cts") => {
                tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
            }
            _ => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

impl FeatureExtractor for ScriptExtractor {
    fn name(&self) -> &'static str {
        "JavaScript/TypeScript"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Script
    }

    fn extensions(&self) -> &[&'static str] {
        &["js", "jsx", "mjs", "cjs", "ts", "tsx", "mts", "cts"]
    }

    fn extract(&self, content: &str, path: &Path) -> Vec<FeatureOccurrence> {
        let mut parser = Parser::new();
        if let Err(e) = parser.set_language(&Self::language_for(path)) {
            warn!(path = %path.display(), error = %e, "Failed to load script grammar");
            return Vec::new();
        }

        let tree = match parser.parse(content, None) {
            Some(tree) => tree,
            None => {
                warn!(path = %path.display(), "Failed to parse script");
                return Vec::new();
            }
        };

        let root = tree.root_node();
        if root.has_error() {
            warn!(path = %path.display(), "Syntax errors in script, skipping");
            return Vec::new();
        }

        let mut collector = Collector::default();
        syntax::walk(root, |node| match node.kind() {
            "member_expression" | "subscript_expression" => {
                visit_member(node, content, &mut collector)
            }
            "call_expression" => visit_call(node, content, &mut collector),
            "new_expression" => visit_new(node, content, &mut collector),
            _ => {}
        });

        collector.finish()
    }
}

/// Dotted path of a member access, e.g. `navigator.clipboard.writeText`.
///
/// Computed or non-identifier properties end the path at the last plain
/// identifier object; anything rooted elsewhere (calls, `this`) has no path.
fn member_path(node: Node<'_>, source: &str) -> Option<String> {
    let object = node.child_by_field_name("object")?;
    let property = node
        .child_by_field_name("property")
        .filter(|p| node.kind() == "member_expression" && p.kind() == "property_identifier");

    match (object.kind(), property) {
        ("identifier", Some(prop)) => Some(format!(
            "{}.{}",
            syntax::text(object, source),
            syntax::text(prop, source)
        )),
        ("member_expression", Some(prop)) => member_path(object, source)
            .map(|path| format!("{}.{}", path, syntax::text(prop, source))),
        ("identifier", None) => Some(syntax::text(object, source).to_string()),
        _ => None,
    }
}

fn callee_name(node: Node<'_>, source: &str) -> Option<String> {
    match node.kind() {
        "identifier" => Some(syntax::text(node, source).to_string()),
        "member_expression" => member_path(node, source),
        _ => None,
    }
}

fn visit_member(node: Node<'_>, source: &str, collector: &mut Collector) {
    let Some(path) = member_path(node, source) else {
        return;
    };
    let (line, column) = syntax::position(node);

    if let Some(rest) = path.strip_prefix("navigator.") {
        collector.push(
            FeatureOccurrence::new(format!("navigator-{}", rest))
                .at(line, column)
                .with_context(path.as_str()),
        );
    }

    if path.starts_with("window.") || tables::is_global_api(&path) {
        let api = path.strip_prefix("window.").unwrap_or(&path);
        collector.push(
            FeatureOccurrence::new(api)
                .at(line, column)
                .with_context(path.as_str()),
        );
    } else if let Some(object) = node
        .child_by_field_name("object")
        .filter(|o| o.kind() == "identifier")
    {
        let name = syntax::text(object, source);
        if tables::is_global_api(name) {
            collector.push(
                FeatureOccurrence::new(name)
                    .at(line, column)
                    .with_context(path.as_str()),
            );
        }
    }
}

fn visit_call(node: Node<'_>, source: &str, collector: &mut Collector) {
    let Some(name) = node
        .child_by_field_name("function")
        .and_then(|callee| callee_name(callee, source))
    else {
        return;
    };
    let name = name.strip_prefix("window.").unwrap_or(&name);

    if tables::is_web_api_call(name) {
        let (line, column) = syntax::position(node);
        collector.push(
            FeatureOccurrence::new(name)
                .at(line, column)
                .with_context(format!("{}()", name)),
        );
    }
}

fn visit_new(node: Node<'_>, source: &str, collector: &mut Collector) {
    let Some(name) = node
        .child_by_field_name("constructor")
        .and_then(|ctor| callee_name(ctor, source))
    else {
        return;
    };

    if tables::is_web_api_constructor(&name) {
        let (line, column) = syntax::position(node);
        collector.push(
            FeatureOccurrence::new(name.to_lowercase())
                .at(line, column)
                .with_context(format!("new {}()", name)),
        );
    }
}
