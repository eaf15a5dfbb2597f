//! Feature extractors.
//!
//! This module provides the [`FeatureExtractor`] trait and one implementation
//! per kind of source file. Each extractor turns raw file text into an
//! unordered list of [`FeatureOccurrence`]s.
//!
//! # Available Extractors
//!
//! | Extractor | Kind | Extensions |
//! |-----------|------|------------|
//! | [`ScriptExtractor`] | JavaScript / TypeScript | js, jsx, mjs, cjs, ts, tsx, mts, cts |
//! | [`StylesheetExtractor`] | CSS | css, scss, less |
//! | [`MarkupExtractor`] | HTML | html, htm |
//!
//! Extractors never fail: text that cannot be parsed yields no occurrences
//! and a logged warning.
//!
//! # Example
//!
//! ```
//! use codesense::extractor::extractor_for;
//! use std::path::Path;
//!
//! let path = Path::new("app.js");
//! let extractor = extractor_for(path).unwrap();
//! let found = extractor.extract("fetch('/api');", path);
//!
//! assert_eq!(found[0].identifier, "fetch");
//! ```

mod markup;
mod script;
mod stylesheet;

pub use markup::MarkupExtractor;
pub use script::ScriptExtractor;
pub use stylesheet::StylesheetExtractor;

use crate::model::FeatureOccurrence;
use std::collections::HashSet;
use std::path::Path;

/// The kind of source a file holds, decided by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Script,
    Stylesheet,
    Markup,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        all_extractors()
            .into_iter()
            .find(|e| e.extensions().contains(&ext.as_str()))
            .map(|e| e.kind())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Script => "script",
            SourceKind::Stylesheet => "stylesheet",
            SourceKind::Markup => "markup",
        }
    }
}

/// Trait for extracting candidate web API usages from one kind of source.
pub trait FeatureExtractor: Send + Sync {
    /// Returns the human-readable name of this extractor.
    fn name(&self) -> &'static str;

    /// Returns the source kind this extractor handles.
    fn kind(&self) -> SourceKind;

    /// Returns the lower-case file extensions this extractor handles.
    fn extensions(&self) -> &[&'static str];

    /// Extracts feature occurrences from `content`.
    ///
    /// `path` is used for grammar selection and diagnostics only. The same
    /// content always yields the same occurrences in the same order.
    fn extract(&self, content: &str, path: &Path) -> Vec<FeatureOccurrence>;
}

/// Returns every available extractor.
pub fn all_extractors() -> Vec<Box<dyn FeatureExtractor>> {
    vec![
        Box::new(ScriptExtractor),
        Box::new(StylesheetExtractor),
        Box::new(MarkupExtractor),
    ]
}

/// Returns the extractor for a source kind.
pub fn get_extractor(kind: SourceKind) -> Box<dyn FeatureExtractor> {
    match kind {
        SourceKind::Script => Box::new(ScriptExtractor),
        SourceKind::Stylesheet => Box::new(StylesheetExtractor),
        SourceKind::Markup => Box::new(MarkupExtractor),
    }
}

/// Returns the extractor matching the file's extension, if any.
pub fn extractor_for(path: &Path) -> Option<Box<dyn FeatureExtractor>> {
    SourceKind::from_path(path).map(get_extractor)
}

/// Accumulates occurrences for one extraction pass, dropping repeats of the
/// same (identifier, line, column).
#[derive(Default)]
pub(crate) struct Collector {
    seen: HashSet<(String, Option<usize>, Option<usize>)>,
    found: Vec<FeatureOccurrence>,
}

impl Collector {
    pub(crate) fn push(&mut self, occurrence: FeatureOccurrence) {
        let key = (
            occurrence.identifier.clone(),
            occurrence.line,
            occurrence.column,
        );
        if self.seen.insert(key) {
            self.found.push(occurrence);
        }
    }

    pub(crate) fn finish(self) -> Vec<FeatureOccurrence> {
        self.found
    }
}

/// Helpers for the tree-sitter based extractors.
pub(crate) mod syntax {
    use tree_sitter::Node;

    /// Source text covered by `node`.
    pub fn text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
        source.get(node.byte_range()).unwrap_or("")
    }

    /// 1-based (line, column) of the node start.
    pub fn position(node: Node<'_>) -> (usize, usize) {
        let point = node.start_position();
        (point.row + 1, point.column + 1)
    }

    /// Visits `root` and its descendants in pre-order.
    pub fn walk<'t>(root: Node<'t>, mut visit: impl FnMut(Node<'t>)) {
        let mut cursor = root.walk();
        loop {
            visit(cursor.node());
            if cursor.goto_first_child() {
                continue;
            }
            loop {
                if cursor.node() == root {
                    return;
                }
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    return;
                }
            }
        }
    }
}
