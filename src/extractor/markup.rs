use super::{Collector, FeatureExtractor, SourceKind};
use crate::model::FeatureOccurrence;
use crate::tables;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::warn;

static RE_OPEN_TAG: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"<(\w+)(?:\s[^>]*)?>").ok());

static RE_ATTRIBUTE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"([\w-]+)(?:=(?:["'][^"']*["']|[^>\s]+))?"#).ok());

/// Line-oriented scan of HTML for modern elements and attributes.
///
/// No DOM is built, so markup inside comments or text that merely looks
/// like an attribute is reported too.
pub struct MarkupExtractor;

impl FeatureExtractor for MarkupExtractor {
    fn name(&self) -> &'static str {
        "HTML"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Markup
    }

    fn extensions(&self) -> &[&'static str] {
        &["html", "htm"]
    }

    fn extract(&self, content: &str, path: &Path) -> Vec<FeatureOccurrence> {
        let (Some(open_tag), Some(attribute)) = (RE_OPEN_TAG.as_ref(), RE_ATTRIBUTE.as_ref())
        else {
            warn!(path = %path.display(), "Markup patterns unavailable");
            return Vec::new();
        };

        let mut collector = Collector::default();

        for (index, line) in content.lines().enumerate() {
            for caps in open_tag.captures_iter(line) {
                let (Some(whole), Some(tag)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                let tag = tag.as_str().to_lowercase();
                if tables::is_modern_element(&tag) {
                    collector.push(
                        FeatureOccurrence::new(format!("html-element-{}", tag))
                            .at(index + 1, whole.start() + 1)
                            .with_context(whole.as_str()),
                    );
                }
            }
        }

        for (index, line) in content.lines().enumerate() {
            for caps in attribute.captures_iter(line) {
                let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                let name = name.as_str().to_lowercase();
                if tables::is_modern_attribute(&name) {
                    collector.push(
                        FeatureOccurrence::new(format!("html-attribute-{}", name))
                            .at(index + 1, whole.start() + 1)
                            .with_context(whole.as_str()),
                    );
                }
            }
        }

        collector.finish()
    }
}
