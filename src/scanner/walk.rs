use crate::error::ScanError;
use crate::extractor::SourceKind;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Include/exclude glob sets, matched against paths relative to the root.
pub(crate) struct PathFilter {
    include: GlobSet,
    exclude: GlobSet,
}

impl PathFilter {
    pub(crate) fn new(include: &[String], exclude: &[String]) -> Result<Self, ScanError> {
        Ok(Self {
            include: build_set(include)?,
            exclude: build_set(exclude)?,
        })
    }

    /// A directory is pruned when the exclude set matches it or anything
    /// directly inside it, so `**/node_modules/**` skips the whole tree.
    fn excludes_dir(&self, rel: &Path) -> bool {
        self.exclude.is_match(rel) || self.exclude.is_match(rel.join("*"))
    }

    fn accepts_file(&self, rel: &Path) -> bool {
        self.include.is_match(rel) && !self.exclude.is_match(rel)
    }
}

fn build_set(patterns: &[String]) -> Result<GlobSet, ScanError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| ScanError::InvalidPattern {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| ScanError::InvalidPattern {
        pattern: patterns.join(", "),
        source,
    })
}

/// Files under `root` accepted by `filter` that some extractor handles,
/// deduplicated and in sorted order.
pub(crate) fn enumerate(root: &Path, filter: &PathFilter) -> Result<Vec<PathBuf>, ScanError> {
    let relative = |path: &Path| path.strip_prefix(root).unwrap_or(path).to_path_buf();

    let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
        entry.depth() == 0
            || !entry.file_type().is_dir()
            || !filter.excludes_dir(&relative(entry.path()))
    });

    let mut files = BTreeSet::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(ScanError::Walk(e)),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if !filter.accepts_file(&relative(path)) {
            continue;
        }
        if SourceKind::from_path(path).is_none() {
            debug!(path = %path.display(), "No extractor for file, skipping");
            continue;
        }
        files.insert(path.to_path_buf());
    }

    Ok(files.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::ScanOptions;
    use std::fs;
    use tempfile::tempdir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn default_filter() -> PathFilter {
        let options = ScanOptions::default();
        PathFilter::new(&options.include_patterns, &options.exclude_patterns).unwrap()
    }

    fn names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_default_patterns() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "src/app.ts");
        touch(dir.path(), "src/style.scss");
        touch(dir.path(), "index.html");
        touch(dir.path(), "README.md");
        touch(dir.path(), "node_modules/pkg/index.js");
        touch(dir.path(), "packages/a/node_modules/dep/x.js");
        touch(dir.path(), "dist/bundle.js");
        touch(dir.path(), ".git/hooks/pre-commit.js");

        let files = enumerate(dir.path(), &default_filter()).unwrap();
        assert_eq!(
            names(dir.path(), &files),
            vec!["index.html", "src/app.ts", "src/style.scss"]
        );
    }

    #[test]
    fn test_custom_include() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "src/app.js");
        touch(dir.path(), "src/theme.css");

        let filter = PathFilter::new(&["**/*.css".to_string()], &[]).unwrap();
        let files = enumerate(dir.path(), &filter).unwrap();
        assert_eq!(names(dir.path(), &files), vec!["src/theme.css"]);
    }

    #[test]
    fn test_included_but_unsupported_files_are_dropped() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "notes.md");
        touch(dir.path(), "a.js");

        let filter = PathFilter::new(&["**/*".to_string()], &[]).unwrap();
        let files = enumerate(dir.path(), &filter).unwrap();
        assert_eq!(names(dir.path(), &files), vec!["a.js"]);
    }

    #[test]
    fn test_excluded_directory_is_pruned() {
        let filter = default_filter();
        assert!(filter.excludes_dir(Path::new("node_modules")));
        assert!(filter.excludes_dir(Path::new("web/build")));
        assert!(!filter.excludes_dir(Path::new("src")));
    }

    #[test]
    fn test_invalid_pattern() {
        let result = PathFilter::new(&["src/[".to_string()], &[]);
        assert!(matches!(result, Err(ScanError::InvalidPattern { .. })));
    }
}
