use std::path::PathBuf;
use thiserror::Error;

/// Filesystem and configuration failures while scanning a project.
///
/// Parse failures and data-source failures are not errors: they are logged
/// and degrade to "no occurrences" or an `Unknown` status.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Path not found: {0}")]
    RootNotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported file type: {0}")]
    UnsupportedFile(PathBuf),

    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_path() {
        let err = ScanError::RootNotFound(PathBuf::from("/no/such/dir"));
        assert_eq!(err.to_string(), "Path not found: /no/such/dir");

        let err = ScanError::UnsupportedFile(PathBuf::from("notes.md"));
        assert!(err.to_string().contains("notes.md"));
    }

    #[test]
    fn test_invalid_pattern_keeps_source() {
        let source = globset::Glob::new("src/[").unwrap_err();
        let err = ScanError::InvalidPattern {
            pattern: "src/[".to_string(),
            source,
        };
        assert!(err.to_string().starts_with("Invalid glob pattern 'src/['"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
