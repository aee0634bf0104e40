use std::path::PathBuf;

use thiserror::Error;

/// Per-file failures surfaced during a category load. The ingest loop
/// applies the configured error policy to these; storage errors are not
/// represented here and always abort the category.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A file or directory name does not encode a valid (year, quarter).
    #[error("invalid period encoding for {category} document {}: {reason}", .path.display())]
    PathFormat {
        category: &'static str,
        path: PathBuf,
        reason: String,
    },

    /// An expected top-level section is missing or has the wrong shape.
    #[error("malformed {category} document {}: {reason}", .path.display())]
    MalformedDocument {
        category: &'static str,
        path: PathBuf,
        reason: String,
    },
}

impl LoadError {
    pub fn path_format(
        category: &'static str,
        path: impl Into<PathBuf>,
        reason: impl Into<String>,
    ) -> Self {
        Self::PathFormat {
            category,
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn malformed(
        category: &'static str,
        path: impl Into<PathBuf>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedDocument {
            category,
            path: path.into(),
            reason: reason.into(),
        }
    }
}
