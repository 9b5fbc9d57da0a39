use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading, merging or persisting datasets.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{source_label}:{line}: invalid JSON ({source}): {content}")]
    Parse {
        source_label: String,
        line: usize,
        content: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{source_label}:{line}: expected a JSON object, found {found}")]
    NotAnObject {
        source_label: String,
        line: usize,
        found: &'static str,
    },
    #[error("base dataset {} contains no records", .0.display())]
    EmptyBase(PathBuf),
    #[error("fold of {label} changed the merged key set ({before} keys before, {after} after)")]
    KeySetChanged {
        label: String,
        before: usize,
        after: usize,
    },
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}
