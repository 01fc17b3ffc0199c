//! Errors raised at the edges of the viewer: file and config loading,
//! protocol arguments, and hovers that miss the document.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComparatorError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("no document loaded")]
    NoDocument,

    #[error("annotated line {line} out of range (document has {count})")]
    LineOutOfRange { line: usize, count: usize },

    #[error("word {word} out of range on line {line} ({count} words)")]
    WordOutOfRange {
        line: usize,
        word: usize,
        count: usize,
    },

    #[error("bad arguments for `{command}`: {reason}")]
    BadArguments { command: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ComparatorResult<T> = Result<T, ComparatorError>;
