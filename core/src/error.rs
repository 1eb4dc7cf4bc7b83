//! Error types returned by knowledge-loading operations.
//!
//! Analysis itself never fails (see [`crate::analyzer::Analyzer`]); only the
//! load-time operations in [`crate::dict`], [`crate::maxent`] and
//! [`crate::knowledge`] return [`CmaError`].

use std::path::PathBuf;

/// Tagged-union error type for the knowledge-loading surface of the crate.
#[derive(Debug, thiserror::Error)]
pub enum CmaError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt model file {path}: {reason}")]
    CorruptModel { path: PathBuf, reason: String },

    #[error("malformed dictionary line in {path}: {line:?}")]
    BadDictLine { path: PathBuf, line: String },

    #[error("unknown encoding {0:?}; expected gb2312, big5, gb18030 or utf8")]
    UnknownEncoding(String),

    #[error("config error: {0}")]
    ConfigError(String),
}

impl CmaError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CmaError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        CmaError::CorruptModel {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
