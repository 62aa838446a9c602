//! Error types for the configuration store.
//!
//! The store has an intentionally asymmetric failure surface (see the crate
//! docs): mutators and internal I/O helpers return `Result<_, ConfigError>`,
//! while the typed getters degrade every failure to `(default, false)` and
//! `load`/`save`/`reload` report success as a plain `bool` after logging the
//! underlying [`ConfigError`].

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the configuration store and its file codec.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A key string contained more than one `::` separator.
    ///
    /// This is a programmer error, not a runtime data error: mutators fail
    /// hard on it, getters degrade it to a not-found result.
    #[error("invalid key '{0}': at most one '::' separator is allowed")]
    InvalidKey(String),

    /// The configuration file named in a `load` call does not exist.
    #[error("configuration file does not exist: {0}")]
    FileMissing(PathBuf),

    /// The file exists but is not valid INI-style key/value-per-section text.
    #[error("parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// A mandatory section was absent during schema validation.
    #[error("invalid configuration file: missing mandatory section [{0}]")]
    MissingSection(String),

    /// A file system I/O error occurred while reading or writing.
    #[error("I/O error accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `save` was called with no explicit path before any successful `load`.
    #[error("no active configuration file to save to")]
    NoActiveFile,
}
