//! Error types for ingestion, store I/O, templates and configuration.
//!
//! The ordering engine itself is total: cyclic dependencies, empty trees and
//! references to unknown nodes are ordinary data. Only the boundaries that
//! touch text or the filesystem can fail.

use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Ingestion
// ---------------------------------------------------------------------------

/// Errors raised while turning raw edge input into a [`crate::ModuleGraph`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestError {
    /// An entry whose endpoints are not usable path strings.
    #[error("malformed edge at entry {entry}: {reason}")]
    MalformedInput { entry: usize, reason: String },

    /// The JSON document is not an array of edges.
    #[error("expected a JSON array of edges, got {0}")]
    NotAnArray(String),
}

impl IngestError {
    pub(crate) fn malformed(entry: usize, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            entry,
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Errors returned by [`crate::store`] reads and writes.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// File I/O error.
    #[error("failed to access store file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON.
    #[error("store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The store was written by a different version.
    #[error("store version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: String, found: String },

    /// Structurally invalid store document.
    #[error("invalid store format: {0}")]
    InvalidFormat(String),
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Errors returned while parsing a line template.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("template token pattern failed to compile: {0}")]
    Pattern(String),

    #[error("field width in `{token}` exceeds the maximum of {max}")]
    Width { token: String, max: usize },
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Errors returned while loading `.literatura.toml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
