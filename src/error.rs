use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading or validating a field catalog. Always fatal at startup.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed catalog: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid pattern for `{owner}`: {source}")]
    Pattern {
        owner: String,
        #[source]
        source: regex::Error,
    },

    #[error("duplicate {kind} `{name}`")]
    Duplicate { kind: &'static str, name: String },

    #[error("section name `{0}` is reserved")]
    ReservedSection(String),

    #[error("field `{0}` has no rules")]
    EmptyField(String),

    #[error("field `{0}` uses fixed_override without a fixed_value")]
    MissingFixedValue(String),
}

/// Failures while loading the skills taxonomy. Always fatal at startup.
#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("failed to read taxonomy {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed taxonomy: {0}")]
    Json(#[from] serde_json::Error),

    #[error("taxonomy contains no skills")]
    Empty,
}

/// Failures raised by document readers before the core sees the document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read document {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures while loading the entity-recognition model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed model: {0}")]
    Json(#[from] serde_json::Error),

    #[error("model has no given names")]
    Empty,
}

/// Single opaque failure for one processing request. No partial result accompanies it.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("document has no pages")]
    EmptyDocument,

    #[error("processing failed: {0}")]
    Internal(String),
}
