//! Error types for trellis operations.
//!
//! Unresolved signatures are never errors: gaps in instrumentation coverage
//! are expected and simply leave edges out of the graph. Errors here are
//! either typed query outcomes ([`Error::FeatureNotFound`],
//! [`Error::AmbiguousSignatureOwner`]) or failures of the surrounding stores
//! and configuration.

use crate::domain::FeatureId;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The error type for trellis operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON decoding or encoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Storage error.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// No feature with this title exists in the given product and version.
    #[error("Feature not found: '{title}' in {product}@{version}")]
    FeatureNotFound {
        /// Product searched
        product: String,
        /// Feature title searched
        title: String,
        /// Version searched
        version: String,
    },

    /// Two features declare the same direct invocation signature and the
    /// configured policy rejects such conflicts.
    #[error("Signature '{signature}' is declared by both {first} and {second}")]
    AmbiguousSignatureOwner {
        /// The contested signature
        signature: String,
        /// Feature registered first
        first: FeatureId,
        /// Feature that declared the signature again
        second: FeatureId,
    },
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No `.trellis/` directory in the working directory or its parents.
    #[error("Not a trellis repository (or any of the parent directories). Run 'trellis init' first.")]
    NotInitialized,

    /// `trellis init` ran where a repository already exists.
    #[error("Trellis is already initialized here. Found existing '{}'", .0.display())]
    AlreadyInitialized(PathBuf),

    /// The configuration file could not be parsed or written.
    #[error("Invalid configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing a JSONL data file failed.
    #[error("Data file error: {0}")]
    Jsonl(#[from] trellis_jsonl::Error),

    /// A record was rejected on insert.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

/// A specialized Result type for trellis operations.
pub type Result<T> = std::result::Result<T, Error>;
