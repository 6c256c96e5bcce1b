//! Common error types for mtree

use thiserror::Error;

use crate::tree::TreeError;

/// Common result type for mtree operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the mtree pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error (wraps serde_json::Error)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML config parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested file or directory not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Input document failed schema checks
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Tree construction fault
    #[error("Tree build error: {0}")]
    Tree(#[from] TreeError),
}
