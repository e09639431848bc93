// src/error.rs

use thiserror::Error;

/// Core error types for Conary dependency handling
#[derive(Error, Debug)]
pub enum Error {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Database initialization error
    #[error("Failed to initialize database: {0}")]
    InitError(String),

    /// Database not found
    #[error("Database not found at path: {0}")]
    DatabaseNotFound(String),

    /// Malformed frozen dependency text, flavor string or dependency string
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Two senses for the same flag cannot be merged
    #[error("Invalid flag combination in merge: {first} and {second}")]
    FlagConflict { first: String, second: String },

    /// A dependency that cannot live in the requested class
    #[error("Invalid dependency: {0}")]
    InvalidDependency(String),

    /// Back edge found while ordering a graph that should be acyclic
    #[error("Cycle detected in graph: {0}")]
    CycleError(String),

    /// Changeset or manifest file could not be decoded
    #[error("Failed to parse manifest: {0}")]
    Manifest(#[from] toml::de::Error),

    /// Requested record does not exist
    #[error("Not found: {0}")]
    NotFoundError(String),
}

/// Result type alias using Conary's Error type
pub type Result<T> = std::result::Result<T, Error>;
