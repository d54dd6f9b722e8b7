/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for the structure module

/// Error types for the structure module
#[derive(Debug, thiserror::Error)]
pub enum StructureError {
    #[error("Invalid lattice: {0}")]
    InvalidLattice(String),

    #[error("Site index {index} out of range (structure has {len} sites)")]
    SiteIndex { index: usize, len: usize },

    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type for structure operations
pub type Result<T> = std::result::Result<T, StructureError>;
