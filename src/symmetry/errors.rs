/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for the symmetry module

use thiserror::Error;

/// Errors raised while detecting, enumerating or deriving space groups
#[derive(Error, Debug)]
pub enum SymmetryError {
    #[error("Invalid precondition: {0}")]
    InvalidPrecondition(String),

    #[error("Detected space group {detected}, expected {expected}. Try to tune the value of symprec")]
    DetectionMismatch { detected: u32, expected: u32 },

    #[error("Could not find a value of symprec that matches the space group {0}")]
    ExhaustedSearch(u32),

    #[error("Primitive standard structure belongs to space group {detected}, expected {expected}")]
    PrimitiveMismatch { detected: u32, expected: u32 },

    #[error("Invalid subgroup relation type '{0}': should be either 't' or 'k'")]
    InvalidRelationType(String),

    #[error("Invalid space group number: {0}")]
    InvalidSpaceGroup(u32),

    #[error("Symmetry detection failed: {0}")]
    DetectionFailed(String),

    #[error("Subgroup generation failed: {0}")]
    GenerationFailed(String),

    #[error("Structure error: {0}")]
    Structure(#[from] crate::structure::StructureError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type for symmetry operations
pub type Result<T> = std::result::Result<T, SymmetryError>;
