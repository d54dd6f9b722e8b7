/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for the density module

use thiserror::Error;

/// Errors raised while building or writing a probability density
#[derive(Error, Debug)]
pub enum DensityError {
    #[error("No atomic positions were generated in {0} attempts")]
    NoPointsGenerated(usize),

    #[error("Invalid grid interval: {0}")]
    InvalidInterval(f64),

    #[error("Invalid trajectory: {0}")]
    InvalidTrajectory(String),

    #[error("Invalid volumetric data: {0}")]
    InvalidData(String),

    #[error("Structure error: {0}")]
    Structure(#[from] crate::structure::StructureError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for density operations
pub type Result<T> = std::result::Result<T, DensityError>;
