/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for the evolution module

use thiserror::Error;

/// Errors raised by evolution conditions
#[derive(Error, Debug)]
pub enum EvolutionError {
    #[error("Energy calculation failed: {0:#}")]
    EnergyCalculation(anyhow::Error),
}

/// Result type for evolution operations
pub type Result<T> = std::result::Result<T, EvolutionError>;
