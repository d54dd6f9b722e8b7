/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Crystal structure module
//!
//! This module provides the lattice, site and structure types shared by the
//! density and symmetry utilities, together with the affine symmetry
//! operations that act on fractional coordinates.

pub mod errors;
pub mod lattice;
pub mod operations;
#[allow(clippy::module_inception)]
pub mod structure;

pub use errors::{Result, StructureError};
pub use lattice::Lattice;
pub use operations::SymmOp;
pub use structure::{Site, Structure};
