/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! # randomcarbon-rs
//!
//! Analysis utilities for random crystal structure generation.
//!
//! The crate provides two independent groups of procedures:
//!
//! * [`density`]: runs a structure [`Evolver`](evolution::Evolver) many times
//!   and turns the positions of the generated atoms into a probability density
//!   written as volumetric data (CHGCAR layout).
//! * [`symmetry`]: detects space groups, enumerates maximal subgroups,
//!   derives structures belonging to a subgroup and validates them.
//!
//! [`evolution`] holds the generator and condition interfaces, including the
//! energy-threshold condition [`SmallEnergyAtoms`](evolution::SmallEnergyAtoms).

pub mod cli;
pub mod density;
pub mod evolution;
pub mod structure;
pub mod symmetry;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

pub use structure::{Lattice, Site, Structure, SymmOp};
