/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Generation density analysis
//!
//! This module runs an [`Evolver`](crate::evolution::Evolver) many times on the
//! same starting structure, collects the positions of the atoms it adds and
//! turns them into a probability density written in the CHGCAR layout, so
//! that the regions where atoms are generated can be inspected with any
//! volumetric data viewer.

mod aggregator;
mod chgcar;
pub mod errors;
mod estimator;
mod profile;

pub use aggregator::{collect_generated_coords, distribution_density, DensityConfig};
pub use chgcar::{fortran_scientific, VolumetricData};
pub use errors::{DensityError, Result};
pub use estimator::{grid_shape, ProbabilityDensity};
pub use profile::{Profiler, SectionStats};
