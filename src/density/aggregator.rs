/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Distribution of the atoms generated by an evolver

use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};
use ndarray::Array3;
use serde::{Deserialize, Serialize};

use super::chgcar::VolumetricData;
use super::errors::{DensityError, Result};
use super::estimator::ProbabilityDensity;
use super::profile::Profiler;
use crate::evolution::Evolver;
use crate::structure::Structure;

/// Configuration for [`distribution_density`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityConfig {
    /// Number of times the evolver is called
    pub n_generated: usize,
    /// Distance between neighbouring grid points in Å
    pub interval: f64,
    /// Where the CHGCAR is written. Nothing is written if None
    pub filepath: Option<PathBuf>,
    /// Log call counts and timings of the generation loop at INFO level
    pub profile: bool,
    /// Show a progress bar over the attempts on stderr
    pub progress: bool,
    /// Species label used for the generated points
    pub species: String,
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            n_generated: 300,
            interval: 0.5,
            filepath: Some(PathBuf::from("CHGCAR")),
            profile: false,
            progress: false,
            species: "C".to_string(),
        }
    }
}

/// Call the evolver `n_generated` times and collect the fractional
/// coordinates of the atoms it adds
///
/// When `current` is given only the sites past `current.len()` are collected,
/// otherwise every site of the generated structures. Failed attempts and
/// attempts returning nothing are logged and skipped. `progress` advances by
/// one per attempt.
pub fn collect_generated_coords<E: Evolver + ?Sized>(
    evolver: &mut E,
    current: Option<&Structure>,
    n_generated: usize,
    mut profiler: Option<&mut Profiler>,
    progress: &ProgressBar,
) -> Vec<[f64; 3]> {
    let prefix = current.map_or(0, Structure::len);
    let mut fcoords = Vec::new();

    for i in 0..n_generated {
        log::debug!("generation {}/{}", i + 1, n_generated);

        let result = match profiler.as_deref_mut() {
            Some(p) => p.time("evolve", || evolver.evolve(current)),
            None => evolver.evolve(current),
        };

        match result {
            Ok(structures) if structures.is_empty() => {
                log::warn!("at iteration {} no structure was generated", i);
            }
            Ok(structures) => {
                let mut collect = || {
                    for s in &structures {
                        fcoords.extend(s.sites().iter().skip(prefix).map(|site| site.frac_coords));
                    }
                };
                match profiler.as_deref_mut() {
                    Some(p) => p.time("collect", collect),
                    None => collect(),
                }
            }
            Err(e) => {
                log::error!("error {}: {:?}", i, e);
            }
        }
        progress.inc(1);
    }

    fcoords
}

/// Use the evolver to generate many new atoms starting from the same structure
/// and compute the probability distribution of the generated atoms
///
/// Useful to inspect where the atoms are being generated. The returned data
/// uses `current` as its structure if given, otherwise `template`.
///
/// # Arguments
///
/// * `evolver` - Generator of new structures; new atoms must be the last sites
/// * `template` - Template structure; its lattice defines the density grid
/// * `current` - Structure to which the new atoms are added. If None new structures are generated from scratch
/// * `config` - Number of attempts, grid interval, output path and profiling
///
/// # Errors
///
/// [`DensityError::NoPointsGenerated`] if no attempt produced an atom.
pub fn distribution_density<E: Evolver + ?Sized>(
    evolver: &mut E,
    template: &Structure,
    current: Option<&Structure>,
    config: &DensityConfig,
) -> Result<VolumetricData> {
    let mut profiler = config.profile.then(Profiler::new);

    let progress = generation_progress(config);
    let fcoords = collect_generated_coords(evolver, current, config.n_generated, profiler.as_mut(), &progress);
    progress.finish_and_clear();

    if let Some(profiler) = &profiler {
        log::info!("{}", profiler.report());
    }

    if fcoords.is_empty() {
        return Err(DensityError::NoPointsGenerated(config.n_generated));
    }
    log::info!(
        "collected {} positions in {} attempts",
        fcoords.len(),
        config.n_generated
    );

    // Each generated atom is one frame of a single-atom trajectory
    let n_frames = fcoords.len();
    let flat: Vec<f64> = fcoords.iter().flatten().copied().collect();
    let trajectory = Array3::from_shape_vec((n_frames, 1, 3), flat)
        .map_err(|e| DensityError::InvalidTrajectory(e.to_string()))?;

    let species = config.species.as_str();
    let placeholder = Structure::from_species(*template.lattice(), &[species], &fcoords[..1]);
    let pda = ProbabilityDensity::new(&placeholder, trajectory.view(), &[species], config.interval)?;

    let base = current.unwrap_or(template).clone();
    let data = VolumetricData::total(base, pda.into_pr());

    if let Some(path) = &config.filepath {
        data.write_file(path)?;
        log::info!("probability density written to {}", path.display());
    }

    Ok(data)
}

fn generation_progress(config: &DensityConfig) -> ProgressBar {
    if !config.progress {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(config.n_generated as u64);
    match ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} [{elapsed_precise}<{eta_precise}]") {
        Ok(style) => bar.with_style(style),
        Err(e) => {
            log::debug!("default progress style: {}", e);
            bar
        }
    }
}
