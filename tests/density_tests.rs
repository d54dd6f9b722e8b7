/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Tests for the generation density analysis

use approx::assert_relative_eq;
use indicatif::ProgressBar;
use randomcarbon_rs::density::{
    collect_generated_coords, distribution_density, DensityConfig, DensityError, Profiler,
};
use randomcarbon_rs::evolution::Evolver;
use randomcarbon_rs::structure::{Lattice, Site, Structure};

/// Adds one carbon atom per call, cycling through a fixed list of positions
struct OneAtomEvolver {
    positions: Vec<[f64; 3]>,
    calls: usize,
    template: Structure,
}

impl OneAtomEvolver {
    fn new(template: Structure) -> Self {
        Self {
            positions: vec![[0.1, 0.1, 0.1], [0.5, 0.5, 0.5], [0.25, 0.75, 0.0]],
            calls: 0,
            template,
        }
    }
}

impl Evolver for OneAtomEvolver {
    fn evolve(&mut self, structure: Option<&Structure>) -> anyhow::Result<Vec<Structure>> {
        let base = structure.unwrap_or(&self.template);
        let p = self.positions[self.calls % self.positions.len()];
        self.calls += 1;
        Ok(vec![base.with_appended_sites(vec![Site::new("C", p)])])
    }
}

/// Fails on every third call and returns nothing on every fourth
struct FlakyEvolver {
    inner: OneAtomEvolver,
    calls: usize,
}

impl Evolver for FlakyEvolver {
    fn evolve(&mut self, structure: Option<&Structure>) -> anyhow::Result<Vec<Structure>> {
        self.calls += 1;
        if self.calls % 3 == 0 {
            anyhow::bail!("generation failed at call {}", self.calls);
        }
        if self.calls % 4 == 0 {
            return Ok(Vec::new());
        }
        self.inner.evolve(structure)
    }
}

struct FailingEvolver;

impl Evolver for FailingEvolver {
    fn evolve(&mut self, _structure: Option<&Structure>) -> anyhow::Result<Vec<Structure>> {
        anyhow::bail!("always fails")
    }
}

fn template() -> Structure {
    Structure::from_species(Lattice::cubic(4.0).unwrap(), &["C", "C"], &[[0.0; 3], [0.5, 0.0, 0.0]])
}

fn config_without_file(n_generated: usize) -> DensityConfig {
    DensityConfig {
        n_generated,
        filepath: None,
        ..DensityConfig::default()
    }
}

#[test]
fn test_one_new_atom_per_call() {
    let current = template();
    let mut evolver = OneAtomEvolver::new(template());

    for n in [0, 1, 7, 25] {
        let coords = collect_generated_coords(&mut evolver, Some(&current), n, None, &ProgressBar::hidden());
        assert_eq!(coords.len(), n);
    }
}

#[test]
fn test_only_new_atoms_are_collected() {
    let current = template();
    let mut evolver = OneAtomEvolver::new(template());
    let coords = collect_generated_coords(&mut evolver, Some(&current), 3, None, &ProgressBar::hidden());
    assert_eq!(coords, vec![[0.1, 0.1, 0.1], [0.5, 0.5, 0.5], [0.25, 0.75, 0.0]]);
}

#[test]
fn test_all_atoms_collected_without_current() {
    let mut evolver = OneAtomEvolver::new(template());
    let coords = collect_generated_coords(&mut evolver, None, 4, None, &ProgressBar::hidden());
    // Two template atoms plus the new one for each call
    assert_eq!(coords.len(), 12);
}

#[test]
fn test_failed_attempts_are_skipped() {
    let current = template();
    let mut evolver = FlakyEvolver {
        inner: OneAtomEvolver::new(template()),
        calls: 0,
    };
    let coords = collect_generated_coords(&mut evolver, Some(&current), 12, None, &ProgressBar::hidden());
    // Calls 3, 6, 9, 12 fail; calls 4 and 8 return nothing
    assert_eq!(coords.len(), 6);
}

#[test]
fn test_density_is_normalised() {
    let current = template();
    let mut evolver = OneAtomEvolver::new(template());
    let data = distribution_density(&mut evolver, &current, Some(&current), &config_without_file(30)).unwrap();

    let grid = data.grid("total").unwrap();
    assert_eq!(grid.dim(), (8, 8, 8));
    assert_relative_eq!(grid.sum(), 1.0, epsilon = 1e-12);
    assert_relative_eq!(grid[[4, 4, 4]], 1.0 / 3.0, epsilon = 1e-12);
    assert_eq!(data.structure(), &current);
}

#[test]
fn test_template_used_without_current() {
    let template = template();
    let mut evolver = OneAtomEvolver::new(template.clone());
    let data = distribution_density(&mut evolver, &template, None, &config_without_file(5)).unwrap();
    assert_eq!(data.structure(), &template);
}

#[test]
fn test_density_written_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("CHGCAR");
    let config = DensityConfig {
        n_generated: 10,
        interval: 1.0,
        filepath: Some(path.clone()),
        profile: true,
        ..DensityConfig::default()
    };

    let current = template();
    let mut evolver = OneAtomEvolver::new(template());
    distribution_density(&mut evolver, &current, Some(&current), &config).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "C2");
    assert_eq!(lines[6], "2");
    assert_eq!(lines[10], "");
    assert_eq!(lines[11].split_whitespace().collect::<Vec<_>>(), vec!["4", "4", "4"]);
    // 64 values, five per line
    assert_eq!(lines.len(), 12 + 13);
}

#[test]
fn test_no_points_is_an_error() {
    let current = template();
    let result = distribution_density(&mut FailingEvolver, &current, Some(&current), &config_without_file(5));
    assert!(matches!(result, Err(DensityError::NoPointsGenerated(5))));
}

#[test]
fn test_profiler_counts_calls() {
    let current = template();
    let mut evolver = FlakyEvolver {
        inner: OneAtomEvolver::new(template()),
        calls: 0,
    };
    let mut profiler = Profiler::new();
    collect_generated_coords(&mut evolver, Some(&current), 8, Some(&mut profiler), &ProgressBar::hidden());

    assert_eq!(profiler.section("evolve").unwrap().calls, 8);
    // Calls 3 and 6 fail, call 4 and 8 return nothing
    assert_eq!(profiler.section("collect").unwrap().calls, 4);
}

#[test]
fn test_progress_advances_once_per_attempt() {
    let current = template();
    let mut evolver = FlakyEvolver {
        inner: OneAtomEvolver::new(template()),
        calls: 0,
    };
    let progress = ProgressBar::hidden();
    collect_generated_coords(&mut evolver, Some(&current), 9, None, &progress);
    // Failed and empty attempts count as well
    assert_eq!(progress.position(), 9);
}

#[test]
fn test_density_with_progress_enabled() {
    let current = template();
    let mut evolver = OneAtomEvolver::new(template());
    let config = DensityConfig {
        progress: true,
        ..config_without_file(6)
    };
    let data = distribution_density(&mut evolver, &current, Some(&current), &config).unwrap();
    assert_relative_eq!(data.grid("total").unwrap().sum(), 1.0, epsilon = 1e-12);
}
