/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Probability density of atomic positions on a periodic grid

use ndarray::{Array3, ArrayView3};

use super::errors::{DensityError, Result};
use crate::structure::{Lattice, Structure};

/// Spatial probability density of selected species along a trajectory
///
/// The cell is divided in `ceil(|a_i| / interval)` points along each lattice
/// vector. Every position of the selected species in every frame is assigned
/// to its nearest grid point; the counts are normalised so that the grid sums
/// to one.
#[derive(Debug, Clone)]
pub struct ProbabilityDensity {
    structure: Structure,
    interval: f64,
    n_frames: usize,
    pr: Array3<f64>,
}

impl ProbabilityDensity {
    /// Compute the probability density
    ///
    /// # Arguments
    ///
    /// * `structure` - Reference structure; fixes the lattice and the species of each site
    /// * `trajectories` - Fractional coordinates with shape (frames, sites, 3)
    /// * `species` - Species whose positions are counted
    /// * `interval` - Approximate distance between neighbouring grid points in Å
    pub fn new(
        structure: &Structure,
        trajectories: ArrayView3<f64>,
        species: &[&str],
        interval: f64,
    ) -> Result<Self> {
        if !(interval.is_finite() && interval > 0.0) {
            return Err(DensityError::InvalidInterval(interval));
        }

        let (n_frames, n_sites, dim) = trajectories.dim();
        if dim != 3 || n_sites != structure.len() {
            return Err(DensityError::InvalidTrajectory(format!(
                "expected shape (frames, {}, 3), got ({}, {}, {})",
                structure.len(),
                n_frames,
                n_sites,
                dim
            )));
        }
        if n_frames == 0 {
            return Err(DensityError::InvalidTrajectory("no frames".to_string()));
        }

        let indices: Vec<usize> = structure
            .sites()
            .iter()
            .enumerate()
            .filter(|(_, site)| species.contains(&site.species.as_str()))
            .map(|(i, _)| i)
            .collect();
        if indices.is_empty() {
            return Err(DensityError::InvalidTrajectory(format!(
                "none of the species {:?} is present in the structure",
                species
            )));
        }

        let lattice = structure.lattice();
        let shape = grid_shape(lattice, interval);
        let mut counts = Array3::<f64>::zeros(shape);

        for frame in trajectories.outer_iter() {
            for &i in &indices {
                let p = frame.row(i);
                let idx = nearest_grid_point(lattice, shape, &[p[0], p[1], p[2]]);
                counts[idx] += 1.0;
            }
        }

        let total = (n_frames * indices.len()) as f64;
        counts.mapv_inplace(|c| c / total);

        Ok(Self {
            structure: structure.clone(),
            interval,
            n_frames,
            pr: counts,
        })
    }

    /// The probability grid
    pub fn pr(&self) -> &Array3<f64> {
        &self.pr
    }

    /// Consume the estimator and return the probability grid
    pub fn into_pr(self) -> Array3<f64> {
        self.pr
    }

    /// Reference structure used for the grid
    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    /// Grid interval in Å
    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Number of frames analysed
    pub fn n_frames(&self) -> usize {
        self.n_frames
    }
}

/// Number of grid points along each lattice vector
pub fn grid_shape(lattice: &Lattice, interval: f64) -> (usize, usize, usize) {
    let abc = lattice.abc();
    let n = |l: f64| ((l / interval).ceil() as usize).max(1);
    (n(abc[0]), n(abc[1]), n(abc[2]))
}

/// Index of the grid point closest to a fractional position
///
/// Only the eight grid points of the enclosing voxel are considered.
fn nearest_grid_point(lattice: &Lattice, shape: (usize, usize, usize), frac: &[f64; 3]) -> (usize, usize, usize) {
    let dims = [shape.0, shape.1, shape.2];
    let mut base = [0i64; 3];
    let mut wrapped = [0.0; 3];
    for k in 0..3 {
        wrapped[k] = frac[k].rem_euclid(1.0);
        base[k] = (wrapped[k] * dims[k] as f64).floor() as i64;
    }

    let mut best = (f64::INFINITY, [0usize; 3]);
    for corner in 0..8 {
        let mut point = [0.0; 3];
        let mut index = [0usize; 3];
        for k in 0..3 {
            let g = base[k] + ((corner >> k) & 1) as i64;
            let n = dims[k] as i64;
            index[k] = g.rem_euclid(n) as usize;
            point[k] = g as f64 / n as f64;
        }
        let d = lattice.distance(&wrapped, &point);
        if d < best.0 {
            best = (d, index);
        }
    }

    (best.1[0], best.1[1], best.1[2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array3;

    fn single_carbon() -> Structure {
        Structure::from_species(Lattice::cubic(4.0).unwrap(), &["C"], &[[0.0; 3]])
    }

    #[test]
    fn test_grid_shape() {
        let lattice = Lattice::from_parameters(4.0, 4.2, 6.0, 90.0, 90.0, 90.0).unwrap();
        assert_eq!(grid_shape(&lattice, 0.5), (8, 9, 12));
    }

    #[test]
    fn test_nearest_point_wraps() {
        let lattice = Lattice::cubic(4.0).unwrap();
        assert_eq!(nearest_grid_point(&lattice, (8, 8, 8), &[0.99, 0.0, 0.51]), (0, 0, 4));
        assert_eq!(nearest_grid_point(&lattice, (8, 8, 8), &[-0.01, 0.26, 0.0]), (0, 2, 0));
    }

    #[test]
    fn test_probability_normalised() {
        let mut traj = Array3::<f64>::zeros((4, 1, 3));
        traj[[1, 0, 0]] = 0.5;
        traj[[2, 0, 1]] = 0.5;
        traj[[3, 0, 2]] = 0.001;

        let pda = ProbabilityDensity::new(&single_carbon(), traj.view(), &["C"], 0.5).unwrap();
        assert_eq!(pda.pr().dim(), (8, 8, 8));
        assert_relative_eq!(pda.pr().sum(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(pda.pr()[[0, 0, 0]], 0.5, epsilon = 1e-12);
        assert_relative_eq!(pda.pr()[[4, 0, 0]], 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_inputs() {
        let s = single_carbon();
        let traj = Array3::<f64>::zeros((2, 1, 3));
        assert!(ProbabilityDensity::new(&s, traj.view(), &["C"], 0.0).is_err());
        assert!(ProbabilityDensity::new(&s, traj.view(), &["Si"], 0.5).is_err());

        let wrong = Array3::<f64>::zeros((2, 2, 3));
        assert!(ProbabilityDensity::new(&s, wrong.view(), &["C"], 0.5).is_err());
    }
}
