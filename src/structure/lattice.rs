/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Periodic lattice with row basis vectors

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use super::errors::{Result, StructureError};

/// A crystal lattice defined by three basis vectors (rows of `matrix`, in Å)
///
/// Deserialization goes through [`Lattice::new`], so degenerate lattices are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLattice")]
pub struct Lattice {
    matrix: [[f64; 3]; 3],
}

#[derive(Deserialize)]
struct RawLattice {
    matrix: [[f64; 3]; 3],
}

impl TryFrom<RawLattice> for Lattice {
    type Error = StructureError;

    fn try_from(raw: RawLattice) -> Result<Self> {
        Self::new(raw.matrix)
    }
}

impl Lattice {
    /// Create a lattice from its three row vectors
    ///
    /// Fails if the vectors are linearly dependent.
    pub fn new(matrix: [[f64; 3]; 3]) -> Result<Self> {
        let lattice = Self { matrix };
        if lattice.volume() < 1e-10 {
            return Err(StructureError::InvalidLattice(format!(
                "basis vectors are degenerate (volume {:.3e})",
                lattice.volume()
            )));
        }
        Ok(lattice)
    }

    /// Create a cubic lattice with edge `a`
    pub fn cubic(a: f64) -> Result<Self> {
        Self::new([[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]])
    }

    /// Create a lattice from its parameters
    ///
    /// # Arguments
    ///
    /// * `a`, `b`, `c` - Lengths of the basis vectors in Å
    /// * `alpha`, `beta`, `gamma` - Angles between the basis vectors in degrees
    pub fn from_parameters(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Result<Self> {
        let (alpha, beta, gamma) = (alpha.to_radians(), beta.to_radians(), gamma.to_radians());

        let cx = c * beta.cos();
        let cy = c * (alpha.cos() - beta.cos() * gamma.cos()) / gamma.sin();
        let cz_sq = c * c - cx * cx - cy * cy;
        if cz_sq <= 0.0 {
            return Err(StructureError::InvalidLattice(
                "angles do not describe a valid cell".to_string(),
            ));
        }

        Self::new([
            [a, 0.0, 0.0],
            [b * gamma.cos(), b * gamma.sin(), 0.0],
            [cx, cy, cz_sq.sqrt()],
        ])
    }

    /// Row vectors of the lattice
    pub fn rows(&self) -> [[f64; 3]; 3] {
        self.matrix
    }

    /// Lattice as a matrix whose rows are the basis vectors
    pub fn matrix(&self) -> Matrix3<f64> {
        let m = &self.matrix;
        Matrix3::new(
            m[0][0], m[0][1], m[0][2],
            m[1][0], m[1][1], m[1][2],
            m[2][0], m[2][1], m[2][2],
        )
    }

    /// Lengths of the three basis vectors
    pub fn abc(&self) -> [f64; 3] {
        let m = self.matrix();
        [m.row(0).norm(), m.row(1).norm(), m.row(2).norm()]
    }

    /// Angles (alpha, beta, gamma) in degrees
    pub fn angles(&self) -> [f64; 3] {
        let m = self.matrix();
        let angle = |i: usize, j: usize| {
            let (u, v) = (m.row(i), m.row(j));
            (u.dot(&v) / (u.norm() * v.norm())).clamp(-1.0, 1.0).acos().to_degrees()
        };
        [angle(1, 2), angle(0, 2), angle(0, 1)]
    }

    /// Cell volume in Å^3
    pub fn volume(&self) -> f64 {
        self.matrix().determinant().abs()
    }

    /// Convert fractional to cartesian coordinates
    pub fn cartesian(&self, frac: &[f64; 3]) -> [f64; 3] {
        let v = self.matrix().transpose() * Vector3::new(frac[0], frac[1], frac[2]);
        [v.x, v.y, v.z]
    }

    /// Convert cartesian to fractional coordinates
    pub fn fractional(&self, cart: &[f64; 3]) -> [f64; 3] {
        // Volume is checked on construction so the inverse exists
        let inv = self
            .matrix()
            .transpose()
            .try_inverse()
            .unwrap_or_else(Matrix3::zeros);
        let v = inv * Vector3::new(cart[0], cart[1], cart[2]);
        [v.x, v.y, v.z]
    }

    /// Minimum-image cartesian distance between two fractional positions
    ///
    /// The fractional difference is wrapped into [-0.5, 0.5) before conversion,
    /// which is exact for cells that are not strongly skewed.
    pub fn distance(&self, a: &[f64; 3], b: &[f64; 3]) -> f64 {
        let mut d = [0.0; 3];
        for k in 0..3 {
            let delta = a[k] - b[k];
            d[k] = delta - delta.round();
        }
        let c = self.cartesian(&d);
        (c[0] * c[0] + c[1] * c[1] + c[2] * c[2]).sqrt()
    }
}
