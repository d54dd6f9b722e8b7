/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Symmetry operations acting on fractional coordinates

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// An affine symmetry operation `x' = R x + t` in fractional coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SymmOp {
    /// Rotation part (rows)
    pub rotation: [[f64; 3]; 3],
    /// Translation part
    pub translation: [f64; 3],
}

impl SymmOp {
    /// Create a new operation from its rotation and translation
    pub fn new(rotation: [[f64; 3]; 3], translation: [f64; 3]) -> Self {
        Self { rotation, translation }
    }

    /// The identity operation
    pub fn identity() -> Self {
        Self::new([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]], [0.0; 3])
    }

    /// Build an operation from an integer rotation matrix and a translation vector
    pub fn from_matrices(rotation: &Matrix3<i32>, translation: &Vector3<f64>) -> Self {
        let mut rot = [[0.0; 3]; 3];
        for (i, row) in rot.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                *value = rotation[(i, j)] as f64;
            }
        }
        Self::new(rot, [translation.x, translation.y, translation.z])
    }

    /// Apply the operation to a fractional position
    pub fn operate(&self, frac: &[f64; 3]) -> [f64; 3] {
        let mut out = self.translation;
        for (i, value) in out.iter_mut().enumerate() {
            for j in 0..3 {
                *value += self.rotation[i][j] * frac[j];
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity() {
        let p = [0.1, 0.2, 0.3];
        assert_eq!(SymmOp::identity().operate(&p), p);
    }

    #[test]
    fn test_inversion_with_translation() {
        let rotation = Matrix3::new(-1, 0, 0, 0, -1, 0, 0, 0, -1);
        let op = SymmOp::from_matrices(&rotation, &Vector3::new(0.5, 0.0, 0.0));
        let q = op.operate(&[0.1, 0.2, 0.3]);
        assert_relative_eq!(q[0], 0.4, epsilon = 1e-12);
        assert_relative_eq!(q[1], -0.2, epsilon = 1e-12);
        assert_relative_eq!(q[2], -0.3, epsilon = 1e-12);
    }
}
