/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Symmetry-constrained site generation

use rand::Rng;

use crate::structure::{Site, Structure, SymmOp};

/// Distance in Å under which two images of the new atom are merged
pub const ORBIT_MERGE_DISTANCE: f64 = 1e-3;

/// Add a new atom at a random position, together with all its images under `symm_ops`
///
/// The operations act on fractional coordinates; images are wrapped into the
/// unit cell and duplicates (special positions) are merged. The new sites are
/// appended after those of `template`.
pub fn add_new_symmetrized_atom<R: Rng + ?Sized>(
    template: &Structure,
    symm_ops: &[SymmOp],
    species: &str,
    rng: &mut R,
) -> Structure {
    let seed = [rng.gen::<f64>(), rng.gen::<f64>(), rng.gen::<f64>()];
    let orbit = symmetrized_orbit(template, symm_ops, &seed);
    template.with_appended_sites(orbit.into_iter().map(|fc| Site::new(species, fc)))
}

/// Images of `seed` under `symm_ops`, wrapped into [0, 1) and de-duplicated
pub fn symmetrized_orbit(template: &Structure, symm_ops: &[SymmOp], seed: &[f64; 3]) -> Vec<[f64; 3]> {
    let lattice = template.lattice();
    let mut orbit: Vec<[f64; 3]> = Vec::with_capacity(symm_ops.len());

    for op in symm_ops {
        let mut p = op.operate(seed);
        for x in p.iter_mut() {
            *x = x.rem_euclid(1.0);
        }
        if orbit
            .iter()
            .all(|q| lattice.distance(q, &p) > ORBIT_MERGE_DISTANCE)
        {
            orbit.push(p);
        }
    }

    orbit
}
