/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Volumetric data in the VASP CHGCAR layout

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use ndarray::Array3;

use super::errors::{DensityError, Result};
use crate::structure::Structure;

/// Number of grid values written per line
const VALUES_PER_LINE: usize = 5;

/// A structure with one or more labelled 3D grids
///
/// The grids are written as they are, so values are expected to follow the
/// CHGCAR convention of the consumer (VASP stores `rho * V`).
#[derive(Debug, Clone)]
pub struct VolumetricData {
    structure: Structure,
    data: BTreeMap<String, Array3<f64>>,
}

impl VolumetricData {
    /// Create volumetric data from a structure and labelled grids of identical shape
    pub fn new(structure: Structure, data: BTreeMap<String, Array3<f64>>) -> Result<Self> {
        let mut shapes = data.values().map(|grid| grid.dim());
        if let Some(first) = shapes.next() {
            if shapes.any(|shape| shape != first) {
                return Err(DensityError::InvalidData(
                    "all grids must have the same shape".to_string(),
                ));
            }
        } else {
            return Err(DensityError::InvalidData("no grid given".to_string()));
        }
        Ok(Self { structure, data })
    }

    /// Create volumetric data with a single grid labelled "total"
    pub fn total(structure: Structure, grid: Array3<f64>) -> Self {
        let mut data = BTreeMap::new();
        data.insert("total".to_string(), grid);
        Self { structure, data }
    }

    /// Structure the grids refer to
    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    /// Grid with the given label
    pub fn grid(&self, label: &str) -> Option<&Array3<f64>> {
        self.data.get(label)
    }

    /// Labels of the stored grids
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    /// Write the data to `path`
    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Write the data in CHGCAR format
    ///
    /// The "total" grid comes first, followed by the others in label order.
    pub fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        write_poscar(w, &self.structure)?;

        let ordered = self
            .data
            .get("total")
            .into_iter()
            .chain(self.data.iter().filter(|(k, _)| k.as_str() != "total").map(|(_, v)| v));

        for grid in ordered {
            write_grid(w, grid)?;
        }
        Ok(())
    }
}

fn write_poscar<W: Write>(w: &mut W, structure: &Structure) -> Result<()> {
    // Consecutive sites of the same species form one block
    let mut blocks: Vec<(&str, usize)> = Vec::new();
    for species in structure.species() {
        if let Some((last, count)) = blocks.last_mut() {
            if *last == species {
                *count += 1;
                continue;
            }
        }
        blocks.push((species, 1));
    }

    let formula: Vec<String> = blocks.iter().map(|(s, n)| format!("{}{}", s, n)).collect();
    writeln!(w, "{}", formula.join(" "))?;
    writeln!(w, "1.0")?;
    for row in structure.lattice().rows() {
        writeln!(w, "{:22.16} {:22.16} {:22.16}", row[0], row[1], row[2])?;
    }

    let names: Vec<&str> = blocks.iter().map(|(s, _)| *s).collect();
    let counts: Vec<String> = blocks.iter().map(|(_, n)| n.to_string()).collect();
    writeln!(w, "{}", names.join(" "))?;
    writeln!(w, "{}", counts.join(" "))?;
    writeln!(w, "direct")?;
    for site in structure.sites() {
        let f = site.frac_coords;
        writeln!(w, "{:.16} {:.16} {:.16} {}", f[0], f[1], f[2], site.species)?;
    }
    Ok(())
}

fn write_grid<W: Write>(w: &mut W, grid: &Array3<f64>) -> Result<()> {
    let (nx, ny, nz) = grid.dim();
    writeln!(w)?;
    writeln!(w, " {:4} {:4} {:4}", nx, ny, nz)?;

    // x runs fastest
    let mut count = 0;
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                write!(w, " {}", fortran_scientific(grid[[i, j, k]]))?;
                count += 1;
                if count % VALUES_PER_LINE == 0 {
                    writeln!(w)?;
                }
            }
        }
    }
    if count % VALUES_PER_LINE != 0 {
        writeln!(w)?;
    }
    Ok(())
}

/// Format a value as `d.ddddddddddde+XX`
pub fn fortran_scientific(value: f64) -> String {
    let formatted = format!("{:.11e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}E{}{:02}", mantissa, sign, exponent.abs())
        }
        None => formatted,
    }
}
