/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Periodic crystal structure

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{Result, StructureError};
use super::lattice::Lattice;

/// A single atomic site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    /// Species label (element symbol)
    pub species: String,
    /// Fractional coordinates
    pub frac_coords: [f64; 3],
}

impl Site {
    /// Create a new site
    pub fn new(species: &str, frac_coords: [f64; 3]) -> Self {
        Self {
            species: species.to_string(),
            frac_coords,
        }
    }
}

/// A periodic structure: a lattice and an ordered list of sites
///
/// Scalar properties computed by external calculators (for example the
/// energy per atom) can be cached on the structure with [`Structure::set_property`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    lattice: Lattice,
    sites: Vec<Site>,
    #[serde(default)]
    properties: BTreeMap<String, f64>,
}

impl Structure {
    /// Create a new structure
    pub fn new(lattice: Lattice, sites: Vec<Site>) -> Self {
        Self {
            lattice,
            sites,
            properties: BTreeMap::new(),
        }
    }

    /// Create a structure from parallel lists of species and fractional coordinates
    pub fn from_species(lattice: Lattice, species: &[&str], frac_coords: &[[f64; 3]]) -> Self {
        let sites = species
            .iter()
            .zip(frac_coords)
            .map(|(sp, fc)| Site::new(sp, *fc))
            .collect();
        Self::new(lattice, sites)
    }

    /// Get the lattice
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Get a slice of all sites
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    /// Get a site by index
    pub fn site(&self, index: usize) -> Result<&Site> {
        self.sites.get(index).ok_or(StructureError::SiteIndex {
            index,
            len: self.sites.len(),
        })
    }

    /// Number of sites
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Whether the structure has no sites
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Fractional coordinates of all sites, in site order
    pub fn frac_coords(&self) -> Vec<[f64; 3]> {
        self.sites.iter().map(|s| s.frac_coords).collect()
    }

    /// Species labels of all sites, in site order
    pub fn species(&self) -> Vec<&str> {
        self.sites.iter().map(|s| s.species.as_str()).collect()
    }

    /// Return a new structure with `sites` appended after the existing ones
    ///
    /// Cached properties are not carried over since they describe the old structure.
    pub fn with_appended_sites(&self, sites: impl IntoIterator<Item = Site>) -> Self {
        let mut all = self.sites.clone();
        all.extend(sites);
        Self::new(self.lattice, all)
    }

    /// Get a cached scalar property
    pub fn get_property(&self, name: &str) -> Option<f64> {
        self.properties.get(name).copied()
    }

    /// Cache a scalar property on the structure
    pub fn set_property(&mut self, name: &str, value: f64) {
        self.properties.insert(name.to_string(), value);
    }

    /// Read a structure from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Write the structure to a JSON file
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}
