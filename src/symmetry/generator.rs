/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Subgroup structure generation
//!
//! Deriving a structure that belongs to a subgroup needs the Wyckoff splitting
//! data of the group-subgroup relation. That work is left to a
//! [`SubgroupGenerator`]; [`ExternalGenerator`] delegates it to an external
//! program speaking JSON over stdin/stdout.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};

use super::errors::{Result, SymmetryError};
use super::subgroups::RelationType;
use crate::structure::Structure;

/// Parameters of a single subgroup derivation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubgroupRequest {
    /// Target subgroup number. If None the generator picks one of the maximal subgroups
    pub target: Option<u32>,
    /// Index of the transformation to use when several lead to the same subgroup
    pub idx: Option<usize>,
    /// Magnitude of the symmetry breaking on positions and lattice
    pub eps: f64,
    /// Relation type between the parent group and the subgroup
    pub group_type: RelationType,
    /// Distance tolerance used to identify the parent group
    pub symprec: f64,
    /// Angle tolerance in degrees used to identify the parent group
    pub angle_tolerance: f64,
}

/// A derived structure together with the subgroup it was built for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubgroupCandidate {
    pub structure: Structure,
    pub spacegroup: u32,
}

/// Produces candidate structures belonging to a subgroup of the input structure's group
pub trait SubgroupGenerator {
    /// Derive candidate subgroup structures from `structure`
    ///
    /// Generation may be randomized, so repeated calls can return different candidates.
    fn generate(&self, structure: &Structure, request: &SubgroupRequest) -> Result<Vec<SubgroupCandidate>>;
}

impl<T: SubgroupGenerator + ?Sized> SubgroupGenerator for &T {
    fn generate(&self, structure: &Structure, request: &SubgroupRequest) -> Result<Vec<SubgroupCandidate>> {
        (**self).generate(structure, request)
    }
}

#[derive(Serialize)]
struct GeneratorInput<'a> {
    structure: &'a Structure,
    #[serde(flatten)]
    request: &'a SubgroupRequest,
}

/// Subgroup generator running an external program
///
/// The program receives `{"structure": ..., "target": ..., "idx": ...,
/// "eps": ..., "group_type": "t", "symprec": ..., "angle_tolerance": ...}` on
/// stdin and must print a JSON list of `{"structure": ..., "spacegroup": N}`
/// on stdout.
#[derive(Debug, Clone)]
pub struct ExternalGenerator {
    program: PathBuf,
    args: Vec<String>,
}

impl ExternalGenerator {
    /// Create a generator running `program` with no extra arguments
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Add command line arguments passed to the program
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl SubgroupGenerator for ExternalGenerator {
    fn generate(&self, structure: &Structure, request: &SubgroupRequest) -> Result<Vec<SubgroupCandidate>> {
        let input = serde_json::to_vec(&GeneratorInput { structure, request })?;

        log::debug!("running subgroup generator {}", self.program.display());
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&input)?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SymmetryError::GenerationFailed(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        Ok(serde_json::from_slice(&output.stdout)?)
    }
}
