/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Maximal subgroup enumeration
//!
//! The group-subgroup relations come from a [`SubgroupTable`]. The bundled
//! implementation, [`JsonSubgroupTable`], reads them from a JSON document of
//! the form `{"t": {"225": [221, 166, ...]}, "k": {...}}`, which can be
//! exported from the International Tables data shipped with most
//! crystallography packages.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::{Result, SymmetryError};

/// Type of group-subgroup relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RelationType {
    /// translationengleiche: same translations, lower point symmetry
    #[default]
    #[serde(rename = "t")]
    Translationengleiche,
    /// klassengleiche: same point symmetry, fewer translations
    #[serde(rename = "k")]
    Klassengleiche,
}

impl FromStr for RelationType {
    type Err = SymmetryError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "t" => Ok(Self::Translationengleiche),
            "k" => Ok(Self::Klassengleiche),
            other => Err(SymmetryError::InvalidRelationType(other.to_string())),
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Translationengleiche => write!(f, "t"),
            Self::Klassengleiche => write!(f, "k"),
        }
    }
}

/// Source of maximal subgroup relations
pub trait SubgroupTable {
    /// Maximal subgroups of `spgn` for the given relation, as listed by the table
    ///
    /// A number may appear more than once when the subgroup can be reached
    /// through different transformations.
    fn maximal_subgroups(&self, spgn: u32, relation: RelationType) -> Result<Vec<u32>>;
}

impl<T: SubgroupTable + ?Sized> SubgroupTable for &T {
    fn maximal_subgroups(&self, spgn: u32, relation: RelationType) -> Result<Vec<u32>> {
        (**self).maximal_subgroups(spgn, relation)
    }
}

/// Maximal subgroup table loaded from JSON
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonSubgroupTable {
    #[serde(default)]
    t: BTreeMap<u32, Vec<u32>>,
    #[serde(default)]
    k: BTreeMap<u32, Vec<u32>>,
}

impl JsonSubgroupTable {
    /// Load a table from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Parse a table from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Register the maximal subgroups of `spgn`
    pub fn insert(&mut self, spgn: u32, relation: RelationType, subgroups: Vec<u32>) {
        match relation {
            RelationType::Translationengleiche => self.t.insert(spgn, subgroups),
            RelationType::Klassengleiche => self.k.insert(spgn, subgroups),
        };
    }
}

impl SubgroupTable for JsonSubgroupTable {
    fn maximal_subgroups(&self, spgn: u32, relation: RelationType) -> Result<Vec<u32>> {
        check_space_group(spgn)?;
        let relations = match relation {
            RelationType::Translationengleiche => &self.t,
            RelationType::Klassengleiche => &self.k,
        };
        match relations.get(&spgn) {
            Some(subgroups) => Ok(subgroups.clone()),
            None => {
                log::debug!("no maximal {}-subgroups listed for space group {}", relation, spgn);
                Ok(Vec::new())
            }
        }
    }
}

/// Check that `spgn` is a valid international space group number
pub fn check_space_group(spgn: u32) -> Result<()> {
    if (1..=230).contains(&spgn) {
        Ok(())
    } else {
        Err(SymmetryError::InvalidSpaceGroup(spgn))
    }
}

/// Recursive subgroup mapping: each key is a maximal subgroup of the parent,
/// mapped to its own maximal subgroups
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubgroupTree(pub BTreeMap<u32, SubgroupTree>);

impl SubgroupTree {
    /// Direct subgroups of this level
    pub fn keys(&self) -> impl Iterator<Item = &u32> {
        self.0.keys()
    }

    /// Subtree of a direct subgroup
    pub fn get(&self, spgn: u32) -> Option<&SubgroupTree> {
        self.0.get(&spgn)
    }

    /// Whether this level has no subgroups
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of nodes in the tree
    pub fn node_count(&self) -> usize {
        self.0.values().map(|t| 1 + t.node_count()).sum()
    }
}

/// Flat or recursive enumeration result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Subgroups {
    Flat(Vec<u32>),
    Tree(SubgroupTree),
}

/// Maximal subgroups of a space group, or the full recursive subgroup tree
///
/// # Arguments
///
/// * `table` - Source of the group-subgroup relations
/// * `spgn` - Space group number
/// * `recursive` - If true the recursive tree is returned
/// * `group_type` - Relation type, either "t" or "k"
pub fn get_subgroups<T: SubgroupTable + ?Sized>(
    table: &T,
    spgn: u32,
    recursive: bool,
    group_type: &str,
) -> Result<Subgroups> {
    let relation = group_type.parse::<RelationType>()?;
    if recursive {
        Ok(Subgroups::Tree(subgroup_tree(table, spgn, relation)?))
    } else {
        Ok(Subgroups::Flat(table.maximal_subgroups(spgn, relation)?))
    }
}

/// Build the recursive subgroup tree of `spgn`
///
/// Each distinct subgroup number is expanded once per level. A subgroup equal
/// to one of its ancestors (isomorphic k-subgroups) is listed as a leaf.
pub fn subgroup_tree<T: SubgroupTable + ?Sized>(
    table: &T,
    spgn: u32,
    relation: RelationType,
) -> Result<SubgroupTree> {
    let mut ancestors = vec![spgn];
    expand(table, spgn, relation, &mut ancestors)
}

fn expand<T: SubgroupTable + ?Sized>(
    table: &T,
    spgn: u32,
    relation: RelationType,
    ancestors: &mut Vec<u32>,
) -> Result<SubgroupTree> {
    let mut tree = BTreeMap::new();
    for sg in table.maximal_subgroups(spgn, relation)? {
        if tree.contains_key(&sg) {
            continue;
        }
        let subtree = if ancestors.contains(&sg) {
            SubgroupTree::default()
        } else {
            ancestors.push(sg);
            let subtree = expand(table, sg, relation, ancestors)?;
            ancestors.pop();
            subtree
        };
        tree.insert(sg, subtree);
    }
    Ok(SubgroupTree(tree))
}
