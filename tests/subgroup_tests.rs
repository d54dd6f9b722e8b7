/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Tests for subgroup derivation and enumeration
//!
//! The derivation tests use scripted detectors and generators so that the
//! orchestration can be checked independently of the group-theory data.

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;

use randomcarbon_rs::structure::{Lattice, Structure, SymmOp};
use randomcarbon_rs::symmetry::{
    derive_subgroup, get_subgroup_structure, get_subgroups, subgroup_tree, JsonSubgroupTable, RelationType,
    SpaceGroupDetector, SubgroupCandidate, SubgroupGenerator, SubgroupParams, SubgroupRequest,
    SubgroupTable, Subgroups, SymmetryDataset, SymmetryError, Tolerance, PRIMITIVE_SEARCH_STEPS,
};

fn parent() -> Structure {
    Structure::from_species(
        Lattice::cubic(3.5).unwrap(),
        &["C", "C"],
        &[[0.0, 0.0, 0.0], [0.5, 0.5, 0.5]],
    )
}

fn derived() -> Structure {
    Structure::from_species(
        Lattice::cubic(3.5).unwrap(),
        &["C", "C"],
        &[[0.0, 0.0, 0.0], [0.5, 0.5, 0.50001]],
    )
}

fn primitive() -> Structure {
    Structure::from_species(Lattice::cubic(3.0).unwrap(), &["C"], &[[0.0; 3]])
}

/// Reports `parent_spgn` for the parent structure, and `sub_spgn` for any other
/// structure once symprec reaches `threshold`
struct ScriptedDetector {
    parent_spgn: u32,
    sub_spgn: u32,
    threshold: f64,
    primitive_spgn: u32,
    primitive_fails: bool,
    calls: RefCell<Vec<f64>>,
}

impl ScriptedDetector {
    fn new(parent_spgn: u32, sub_spgn: u32, threshold: f64) -> Self {
        Self {
            parent_spgn,
            sub_spgn,
            threshold,
            primitive_spgn: sub_spgn,
            primitive_fails: false,
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl SpaceGroupDetector for ScriptedDetector {
    fn detect(&self, structure: &Structure, tolerance: &Tolerance) -> Result<SymmetryDataset, SymmetryError> {
        self.calls.borrow_mut().push(tolerance.symprec);

        if self.primitive_fails && *structure == primitive() {
            return Err(SymmetryError::DetectionFailed("no symmetry found".to_string()));
        }
        let number = if *structure == parent() {
            self.parent_spgn
        } else if *structure == primitive() {
            self.primitive_spgn
        } else if tolerance.symprec >= self.threshold {
            self.sub_spgn
        } else {
            1
        };
        Ok(SymmetryDataset {
            number,
            operations: vec![SymmOp::identity(); number as usize % 7 + 1],
            primitive_standard: primitive(),
        })
    }
}

struct ScriptedGenerator {
    spacegroup: u32,
    calls: Cell<usize>,
    last_request: RefCell<Option<SubgroupRequest>>,
}

impl ScriptedGenerator {
    fn new(spacegroup: u32) -> Self {
        Self {
            spacegroup,
            calls: Cell::new(0),
            last_request: RefCell::new(None),
        }
    }
}

impl SubgroupGenerator for ScriptedGenerator {
    fn generate(
        &self,
        _structure: &Structure,
        request: &SubgroupRequest,
    ) -> Result<Vec<SubgroupCandidate>, SymmetryError> {
        self.calls.set(self.calls.get() + 1);
        *self.last_request.borrow_mut() = Some(request.clone());
        Ok(vec![
            SubgroupCandidate {
                structure: derived(),
                spacegroup: self.spacegroup,
            },
            SubgroupCandidate {
                structure: parent(),
                spacegroup: 1,
            },
        ])
    }
}

#[test]
fn test_primitive_with_zero_eps_fails_before_detection() {
    let detector = ScriptedDetector::new(221, 123, 0.0);
    let generator = ScriptedGenerator::new(123);
    let params = SubgroupParams {
        primitive: true,
        eps: 0.0,
        ..SubgroupParams::for_subgroup(123)
    };

    let result = get_subgroup_structure(&parent(), &detector, &generator, &params);
    assert!(matches!(result, Err(SymmetryError::InvalidPrecondition(_))));
    assert!(detector.calls.borrow().is_empty());
    assert_eq!(generator.calls.get(), 0);
}

#[test]
fn test_initial_mismatch_fails_before_derivation() {
    let detector = ScriptedDetector::new(221, 123, 0.0);
    let generator = ScriptedGenerator::new(123);
    let params = SubgroupParams {
        expected_initial_spgn: Some(225),
        ..SubgroupParams::for_subgroup(123)
    };

    let result = get_subgroup_structure(&parent(), &detector, &generator, &params);
    assert!(matches!(
        result,
        Err(SymmetryError::DetectionMismatch {
            detected: 221,
            expected: 225
        })
    ));
    assert_eq!(generator.calls.get(), 0);
}

#[test]
fn test_conventional_derivation() {
    let detector = ScriptedDetector::new(221, 123, 0.0);
    let generator = ScriptedGenerator::new(123);
    let params = SubgroupParams {
        idx: Some(1),
        group_type: RelationType::Klassengleiche,
        expected_initial_spgn: Some(221),
        ..SubgroupParams::for_subgroup(123)
    };

    let (structure, ops) = get_subgroup_structure(&parent(), &detector, &generator, &params).unwrap();
    assert_eq!(structure, derived());
    assert_eq!(ops.len(), 123 % 7 + 1);

    let request = generator.last_request.borrow().clone().unwrap();
    assert_eq!(request.target, Some(123));
    assert_eq!(request.idx, Some(1));
    assert_eq!(request.group_type, RelationType::Klassengleiche);
    assert_eq!(*detector.calls.borrow(), vec![0.001, 0.001]);
}

#[test]
fn test_primitive_tolerance_scan() {
    let eps = 1e-3;
    // Matches from the third step on: eps * 2^3 / 16
    let detector = ScriptedDetector::new(221, 123, eps * 8.0 / 16.0);
    let generator = ScriptedGenerator::new(123);
    let params = SubgroupParams {
        primitive: true,
        eps,
        ..SubgroupParams::for_subgroup(123)
    };

    let (structure, _ops) = get_subgroup_structure(&parent(), &detector, &generator, &params).unwrap();
    assert_eq!(structure, primitive());

    let calls = detector.calls.borrow();
    // Initial detection, three scan steps, and the check on the primitive cell
    assert_eq!(calls.len(), 5);
    let expected = [eps * 2.0 / 16.0, eps * 4.0 / 16.0, eps * 8.0 / 16.0, eps * 8.0 / 16.0];
    for (got, want) in calls[1..].iter().zip(expected) {
        assert!((got - want).abs() < 1e-15);
    }
}

#[test]
fn test_target_taken_from_candidate() {
    let eps = 1e-3;
    let detector = ScriptedDetector::new(221, 99, eps * 2.0 / 16.0);
    let generator = ScriptedGenerator::new(99);
    let params = SubgroupParams {
        primitive: true,
        eps,
        ..SubgroupParams::default()
    };

    let (structure, _) = get_subgroup_structure(&parent(), &detector, &generator, &params).unwrap();
    assert_eq!(structure, primitive());
    assert_eq!(generator.last_request.borrow().as_ref().unwrap().target, None);
}

#[test]
fn test_primitive_scan_exhausted() {
    let detector = ScriptedDetector::new(221, 123, f64::INFINITY);
    let generator = ScriptedGenerator::new(123);
    let params = SubgroupParams {
        primitive: true,
        eps: 1e-3,
        ..SubgroupParams::for_subgroup(123)
    };

    let result = get_subgroup_structure(&parent(), &detector, &generator, &params);
    assert!(matches!(result, Err(SymmetryError::ExhaustedSearch(123))));
    assert_eq!(detector.calls.borrow().len(), 1 + PRIMITIVE_SEARCH_STEPS as usize);
}

#[test]
fn test_primitive_cell_in_other_group_is_fatal() {
    let mut detector = ScriptedDetector::new(221, 123, 0.0);
    detector.primitive_spgn = 47;
    let generator = ScriptedGenerator::new(123);
    let params = SubgroupParams {
        primitive: true,
        eps: 1e-3,
        ..SubgroupParams::for_subgroup(123)
    };

    let result = get_subgroup_structure(&parent(), &detector, &generator, &params);
    assert!(matches!(
        result,
        Err(SymmetryError::PrimitiveMismatch {
            detected: 47,
            expected: 123
        })
    ));
}

#[test]
fn test_failed_detection_on_primitive_cell_skips_step() {
    let mut detector = ScriptedDetector::new(221, 123, 0.0);
    detector.primitive_fails = true;
    let generator = ScriptedGenerator::new(123);
    let params = SubgroupParams {
        primitive: true,
        eps: 1e-3,
        ..SubgroupParams::for_subgroup(123)
    };

    let result = get_subgroup_structure(&parent(), &detector, &generator, &params);
    assert!(matches!(result, Err(SymmetryError::ExhaustedSearch(123))));
    // Initial detection, then the derived and the primitive cell at every step
    assert_eq!(detector.calls.borrow().len(), 1 + 2 * PRIMITIVE_SEARCH_STEPS as usize);
}

#[test]
fn test_derived_spacegroup_reported() {
    let detector = ScriptedDetector::new(221, 99, 0.0);
    let generator = ScriptedGenerator::new(99);

    let result = derive_subgroup(&parent(), &detector, &generator, &SubgroupParams::default()).unwrap();
    assert_eq!(result.spacegroup, 99);
    assert_eq!(result.structure, derived());
    assert_eq!(result.operations.len(), 99 % 7 + 1);

    let result = derive_subgroup(&parent(), &detector, &generator, &SubgroupParams::for_subgroup(123)).unwrap();
    assert_eq!(result.spacegroup, 123);
}

fn cubic_table() -> JsonSubgroupTable {
    JsonSubgroupTable::from_json(
        r#"{
            "t": {
                "221": [200, 215, 207, 123, 123, 123, 166],
                "200": [47, 146],
                "215": [111, 146],
                "207": [89, 146],
                "123": [47, 83, 89, 99, 111],
                "166": [148, 155, 160],
                "47": [16, 25, 10],
                "146": [1]
            }
        }"#,
    )
    .unwrap()
}

#[test]
fn test_flat_subgroups_keep_duplicates() {
    let subgroups = get_subgroups(&cubic_table(), 221, false, "t").unwrap();
    assert_eq!(subgroups, Subgroups::Flat(vec![200, 215, 207, 123, 123, 123, 166]));
}

#[test]
fn test_recursive_keys_are_unique_flat_elements() {
    let table = cubic_table();
    let flat: BTreeSet<u32> = table
        .maximal_subgroups(221, RelationType::Translationengleiche)
        .unwrap()
        .into_iter()
        .collect();

    let tree = subgroup_tree(&table, 221, RelationType::Translationengleiche).unwrap();
    let keys: BTreeSet<u32> = tree.keys().copied().collect();
    assert_eq!(keys, flat);

    // 146 is reached from 200, 215 and 207 and expanded in each branch
    for parent in [200, 215, 207] {
        let branch = tree.get(parent).unwrap();
        assert_eq!(branch.get(146).unwrap().keys().copied().collect::<Vec<_>>(), vec![1]);
    }
    assert!(tree.get(166).unwrap().get(148).unwrap().is_empty());
}

#[test]
fn test_invalid_group_type() {
    assert!(matches!(
        get_subgroups(&cubic_table(), 221, true, "x"),
        Err(SymmetryError::InvalidRelationType(_))
    ));
}

#[test]
fn test_tree_serializes_as_nested_map() {
    let subgroups = get_subgroups(&cubic_table(), 47, true, "t").unwrap();
    let json = serde_json::to_value(&subgroups).unwrap();
    assert!(json["16"].as_object().unwrap().is_empty());
    assert!(json.get("10").is_some());
}
