/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Command Line Interface (CLI) module
//!
//! This module provides a command-line interface to the symmetry utilities:
//! space group detection, maximal subgroup enumeration and subgroup
//! structure derivation.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;

use crate::structure::{Structure, SymmOp};
use crate::symmetry::{
    derive_subgroup, get_subgroups, validate_subgroup, DerivedSubgroup, ExternalGenerator,
    JsonSubgroupTable, MoyoAnalyzer, RelationType, SpaceGroupDetector, SubgroupParams, Tolerance,
    ValidationConfig,
};

/// Crystallographic subgroup utilities for random structure generation
#[derive(Debug, Parser)]
#[command(name = "randomcarbon", version, about)]
pub struct Cli {
    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Detect the space group of a structure
    Spacegroup(SpacegroupArgs),
    /// List the maximal subgroups of a space group
    Subgroups(SubgroupsArgs),
    /// Derive a structure belonging to a subgroup of the input structure's group
    Subgroup(SubgroupArgs),
}

#[derive(Debug, Args)]
pub struct SpacegroupArgs {
    /// Structure in JSON format
    pub structure: PathBuf,

    /// Distance tolerance in Å
    #[arg(long, default_value_t = 0.01)]
    pub symprec: f64,

    /// Angle tolerance in degrees; derived from symprec if absent
    #[arg(long)]
    pub angle_tolerance: Option<f64>,
}

#[derive(Debug, Args)]
pub struct SubgroupsArgs {
    /// Space group number
    pub spgn: u32,

    /// JSON table of maximal subgroups
    #[arg(long)]
    pub table: PathBuf,

    /// Subgroup relation, "t" or "k"
    #[arg(long, default_value = "t")]
    pub group_type: String,

    /// Print the full recursive subgroup tree
    #[arg(long)]
    pub recursive: bool,
}

#[derive(Debug, Args)]
pub struct SubgroupArgs {
    /// Structure in JSON format
    pub structure: PathBuf,

    /// Program deriving the subgroup structures
    #[arg(long)]
    pub generator: PathBuf,

    /// Extra argument passed to the generator (repeatable)
    #[arg(long = "generator-arg", allow_hyphen_values = true)]
    pub generator_args: Vec<String>,

    /// JSON file with the derivation parameters; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Target subgroup number
    #[arg(long)]
    pub spgn: Option<u32>,

    /// Index of the transformation leading to the subgroup
    #[arg(long)]
    pub idx: Option<usize>,

    /// Amount by which the symmetry is broken
    #[arg(long)]
    pub eps: Option<f64>,

    /// Subgroup relation, "t" or "k"
    #[arg(long)]
    pub group_type: Option<String>,

    /// Return the primitive cell
    #[arg(long)]
    pub primitive: bool,

    /// Distance tolerance used on the input structure
    #[arg(long)]
    pub symprec: Option<f64>,

    /// Angle tolerance in degrees used on the input structure
    #[arg(long)]
    pub angle_tolerance: Option<f64>,

    /// Expected space group of the input structure
    #[arg(long)]
    pub expected_initial_spgn: Option<u32>,

    /// Number of times the derivation is attempted
    #[arg(long, default_value_t = 1)]
    pub attempts: usize,

    /// Validate the derived structure and operations
    #[arg(long)]
    pub validate: bool,

    /// Output file; stdout if absent
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl SubgroupArgs {
    /// Derivation parameters from the config file, overridden by the flags
    pub fn params(&self) -> anyhow::Result<SubgroupParams> {
        let mut params = match &self.config {
            Some(path) => {
                let reader = BufReader::new(
                    File::open(path).with_context(|| format!("opening {}", path.display()))?,
                );
                serde_json::from_reader(reader)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => SubgroupParams::default(),
        };

        if self.spgn.is_some() {
            params.spgn = self.spgn;
        }
        if self.idx.is_some() {
            params.idx = self.idx;
        }
        if let Some(eps) = self.eps {
            params.eps = eps;
        }
        if let Some(group_type) = &self.group_type {
            params.group_type = group_type.parse::<RelationType>()?;
        }
        if self.primitive {
            params.primitive = true;
        }
        if let Some(symprec) = self.symprec {
            params.symprec = symprec;
        }
        if let Some(angle_tolerance) = self.angle_tolerance {
            params.angle_tolerance = angle_tolerance;
        }
        if self.expected_initial_spgn.is_some() {
            params.expected_initial_spgn = self.expected_initial_spgn;
        }
        Ok(params)
    }
}

#[derive(Serialize)]
struct SubgroupOutput {
    spacegroup: u32,
    structure: Structure,
    operations: Vec<SymmOp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    validation: Option<Option<String>>,
}

/// Initialise `env_logger`; `RUST_LOG` takes precedence over `verbose`
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Run a parsed command
pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Spacegroup(args) => run_spacegroup(&args),
        Commands::Subgroups(args) => run_subgroups(&args),
        Commands::Subgroup(args) => run_subgroup(&args),
    }
}

fn read_structure(path: &Path) -> anyhow::Result<Structure> {
    Structure::from_json_file(path).with_context(|| format!("reading structure {}", path.display()))
}

fn run_spacegroup(args: &SpacegroupArgs) -> anyhow::Result<()> {
    let structure = read_structure(&args.structure)?;
    let tolerance = Tolerance {
        symprec: args.symprec,
        angle_tolerance: args.angle_tolerance,
    };
    let dataset = MoyoAnalyzer::new().detect(&structure, &tolerance)?;

    println!("space group: {}", dataset.number);
    println!("operations: {}", dataset.operations.len());
    println!("sites: {} (primitive: {})", structure.len(), dataset.primitive_standard.len());
    Ok(())
}

fn run_subgroups(args: &SubgroupsArgs) -> anyhow::Result<()> {
    let table = JsonSubgroupTable::from_file(&args.table)
        .with_context(|| format!("loading subgroup table {}", args.table.display()))?;
    let subgroups = get_subgroups(&table, args.spgn, args.recursive, &args.group_type)?;
    println!("{}", serde_json::to_string_pretty(&subgroups)?);
    Ok(())
}

fn run_subgroup(args: &SubgroupArgs) -> anyhow::Result<()> {
    if args.attempts == 0 {
        bail!("--attempts should be at least 1");
    }

    let structure = read_structure(&args.structure)?;
    let params = args.params()?;
    let detector = MoyoAnalyzer::new();
    let generator = ExternalGenerator::new(&args.generator).with_args(args.generator_args.iter().cloned());

    let mut derived = None;
    for attempt in 1..=args.attempts {
        match derive_subgroup(&structure, &detector, &generator, &params) {
            Ok(result) => {
                derived = Some(result);
                break;
            }
            Err(e) if attempt < args.attempts => {
                log::warn!("attempt {}/{} failed: {}", attempt, args.attempts, e);
            }
            Err(e) => return Err(e).context(format!("derivation failed after {} attempts", attempt)),
        }
    }
    let Some(DerivedSubgroup {
        structure: sub_structure,
        operations,
        spacegroup,
    }) = derived
    else {
        bail!("no subgroup structure derived");
    };

    let validation = if args.validate {
        let report = validate_subgroup(
            &structure,
            &sub_structure,
            &operations,
            spacegroup,
            &detector,
            &ValidationConfig::default(),
        )?;
        match &report {
            Some(reason) => log::warn!("validation failed: {}", reason),
            None => log::info!("validation passed"),
        }
        Some(report)
    } else {
        None
    };

    let output = SubgroupOutput {
        spacegroup,
        structure: sub_structure,
        operations,
        validation,
    };

    match &args.output {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, &output)?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &output)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}
