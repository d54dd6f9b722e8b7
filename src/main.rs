/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Main executable for randomcarbon-rs

use clap::Parser;
use randomcarbon_rs::cli::{init_logging, run, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    run(cli)
}
