/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use osim::banker;
use osim::protocol;
use osim::scenario;

// ── CLI argument definition ───────────────────────────────────────────────────

/// Banker's-algorithm deadlock detection engine (Rust implementation).
///
/// Example:
///   deadlock < request.txt
///   deadlock --scenario demos/claims.yaml
#[derive(Debug, Parser)]
#[command(
    name = "deadlock",
    about = "Banker's-algorithm deadlock detection engine",
    long_about = None,
)]
struct Cli {
    /// Read the line-protocol request from a file instead of standard input.
    #[arg(short = 'i', long = "input")]
    input: Option<PathBuf>,

    /// Load the problem instance from a YAML scenario file instead of the
    /// line protocol.
    #[arg(short = 's', long = "scenario", conflicts_with = "input")]
    scenario: Option<PathBuf>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialise structured logging on stderr — stdout carries the protocol
    // response. Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!(input = ?cli.input, scenario = ?cli.scenario, "deadlock engine starting");

    match run(&cli) {
        Ok(report) => print!("{report}"),
        Err(e) => {
            // The exit contract is a diagnostic on stderr and a non-zero
            // status, independent of the log filter.
            eprintln!("error: {e:#}");
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<String> {
    if let Some(path) = &cli.scenario {
        let state = scenario::load_deadlock_scenario(path)?;
        return Ok(protocol::render_safety_report(&banker::evaluate(&state)));
    }

    let request = match &cli.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Cannot open request file: {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read request from stdin")?;
            buf
        }
    };

    Ok(protocol::run_deadlock(&request)?)
}
