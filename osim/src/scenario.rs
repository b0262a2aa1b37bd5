//! YAML scenario loading.
//!
//! Scenario files are the structured alternative to the line protocol: the
//! same problem instances, described as YAML, validated through the same
//! constructors so a file can never smuggle an invalid instance past the
//! engines.
//!
//! The expected layouts are:
//! ```yaml
//! # deadlock scenario
//! available: [3, 3, 2]
//! processes:
//!   - name: P1
//!     allocation: [0, 1, 0]
//!     max: [7, 5, 3]
//!     priority: 0        # optional
//! ```
//! ```yaml
//! # scheduling scenario
//! policy: ROBIN
//! quantum: 2             # required iff policy == ROBIN
//! processes:
//!   - { id: 1, arrival: 0, burst: 5, priority: 0 }
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::protocol::SchedulingRequest;
use crate::resource::{ClaimSpec, SystemState};
use crate::sched::{Policy, Process};

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level layout of a deadlock scenario file.
///
/// Kept private — callers work with the validated [`SystemState`] instead.
#[derive(Debug, Deserialize)]
struct DeadlockScenarioFile {
    available: Vec<u32>,
    #[serde(default)]
    processes: Vec<DeadlockProcessEntry>,
}

#[derive(Debug, Deserialize)]
struct DeadlockProcessEntry {
    name: String,
    allocation: Vec<u32>,
    max: Vec<u32>,
    /// Optional; the safety scan never consults it.
    #[serde(default)]
    priority: i32,
}

/// Top-level layout of a scheduling scenario file.
#[derive(Debug, Deserialize)]
struct SchedulingScenarioFile {
    policy: String,
    quantum: Option<u32>,
    processes: Vec<SchedulingProcessEntry>,
}

#[derive(Debug, Deserialize)]
struct SchedulingProcessEntry {
    id: u32,
    arrival: u32,
    burst: u32,
    #[serde(default)]
    priority: i32,
}

// ── Loaders ───────────────────────────────────────────────────────────────────

/// Parse `path` into a validated [`SystemState`].
///
/// # Errors
/// Returns an error if the file cannot be opened, if the YAML is
/// structurally invalid, or if the described state fails validation
/// (allocation over max, mismatched vector lengths, no resources).
pub fn load_deadlock_scenario(path: &Path) -> Result<SystemState> {
    info!("Loading deadlock scenario from: {}", path.display());

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot open scenario file: {}", path.display()))?;

    let file: DeadlockScenarioFile = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?;

    let specs = file
        .processes
        .into_iter()
        .map(|entry| ClaimSpec {
            name: entry.name,
            allocation: entry.allocation,
            max: entry.max,
            priority: entry.priority,
        })
        .collect();

    let state = SystemState::new(file.available, specs)
        .context("scenario describes an invalid system state")?;

    debug!(
        process_count = state.claims.len(),
        resource_count = state.resource_count(),
        "deadlock scenario loaded"
    );
    Ok(state)
}

/// Parse `path` into a [`SchedulingRequest`], the same type the line
/// protocol produces.
///
/// # Errors
/// Returns an error if the file cannot be opened, if the YAML is
/// structurally invalid, or if the policy token is unknown. Instance-level
/// validation (zero bursts, quantum rules) happens in
/// [`SchedulingRequest::simulate`].
pub fn load_scheduling_scenario(path: &Path) -> Result<SchedulingRequest> {
    info!("Loading scheduling scenario from: {}", path.display());

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot open scenario file: {}", path.display()))?;

    let file: SchedulingScenarioFile = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?;

    let policy: Policy = file.policy.parse()?;
    let processes: Vec<Process> = file
        .processes
        .into_iter()
        .map(|entry| Process {
            id: entry.id,
            arrival: u64::from(entry.arrival),
            burst: u64::from(entry.burst),
            priority: entry.priority,
        })
        .collect();

    debug!(
        policy = %policy,
        process_count = processes.len(),
        "scheduling scenario loaded"
    );
    Ok(SchedulingRequest {
        policy,
        quantum: file.quantum.map(u64::from),
        processes,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
