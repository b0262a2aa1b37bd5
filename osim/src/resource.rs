/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Resource-allocation data model for the deadlock engine.
//!
//! Two types model the two sides of the validation boundary:
//!
//! ```text
//! protocol/scenario ──► ClaimSpec ──(SystemState::new)──► Claim + SystemState
//!                        ↑ raw input                       ↑ validated, need derived
//! ```
//!
//! # Ownership model
//! A [`SystemState`] is built once from caller input, is immutable afterwards,
//! and is consumed read-only by [`banker::evaluate`](crate::banker::evaluate).
//! All validation happens inside [`SystemState::new`]; a constructed state is
//! guaranteed well-formed, so the safety scan itself has no failure modes.

use thiserror::Error;

// ── Errors ────────────────────────────────────────────────────────────────────

/// Why a system description was rejected before the safety scan.
///
/// Every variant carries the exact values involved so the caller can log or
/// report them without further parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The available vector was empty — at least one resource type is required.
    #[error("no resource types declared — the available vector is empty")]
    NoResources,

    /// A claim's allocation or max vector does not match the declared number
    /// of resource types.
    #[error("process '{process}' carries {got} values for '{vector}', expected {expected}")]
    VectorLengthMismatch {
        process: String,
        vector: &'static str,
        expected: usize,
        got: usize,
    },

    /// A claim holds more of a resource than it declared it would ever need.
    #[error(
        "process '{process}' holds {allocation} units of resource {resource} \
         but declared a maximum of {max}"
    )]
    AllocationExceedsMax {
        process: String,
        resource: usize,
        allocation: u32,
        max: u32,
    },
}

// ── ClaimSpec (input) ─────────────────────────────────────────────────────────

/// One process's resource claim as supplied by the caller, before validation.
///
/// `priority` is carried for parity with the front end's process table; the
/// wire protocol does not transmit it and the safety scan never consults it.
#[derive(Debug, Clone, Default)]
pub struct ClaimSpec {
    pub name: String,
    pub allocation: Vec<u32>,
    pub max: Vec<u32>,
    pub priority: i32,
}

// ── Claim (validated) ─────────────────────────────────────────────────────────

/// A validated claim with its derived need vector.
///
/// Invariants (enforced by [`SystemState::new`]):
/// * `allocation.len() == max.len() == need.len()` == resource count,
/// * `allocation[i] <= max[i]` for every resource `i`,
/// * `need[i] == max[i] - allocation[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub name: String,
    pub allocation: Vec<u32>,
    pub max: Vec<u32>,
    pub need: Vec<u32>,
    pub priority: i32,
}

impl Claim {
    fn from_spec(spec: ClaimSpec, resource_count: usize) -> Result<Self, StateError> {
        if spec.allocation.len() != resource_count {
            return Err(StateError::VectorLengthMismatch {
                process: spec.name,
                vector: "allocation",
                expected: resource_count,
                got: spec.allocation.len(),
            });
        }
        if spec.max.len() != resource_count {
            return Err(StateError::VectorLengthMismatch {
                process: spec.name,
                vector: "max",
                expected: resource_count,
                got: spec.max.len(),
            });
        }

        let mut need = Vec::with_capacity(resource_count);
        for (i, (&alloc, &max)) in spec.allocation.iter().zip(&spec.max).enumerate() {
            if alloc > max {
                return Err(StateError::AllocationExceedsMax {
                    process: spec.name,
                    resource: i,
                    allocation: alloc,
                    max,
                });
            }
            need.push(max - alloc);
        }

        Ok(Claim {
            name: spec.name,
            allocation: spec.allocation,
            max: spec.max,
            need,
            priority: spec.priority,
        })
    }
}

// ── SystemState ───────────────────────────────────────────────────────────────

/// A snapshot of the resource system at a single point in time: unassigned
/// units per resource type plus every process's validated claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemState {
    pub available: Vec<u32>,
    pub claims: Vec<Claim>,
}

impl SystemState {
    /// Validate `specs` against `available` and build an immutable state.
    ///
    /// # Errors
    /// * [`StateError::NoResources`] — `available` is empty.
    /// * [`StateError::VectorLengthMismatch`] — a claim's vectors do not match
    ///   the declared resource count.
    /// * [`StateError::AllocationExceedsMax`] — a claim holds more than its
    ///   declared maximum.
    ///
    /// Zero claims is a valid state (trivially safe).
    pub fn new(available: Vec<u32>, specs: Vec<ClaimSpec>) -> Result<Self, StateError> {
        if available.is_empty() {
            return Err(StateError::NoResources);
        }

        let resource_count = available.len();
        let claims = specs
            .into_iter()
            .map(|spec| Claim::from_spec(spec, resource_count))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SystemState { available, claims })
    }

    /// Number of resource types in this state.
    pub fn resource_count(&self) -> usize {
        self.available.len()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
