/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for the scheduling engine.
//!
//! Every variant carries enough data for the protocol layer to print a
//! precise diagnostic without re-parsing anything. All preconditions are
//! checked before the simulation loop starts; a [`simulate`] call that gets
//! past them cannot fail.
//!
//! [`simulate`]: super::simulate

use thiserror::Error;

/// Top-level error type returned by [`simulate`](super::simulate) and by
/// [`Policy::from_str`](super::Policy).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimulationError {
    /// `simulate()` was called with an empty process list.
    #[error("no processes provided — process list is empty")]
    NoProcesses,

    /// The policy token is not one of the five recognised names.
    #[error("unknown scheduling policy: '{0}' (valid: FCFS, SJF, SRTF, PRIORITY, ROBIN)")]
    UnknownPolicy(String),

    /// A process declared a zero burst time, which can never be scheduled.
    #[error("process {id} has a zero burst time — every process must require CPU time")]
    ZeroBurst { id: u32 },

    /// Round robin was selected but no time quantum was supplied.
    #[error("round robin requires a time quantum")]
    MissingQuantum,

    /// Round robin was selected with a quantum of zero.
    #[error("time quantum must be a positive integer")]
    ZeroQuantum,
}
