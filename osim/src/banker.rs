//! Banker's safety algorithm.
//!
//! [`evaluate`] answers one question about a [`SystemState`]: starting from
//! the current allocation, can every process still run to completion in some
//! order? If yes, the state is *safe* and one witnessing completion order is
//! returned; if no, the processes that can never be satisfied form the
//! deadlocked set.
//!
//! The scan is first-fit with an index-order tie-break: after every grant it
//! restarts from index 0, so among equally satisfiable claims the lowest
//! input index always completes first. This makes the reported sequence a
//! deterministic function of the input.
//!
//! Complexity is O(P² · R): at most P full passes, each scanning P claims
//! over R resources.
//!
//! # Example
//! ```rust
//! use osim::banker::{evaluate, SafetyVerdict};
//! use osim::resource::{ClaimSpec, SystemState};
//!
//! let state = SystemState::new(
//!     vec![2],
//!     vec![ClaimSpec { name: "P1".into(), allocation: vec![1], max: vec![3], ..Default::default() }],
//! )
//! .unwrap();
//!
//! assert!(matches!(evaluate(&state), SafetyVerdict::Safe { .. }));
//! ```

use tracing::{debug, info};

use crate::resource::SystemState;

// ── Verdict ───────────────────────────────────────────────────────────────────

/// Outcome of the safety scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SafetyVerdict {
    /// Every process can complete; `sequence` lists one completion order in
    /// discovery order. Empty for a state with zero processes.
    Safe { sequence: Vec<String> },

    /// No completion order exists; `blocked` lists the unfinished processes
    /// in input order.
    Deadlock { blocked: Vec<String> },
}

impl SafetyVerdict {
    /// Returns `true` for [`SafetyVerdict::Safe`].
    pub fn is_safe(&self) -> bool {
        matches!(self, SafetyVerdict::Safe { .. })
    }
}

// ── Algorithm ─────────────────────────────────────────────────────────────────

/// Run the safety scan over `state`.
///
/// Infallible: `state` was validated at construction, so the scan always
/// terminates with a verdict.
pub fn evaluate(state: &SystemState) -> SafetyVerdict {
    let mut work = state.available.clone();
    let mut finished = vec![false; state.claims.len()];
    let mut sequence = Vec::with_capacity(state.claims.len());

    info!(
        process_count = state.claims.len(),
        resource_count = state.resource_count(),
        "=== banker::evaluate() ==="
    );

    // Grant the lowest-index satisfiable claim, release its allocation back
    // into the working vector, and restart the scan from index 0.
    'scan: loop {
        for (i, claim) in state.claims.iter().enumerate() {
            if finished[i] {
                continue;
            }
            let satisfiable = claim.need.iter().zip(&work).all(|(need, have)| need <= have);
            if satisfiable {
                for (have, held) in work.iter_mut().zip(&claim.allocation) {
                    *have += held;
                }
                finished[i] = true;
                sequence.push(claim.name.clone());
                debug!(process = %claim.name, work = ?work, "claim satisfiable — allocation released");
                continue 'scan;
            }
        }
        break;
    }

    if finished.iter().all(|&done| done) {
        info!(sequence = ?sequence, "system is in a safe state");
        SafetyVerdict::Safe { sequence }
    } else {
        let blocked: Vec<String> = state
            .claims
            .iter()
            .zip(&finished)
            .filter(|(_, &done)| !done)
            .map(|(claim, _)| claim.name.clone())
            .collect();
        info!(blocked = ?blocked, "system is in deadlock");
        SafetyVerdict::Deadlock { blocked }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
