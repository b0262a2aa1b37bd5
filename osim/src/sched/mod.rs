//! Single-CPU scheduling engine.
//!
//! [`simulate`] dispatches a list of [`Process`] descriptors under one of
//! five policies and returns a [`Schedule`]: the execution timeline plus
//! per-process outcomes and aggregate metrics.
//!
//! # Design decisions vs the C implementation
//!
//! | Topic | C | Rust |
//! |---|---|---|
//! | State | Module-level arrays, mutated in place | Stateless `simulate()` — all per-run state is local |
//! | Idle CPU | Busy-loop `current_time++` | Jump to the next arrival (observationally identical) |
//! | SRTF | One tick per loop iteration, steps merged ad hoc | Event-driven (run to completion or next arrival); the timeline coalesces uniformly |
//! | Round robin | Cyclic array scan | Explicit FIFO ready queue, arrivals enqueue before the preempted process |
//! | Tie-breaks | First hit of a strict `<` scan | Total order over (metric, arrival, input index) |
//! | Errors | Silent garbage on bad input | `Result<Schedule, SimulationError>` with typed variants |
//!
//! All tie-breaks are total orders, so for identical input the output is
//! byte-for-byte reproducible.
//!
//! # Example
//! ```rust
//! use osim::sched::{simulate, Policy, Process};
//!
//! let processes = vec![
//!     Process { id: 1, arrival: 0, burst: 5, priority: 0 },
//!     Process { id: 2, arrival: 1, burst: 3, priority: 0 },
//! ];
//! let schedule = simulate(Policy::Fcfs, &processes, None).unwrap();
//! assert_eq!(schedule.records.len(), 2);
//! ```

pub mod error;
pub mod metrics;

pub use error::SimulationError;
pub use metrics::Metrics;

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use tracing::{debug, info};

// ── Policy ────────────────────────────────────────────────────────────────────

/// Dispatch policy selector.
///
/// Parses from / displays as the protocol tokens, so an invalid policy name
/// can never exist inside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// First-come-first-served: non-preemptive, arrival order.
    Fcfs,
    /// Shortest job first: non-preemptive, smallest full burst among arrived.
    Sjf,
    /// Shortest remaining time first: preemptive SJF, re-evaluated at every
    /// arrival and completion.
    Srtf,
    /// Non-preemptive priority; a lower numeric value is more urgent.
    Priority,
    /// Round robin over a FIFO ready queue with a fixed time quantum.
    RoundRobin,
}

impl Policy {
    /// The token this policy uses on the wire.
    pub fn token(self) -> &'static str {
        match self {
            Policy::Fcfs => "FCFS",
            Policy::Sjf => "SJF",
            Policy::Srtf => "SRTF",
            Policy::Priority => "PRIORITY",
            Policy::RoundRobin => "ROBIN",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Policy {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FCFS" => Ok(Policy::Fcfs),
            "SJF" => Ok(Policy::Sjf),
            "SRTF" => Ok(Policy::Srtf),
            "PRIORITY" => Ok(Policy::Priority),
            "ROBIN" => Ok(Policy::RoundRobin),
            other => Err(SimulationError::UnknownPolicy(other.to_string())),
        }
    }
}

// ── Process (input) ───────────────────────────────────────────────────────────

/// One process descriptor as supplied by the caller.
///
/// The remaining-time counter used by the preemptive policies is per-run
/// state local to the simulation; it is never stored here, so a `Process`
/// list can be reused across runs unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Process {
    /// Numeric identifier echoed into every execution record.
    pub id: u32,
    /// Time at which the process becomes runnable.
    pub arrival: u64,
    /// Total CPU time the process requires. Must be positive.
    pub burst: u64,
    /// Priority value for the PRIORITY policy; lower is more urgent.
    /// Zero when not applicable.
    pub priority: i32,
}

// ── Outputs ───────────────────────────────────────────────────────────────────

/// One contiguous CPU occupancy interval.
///
/// A process preempted and later resumed yields several records whose
/// durations sum to its original burst time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionRecord {
    pub process_id: u32,
    pub start: u64,
    pub duration: u64,
}

/// Per-process results of one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub id: u32,
    pub completion: u64,
    /// `completion - arrival`.
    pub turnaround: u64,
    /// `turnaround - burst`.
    pub waiting: u64,
}

/// Complete result of one simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    /// Occupancy intervals in chronological order, no overlaps, adjacent
    /// same-process intervals coalesced.
    pub records: Vec<ExecutionRecord>,
    /// One outcome per input process, in input order.
    pub outcomes: Vec<ProcessOutcome>,
    pub metrics: Metrics,
}

// ── Timeline accumulator ──────────────────────────────────────────────────────

/// Builds the record list, coalescing adjacent intervals of the same process
/// so every record is one maximal contiguous run.
#[derive(Debug, Default)]
struct Timeline {
    records: Vec<ExecutionRecord>,
}

impl Timeline {
    fn new() -> Self {
        Self::default()
    }

    /// Append an interval. `start` must not precede the end of the previous
    /// record — the simulation loops only ever move time forward.
    fn push(&mut self, process_id: u32, start: u64, duration: u64) {
        debug_assert!(duration > 0, "zero-length interval for process {process_id}");
        if let Some(last) = self.records.last_mut() {
            debug_assert!(
                start >= last.start + last.duration,
                "interval for process {process_id} overlaps the timeline tail"
            );
            if last.process_id == process_id && last.start + last.duration == start {
                last.duration += duration;
                return;
            }
        }
        self.records.push(ExecutionRecord {
            process_id,
            start,
            duration,
        });
    }

    fn into_records(self) -> Vec<ExecutionRecord> {
        self.records
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Simulate `processes` under `policy` and return the resulting [`Schedule`].
///
/// `quantum` is consulted only for [`Policy::RoundRobin`]; the original
/// backend reads it only in that case, and this port keeps that contract by
/// ignoring it elsewhere.
///
/// # Errors
/// All preconditions are checked before the simulation loop starts:
/// * [`SimulationError::NoProcesses`] — empty process list.
/// * [`SimulationError::ZeroBurst`] — a process with `burst == 0`.
/// * [`SimulationError::MissingQuantum`] / [`SimulationError::ZeroQuantum`] —
///   round robin without a positive quantum.
pub fn simulate(
    policy: Policy,
    processes: &[Process],
    quantum: Option<u64>,
) -> Result<Schedule, SimulationError> {
    if processes.is_empty() {
        return Err(SimulationError::NoProcesses);
    }
    if let Some(p) = processes.iter().find(|p| p.burst == 0) {
        return Err(SimulationError::ZeroBurst { id: p.id });
    }

    info!(
        policy = %policy,
        process_count = processes.len(),
        "=== sched::simulate() ==="
    );

    let (timeline, completion) = match policy {
        // FCFS is the degenerate non-preemptive policy keyed on arrival itself.
        Policy::Fcfs => run_nonpreemptive(processes, |p| p.arrival),
        Policy::Sjf => run_nonpreemptive(processes, |p| p.burst),
        Policy::Priority => run_nonpreemptive(processes, |p| p.priority),
        Policy::Srtf => run_srtf(processes),
        Policy::RoundRobin => {
            let quantum = match quantum {
                None => return Err(SimulationError::MissingQuantum),
                Some(0) => return Err(SimulationError::ZeroQuantum),
                Some(q) => q,
            };
            run_round_robin(processes, quantum)
        }
    };

    let outcomes: Vec<ProcessOutcome> = processes
        .iter()
        .zip(&completion)
        .map(|(p, &completion)| {
            let turnaround = completion - p.arrival;
            ProcessOutcome {
                id: p.id,
                completion,
                turnaround,
                waiting: turnaround - p.burst,
            }
        })
        .collect();

    let metrics = metrics::aggregate(&outcomes);

    info!(
        record_count = timeline.records.len(),
        avg_waiting = metrics.avg_waiting,
        avg_turnaround = metrics.avg_turnaround,
        "simulation complete"
    );

    Ok(Schedule {
        records: timeline.into_records(),
        outcomes,
        metrics,
    })
}

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Earliest arrival strictly after `now` among unfinished processes.
fn next_arrival(processes: &[Process], done: &[bool], now: u64) -> Option<u64> {
    (0..processes.len())
        .filter(|&i| !done[i] && processes[i].arrival > now)
        .map(|i| processes[i].arrival)
        .min()
}

// ── Non-preemptive policies (FCFS, SJF, PRIORITY) ─────────────────────────────

/// Shared loop for the non-preemptive policies.
///
/// At every completion (and at start), picks the arrived, unfinished process
/// minimising `(key, arrival, input index)` and runs it to completion. When
/// nobody has arrived, time jumps to the next arrival — the gap produces no
/// record and penalises no process.
fn run_nonpreemptive<K: Ord>(
    processes: &[Process],
    key: impl Fn(&Process) -> K,
) -> (Timeline, Vec<u64>) {
    let n = processes.len();
    let mut timeline = Timeline::new();
    let mut completion = vec![0u64; n];
    let mut done = vec![false; n];
    let mut completed = 0usize;
    let mut now = 0u64;

    while completed < n {
        let pick = (0..n)
            .filter(|&i| !done[i] && processes[i].arrival <= now)
            .min_by_key(|&i| (key(&processes[i]), processes[i].arrival, i));

        let Some(i) = pick else {
            match next_arrival(processes, &done, now) {
                Some(t) => now = t,
                None => break,
            }
            continue;
        };

        let p = &processes[i];
        timeline.push(p.id, now, p.burst);
        now += p.burst;
        completion[i] = now;
        done[i] = true;
        completed += 1;
        debug!(id = p.id, completion = now, "dispatched to completion");
    }

    (timeline, completion)
}

// ── SRTF ──────────────────────────────────────────────────────────────────────

/// Shortest remaining time first, event-driven.
///
/// The running process is re-chosen at every arrival and every completion —
/// the only instants at which the minimum of `(remaining, index)` can change.
/// Between events the chosen process runs uninterrupted, so each loop
/// iteration covers a whole segment instead of a single tick.
fn run_srtf(processes: &[Process]) -> (Timeline, Vec<u64>) {
    let n = processes.len();
    let mut timeline = Timeline::new();
    let mut completion = vec![0u64; n];
    let mut remaining: Vec<u64> = processes.iter().map(|p| p.burst).collect();
    let mut done = vec![false; n];
    let mut completed = 0usize;
    let mut now = processes.iter().map(|p| p.arrival).min().unwrap_or(0);

    while completed < n {
        let running = (0..n)
            .filter(|&i| !done[i] && processes[i].arrival <= now)
            .min_by_key(|&i| (remaining[i], i));

        let Some(i) = running else {
            match next_arrival(processes, &done, now) {
                Some(t) => now = t,
                None => break,
            }
            continue;
        };

        let finish_at = now + remaining[i];
        let horizon = next_arrival(processes, &done, now);
        let run_until = match horizon {
            Some(arrival) if arrival < finish_at => arrival,
            _ => finish_at,
        };

        timeline.push(processes[i].id, now, run_until - now);
        remaining[i] -= run_until - now;
        now = run_until;

        if remaining[i] == 0 {
            completion[i] = now;
            done[i] = true;
            completed += 1;
            debug!(id = processes[i].id, completion = now, "completed");
        }
    }

    (timeline, completion)
}

// ── Round robin ───────────────────────────────────────────────────────────────

/// Round robin over an explicit FIFO ready queue.
///
/// Queue discipline: processes enter in arrival order (ties by input index);
/// each dispatch runs for `min(quantum, remaining)`; every process that has
/// arrived by the end of a slice — the end instant included — enqueues
/// before the preempted process re-enters the back of the queue.
fn run_round_robin(processes: &[Process], quantum: u64) -> (Timeline, Vec<u64>) {
    let n = processes.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by_key(|&i| (processes[i].arrival, i));

    let mut timeline = Timeline::new();
    let mut completion = vec![0u64; n];
    let mut remaining: Vec<u64> = processes.iter().map(|p| p.burst).collect();

    let mut queue: VecDeque<usize> = VecDeque::new();
    let mut next = 0usize; // cursor into `order`
    let mut now = 0u64;

    loop {
        if queue.is_empty() {
            // CPU idle: jump to the next arrival.
            let Some(&idx) = order.get(next) else { break };
            now = now.max(processes[idx].arrival);
        }
        while next < n && processes[order[next]].arrival <= now {
            queue.push_back(order[next]);
            next += 1;
        }

        let Some(i) = queue.pop_front() else { break };
        let slice = quantum.min(remaining[i]);
        timeline.push(processes[i].id, now, slice);
        now += slice;
        remaining[i] -= slice;

        // Arrivals during the slice join ahead of the preempted process.
        while next < n && processes[order[next]].arrival <= now {
            queue.push_back(order[next]);
            next += 1;
        }

        if remaining[i] > 0 {
            queue.push_back(i);
        } else {
            completion[i] = now;
            debug!(id = processes[i].id, completion = now, "completed");
        }
    }

    (timeline, completion)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
