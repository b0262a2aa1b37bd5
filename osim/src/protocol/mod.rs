//! Line-oriented request parsing and report rendering.
//!
//! This module is the adapter between the legacy text exchange spoken by the
//! GUI front end and the typed engine APIs. The wire format is positional:
//!
//! ```text
//! deadlock request            scheduling request
//! ────────────────            ──────────────────
//! 3 3 2                       ROBIN
//! P1 0 1 0 7 5 3              2            ← quantum, ROBIN only
//! P2 2 0 0 3 2 2              2            ← process count
//! END                         1 0 5 0      ← id arrival burst priority
//!                             2 1 4 0
//!                             END
//! ```
//!
//! Parsing is eager and total: every structural and numeric check happens
//! here, before either engine runs, so a malformed request can never produce
//! partial output. Blank lines are tolerated anywhere (the original C
//! tokeniser skipped them); everything else is positional.
//!
//! Arrival, burst, and quantum values are parsed as `u32` and widened, which
//! keeps the engines' `u64` time arithmetic out of overflow range for any
//! parseable request.

use thiserror::Error;

use crate::banker::{self, SafetyVerdict};
use crate::resource::{ClaimSpec, StateError, SystemState};
use crate::sched::{self, Policy, Process, Schedule, SimulationError};

// ── Errors ────────────────────────────────────────────────────────────────────

/// Why a request was rejected at the protocol boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The request contained no content lines at all.
    #[error("request is empty")]
    EmptyRequest,

    /// A positional line (quantum, process count, …) was missing before EOF.
    #[error("unexpected end of input — expected {expected}")]
    UnexpectedEof { expected: &'static str },

    /// The request body was not terminated by an `END` line.
    #[error("request is not terminated by an END line")]
    MissingEnd,

    /// A numeric field failed to parse (includes negative values for
    /// unsigned fields).
    #[error("line {line}: '{token}' is not a valid integer")]
    InvalidInteger { line: usize, token: String },

    /// A line carried the wrong number of whitespace-separated tokens.
    #[error("line {line}: expected {expected} whitespace-separated tokens, got {got}")]
    TokenCount {
        line: usize,
        expected: usize,
        got: usize,
    },

    /// The declared process count does not match the number of process lines.
    #[error("process count is {declared} but {got} process lines were supplied")]
    CountMismatch { declared: usize, got: usize },

    /// The parsed values describe an invalid resource state.
    #[error(transparent)]
    State(#[from] StateError),

    /// The parsed values describe an invalid scheduling instance.
    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

// ── Line tokenising helpers ───────────────────────────────────────────────────

/// Trimmed, non-blank lines with their 1-based line numbers.
fn content_lines(input: &str) -> impl Iterator<Item = (usize, &str)> {
    input
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

fn parse_token<T: std::str::FromStr>(line: usize, token: &str) -> Result<T, ProtocolError> {
    token.parse().map_err(|_| ProtocolError::InvalidInteger {
        line,
        token: token.to_string(),
    })
}

/// Parse a line that must consist of exactly one integer token.
fn parse_single_int<T: std::str::FromStr>(line_no: usize, line: &str) -> Result<T, ProtocolError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != 1 {
        return Err(ProtocolError::TokenCount {
            line: line_no,
            expected: 1,
            got: tokens.len(),
        });
    }
    parse_token(line_no, tokens[0])
}

// ── Deadlock requests ─────────────────────────────────────────────────────────

/// Parse a deadlock request into a validated [`SystemState`].
///
/// Line 1 carries the available vector; each subsequent line carries
/// `name alloc_0..alloc_{R-1} max_0..max_{R-1}` (2R+1 tokens); the body is
/// terminated by a line that is exactly `END`.
pub fn parse_deadlock_request(input: &str) -> Result<SystemState, ProtocolError> {
    let mut lines = content_lines(input);

    let (line_no, header) = lines.next().ok_or(ProtocolError::EmptyRequest)?;
    let available = header
        .split_whitespace()
        .map(|token| parse_token::<u32>(line_no, token))
        .collect::<Result<Vec<_>, _>>()?;
    let resource_count = available.len();

    let mut specs = Vec::new();
    let mut terminated = false;
    for (line_no, line) in lines {
        if line == "END" {
            terminated = true;
            break;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let expected = 2 * resource_count + 1;
        if tokens.len() != expected {
            return Err(ProtocolError::TokenCount {
                line: line_no,
                expected,
                got: tokens.len(),
            });
        }
        let values = tokens[1..]
            .iter()
            .map(|token| parse_token::<u32>(line_no, token))
            .collect::<Result<Vec<_>, _>>()?;
        specs.push(ClaimSpec {
            name: tokens[0].to_string(),
            allocation: values[..resource_count].to_vec(),
            max: values[resource_count..].to_vec(),
            priority: 0,
        });
    }
    if !terminated {
        return Err(ProtocolError::MissingEnd);
    }

    Ok(SystemState::new(available, specs)?)
}

/// Render a safety verdict as the human-readable report.
///
/// Contract: the word "deadlock" appears (case-insensitively) in the output
/// if and only if the state is unsafe — the front end greps for exactly
/// that substring.
pub fn render_safety_report(verdict: &SafetyVerdict) -> String {
    match verdict {
        SafetyVerdict::Safe { sequence } => {
            let mut out = String::from("SYSTEM IS IN SAFE STATE!\n");
            if !sequence.is_empty() {
                out.push_str(&format!("SAFE SEQUENCE : {}\n", sequence.join(" -> ")));
            }
            out
        }
        SafetyVerdict::Deadlock { blocked } => format!(
            "SYSTEM IS IN DEADLOCK STATE!\nDEADLOCKED PROCESSES : {}\n",
            blocked.join(" ")
        ),
    }
}

/// Parse, evaluate, and render one deadlock exchange.
pub fn run_deadlock(input: &str) -> Result<String, ProtocolError> {
    let state = parse_deadlock_request(input)?;
    Ok(render_safety_report(&banker::evaluate(&state)))
}

// ── Scheduling requests ───────────────────────────────────────────────────────

/// A fully parsed scheduling request, ready to simulate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulingRequest {
    pub policy: Policy,
    /// Present iff the request carried a quantum line (ROBIN only).
    pub quantum: Option<u64>,
    pub processes: Vec<Process>,
}

impl SchedulingRequest {
    /// Run the scheduling engine on this request.
    pub fn simulate(&self) -> Result<Schedule, SimulationError> {
        sched::simulate(self.policy, &self.processes, self.quantum)
    }
}

/// Parse a scheduling request.
///
/// Line 1 = policy token; if `ROBIN`, line 2 = quantum; next line = declared
/// process count; then one `id arrival burst priority` line per process;
/// terminated by `END`. The declared count must match the number of process
/// lines exactly.
pub fn parse_scheduling_request(input: &str) -> Result<SchedulingRequest, ProtocolError> {
    let mut lines = content_lines(input);

    let (_, policy_line) = lines.next().ok_or(ProtocolError::EmptyRequest)?;
    let policy: Policy = policy_line.parse()?;

    let quantum = if policy == Policy::RoundRobin {
        let (line_no, line) = lines.next().ok_or(ProtocolError::UnexpectedEof {
            expected: "a time-quantum line",
        })?;
        Some(u64::from(parse_single_int::<u32>(line_no, line)?))
    } else {
        None
    };

    let (line_no, line) = lines.next().ok_or(ProtocolError::UnexpectedEof {
        expected: "a process-count line",
    })?;
    let declared = parse_single_int::<usize>(line_no, line)?;

    let mut processes = Vec::new();
    let mut terminated = false;
    for (line_no, line) in lines {
        if line == "END" {
            terminated = true;
            break;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != 4 {
            return Err(ProtocolError::TokenCount {
                line: line_no,
                expected: 4,
                got: tokens.len(),
            });
        }
        processes.push(Process {
            id: parse_token::<u32>(line_no, tokens[0])?,
            arrival: u64::from(parse_token::<u32>(line_no, tokens[1])?),
            burst: u64::from(parse_token::<u32>(line_no, tokens[2])?),
            priority: parse_token::<i32>(line_no, tokens[3])?,
        });
    }
    if !terminated {
        return Err(ProtocolError::MissingEnd);
    }
    if processes.len() != declared {
        return Err(ProtocolError::CountMismatch {
            declared,
            got: processes.len(),
        });
    }

    Ok(SchedulingRequest {
        policy,
        quantum,
        processes,
    })
}

/// Render a schedule as the line-oriented report: one line per execution
/// record in chronological order, then the three `Average` metric lines.
pub fn render_schedule_report(schedule: &Schedule) -> String {
    let mut out = String::new();
    for r in &schedule.records {
        out.push_str(&format!(
            "Process {}: Start Time = {}, Duration = {}\n",
            r.process_id, r.start, r.duration
        ));
    }
    let m = &schedule.metrics;
    out.push_str(&format!("Average Completion Time: {:.2}\n", m.avg_completion));
    out.push_str(&format!("Average Turnaround Time: {:.2}\n", m.avg_turnaround));
    // The established consumer matches this exact wording, stray space included.
    out.push_str(&format!("Average Waiting Time : {:.2}\n", m.avg_waiting));
    out
}

/// Parse, simulate, and render one scheduling exchange.
pub fn run_scheduling(input: &str) -> Result<String, ProtocolError> {
    let request = parse_scheduling_request(input)?;
    Ok(render_schedule_report(&request.simulate()?))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Deadlock parsing ──────────────────────────────────────────────────────

    #[test]
    fn parses_minimal_deadlock_request() {
        let state = parse_deadlock_request("3 3 2\nP1 0 1 0 7 5 3\nEND\n").unwrap();
        assert_eq!(state.available, vec![3, 3, 2]);
        assert_eq!(state.claims.len(), 1);
        assert_eq!(state.claims[0].name, "P1");
        assert_eq!(state.claims[0].allocation, vec![0, 1, 0]);
        assert_eq!(state.claims[0].max, vec![7, 5, 3]);
        assert_eq!(state.claims[0].need, vec![7, 4, 3]);
    }

    #[test]
    fn deadlock_request_tolerates_blank_lines() {
        let state = parse_deadlock_request("\n2 2\n\nP1 1 1 2 2\n\nEND\n\n").unwrap();
        assert_eq!(state.claims.len(), 1);
    }

    #[test]
    fn deadlock_request_without_end_is_rejected() {
        let err = parse_deadlock_request("1 1\nP1 0 0 1 1\n").unwrap_err();
        assert_eq!(err, ProtocolError::MissingEnd);
    }

    #[test]
    fn empty_deadlock_request_is_rejected() {
        assert_eq!(
            parse_deadlock_request("").unwrap_err(),
            ProtocolError::EmptyRequest
        );
    }

    #[test]
    fn deadlock_request_with_short_process_line_is_rejected() {
        let err = parse_deadlock_request("1 1\nP1 0 0 1\nEND\n").unwrap_err();
        assert_eq!(
            err,
            ProtocolError::TokenCount {
                line: 2,
                expected: 5,
                got: 4,
            }
        );
    }

    #[test]
    fn deadlock_request_with_non_integer_field_is_rejected() {
        let err = parse_deadlock_request("1 x\nEND\n").unwrap_err();
        assert_eq!(
            err,
            ProtocolError::InvalidInteger {
                line: 1,
                token: "x".to_string(),
            }
        );
    }

    #[test]
    fn negative_available_value_is_rejected() {
        // Unsigned parse: a negative token is not a valid integer field.
        assert!(matches!(
            parse_deadlock_request("-1 2\nEND\n").unwrap_err(),
            ProtocolError::InvalidInteger { .. }
        ));
    }

    #[test]
    fn allocation_over_max_is_rejected_before_the_scan() {
        let err = parse_deadlock_request("2 2\nP1 2 0 1 1\nEND\n").unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::State(StateError::AllocationExceedsMax { .. })
        ));
    }

    // ── Deadlock rendering ────────────────────────────────────────────────────

    #[test]
    fn safe_report_lists_the_sequence() {
        let report = render_safety_report(&SafetyVerdict::Safe {
            sequence: vec!["P1".to_string(), "P0".to_string()],
        });
        assert_eq!(report, "SYSTEM IS IN SAFE STATE!\nSAFE SEQUENCE : P1 -> P0\n");
    }

    #[test]
    fn safe_report_never_contains_the_deadlock_marker() {
        for sequence in [vec![], vec!["P1".to_string()]] {
            let report = render_safety_report(&SafetyVerdict::Safe { sequence });
            assert!(
                !report.to_lowercase().contains("deadlock"),
                "safe report must not trip the front end's deadlock detection: {report}"
            );
        }
    }

    #[test]
    fn deadlock_report_carries_marker_and_blocked_set() {
        let report = render_safety_report(&SafetyVerdict::Deadlock {
            blocked: vec!["P0".to_string(), "P2".to_string()],
        });
        assert_eq!(
            report,
            "SYSTEM IS IN DEADLOCK STATE!\nDEADLOCKED PROCESSES : P0 P2\n"
        );
        assert!(report.to_lowercase().contains("deadlock"));
    }

    #[test]
    fn run_deadlock_end_to_end_safe() {
        // Full textbook instance (Silberschatz et al., ch. 8).
        let input = "3 3 2\n\
                     P0 0 1 0 7 5 3\n\
                     P1 2 0 0 3 2 2\n\
                     P2 3 0 2 9 0 2\n\
                     P3 2 1 1 2 2 2\n\
                     P4 0 0 2 4 3 3\n\
                     END\n";
        let report = run_deadlock(input).unwrap();
        assert_eq!(
            report,
            "SYSTEM IS IN SAFE STATE!\nSAFE SEQUENCE : P1 -> P3 -> P0 -> P2 -> P4\n"
        );
    }

    #[test]
    fn run_deadlock_end_to_end_deadlocked() {
        let input = "0\nA 1 2\nB 1 2\nEND\n";
        let report = run_deadlock(input).unwrap();
        assert_eq!(
            report,
            "SYSTEM IS IN DEADLOCK STATE!\nDEADLOCKED PROCESSES : A B\n"
        );
    }

    #[test]
    fn run_deadlock_zero_processes_is_safe() {
        let report = run_deadlock("1 2 3\nEND\n").unwrap();
        assert_eq!(report, "SYSTEM IS IN SAFE STATE!\n");
    }

    // ── Scheduling parsing ────────────────────────────────────────────────────

    #[test]
    fn parses_fcfs_request() {
        let request =
            parse_scheduling_request("FCFS\n2\n1 0 5 0\n2 1 3 0\nEND\n").unwrap();
        assert_eq!(request.policy, Policy::Fcfs);
        assert_eq!(request.quantum, None);
        assert_eq!(
            request.processes,
            vec![
                Process { id: 1, arrival: 0, burst: 5, priority: 0 },
                Process { id: 2, arrival: 1, burst: 3, priority: 0 },
            ]
        );
    }

    #[test]
    fn parses_robin_request_with_quantum_line() {
        let request = parse_scheduling_request("ROBIN\n2\n1\n1 0 5 0\nEND\n").unwrap();
        assert_eq!(request.policy, Policy::RoundRobin);
        assert_eq!(request.quantum, Some(2));
        assert_eq!(request.processes.len(), 1);
    }

    #[test]
    fn non_robin_request_has_no_quantum_line() {
        // For SJF the second line is already the process count.
        let request = parse_scheduling_request("SJF\n1\n1 0 5 0\nEND\n").unwrap();
        assert_eq!(request.quantum, None);
        assert_eq!(request.processes.len(), 1);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let err = parse_scheduling_request("MLFQ\n1\n1 0 5 0\nEND\n").unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Simulation(SimulationError::UnknownPolicy(_))
        ));
    }

    #[test]
    fn robin_request_ending_after_policy_line_is_rejected() {
        let err = parse_scheduling_request("ROBIN\n").unwrap_err();
        assert_eq!(
            err,
            ProtocolError::UnexpectedEof {
                expected: "a time-quantum line",
            }
        );
    }

    #[test]
    fn request_without_count_line_is_rejected() {
        let err = parse_scheduling_request("FCFS\n").unwrap_err();
        assert_eq!(
            err,
            ProtocolError::UnexpectedEof {
                expected: "a process-count line",
            }
        );
    }

    #[test]
    fn count_mismatch_is_rejected() {
        let err = parse_scheduling_request("FCFS\n3\n1 0 5 0\nEND\n").unwrap_err();
        assert_eq!(err, ProtocolError::CountMismatch { declared: 3, got: 1 });
    }

    #[test]
    fn process_line_with_wrong_token_count_is_rejected() {
        let err = parse_scheduling_request("FCFS\n1\n1 0 5\nEND\n").unwrap_err();
        assert_eq!(
            err,
            ProtocolError::TokenCount {
                line: 3,
                expected: 4,
                got: 3,
            }
        );
    }

    #[test]
    fn scheduling_request_without_end_is_rejected() {
        let err = parse_scheduling_request("FCFS\n1\n1 0 5 0\n").unwrap_err();
        assert_eq!(err, ProtocolError::MissingEnd);
    }

    #[test]
    fn negative_priority_is_accepted() {
        // Priority is signed; lower values are more urgent.
        let request = parse_scheduling_request("PRIORITY\n1\n1 0 5 -3\nEND\n").unwrap();
        assert_eq!(request.processes[0].priority, -3);
    }

    // ── Scheduling rendering & end-to-end ─────────────────────────────────────

    #[test]
    fn run_scheduling_fcfs_worked_example() {
        let input = "FCFS\n3\n1 0 5 0\n2 1 3 0\n3 2 8 0\nEND\n";
        let report = run_scheduling(input).unwrap();
        assert_eq!(
            report,
            "Process 1: Start Time = 0, Duration = 5\n\
             Process 2: Start Time = 5, Duration = 3\n\
             Process 3: Start Time = 8, Duration = 8\n\
             Average Completion Time: 9.67\n\
             Average Turnaround Time: 8.67\n\
             Average Waiting Time : 3.33\n"
        );
    }

    #[test]
    fn run_scheduling_round_robin_worked_example() {
        let input = "ROBIN\n2\n2\n1 0 5 0\n2 1 4 0\nEND\n";
        let report = run_scheduling(input).unwrap();
        assert_eq!(
            report,
            "Process 1: Start Time = 0, Duration = 2\n\
             Process 2: Start Time = 2, Duration = 2\n\
             Process 1: Start Time = 4, Duration = 2\n\
             Process 2: Start Time = 6, Duration = 2\n\
             Process 1: Start Time = 8, Duration = 1\n\
             Average Completion Time: 8.50\n\
             Average Turnaround Time: 8.00\n\
             Average Waiting Time : 3.50\n"
        );
    }

    #[test]
    fn run_scheduling_zero_quantum_is_rejected() {
        let err = run_scheduling("ROBIN\n0\n1\n1 0 5 0\nEND\n").unwrap_err();
        assert_eq!(
            err,
            ProtocolError::Simulation(SimulationError::ZeroQuantum)
        );
    }

    #[test]
    fn run_scheduling_zero_burst_is_rejected() {
        let err = run_scheduling("FCFS\n1\n1 0 0 0\nEND\n").unwrap_err();
        assert_eq!(
            err,
            ProtocolError::Simulation(SimulationError::ZeroBurst { id: 1 })
        );
    }

    #[test]
    fn run_scheduling_declared_zero_processes_is_rejected() {
        let err = run_scheduling("FCFS\n0\nEND\n").unwrap_err();
        assert_eq!(err, ProtocolError::Simulation(SimulationError::NoProcesses));
    }

    // ── Idempotence ───────────────────────────────────────────────────────────

    #[test]
    fn identical_requests_yield_byte_identical_output() {
        let deadlock_input = "3 3 2\nP0 0 1 0 7 5 3\nP1 2 0 0 3 2 2\nEND\n";
        let sched_input = "SRTF\n2\n1 0 8 0\n2 1 4 0\nEND\n";

        let first = run_deadlock(deadlock_input).unwrap();
        let second = run_deadlock(deadlock_input).unwrap();
        assert_eq!(first, second);

        let first = run_scheduling(sched_input).unwrap();
        let second = run_scheduling(sched_input).unwrap();
        assert_eq!(first, second);
    }
}
