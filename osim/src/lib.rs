/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! osim – deterministic simulation engines for two classroom OS algorithms.
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── resource/   – deadlock data model: validated SystemState + derived need
//! ├── banker/     – Banker's safety algorithm over a SystemState
//! ├── sched/      – five dispatch policies, execution timeline, metrics
//! ├── protocol/   – line-oriented request parsing and report rendering
//! └── scenario/   – YAML scenario files (structured alternative input)
//! ```
//!
//! Both engines are stateless batch computations: the caller builds a fresh,
//! validated input object, the engine runs to completion, and the result is
//! returned by value. Nothing is retained between invocations.

pub mod banker;
pub mod protocol;
pub mod resource;
pub mod scenario;
pub mod sched;
