//! # FET Bridge
//!
//! Translation and reporting layer around an external combinatorial
//! timetabling solver.
//!
//! This crate models a school's scheduling requirements (activities,
//! teachers, rooms, time/space constraints) as the solver's input
//! document, and parses the solver-generated HTML statistics report back
//! into typed, aggregatable data. The solver itself is an external
//! program: this crate only produces its input and consumes its output
//! artifacts.
//!
//! ## Architecture
//!
//! - [`models`]: activities, the constraint taxonomy with its validation
//!   registry, and the parsed statistics report types
//! - [`export`]: deterministic serialization of activities and validated
//!   constraints into the solver's XML input dialect
//! - [`parsing`]: tolerant parsing of the generated HTML report into a
//!   [`models::report::StatisticsReport`] plus warnings
//! - [`services`]: independent recomputation of summary statistics and
//!   diff-checking against the parsed report
//! - [`config`]: institution and week-shape configuration (TOML)
//!
//! ## Pipeline
//!
//! Build activities → export document → (external solver run, owned by
//! the caller) → read report artifact → parse → cross-check. Every stage
//! is a pure function of its inputs; the only process-wide state is the
//! read-only constraint registry.

pub mod config;
pub mod export;
pub mod models;
pub mod parsing;
pub mod services;
