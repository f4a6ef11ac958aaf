//! `andamio-projects` — the Project Allocation Set domain.
//!
//! A project carries an ordered set of allocation lines (structure,
//! quantity). Lines are provisional while the project is in `Draft`; the
//! `Draft -> Active` transition is the single event that locks them against
//! the structure ledger. Ceiling checks against availability live in the
//! coordinator, which is the only place that can see the ledger.

pub mod project;

pub use project::{AllocationLine, Project, ProjectStatus};
