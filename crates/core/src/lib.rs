//! `andamio-core` — domain foundation for the rental allocation core.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;

pub use error::{AllocationError, AllocationResult};
pub use id::{CategoryId, DispatchId, DispatchItemId, LineId, ProjectId, StructureId};
