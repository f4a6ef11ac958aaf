//! `andamio-allocation` — the Allocation Coordinator.
//!
//! The one place where structure stock, project reservations, and dispatch
//! records meet. Every mutating operation runs as a transaction against a
//! single serializing store: preconditions are validated against
//! authoritative state under the write lock, then applied, so partial
//! application is never a reachable end state and two concurrent callers can
//! never jointly overbook a structure.

pub mod coordinator;
pub mod store;

pub use coordinator::AllocationCoordinator;
pub use store::{AllocationState, InMemoryStore};
