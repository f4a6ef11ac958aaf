//! `andamio-client` — client-side availability view with optimistic updates.
//!
//! UI forms decrement a visible "remaining" figure before the server
//! confirms. This crate makes that an explicit two-phase local state update:
//! confirmed levels from the server plus per-operation pending deltas,
//! folded in on confirmation or dropped on rejection. The client is never
//! authoritative; the coordinator re-checks everything at write time.

pub mod availability;

pub use availability::{AvailabilityView, OperationId, StockDelta};
