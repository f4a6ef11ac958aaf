//! `andamio-dispatch` — the Dispatch Ledger domain.
//!
//! A dispatch records one physical hand-off of reserved material to a named
//! driver. Item quantities are immutable after creation; to change dispatched
//! amounts, delete the dispatch and recreate it. Deletion is the rollback
//! path and restores the lines' undispatched remainder.

pub mod dispatch;

pub use dispatch::{CarrierInfo, Dispatch, DispatchItem};
