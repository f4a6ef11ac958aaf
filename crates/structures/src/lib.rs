//! `andamio-structures` — the Structure Ledger domain.
//!
//! A structure is one pool of identical rentable units (scaffolding frames,
//! braces, planks). The entity owns the total `stock` count; `available` and
//! `in_use` are always derived from project allocations, never stored.

pub mod structure;

pub use structure::{NewStructure, StockLevel, Structure};
