//! `andamio-api` — HTTP surface over the allocation coordinator.

pub mod app;
