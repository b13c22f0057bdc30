//! catalog-server — catalog mutation & synchronization engine
//!
//! The canonical restaurant catalog lives in SQLite as SCD2 version chains
//! (full history, one open version per logical id). Batch upsert
//! orchestrators validate requests, detect changes, write all canonical
//! mutations in one transaction per call, mirror the result into the
//! external POS catalog through ID-mapped batch calls, and fire a single
//! recompute trigger per successful batch. HTTP routing, auth and the
//! read-side snapshot broadcast live in other crates and consume this one.

pub mod core;
pub mod db;
pub mod mirror;
pub mod services;
pub mod utils;
