//! Shared types for the catalog engine
//!
//! Data models, upsert request shapes and the POS catalog wire protocol,
//! consumed by `catalog-server` and by API/UI layers living elsewhere.

pub mod models;
pub mod pos;
pub mod util;
