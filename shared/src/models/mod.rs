//! Data models
//!
//! Shared between catalog-server and API/UI layers. Entities are stored as
//! JSON payload snapshots in the version tables, so every entity derives
//! `Serialize`/`Deserialize` and `PartialEq` (no-op detection compares full
//! snapshots). All IDs are `i64` snowflakes, all timestamps Unix millis.

pub mod availability;
pub mod category;
pub mod modifier;
pub mod printer_group;
pub mod product;
pub mod upsert;

// Re-exports
pub use availability::*;
pub use category::*;
pub use modifier::*;
pub use printer_group::*;
pub use product::*;
pub use upsert::*;
