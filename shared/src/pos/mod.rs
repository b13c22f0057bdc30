//! POS catalog wire protocol
//!
//! Request/response types for the third-party point-of-sale catalog service
//! the canonical catalog is mirrored into.

pub mod catalog;

pub use catalog::*;
