//! Service layer
//!
//! The upsert orchestrators plus their collaborators. Failures are typed
//! internally but collapse to `None` at the public boundary — callers get a
//! single "unable to apply changes" signal; detail lives in the logs at the
//! detection site.

pub mod catalog_service;
pub mod change_detector;
pub mod notify;

pub use catalog_service::CatalogService;
pub use notify::{BroadcastNotifier, CatalogNotifier, NullNotifier};

use thiserror::Error;

use crate::db::repository::RepoError;
use crate::mirror::MirrorError;

/// Orchestrator failure taxonomy
///
/// `Validation` and `NotFound` reject before any write. `ExternalSync`
/// rejects after canonical writes were committed — the tolerated divergence
/// window. `Storage` aborts the batch wholesale.
#[derive(Debug, Error)]
pub enum UpsertError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("target not found: {0}")]
    NotFound(String),

    #[error("external catalog sync failed: {0}")]
    ExternalSync(#[from] MirrorError),

    #[error("storage failure: {0}")]
    Storage(RepoError),
}

impl From<RepoError> for UpsertError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => UpsertError::NotFound(msg),
            RepoError::Validation(msg) | RepoError::Duplicate(msg) => {
                UpsertError::Validation(msg)
            }
            other => UpsertError::Storage(other),
        }
    }
}
