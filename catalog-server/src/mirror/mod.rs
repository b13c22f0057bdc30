//! External POS catalog mirror
//!
//! Keeps the third-party POS catalog consistent with the canonical store via
//! ID-mapped batch calls. The adapter owns the id mappings (one row per
//! entity and key, overwritten on re-sync) and the sync policy: retrieve
//! mapped objects first to detect drift, upsert only what is new, stale or
//! dirty, and treat any retrieve/upsert failure as failing the entire batch.
//! Deletes are the one place mirror lag is tolerated — failures are logged
//! and the canonical delete stands.

pub mod client;
pub mod store;
pub mod translate;

pub use client::{HttpPosClient, PosCatalogClient};

use std::collections::HashMap;
use std::sync::Arc;

use sqlx::SqlitePool;
use thiserror::Error;

use crate::db::repository::RepoError;
use shared::models::{ModifierTypeWithOptions, ProductWithInstances};
use shared::pos::{
    BatchDeleteRequest, BatchRetrieveRequest, BatchUpsertRequest, CatalogApiError, CatalogObject,
};
use store::{EntityKind, MappingEntry};
use translate::TranslatedObject;

/// Mirror failure — any variant fails the whole batch it occurred in
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("POS request failed: {0}")]
    Transport(String),

    #[error("POS rejected batch: {0:?}")]
    Api(Vec<CatalogApiError>),

    #[error("unexpected POS response: {0}")]
    Protocol(String),

    #[error("mapping store failure: {0}")]
    Store(#[from] RepoError),
}

/// Adapter over the POS catalog client plus the persisted id mappings
#[derive(Clone)]
pub struct MirrorAdapter {
    client: Arc<dyn PosCatalogClient>,
}

impl MirrorAdapter {
    pub fn new(client: Arc<dyn PosCatalogClient>) -> Self {
        Self { client }
    }

    /// True when every listed entity already carries its id mapping —
    /// the boot-time "nothing to do" precondition.
    pub async fn has_complete_mappings(
        &self,
        pool: &SqlitePool,
        pairs: &[(EntityKind, i64)],
    ) -> Result<bool, RepoError> {
        let mappings = store::load(pool, pairs).await?;
        Ok(pairs.iter().all(|p| mappings.contains_key(p)))
    }

    /// Mirror a batch of products and their instances.
    ///
    /// `reference_pairs` lets the translation resolve modifier-list ids for
    /// modifier types synced earlier; unmapped references are omitted with a
    /// warning and attach on the next sync after the type is mirrored.
    pub async fn sync_products(
        &self,
        pool: &SqlitePool,
        entries: &[ProductWithInstances],
    ) -> Result<u32, MirrorError> {
        let mut entity_pairs: Vec<(EntityKind, i64)> = Vec::new();
        let mut reference_pairs: Vec<(EntityKind, i64)> = Vec::new();
        for entry in entries {
            entity_pairs.push((EntityKind::Product, entry.product.id));
            for instance in &entry.instances {
                entity_pairs.push((EntityKind::ProductInstance, instance.id));
            }
            for mref in &entry.product.modifiers {
                reference_pairs.push((EntityKind::ModifierType, mref.modifier_type_id));
            }
        }
        self.sync_batch(pool, entity_pairs, reference_pairs, |mappings| {
            entries
                .iter()
                .flat_map(|e| translate::product_objects(&e.product, &e.instances, mappings))
                .collect()
        })
        .await
    }

    /// Mirror a batch of modifier types and their options
    pub async fn sync_modifier_types(
        &self,
        pool: &SqlitePool,
        entries: &[ModifierTypeWithOptions],
    ) -> Result<u32, MirrorError> {
        let mut entity_pairs: Vec<(EntityKind, i64)> = Vec::new();
        for entry in entries {
            entity_pairs.push((EntityKind::ModifierType, entry.modifier_type.id));
            for option in &entry.options {
                entity_pairs.push((EntityKind::ModifierOption, option.id));
            }
        }
        self.sync_batch(pool, entity_pairs, vec![], |mappings| {
            entries
                .iter()
                .flat_map(|e| translate::modifier_type_objects(&e.modifier_type, &e.options, mappings))
                .collect()
        })
        .await
    }

    /// Drop the mirror objects for deleted entities, best effort.
    ///
    /// Mapping rows go away regardless; a failed POS delete is logged and
    /// tolerated (the canonical delete is never rolled back).
    pub async fn delete_entities(&self, pool: &SqlitePool, pairs: &[(EntityKind, i64)]) {
        let mappings = match store::load(pool, pairs).await {
            Ok(m) => m,
            Err(e) => {
                tracing::error!("mirror delete: failed to load id mappings: {e}");
                return;
            }
        };
        let external_ids: Vec<String> = mappings.values().cloned().collect();
        if let Err(e) = store::remove(pool, pairs).await {
            tracing::error!("mirror delete: failed to drop id mappings: {e}");
        }
        if external_ids.is_empty() {
            return;
        }
        match self
            .client
            .batch_delete(BatchDeleteRequest {
                object_ids: external_ids.clone(),
            })
            .await
        {
            Ok(resp) => {
                tracing::info!(
                    deleted = resp.deleted_object_ids.len(),
                    requested = external_ids.len(),
                    "mirror delete applied"
                );
            }
            Err(e) => {
                // Tolerated divergence: the POS keeps the objects until the
                // next reconciliation; canonical state is authoritative.
                tracing::warn!("mirror delete failed, POS will lag: {e}");
            }
        }
    }

    /// Shared sync driver: retrieve → prune stale → translate → drift-skip →
    /// upsert → persist mappings. Returns the number of objects upserted.
    async fn sync_batch<F>(
        &self,
        pool: &SqlitePool,
        entity_pairs: Vec<(EntityKind, i64)>,
        reference_pairs: Vec<(EntityKind, i64)>,
        translate_with: F,
    ) -> Result<u32, MirrorError>
    where
        F: FnOnce(&HashMap<(EntityKind, i64), String>) -> Vec<TranslatedObject>,
    {
        let mut all_pairs = entity_pairs.clone();
        all_pairs.extend(reference_pairs);
        let mut mappings = store::load(pool, &all_pairs).await?;

        // Drift check: fetch what the POS currently holds for our mapped ids.
        // A failure here aborts before any upsert.
        let mapped_ids: Vec<String> = entity_pairs
            .iter()
            .filter_map(|p| mappings.get(p).cloned())
            .collect();
        let retrieved: HashMap<String, CatalogObject> = if mapped_ids.is_empty() {
            HashMap::new()
        } else {
            let resp = self
                .client
                .batch_retrieve(BatchRetrieveRequest {
                    object_ids: mapped_ids,
                })
                .await?;
            resp.objects
                .into_iter()
                .chain(resp.related_objects)
                .map(|o| (o.id.clone(), o))
                .collect()
        };

        // Stale mappings: the POS no longer knows the object. Drop the
        // mapping so the entity re-syncs under a fresh client id.
        let mut stale: Vec<(EntityKind, i64)> = Vec::new();
        for pair in &entity_pairs {
            if let Some(ext) = mappings.get(pair)
                && !retrieved.contains_key(ext)
            {
                tracing::warn!(kind = pair.0.as_str(), id = pair.1, "stale POS mapping, re-creating");
                stale.push(*pair);
            }
        }
        for pair in &stale {
            mappings.remove(pair);
        }
        if !stale.is_empty() {
            store::remove(pool, &stale).await?;
        }

        let translated = translate_with(&mappings);

        // Dirty check: skip objects whose POS copy already matches.
        let mut upserts: Vec<TranslatedObject> = Vec::new();
        for mut t in translated {
            if t.client_id.is_none() {
                match retrieved.get(&t.object.id) {
                    Some(existing) if existing.data == t.object.data => continue,
                    Some(existing) => t.object.version = existing.version,
                    None => {}
                }
            }
            upserts.push(t);
        }
        if upserts.is_empty() {
            return Ok(0);
        }

        let request = BatchUpsertRequest {
            idempotency_key: uuid::Uuid::new_v4().to_string(),
            objects: upserts.iter().map(|t| t.object.clone()).collect(),
        };
        let response = self.client.batch_upsert(request).await?;

        // Resolve assigned ids for new objects and persist the mappings.
        let assigned: HashMap<String, String> = response
            .id_mappings
            .into_iter()
            .map(|m| (m.client_object_id, m.object_id))
            .collect();
        let now = shared::util::now_millis();
        let mut entries: Vec<MappingEntry> = Vec::with_capacity(upserts.len());
        for t in &upserts {
            let external_id = match &t.client_id {
                Some(client_id) => assigned.get(client_id).cloned().ok_or_else(|| {
                    MirrorError::Protocol(format!("no id mapping returned for {client_id}"))
                })?,
                None => t.object.id.clone(),
            };
            entries.push(MappingEntry {
                kind: t.kind,
                logical_id: t.logical_id,
                external_id,
                synced_at: now,
            });
        }
        store::put(pool, &entries).await?;

        Ok(upserts.len() as u32)
    }
}
