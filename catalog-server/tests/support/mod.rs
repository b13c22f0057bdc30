//! Shared test fixtures: in-memory pool, scripted POS client, counting
//! notifier.

// Each test binary compiles its own copy; not all of them use every helper.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use catalog_server::mirror::{MirrorError, PosCatalogClient};
use catalog_server::services::{CatalogNotifier, CatalogService};
use shared::pos::{
    BatchDeleteRequest, BatchDeleteResponse, BatchRetrieveRequest, BatchRetrieveResponse,
    BatchUpsertRequest, BatchUpsertResponse, CatalogApiError, CatalogIdMapping, CatalogObject,
};

pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    catalog_server::db::MIGRATOR.run(&pool).await.unwrap();
    pool
}

/// Count all version rows (open and closed) for one logical id
pub async fn version_count(pool: &SqlitePool, table: &str, id: i64) -> i64 {
    let sql = format!("SELECT COUNT(*) FROM {table} WHERE logical_id = ?");
    sqlx::query_scalar(&sql).bind(id).fetch_one(pool).await.unwrap()
}

pub async fn setup() -> (CatalogService, Arc<MockPosClient>, Arc<CountingNotifier>) {
    let pool = test_pool().await;
    let client = Arc::new(MockPosClient::new());
    let notifier = Arc::new(CountingNotifier::default());
    let service = CatalogService::new(pool, client.clone(), notifier.clone());
    (service, client, notifier)
}

/// Notifier that counts recompute triggers
#[derive(Default)]
pub struct CountingNotifier(AtomicU32);

impl CountingNotifier {
    pub fn count(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogNotifier for CountingNotifier {
    async fn catalog_changed(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct MockState {
    objects: HashMap<String, CatalogObject>,
    next_id: u64,
    upsert_calls: u32,
    retrieve_calls: u32,
    delete_calls: u32,
    fail_upsert: bool,
    fail_retrieve: bool,
    fail_delete: bool,
}

/// In-memory stand-in for the POS catalog service
#[derive(Default)]
pub struct MockPosClient {
    state: Mutex<MockState>,
}

impl MockPosClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_upsert(&self, fail: bool) {
        self.state.lock().unwrap().fail_upsert = fail;
    }

    pub fn fail_retrieve(&self, fail: bool) {
        self.state.lock().unwrap().fail_retrieve = fail;
    }

    pub fn fail_delete(&self, fail: bool) {
        self.state.lock().unwrap().fail_delete = fail;
    }

    pub fn upsert_calls(&self) -> u32 {
        self.state.lock().unwrap().upsert_calls
    }

    pub fn retrieve_calls(&self) -> u32 {
        self.state.lock().unwrap().retrieve_calls
    }

    pub fn delete_calls(&self) -> u32 {
        self.state.lock().unwrap().delete_calls
    }

    pub fn object_count(&self) -> usize {
        self.state.lock().unwrap().objects.len()
    }

    pub fn object(&self, id: &str) -> Option<CatalogObject> {
        self.state.lock().unwrap().objects.get(id).cloned()
    }

    /// Drop an object behind the engine's back (simulates external drift)
    pub fn forget(&self, id: &str) {
        self.state.lock().unwrap().objects.remove(id);
    }

    pub fn objects(&self) -> Vec<CatalogObject> {
        self.state.lock().unwrap().objects.values().cloned().collect()
    }
}

fn rejected() -> MirrorError {
    MirrorError::Api(vec![CatalogApiError {
        category: "API_ERROR".into(),
        code: "SERVICE_UNAVAILABLE".into(),
        detail: None,
    }])
}

#[async_trait]
impl PosCatalogClient for MockPosClient {
    async fn batch_upsert(
        &self,
        request: BatchUpsertRequest,
    ) -> Result<BatchUpsertResponse, MirrorError> {
        let mut state = self.state.lock().unwrap();
        state.upsert_calls += 1;
        if state.fail_upsert {
            return Err(rejected());
        }

        let mut objects = Vec::with_capacity(request.objects.len());
        let mut id_mappings = Vec::new();
        // First pass: assign ids so intra-batch references can be rewritten
        let mut assigned: HashMap<String, String> = HashMap::new();
        for object in &request.objects {
            if object.is_new() {
                state.next_id += 1;
                assigned.insert(object.id.clone(), format!("POS_{}", state.next_id));
            }
        }
        for mut object in request.objects {
            if let Some(new_id) = assigned.get(&object.id) {
                id_mappings.push(CatalogIdMapping {
                    client_object_id: object.id.clone(),
                    object_id: new_id.clone(),
                });
                object.id = new_id.clone();
            }
            object.data = rewrite_refs(object.data, &assigned);
            object.version += 1;
            state.objects.insert(object.id.clone(), object.clone());
            objects.push(object);
        }
        Ok(BatchUpsertResponse {
            objects,
            id_mappings,
        })
    }

    async fn batch_retrieve(
        &self,
        request: BatchRetrieveRequest,
    ) -> Result<BatchRetrieveResponse, MirrorError> {
        let mut state = self.state.lock().unwrap();
        state.retrieve_calls += 1;
        if state.fail_retrieve {
            return Err(rejected());
        }
        let objects = request
            .object_ids
            .iter()
            .filter_map(|id| state.objects.get(id).cloned())
            .collect();
        Ok(BatchRetrieveResponse {
            objects,
            related_objects: vec![],
        })
    }

    async fn batch_delete(
        &self,
        request: BatchDeleteRequest,
    ) -> Result<BatchDeleteResponse, MirrorError> {
        let mut state = self.state.lock().unwrap();
        state.delete_calls += 1;
        if state.fail_delete {
            return Err(rejected());
        }
        let mut deleted = Vec::new();
        for id in request.object_ids {
            if state.objects.remove(&id).is_some() {
                deleted.push(id);
            }
        }
        Ok(BatchDeleteResponse {
            deleted_object_ids: deleted,
            deleted_at: Some("2026-01-01T00:00:00Z".into()),
        })
    }
}

/// Rewrite intra-batch client-id references to their assigned ids, the way
/// the real POS resolves `#` references on upsert.
fn rewrite_refs(
    data: shared::pos::CatalogObjectData,
    assigned: &HashMap<String, String>,
) -> shared::pos::CatalogObjectData {
    use shared::pos::CatalogObjectData::*;
    match data {
        Item {
            name,
            ordinal,
            present_at_pos,
            present_online,
            modifier_list_ids,
        } => Item {
            name,
            ordinal,
            present_at_pos,
            present_online,
            modifier_list_ids: modifier_list_ids
                .into_iter()
                .map(|id| assigned.get(&id).cloned().unwrap_or(id))
                .collect(),
        },
        ItemVariation {
            item_id,
            name,
            ordinal,
            price_cents,
            sku,
        } => ItemVariation {
            item_id: assigned.get(&item_id).cloned().unwrap_or(item_id),
            name,
            ordinal,
            price_cents,
            sku,
        },
        Modifier {
            modifier_list_id,
            name,
            ordinal,
            price_cents,
        } => Modifier {
            modifier_list_id: assigned
                .get(&modifier_list_id)
                .cloned()
                .unwrap_or(modifier_list_id),
            name,
            ordinal,
            price_cents,
        },
        other => other,
    }
}
