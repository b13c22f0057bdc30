//! Product Instance Repository

use super::{RepoError, RepoResult};
use crate::db::temporal::{self, Versioned};
use shared::models::{ProductInstance, ProductInstanceCreate, ProductInstancePatch};
use shared::util::snowflake_id;
use sqlx::SqlitePool;

impl Versioned for ProductInstance {
    const TABLE: &'static str = "product_instance_version";

    fn logical_id(&self) -> i64 {
        self.id
    }
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<ProductInstance>> {
    temporal::find_active(pool, id).await
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<ProductInstance>> {
    temporal::find_all_active(pool).await
}

/// Active instances for a set of ids, returned in the order of `ids`.
/// Missing ids are silently dropped; callers that care check the length.
pub async fn find_by_ids(pool: &SqlitePool, ids: &[i64]) -> RepoResult<Vec<ProductInstance>> {
    let unordered = temporal::find_active_in::<ProductInstance>(pool, ids).await?;
    let mut by_id: std::collections::HashMap<i64, ProductInstance> =
        unordered.into_iter().map(|i| (i.id, i)).collect();
    Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
}

/// Active instances owned by a product
pub async fn find_by_product(pool: &SqlitePool, product_id: i64) -> RepoResult<Vec<ProductInstance>> {
    let rows: Vec<temporal::VersionRow> = sqlx::query_as(
        "SELECT row_id, logical_id, valid_from, valid_to, created_at, payload \
         FROM product_instance_version \
         WHERE valid_to IS NULL AND json_extract(payload, '$.product_id') = ? \
         ORDER BY logical_id",
    )
    .bind(product_id)
    .fetch_all(pool)
    .await?;
    rows.into_iter()
        .map(|row| {
            serde_json::from_str(&row.payload)
                .map_err(|e| RepoError::Database(format!("corrupt instance payload: {e}")))
        })
        .collect()
}

pub async fn create(
    pool: &SqlitePool,
    product_id: i64,
    data: ProductInstanceCreate,
) -> RepoResult<ProductInstance> {
    let instance = ProductInstance::from_create(snowflake_id(), product_id, data);
    temporal::create(pool, &instance).await?;
    Ok(instance)
}

pub async fn bulk_create(
    pool: &SqlitePool,
    product_id: i64,
    list: Vec<ProductInstanceCreate>,
) -> RepoResult<Vec<ProductInstance>> {
    let instances: Vec<ProductInstance> = list
        .into_iter()
        .map(|data| ProductInstance::from_create(snowflake_id(), product_id, data))
        .collect();
    temporal::bulk_create(pool, &instances).await?;
    Ok(instances)
}

pub async fn update(pool: &SqlitePool, patch: ProductInstancePatch) -> RepoResult<ProductInstance> {
    let current = find_by_id(pool, patch.id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Product instance {} not found", patch.id)))?;
    let next = patch.apply(&current);
    temporal::update(pool, &next).await?;
    Ok(next)
}

pub async fn bulk_update(pool: &SqlitePool, list: Vec<ProductInstancePatch>) -> RepoResult<u64> {
    let mut next_versions = Vec::with_capacity(list.len());
    for patch in list {
        let current = find_by_id(pool, patch.id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Product instance {} not found", patch.id)))?;
        next_versions.push(patch.apply(&current));
    }
    temporal::bulk_update(pool, &next_versions).await
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<u64> {
    temporal::delete::<ProductInstance>(pool, id).await
}

pub async fn bulk_delete(pool: &SqlitePool, ids: &[i64]) -> RepoResult<u64> {
    temporal::bulk_delete::<ProductInstance>(pool, ids).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::MIGRATOR.run(&pool).await.unwrap();
        pool
    }

    fn size(name: &str, adjustment: i64) -> ProductInstanceCreate {
        ProductInstanceCreate {
            name: name.into(),
            price_adjustment: adjustment,
            sku: None,
            sort_order: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_product_filters_ownership() {
        let pool = test_pool().await;
        let a = bulk_create(&pool, 100, vec![size("Small", -200), size("Large", 200)])
            .await
            .unwrap();
        bulk_create(&pool, 200, vec![size("Regular", 0)]).await.unwrap();

        let owned = find_by_product(&pool, 100).await.unwrap();
        assert_eq!(owned.len(), 2);
        assert!(owned.iter().all(|i| i.product_id == 100));

        // Soft-deleted instances disappear from ownership queries
        delete(&pool, a[0].id).await.unwrap();
        let owned = find_by_product(&pool, 100).await.unwrap();
        assert_eq!(owned.len(), 1);
    }

    #[tokio::test]
    async fn test_find_by_ids_preserves_requested_order() {
        let pool = test_pool().await;
        let created = bulk_create(
            &pool,
            100,
            vec![size("S", -200), size("M", 0), size("L", 200)],
        )
        .await
        .unwrap();

        let reversed: Vec<i64> = created.iter().rev().map(|i| i.id).collect();
        let found = find_by_ids(&pool, &reversed).await.unwrap();
        let found_ids: Vec<i64> = found.iter().map(|i| i.id).collect();
        assert_eq!(found_ids, reversed);
    }
}
