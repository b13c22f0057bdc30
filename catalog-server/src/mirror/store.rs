//! Persisted POS id mappings
//!
//! One row per (entity kind, logical id, key). The key names the external
//! system and object kind ("pos:item"); values are POS object ids.

use std::collections::HashMap;

use sqlx::SqlitePool;

use crate::db::repository::RepoResult;

/// Catalog families that mirror into the POS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Product,
    ProductInstance,
    ModifierType,
    ModifierOption,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Product => "product",
            EntityKind::ProductInstance => "product_instance",
            EntityKind::ModifierType => "modifier_type",
            EntityKind::ModifierOption => "modifier_option",
        }
    }

    /// Mapping key: external system + object kind
    pub fn map_key(&self) -> &'static str {
        match self {
            EntityKind::Product => "pos:item",
            EntityKind::ProductInstance => "pos:item_variation",
            EntityKind::ModifierType => "pos:modifier_list",
            EntityKind::ModifierOption => "pos:modifier",
        }
    }

    fn from_str(s: &str) -> Option<Self> {
        match s {
            "product" => Some(EntityKind::Product),
            "product_instance" => Some(EntityKind::ProductInstance),
            "modifier_type" => Some(EntityKind::ModifierType),
            "modifier_option" => Some(EntityKind::ModifierOption),
            _ => None,
        }
    }
}

/// A mapping row to persist
#[derive(Debug, Clone)]
pub struct MappingEntry {
    pub kind: EntityKind,
    pub logical_id: i64,
    pub external_id: String,
    pub synced_at: i64,
}

/// Load mappings for the given (kind, id) pairs
pub async fn load(
    pool: &SqlitePool,
    pairs: &[(EntityKind, i64)],
) -> RepoResult<HashMap<(EntityKind, i64), String>> {
    if pairs.is_empty() {
        return Ok(HashMap::new());
    }
    let mut clauses = Vec::with_capacity(pairs.len());
    for _ in pairs {
        clauses.push("(entity_kind = ? AND logical_id = ? AND map_key = ?)");
    }
    let sql = format!(
        "SELECT entity_kind, logical_id, external_id FROM external_id_map WHERE {}",
        clauses.join(" OR ")
    );
    let mut query = sqlx::query_as::<_, (String, i64, String)>(&sql);
    for (kind, id) in pairs {
        query = query.bind(kind.as_str()).bind(id).bind(kind.map_key());
    }
    let rows = query.fetch_all(pool).await?;

    let mut mappings = HashMap::with_capacity(rows.len());
    for (kind_str, logical_id, external_id) in rows {
        if let Some(kind) = EntityKind::from_str(&kind_str) {
            mappings.insert((kind, logical_id), external_id);
        }
    }
    Ok(mappings)
}

/// Persist mappings, overwriting by key — re-syncs are idempotent
pub async fn put(pool: &SqlitePool, entries: &[MappingEntry]) -> RepoResult<()> {
    if entries.is_empty() {
        return Ok(());
    }
    let mut tx = pool.begin().await?;
    for entry in entries {
        sqlx::query(
            "INSERT OR REPLACE INTO external_id_map \
             (entity_kind, logical_id, map_key, external_id, synced_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(entry.kind.as_str())
        .bind(entry.logical_id)
        .bind(entry.kind.map_key())
        .bind(&entry.external_id)
        .bind(entry.synced_at)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

/// Drop mappings for the given pairs (deleted or stale entities)
pub async fn remove(pool: &SqlitePool, pairs: &[(EntityKind, i64)]) -> RepoResult<u64> {
    if pairs.is_empty() {
        return Ok(0);
    }
    let mut tx = pool.begin().await?;
    let mut removed = 0u64;
    for (kind, id) in pairs {
        let result = sqlx::query(
            "DELETE FROM external_id_map WHERE entity_kind = ?1 AND logical_id = ?2 AND map_key = ?3",
        )
        .bind(kind.as_str())
        .bind(id)
        .bind(kind.map_key())
        .execute(&mut *tx)
        .await?;
        removed += result.rows_affected();
    }
    tx.commit().await?;
    Ok(removed)
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

    #[tokio::test]
    async fn test_put_overwrites_by_key() {
        let pool = test_pool().await;
        let entry = MappingEntry {
            kind: EntityKind::Product,
            logical_id: 1,
            external_id: "OBJ_A".into(),
            synced_at: 1000,
        };
        put(&pool, &[entry.clone()]).await.unwrap();
        put(
            &pool,
            &[MappingEntry {
                external_id: "OBJ_B".into(),
                synced_at: 2000,
                ..entry
            }],
        )
        .await
        .unwrap();

        let mappings = load(&pool, &[(EntityKind::Product, 1)]).await.unwrap();
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[&(EntityKind::Product, 1)], "OBJ_B");
    }

    #[tokio::test]
    async fn test_kinds_do_not_collide() {
        let pool = test_pool().await;
        put(
            &pool,
            &[
                MappingEntry {
                    kind: EntityKind::Product,
                    logical_id: 7,
                    external_id: "ITEM_7".into(),
                    synced_at: 1000,
                },
                MappingEntry {
                    kind: EntityKind::ProductInstance,
                    logical_id: 7,
                    external_id: "VAR_7".into(),
                    synced_at: 1000,
                },
            ],
        )
        .await
        .unwrap();

        let mappings = load(
            &pool,
            &[(EntityKind::Product, 7), (EntityKind::ProductInstance, 7)],
        )
        .await
        .unwrap();
        assert_eq!(mappings[&(EntityKind::Product, 7)], "ITEM_7");
        assert_eq!(mappings[&(EntityKind::ProductInstance, 7)], "VAR_7");

        assert_eq!(remove(&pool, &[(EntityKind::Product, 7)]).await.unwrap(), 1);
        let left = load(
            &pool,
            &[(EntityKind::Product, 7), (EntityKind::ProductInstance, 7)],
        )
        .await
        .unwrap();
        assert_eq!(left.len(), 1);
    }
}
