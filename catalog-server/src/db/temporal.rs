//! SCD2 version-chain primitives
//!
//! Every catalog family stores its history in a `<family>_version` table:
//! one row per version, `valid_to IS NULL` marking the open row. The
//! close-old/open-new transition always happens inside one transaction —
//! two independent statements would give readers a window with zero active
//! versions. A partial unique index backs the at-most-one-open invariant.

use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::{Sqlite, SqlitePool, Transaction};

use super::repository::{RepoError, RepoResult};
use shared::util::now_millis;

/// An entity family persisted as an SCD2 version chain
pub trait Versioned: Serialize + DeserializeOwned + Send + Sync + Unpin {
    const TABLE: &'static str;

    /// Stable id across the whole version history
    fn logical_id(&self) -> i64;
}

/// Raw version record
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VersionRow {
    pub row_id: i64,
    pub logical_id: i64,
    pub valid_from: i64,
    pub valid_to: Option<i64>,
    pub created_at: i64,
    pub payload: String,
}

const COLUMNS: &str = "row_id, logical_id, valid_from, valid_to, created_at, payload";

fn decode<T: Versioned>(row: VersionRow) -> RepoResult<T> {
    serde_json::from_str(&row.payload).map_err(|e| {
        RepoError::Database(format!(
            "corrupt {} payload at row {}: {e}",
            T::TABLE,
            row.row_id
        ))
    })
}

fn encode<T: Versioned>(entity: &T) -> RepoResult<String> {
    serde_json::to_string(entity)
        .map_err(|e| RepoError::Database(format!("failed to serialize {} payload: {e}", T::TABLE)))
}

// =============================================================================
// Reads (pool-level)
// =============================================================================

/// Open version for a logical id
pub async fn find_active<T: Versioned>(pool: &SqlitePool, id: i64) -> RepoResult<Option<T>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM {} WHERE logical_id = ? AND valid_to IS NULL",
        T::TABLE
    );
    let row: Option<VersionRow> = sqlx::query_as(&sql).bind(id).fetch_optional(pool).await?;
    row.map(decode::<T>).transpose()
}

/// All open versions in the family
pub async fn find_all_active<T: Versioned>(pool: &SqlitePool) -> RepoResult<Vec<T>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM {} WHERE valid_to IS NULL ORDER BY logical_id",
        T::TABLE
    );
    let rows: Vec<VersionRow> = sqlx::query_as(&sql).fetch_all(pool).await?;
    rows.into_iter().map(decode::<T>).collect()
}

/// Open versions for a set of logical ids (result unordered)
pub async fn find_active_in<T: Versioned>(pool: &SqlitePool, ids: &[i64]) -> RepoResult<Vec<T>> {
    if ids.is_empty() {
        return Ok(vec![]);
    }
    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!(
        "SELECT {COLUMNS} FROM {} WHERE valid_to IS NULL AND logical_id IN ({placeholders})",
        T::TABLE
    );
    let mut query = sqlx::query_as::<_, VersionRow>(&sql);
    for id in ids {
        query = query.bind(id);
    }
    let rows = query.fetch_all(pool).await?;
    rows.into_iter().map(decode::<T>).collect()
}

/// Version whose `[valid_from, valid_to)` interval contains `at`
pub async fn find_as_of<T: Versioned>(
    pool: &SqlitePool,
    id: i64,
    at: i64,
) -> RepoResult<Option<T>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM {} WHERE logical_id = ?1 AND valid_from <= ?2 \
         AND (valid_to IS NULL OR valid_to > ?2) ORDER BY valid_from DESC LIMIT 1",
        T::TABLE
    );
    let row: Option<VersionRow> = sqlx::query_as(&sql)
        .bind(id)
        .bind(at)
        .fetch_optional(pool)
        .await?;
    row.map(decode::<T>).transpose()
}

/// Number of open versions for a logical id (0 or 1 when the invariant holds)
pub async fn count_active<T: Versioned>(pool: &SqlitePool, id: i64) -> RepoResult<i64> {
    let sql = format!(
        "SELECT COUNT(*) FROM {} WHERE logical_id = ? AND valid_to IS NULL",
        T::TABLE
    );
    let count: i64 = sqlx::query_scalar(&sql).bind(id).fetch_one(pool).await?;
    Ok(count)
}

// =============================================================================
// Writes (transaction-level building blocks)
// =============================================================================

/// Open a brand-new version row (`valid_from = now`, `valid_to = NULL`)
pub async fn insert_tx<T: Versioned>(
    tx: &mut Transaction<'_, Sqlite>,
    entity: &T,
    now: i64,
) -> RepoResult<()> {
    let sql = format!(
        "INSERT INTO {} (logical_id, valid_from, valid_to, created_at, payload) \
         VALUES (?1, ?2, NULL, ?2, ?3)",
        T::TABLE
    );
    sqlx::query(&sql)
        .bind(entity.logical_id())
        .bind(now)
        .bind(encode(entity)?)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Close the open version; returns rows affected (0 = nothing was open)
pub async fn close_tx<T: Versioned>(
    tx: &mut Transaction<'_, Sqlite>,
    id: i64,
    now: i64,
) -> RepoResult<u64> {
    let sql = format!(
        "UPDATE {} SET valid_to = ?1 WHERE logical_id = ?2 AND valid_to IS NULL",
        T::TABLE
    );
    let result = sqlx::query(&sql).bind(now).bind(id).execute(&mut **tx).await?;
    Ok(result.rows_affected())
}

/// Close the open version and open its replacement, atomically within `tx`.
///
/// NotFound if the id has no open version; the caller's transaction then
/// rolls back whatever else it staged.
pub async fn replace_tx<T: Versioned>(
    tx: &mut Transaction<'_, Sqlite>,
    next: &T,
    now: i64,
) -> RepoResult<()> {
    let closed = close_tx::<T>(tx, next.logical_id(), now).await?;
    if closed == 0 {
        return Err(RepoError::NotFound(format!(
            "{} {} has no active version",
            T::TABLE,
            next.logical_id()
        )));
    }
    insert_tx(tx, next, now).await
}

// =============================================================================
// Writes (pool-level, one transaction per call)
// =============================================================================

pub async fn create<T: Versioned>(pool: &SqlitePool, entity: &T) -> RepoResult<()> {
    let now = now_millis();
    let mut tx = pool.begin().await?;
    insert_tx(&mut tx, entity, now).await?;
    tx.commit().await?;
    Ok(())
}

pub async fn bulk_create<T: Versioned>(pool: &SqlitePool, entities: &[T]) -> RepoResult<()> {
    if entities.is_empty() {
        return Ok(());
    }
    let now = now_millis();
    let mut tx = pool.begin().await?;
    for entity in entities {
        insert_tx(&mut tx, entity, now).await?;
    }
    tx.commit().await?;
    Ok(())
}

/// §4.1 update: fails NotFound without writes if the id is not active
pub async fn update<T: Versioned>(pool: &SqlitePool, next: &T) -> RepoResult<()> {
    let now = now_millis();
    let mut tx = pool.begin().await?;
    replace_tx(&mut tx, next, now).await?;
    tx.commit().await?;
    Ok(())
}

/// All-or-nothing bulk replacement; returns the number of logical entities
/// changed. A single missing target rolls back the whole batch.
pub async fn bulk_update<T: Versioned>(pool: &SqlitePool, entities: &[T]) -> RepoResult<u64> {
    if entities.is_empty() {
        return Ok(0);
    }
    let now = now_millis();
    let mut tx = pool.begin().await?;
    for entity in entities {
        replace_tx(&mut tx, entity, now).await?;
    }
    tx.commit().await?;
    Ok(entities.len() as u64)
}

/// Soft delete: close the open version with no replacement. Idempotent —
/// an already-inactive id reports zero affected.
pub async fn delete<T: Versioned>(pool: &SqlitePool, id: i64) -> RepoResult<u64> {
    let now = now_millis();
    let mut tx = pool.begin().await?;
    let closed = close_tx::<T>(&mut tx, id, now).await?;
    tx.commit().await?;
    Ok(closed)
}

pub async fn bulk_delete<T: Versioned>(pool: &SqlitePool, ids: &[i64]) -> RepoResult<u64> {
    if ids.is_empty() {
        return Ok(0);
    }
    let now = now_millis();
    let mut tx = pool.begin().await?;
    let mut closed = 0u64;
    for id in ids {
        closed += close_tx::<T>(&mut tx, *id, now).await?;
    }
    tx.commit().await?;
    Ok(closed)
}
