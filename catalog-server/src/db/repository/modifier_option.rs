//! Modifier Option Repository

use super::{RepoError, RepoResult};
use crate::db::temporal::{self, Versioned};
use shared::models::{ModifierOption, ModifierOptionCreate, ModifierOptionPatch};
use shared::util::snowflake_id;
use sqlx::SqlitePool;

impl Versioned for ModifierOption {
    const TABLE: &'static str = "modifier_option_version";

    fn logical_id(&self) -> i64 {
        self.id
    }
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<ModifierOption>> {
    temporal::find_active(pool, id).await
}

/// Active options for a set of ids, returned in the order of `ids`
pub async fn find_by_ids(pool: &SqlitePool, ids: &[i64]) -> RepoResult<Vec<ModifierOption>> {
    let unordered = temporal::find_active_in::<ModifierOption>(pool, ids).await?;
    let mut by_id: std::collections::HashMap<i64, ModifierOption> =
        unordered.into_iter().map(|o| (o.id, o)).collect();
    Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
}

pub async fn bulk_create(
    pool: &SqlitePool,
    modifier_type_id: i64,
    list: Vec<ModifierOptionCreate>,
) -> RepoResult<Vec<ModifierOption>> {
    let options: Vec<ModifierOption> = list
        .into_iter()
        .map(|data| ModifierOption::from_create(snowflake_id(), modifier_type_id, data))
        .collect();
    temporal::bulk_create(pool, &options).await?;
    Ok(options)
}

pub async fn update(pool: &SqlitePool, patch: ModifierOptionPatch) -> RepoResult<ModifierOption> {
    let current = find_by_id(pool, patch.id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Modifier option {} not found", patch.id)))?;
    let next = patch.apply(&current);
    temporal::update(pool, &next).await?;
    Ok(next)
}

pub async fn bulk_delete(pool: &SqlitePool, ids: &[i64]) -> RepoResult<u64> {
    temporal::bulk_delete::<ModifierOption>(pool, ids).await
}
