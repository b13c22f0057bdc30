//! Modifier Type Repository

use super::{RepoError, RepoResult};
use crate::db::temporal::{self, Versioned};
use shared::models::{ModifierType, ModifierTypeCreate, ModifierTypeUpdate};
use shared::util::snowflake_id;
use sqlx::SqlitePool;

impl Versioned for ModifierType {
    const TABLE: &'static str = "modifier_type_version";

    fn logical_id(&self) -> i64 {
        self.id
    }
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<ModifierType>> {
    temporal::find_active(pool, id).await
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<ModifierType>> {
    temporal::find_all_active(pool).await
}

pub async fn find_by_ids(pool: &SqlitePool, ids: &[i64]) -> RepoResult<Vec<ModifierType>> {
    temporal::find_active_in(pool, ids).await
}

pub async fn create(pool: &SqlitePool, data: ModifierTypeCreate) -> RepoResult<ModifierType> {
    let modifier_type = ModifierType::from_create(snowflake_id(), data);
    temporal::create(pool, &modifier_type).await?;
    Ok(modifier_type)
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: ModifierTypeUpdate,
) -> RepoResult<ModifierType> {
    let current = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Modifier type {id} not found")))?;
    let next = data.apply(&current);
    temporal::update(pool, &next).await?;
    Ok(next)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<u64> {
    temporal::delete::<ModifierType>(pool, id).await
}
