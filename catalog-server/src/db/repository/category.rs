//! Category Repository

use super::{RepoError, RepoResult};
use crate::db::temporal::{self, Versioned};
use shared::models::{Category, CategoryCreate, CategoryUpdate};
use shared::util::snowflake_id;
use sqlx::SqlitePool;

impl Versioned for Category {
    const TABLE: &'static str = "category_version";

    fn logical_id(&self) -> i64 {
        self.id
    }
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Category>> {
    temporal::find_active(pool, id).await
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Category>> {
    temporal::find_all_active(pool).await
}

/// Create a category; duplicate names are rejected
pub async fn create(pool: &SqlitePool, data: CategoryCreate) -> RepoResult<Category> {
    let existing = find_all(pool).await?;
    if existing.iter().any(|c| c.name == data.name) {
        return Err(RepoError::Duplicate(format!(
            "Category '{}' already exists",
            data.name
        )));
    }
    let category = Category::from_create(snowflake_id(), data);
    temporal::create(pool, &category).await?;
    Ok(category)
}

pub async fn update(pool: &SqlitePool, id: i64, data: CategoryUpdate) -> RepoResult<Category> {
    let current = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Category {id} not found")))?;
    if let Some(ref new_name) = data.name
        && new_name != &current.name
    {
        let existing = find_all(pool).await?;
        if existing.iter().any(|c| &c.name == new_name) {
            return Err(RepoError::Duplicate(format!(
                "Category '{new_name}' already exists"
            )));
        }
    }
    let next = data.apply(&current);
    temporal::update(pool, &next).await?;
    Ok(next)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<u64> {
    temporal::delete::<Category>(pool, id).await
}
