//! Printer Group Repository

use super::{RepoError, RepoResult};
use crate::db::temporal::{self, Versioned};
use shared::models::{PrinterGroup, PrinterGroupCreate, PrinterGroupUpdate};
use shared::util::snowflake_id;
use sqlx::SqlitePool;

impl Versioned for PrinterGroup {
    const TABLE: &'static str = "printer_group_version";

    fn logical_id(&self) -> i64 {
        self.id
    }
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<PrinterGroup>> {
    temporal::find_active(pool, id).await
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<PrinterGroup>> {
    temporal::find_all_active(pool).await
}

pub async fn create(pool: &SqlitePool, data: PrinterGroupCreate) -> RepoResult<PrinterGroup> {
    let group = PrinterGroup::from_create(snowflake_id(), data);
    temporal::create(pool, &group).await?;
    Ok(group)
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: PrinterGroupUpdate,
) -> RepoResult<PrinterGroup> {
    let current = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Printer group {id} not found")))?;
    let next = data.apply(&current);
    temporal::update(pool, &next).await?;
    Ok(next)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<u64> {
    temporal::delete::<PrinterGroup>(pool, id).await
}
