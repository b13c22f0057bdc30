//! Product Repository

use super::{RepoError, RepoResult};
use crate::db::temporal::{self, Versioned};
use shared::models::{Product, ProductCreate, ProductUpdate};
use shared::util::snowflake_id;
use sqlx::SqlitePool;

impl Versioned for Product {
    const TABLE: &'static str = "product_version";

    fn logical_id(&self) -> i64 {
        self.id
    }
}

/// Find the active version of a product
pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    temporal::find_active(pool, id).await
}

/// All active products
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Product>> {
    temporal::find_all_active(pool).await
}

/// Active versions for a set of ids
pub async fn find_by_ids(pool: &SqlitePool, ids: &[i64]) -> RepoResult<Vec<Product>> {
    temporal::find_active_in(pool, ids).await
}

/// Product state as of a past instant
pub async fn find_as_of(pool: &SqlitePool, id: i64, at: i64) -> RepoResult<Option<Product>> {
    temporal::find_as_of(pool, id, at).await
}

/// Create a new product (fresh logical id, empty instance roster)
pub async fn create(pool: &SqlitePool, data: ProductCreate) -> RepoResult<Product> {
    let product = Product::from_create(snowflake_id(), data);
    temporal::create(pool, &product).await?;
    Ok(product)
}

pub async fn bulk_create(pool: &SqlitePool, list: Vec<ProductCreate>) -> RepoResult<Vec<Product>> {
    let products: Vec<Product> = list
        .into_iter()
        .map(|data| Product::from_create(snowflake_id(), data))
        .collect();
    temporal::bulk_create(pool, &products).await?;
    Ok(products)
}

/// Merge the partial over the active snapshot and open the new version.
/// NotFound (with zero writes) if the id has no active version.
pub async fn update(pool: &SqlitePool, id: i64, data: ProductUpdate) -> RepoResult<Product> {
    let current = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))?;
    let next = data.apply(&current);
    temporal::update(pool, &next).await?;
    Ok(next)
}

/// All-or-nothing batch update; returns the count of products changed
pub async fn bulk_update(pool: &SqlitePool, list: Vec<(i64, ProductUpdate)>) -> RepoResult<u64> {
    let mut next_versions = Vec::with_capacity(list.len());
    for (id, data) in list {
        let current = find_by_id(pool, id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))?;
        next_versions.push(data.apply(&current));
    }
    temporal::bulk_update(pool, &next_versions).await
}

/// Soft delete; idempotent
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<u64> {
    temporal::delete::<Product>(pool, id).await
}

pub async fn bulk_delete(pool: &SqlitePool, ids: &[i64]) -> RepoResult<u64> {
    temporal::bulk_delete::<Product>(pool, ids).await
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

    fn ramen() -> ProductCreate {
        ProductCreate {
            name: "Ramen".into(),
            category_id: None,
            price: 1250,
            printer_group_id: None,
            modifiers: vec![],
            display: None,
            disabled_window: None,
            availability: None,
            sort_order: None,
        }
    }

    fn price_update(price: i64) -> ProductUpdate {
        ProductUpdate {
            name: None,
            category_id: None,
            price: Some(price),
            printer_group_id: None,
            modifiers: None,
            display: None,
            disabled_window: None,
            availability: None,
            sort_order: None,
        }
    }

    #[tokio::test]
    async fn test_create_opens_single_version() {
        let pool = test_pool().await;
        let p = create(&pool, ramen()).await.unwrap();
        assert_eq!(temporal::count_active::<Product>(&pool, p.id).await.unwrap(), 1);
        let found = find_by_id(&pool, p.id).await.unwrap().unwrap();
        assert_eq!(found, p);
    }

    #[tokio::test]
    async fn test_update_closes_then_opens_exactly_one() {
        let pool = test_pool().await;
        let p = create(&pool, ramen()).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let next = update(&pool, p.id, price_update(1350)).await.unwrap();
        assert_eq!(next.price, 1350);
        assert_eq!(next.name, "Ramen"); // carried forward

        // Exactly one open version, two rows total
        assert_eq!(temporal::count_active::<Product>(&pool, p.id).await.unwrap(), 1);
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM product_version WHERE logical_id = ?")
                .bind(p.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(total, 2);
    }

    #[tokio::test]
    async fn test_update_nonexistent_is_not_found_with_zero_writes() {
        let pool = test_pool().await;
        let err = update(&pool, 999, price_update(100)).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product_version")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_as_of_reads_the_containing_interval() {
        let pool = test_pool().await;
        let p = create(&pool, ramen()).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        let between = shared::util::now_millis();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        update(&pool, p.id, price_update(1350)).await.unwrap();

        let old = find_as_of(&pool, p.id, between).await.unwrap().unwrap();
        assert_eq!(old.price, 1250);
        let now = find_as_of(&pool, p.id, shared::util::now_millis())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(now.price, 1350);
    }

    #[tokio::test]
    async fn test_current_state_holds_for_never_updated_entity() {
        let pool = test_pool().await;
        let p = create(&pool, ramen()).await.unwrap();
        let all = find_all(&pool).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, p.id);
    }

    #[tokio::test]
    async fn test_delete_closes_without_replacement_and_is_idempotent() {
        let pool = test_pool().await;
        let p = create(&pool, ramen()).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        assert_eq!(delete(&pool, p.id).await.unwrap(), 1);
        assert!(find_by_id(&pool, p.id).await.unwrap().is_none());
        assert_eq!(temporal::count_active::<Product>(&pool, p.id).await.unwrap(), 0);

        // Second delete reports zero affected
        assert_eq!(delete(&pool, p.id).await.unwrap(), 0);

        // As-of before the create still finds nothing
        let historic = find_as_of(&pool, p.id, 0).await.unwrap();
        assert!(historic.is_none());
    }

    #[tokio::test]
    async fn test_bulk_update_is_all_or_nothing() {
        let pool = test_pool().await;
        let a = create(&pool, ramen()).await.unwrap();
        let b = create(&pool, ramen()).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        // Last entry targets a missing id → nothing may change
        let err = bulk_update(
            &pool,
            vec![
                (a.id, price_update(1111)),
                (b.id, price_update(2222)),
                (424242, price_update(3333)),
            ],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));

        assert_eq!(find_by_id(&pool, a.id).await.unwrap().unwrap().price, 1250);
        assert_eq!(find_by_id(&pool, b.id).await.unwrap().unwrap().price, 1250);

        // Valid batch updates all
        let count = bulk_update(
            &pool,
            vec![(a.id, price_update(1111)), (b.id, price_update(2222))],
        )
        .await
        .unwrap();
        assert_eq!(count, 2);
        assert_eq!(find_by_id(&pool, a.id).await.unwrap().unwrap().price, 1111);
    }

    #[tokio::test]
    async fn test_create_update_delete_never_exposes_two_open_versions() {
        let pool = test_pool().await;
        let p = create(&pool, ramen()).await.unwrap();
        for price in [1300, 1400, 1500] {
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
            update(&pool, p.id, price_update(price)).await.unwrap();
            assert!(temporal::count_active::<Product>(&pool, p.id).await.unwrap() <= 1);
        }
        delete(&pool, p.id).await.unwrap();
        assert_eq!(temporal::count_active::<Product>(&pool, p.id).await.unwrap(), 0);
    }
}
