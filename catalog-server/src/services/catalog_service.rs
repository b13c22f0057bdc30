//! Catalog Service — batch upsert orchestrators
//!
//! One orchestrator call is one logical batch: validate every request up
//! front (any violation fails the whole call with zero writes), apply all
//! canonical writes in a single transaction, then drive the POS mirror once
//! per family and fire the recompute trigger once per successful batch.
//! Canonical writes and the mirror call are deliberately not one
//! cross-system transaction — a mirror failure after commit surfaces as a
//! failed call while the canonical state stands, and the drift check heals
//! the POS on the next sync.

use std::collections::HashSet;
use std::sync::Arc;

use sqlx::SqlitePool;

use crate::db::repository::{
    RepoError, category, modifier_option, modifier_type, printer_group, product,
    product_instance,
};
use crate::db::temporal;
use crate::mirror::store::EntityKind;
use crate::mirror::{MirrorAdapter, PosCatalogClient};
use shared::models::{
    Category, CategoryUpsert, InstanceEntry, ModifierOption, ModifierType, ModifierTypeUpsert,
    ModifierTypeWithOptions, OptionEntry, PrinterGroup, PrinterGroupUpsert, Product,
    ProductInstance, ProductUpsert, ProductWithInstances,
};
use shared::util::{now_millis, snowflake_id};

use super::UpsertError;
use super::change_detector::{
    detect_product_change, instance_patch_is_noop, modifier_type_change, option_patch_is_noop,
};
use super::notify::CatalogNotifier;

/// Orchestrates catalog mutations across the temporal store and the POS
/// mirror. Every public method collapses failures to `None`; diagnostics are
/// logged where they are detected.
#[derive(Clone)]
pub struct CatalogService {
    pool: SqlitePool,
    mirror: MirrorAdapter,
    notifier: Arc<dyn CatalogNotifier>,
}

/// Planned work for one product request, computed before any write
struct ProductPlan {
    product: Product,
    is_create: bool,
    product_write: bool,
    instance_creates: Vec<ProductInstance>,
    instance_updates: Vec<ProductInstance>,
    instance_removes: Vec<i64>,
    instances_final: Vec<ProductInstance>,
}

/// Planned work for one modifier-type request
struct ModifierPlan {
    modifier_type: ModifierType,
    is_create: bool,
    type_write: bool,
    option_creates: Vec<ModifierOption>,
    option_updates: Vec<ModifierOption>,
    option_removes: Vec<i64>,
    options_final: Vec<ModifierOption>,
}

impl CatalogService {
    pub fn new(
        pool: SqlitePool,
        client: Arc<dyn PosCatalogClient>,
        notifier: Arc<dyn CatalogNotifier>,
    ) -> Self {
        Self {
            pool,
            mirror: MirrorAdapter::new(client),
            notifier,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Apply an ordered batch of product creates/updates.
    ///
    /// Returns the products with their instances in input order, or `None`
    /// on any failure — validation, missing target, storage or mirror.
    pub async fn batch_upsert_products(
        &self,
        requests: Vec<ProductUpsert>,
    ) -> Option<Vec<ProductWithInstances>> {
        match self.try_batch_upsert_products(requests).await {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::error!("batch product upsert failed: {e}");
                None
            }
        }
    }

    async fn try_batch_upsert_products(
        &self,
        requests: Vec<ProductUpsert>,
    ) -> Result<Vec<ProductWithInstances>, UpsertError> {
        let mut plans: Vec<ProductPlan> = Vec::with_capacity(requests.len());

        for request in requests {
            match request {
                ProductUpsert::Create(req) => {
                    let product_id = snowflake_id();
                    let instances: Vec<ProductInstance> = req
                        .instances
                        .into_iter()
                        .map(|data| ProductInstance::from_create(snowflake_id(), product_id, data))
                        .collect();
                    let mut product = Product::from_create(product_id, req.data);
                    product.instance_ids = instances.iter().map(|i| i.id).collect();
                    plans.push(ProductPlan {
                        product,
                        is_create: true,
                        product_write: true,
                        instance_creates: instances.clone(),
                        instance_updates: vec![],
                        instance_removes: vec![],
                        instances_final: instances,
                    });
                }
                ProductUpsert::Update(req) => {
                    let current = product::find_by_id(&self.pool, req.id).await?.ok_or_else(
                        || UpsertError::NotFound(format!("Product {} not found", req.id)),
                    )?;
                    let change = detect_product_change(&current, &req.data);
                    let mut next = change.next;
                    let mut product_write = change.field_changed;

                    let current_instances =
                        product_instance::find_by_ids(&self.pool, &current.instance_ids).await?;
                    let by_id: std::collections::HashMap<i64, &ProductInstance> =
                        current_instances.iter().map(|i| (i.id, i)).collect();

                    let mut instance_creates: Vec<ProductInstance> = vec![];
                    let mut instance_updates: Vec<ProductInstance> = vec![];
                    let mut instance_removes: Vec<i64> = vec![];
                    let mut instances_final: Vec<ProductInstance> = vec![];

                    match req.instances {
                        None => {
                            // Roster untouched
                            instances_final = current_instances.clone();
                        }
                        Some(entries) => {
                            let mut roster: Vec<i64> = Vec::with_capacity(entries.len());
                            let mut seen: HashSet<i64> = HashSet::new();
                            for entry in entries {
                                match entry {
                                    InstanceEntry::Keep(id) => {
                                        let cur = *by_id.get(&id).ok_or_else(|| {
                                            UpsertError::Validation(format!(
                                                "instance {id} does not belong to product {}",
                                                current.id
                                            ))
                                        })?;
                                        if !seen.insert(id) {
                                            return Err(UpsertError::Validation(format!(
                                                "instance {id} listed twice"
                                            )));
                                        }
                                        roster.push(id);
                                        instances_final.push(cur.clone());
                                    }
                                    InstanceEntry::Update(patch) => {
                                        let cur = *by_id.get(&patch.id).ok_or_else(|| {
                                            UpsertError::Validation(format!(
                                                "instance {} does not belong to product {}",
                                                patch.id, current.id
                                            ))
                                        })?;
                                        if !seen.insert(patch.id) {
                                            return Err(UpsertError::Validation(format!(
                                                "instance {} listed twice",
                                                patch.id
                                            )));
                                        }
                                        roster.push(patch.id);
                                        if instance_patch_is_noop(cur, &patch) {
                                            instances_final.push(cur.clone());
                                        } else {
                                            let next_instance = patch.apply(cur);
                                            instance_updates.push(next_instance.clone());
                                            instances_final.push(next_instance);
                                        }
                                    }
                                    InstanceEntry::Create(data) => {
                                        let instance = ProductInstance::from_create(
                                            snowflake_id(),
                                            current.id,
                                            data,
                                        );
                                        roster.push(instance.id);
                                        instance_creates.push(instance.clone());
                                        instances_final.push(instance);
                                    }
                                }
                            }
                            // The roster is the complete new list: current
                            // instances left out of it are closed.
                            for id in &current.instance_ids {
                                if !roster.contains(id) {
                                    instance_removes.push(*id);
                                }
                            }
                            if roster != current.instance_ids {
                                next.instance_ids = roster;
                                product_write = true;
                            }
                        }
                    }

                    // Cascade: parent change affects the instances'
                    // externally-visible representation — force the
                    // otherwise-unchanged ones into the update set.
                    if change.cascade {
                        let touched: HashSet<i64> = instance_updates
                            .iter()
                            .chain(instance_creates.iter())
                            .map(|i| i.id)
                            .collect();
                        for instance in &instances_final {
                            if !touched.contains(&instance.id) {
                                instance_updates.push(instance.clone());
                            }
                        }
                    }

                    plans.push(ProductPlan {
                        product: next,
                        is_create: false,
                        product_write,
                        instance_creates,
                        instance_updates,
                        instance_removes,
                        instances_final,
                    });
                }
            }
        }

        self.validate_product_references(&plans).await?;

        // ── Canonical writes: one transaction for the whole batch ──
        let any_write = plans.iter().any(|p| {
            p.product_write
                || !p.instance_creates.is_empty()
                || !p.instance_updates.is_empty()
                || !p.instance_removes.is_empty()
        });
        if any_write {
            let now = now_millis();
            let mut tx = self.pool.begin().await.map_err(|e| UpsertError::Storage(RepoError::from(e)))?;
            for plan in &plans {
                if plan.is_create {
                    temporal::insert_tx(&mut tx, &plan.product, now).await?;
                } else if plan.product_write {
                    temporal::replace_tx(&mut tx, &plan.product, now).await?;
                }
                for instance in &plan.instance_creates {
                    temporal::insert_tx(&mut tx, instance, now).await?;
                }
                for instance in &plan.instance_updates {
                    temporal::replace_tx(&mut tx, instance, now).await?;
                }
                for id in &plan.instance_removes {
                    temporal::close_tx::<ProductInstance>(&mut tx, *id, now).await?;
                }
            }
            tx.commit()
                .await
                .map_err(|e| UpsertError::Storage(RepoError::from(e)))?;
        }

        let results: Vec<ProductWithInstances> = plans
            .iter()
            .map(|p| ProductWithInstances {
                product: p.product.clone(),
                instances: p.instances_final.clone(),
            })
            .collect();

        // ── Mirror: skip entirely when nothing changed and every entity is
        // already mapped (boot-time idempotence) ──
        let mut pairs: Vec<(EntityKind, i64)> = Vec::new();
        for result in &results {
            pairs.push((EntityKind::Product, result.product.id));
            for instance in &result.instances {
                pairs.push((EntityKind::ProductInstance, instance.id));
            }
        }
        let skip_mirror = !any_write
            && self
                .mirror
                .has_complete_mappings(&self.pool, &pairs)
                .await?;
        if !skip_mirror {
            self.mirror.sync_products(&self.pool, &results).await?;
        }
        let removed_pairs: Vec<(EntityKind, i64)> = plans
            .iter()
            .flat_map(|p| p.instance_removes.iter())
            .map(|id| (EntityKind::ProductInstance, *id))
            .collect();
        if !removed_pairs.is_empty() {
            self.mirror.delete_entities(&self.pool, &removed_pairs).await;
        }

        if any_write {
            self.notifier.catalog_changed().await;
        }

        Ok(results)
    }

    /// Referential integrity for a product batch: modifier types, printer
    /// groups and categories must resolve to active versions.
    async fn validate_product_references(&self, plans: &[ProductPlan]) -> Result<(), UpsertError> {
        let mut modifier_ids: HashSet<i64> = HashSet::new();
        let mut printer_ids: HashSet<i64> = HashSet::new();
        let mut category_ids: HashSet<i64> = HashSet::new();
        for plan in plans {
            for mref in &plan.product.modifiers {
                modifier_ids.insert(mref.modifier_type_id);
            }
            if let Some(id) = plan.product.printer_group_id {
                printer_ids.insert(id);
            }
            if let Some(id) = plan.product.category_id {
                category_ids.insert(id);
            }
        }

        let wanted: Vec<i64> = modifier_ids.iter().copied().collect();
        let found = modifier_type::find_by_ids(&self.pool, &wanted).await?;
        let found_ids: HashSet<i64> = found.iter().map(|m| m.id).collect();
        for id in &modifier_ids {
            if !found_ids.contains(id) {
                return Err(UpsertError::Validation(format!(
                    "modifier type {id} does not exist"
                )));
            }
        }
        for id in printer_ids {
            if printer_group::find_by_id(&self.pool, id).await?.is_none() {
                return Err(UpsertError::Validation(format!(
                    "printer group {id} does not exist"
                )));
            }
        }
        for id in category_ids {
            if category::find_by_id(&self.pool, id).await?.is_none() {
                return Err(UpsertError::Validation(format!(
                    "category {id} does not exist"
                )));
            }
        }
        Ok(())
    }

    // =========================================================================
    // Modifier types
    // =========================================================================

    pub async fn batch_upsert_modifier_types(
        &self,
        requests: Vec<ModifierTypeUpsert>,
    ) -> Option<Vec<ModifierTypeWithOptions>> {
        match self.try_batch_upsert_modifier_types(requests).await {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::error!("batch modifier type upsert failed: {e}");
                None
            }
        }
    }

    async fn try_batch_upsert_modifier_types(
        &self,
        requests: Vec<ModifierTypeUpsert>,
    ) -> Result<Vec<ModifierTypeWithOptions>, UpsertError> {
        let mut plans: Vec<ModifierPlan> = Vec::with_capacity(requests.len());

        for request in requests {
            match request {
                ModifierTypeUpsert::Create(req) => {
                    let type_id = snowflake_id();
                    let options: Vec<ModifierOption> = req
                        .options
                        .into_iter()
                        .map(|data| ModifierOption::from_create(snowflake_id(), type_id, data))
                        .collect();
                    let mut modifier_type = ModifierType::from_create(type_id, req.data);
                    modifier_type.option_ids = options.iter().map(|o| o.id).collect();
                    plans.push(ModifierPlan {
                        modifier_type,
                        is_create: true,
                        type_write: true,
                        option_creates: options.clone(),
                        option_updates: vec![],
                        option_removes: vec![],
                        options_final: options,
                    });
                }
                ModifierTypeUpsert::Update(req) => {
                    let current = modifier_type::find_by_id(&self.pool, req.id)
                        .await?
                        .ok_or_else(|| {
                            UpsertError::NotFound(format!("Modifier type {} not found", req.id))
                        })?;
                    let (mut next, mut type_write) = modifier_type_change(&current, &req.data);

                    let current_options =
                        modifier_option::find_by_ids(&self.pool, &current.option_ids).await?;
                    let by_id: std::collections::HashMap<i64, &ModifierOption> =
                        current_options.iter().map(|o| (o.id, o)).collect();

                    let mut option_creates: Vec<ModifierOption> = vec![];
                    let mut option_updates: Vec<ModifierOption> = vec![];
                    let mut option_removes: Vec<i64> = vec![];
                    let mut options_final: Vec<ModifierOption> = vec![];

                    match req.options {
                        None => {
                            options_final = current_options.clone();
                        }
                        Some(entries) => {
                            let mut roster: Vec<i64> = Vec::with_capacity(entries.len());
                            let mut seen: HashSet<i64> = HashSet::new();
                            for entry in entries {
                                match entry {
                                    OptionEntry::Keep(id) => {
                                        let cur = *by_id.get(&id).ok_or_else(|| {
                                            UpsertError::Validation(format!(
                                                "option {id} does not belong to modifier type {}",
                                                current.id
                                            ))
                                        })?;
                                        if !seen.insert(id) {
                                            return Err(UpsertError::Validation(format!(
                                                "option {id} listed twice"
                                            )));
                                        }
                                        roster.push(id);
                                        options_final.push(cur.clone());
                                    }
                                    OptionEntry::Update(patch) => {
                                        let cur = *by_id.get(&patch.id).ok_or_else(|| {
                                            UpsertError::Validation(format!(
                                                "option {} does not belong to modifier type {}",
                                                patch.id, current.id
                                            ))
                                        })?;
                                        if !seen.insert(patch.id) {
                                            return Err(UpsertError::Validation(format!(
                                                "option {} listed twice",
                                                patch.id
                                            )));
                                        }
                                        roster.push(patch.id);
                                        if option_patch_is_noop(cur, &patch) {
                                            options_final.push(cur.clone());
                                        } else {
                                            let next_option = patch.apply(cur);
                                            option_updates.push(next_option.clone());
                                            options_final.push(next_option);
                                        }
                                    }
                                    OptionEntry::Create(data) => {
                                        let option = ModifierOption::from_create(
                                            snowflake_id(),
                                            current.id,
                                            data,
                                        );
                                        roster.push(option.id);
                                        option_creates.push(option.clone());
                                        options_final.push(option);
                                    }
                                }
                            }
                            for id in &current.option_ids {
                                if !roster.contains(id) {
                                    option_removes.push(*id);
                                }
                            }
                            if roster != current.option_ids {
                                next.option_ids = roster;
                                type_write = true;
                            }
                        }
                    }

                    plans.push(ModifierPlan {
                        modifier_type: next,
                        is_create: false,
                        type_write,
                        option_creates,
                        option_updates,
                        option_removes,
                        options_final,
                    });
                }
            }
        }

        let any_write = plans.iter().any(|p| {
            p.type_write
                || !p.option_creates.is_empty()
                || !p.option_updates.is_empty()
                || !p.option_removes.is_empty()
        });
        if any_write {
            let now = now_millis();
            let mut tx = self.pool.begin().await.map_err(|e| UpsertError::Storage(RepoError::from(e)))?;
            for plan in &plans {
                if plan.is_create {
                    temporal::insert_tx(&mut tx, &plan.modifier_type, now).await?;
                } else if plan.type_write {
                    temporal::replace_tx(&mut tx, &plan.modifier_type, now).await?;
                }
                for option in &plan.option_creates {
                    temporal::insert_tx(&mut tx, option, now).await?;
                }
                for option in &plan.option_updates {
                    temporal::replace_tx(&mut tx, option, now).await?;
                }
                for id in &plan.option_removes {
                    temporal::close_tx::<ModifierOption>(&mut tx, *id, now).await?;
                }
            }
            tx.commit()
                .await
                .map_err(|e| UpsertError::Storage(RepoError::from(e)))?;
        }

        let results: Vec<ModifierTypeWithOptions> = plans
            .iter()
            .map(|p| ModifierTypeWithOptions {
                modifier_type: p.modifier_type.clone(),
                options: p.options_final.clone(),
            })
            .collect();

        let mut pairs: Vec<(EntityKind, i64)> = Vec::new();
        for result in &results {
            pairs.push((EntityKind::ModifierType, result.modifier_type.id));
            for option in &result.options {
                pairs.push((EntityKind::ModifierOption, option.id));
            }
        }
        let skip_mirror = !any_write
            && self
                .mirror
                .has_complete_mappings(&self.pool, &pairs)
                .await?;
        if !skip_mirror {
            self.mirror.sync_modifier_types(&self.pool, &results).await?;
        }
        let removed_pairs: Vec<(EntityKind, i64)> = plans
            .iter()
            .flat_map(|p| p.option_removes.iter())
            .map(|id| (EntityKind::ModifierOption, *id))
            .collect();
        if !removed_pairs.is_empty() {
            self.mirror.delete_entities(&self.pool, &removed_pairs).await;
        }

        if any_write {
            self.notifier.catalog_changed().await;
        }

        Ok(results)
    }

    // =========================================================================
    // Categories and printer groups (canonical-only families)
    // =========================================================================

    pub async fn batch_upsert_categories(
        &self,
        requests: Vec<CategoryUpsert>,
    ) -> Option<Vec<Category>> {
        match self.try_batch_upsert_categories(requests).await {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::error!("batch category upsert failed: {e}");
                None
            }
        }
    }

    async fn try_batch_upsert_categories(
        &self,
        requests: Vec<CategoryUpsert>,
    ) -> Result<Vec<Category>, UpsertError> {
        let existing = category::find_all(&self.pool).await?;
        let mut names: HashSet<String> = existing.iter().map(|c| c.name.clone()).collect();

        let mut results: Vec<Category> = Vec::with_capacity(requests.len());
        let mut writes: Vec<(Category, bool)> = Vec::new(); // (snapshot, is_create)
        for request in requests {
            match request {
                CategoryUpsert::Create(data) => {
                    if !names.insert(data.name.clone()) {
                        return Err(UpsertError::Validation(format!(
                            "category '{}' already exists",
                            data.name
                        )));
                    }
                    let next = Category::from_create(snowflake_id(), data);
                    writes.push((next.clone(), true));
                    results.push(next);
                }
                CategoryUpsert::Update(req) => {
                    let current = existing.iter().find(|c| c.id == req.id).ok_or_else(|| {
                        UpsertError::NotFound(format!("Category {} not found", req.id))
                    })?;
                    if let Some(ref new_name) = req.data.name
                        && new_name != &current.name
                        && !names.insert(new_name.clone())
                    {
                        return Err(UpsertError::Validation(format!(
                            "category '{new_name}' already exists"
                        )));
                    }
                    let next = req.data.apply(current);
                    if next != *current {
                        writes.push((next.clone(), false));
                    }
                    results.push(next);
                }
            }
        }

        if !writes.is_empty() {
            let now = now_millis();
            let mut tx = self.pool.begin().await.map_err(|e| UpsertError::Storage(RepoError::from(e)))?;
            for (snapshot, is_create) in &writes {
                if *is_create {
                    temporal::insert_tx(&mut tx, snapshot, now).await?;
                } else {
                    temporal::replace_tx(&mut tx, snapshot, now).await?;
                }
            }
            tx.commit()
                .await
                .map_err(|e| UpsertError::Storage(RepoError::from(e)))?;
            self.notifier.catalog_changed().await;
        }

        Ok(results)
    }

    pub async fn batch_upsert_printer_groups(
        &self,
        requests: Vec<PrinterGroupUpsert>,
    ) -> Option<Vec<PrinterGroup>> {
        match self.try_batch_upsert_printer_groups(requests).await {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::error!("batch printer group upsert failed: {e}");
                None
            }
        }
    }

    async fn try_batch_upsert_printer_groups(
        &self,
        requests: Vec<PrinterGroupUpsert>,
    ) -> Result<Vec<PrinterGroup>, UpsertError> {
        let mut results: Vec<PrinterGroup> = Vec::with_capacity(requests.len());
        let mut writes: Vec<(PrinterGroup, bool)> = Vec::new();
        for request in requests {
            match request {
                PrinterGroupUpsert::Create(data) => {
                    let next = PrinterGroup::from_create(snowflake_id(), data);
                    writes.push((next.clone(), true));
                    results.push(next);
                }
                PrinterGroupUpsert::Update(req) => {
                    let current = printer_group::find_by_id(&self.pool, req.id)
                        .await?
                        .ok_or_else(|| {
                            UpsertError::NotFound(format!("Printer group {} not found", req.id))
                        })?;
                    let next = req.data.apply(&current);
                    if next != current {
                        writes.push((next.clone(), false));
                    }
                    results.push(next);
                }
            }
        }

        if !writes.is_empty() {
            let now = now_millis();
            let mut tx = self.pool.begin().await.map_err(|e| UpsertError::Storage(RepoError::from(e)))?;
            for (snapshot, is_create) in &writes {
                if *is_create {
                    temporal::insert_tx(&mut tx, snapshot, now).await?;
                } else {
                    temporal::replace_tx(&mut tx, snapshot, now).await?;
                }
            }
            tx.commit()
                .await
                .map_err(|e| UpsertError::Storage(RepoError::from(e)))?;
            self.notifier.catalog_changed().await;
        }

        Ok(results)
    }

    // =========================================================================
    // Deletes (canonical soft delete; mirror lag tolerated)
    // =========================================================================

    /// Soft-delete a product and its instances. Idempotent — an inactive id
    /// reports zero affected. Returns the number of logical entities closed.
    pub async fn delete_product(&self, id: i64) -> Option<u64> {
        match self.try_delete_product(id).await {
            Ok(count) => Some(count),
            Err(e) => {
                tracing::error!("product delete failed: {e}");
                None
            }
        }
    }

    async fn try_delete_product(&self, id: i64) -> Result<u64, UpsertError> {
        let Some(current) = product::find_by_id(&self.pool, id).await? else {
            return Ok(0);
        };

        let now = now_millis();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| UpsertError::Storage(RepoError::from(e)))?;
        let mut closed = temporal::close_tx::<Product>(&mut tx, id, now).await?;
        for instance_id in &current.instance_ids {
            closed += temporal::close_tx::<ProductInstance>(&mut tx, *instance_id, now).await?;
        }
        tx.commit()
            .await
            .map_err(|e| UpsertError::Storage(RepoError::from(e)))?;

        let mut pairs = vec![(EntityKind::Product, id)];
        pairs.extend(
            current
                .instance_ids
                .iter()
                .map(|i| (EntityKind::ProductInstance, *i)),
        );
        self.mirror.delete_entities(&self.pool, &pairs).await;

        self.notifier.catalog_changed().await;
        Ok(closed)
    }

    /// Soft-delete a modifier type and its options, detaching it from every
    /// product that referenced it (which re-syncs those products).
    pub async fn delete_modifier_type(&self, id: i64) -> Option<u64> {
        match self.try_delete_modifier_type(id).await {
            Ok(count) => Some(count),
            Err(e) => {
                tracing::error!("modifier type delete failed: {e}");
                None
            }
        }
    }

    async fn try_delete_modifier_type(&self, id: i64) -> Result<u64, UpsertError> {
        let Some(current) = modifier_type::find_by_id(&self.pool, id).await? else {
            return Ok(0);
        };

        // Products losing the reference change their effective modifier set,
        // so their instances are dependent-dirty as well.
        let all_products = product::find_all(&self.pool).await?;
        let mut affected: Vec<ProductWithInstances> = Vec::new();
        for mut p in all_products {
            if p.modifiers.iter().any(|m| m.modifier_type_id == id) {
                p.modifiers.retain(|m| m.modifier_type_id != id);
                let instances = product_instance::find_by_ids(&self.pool, &p.instance_ids).await?;
                affected.push(ProductWithInstances {
                    product: p,
                    instances,
                });
            }
        }

        let now = now_millis();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| UpsertError::Storage(RepoError::from(e)))?;
        let mut closed = temporal::close_tx::<ModifierType>(&mut tx, id, now).await?;
        for option_id in &current.option_ids {
            closed += temporal::close_tx::<ModifierOption>(&mut tx, *option_id, now).await?;
        }
        for entry in &affected {
            temporal::replace_tx(&mut tx, &entry.product, now).await?;
            for instance in &entry.instances {
                temporal::replace_tx(&mut tx, instance, now).await?;
            }
        }
        tx.commit()
            .await
            .map_err(|e| UpsertError::Storage(RepoError::from(e)))?;

        let mut pairs = vec![(EntityKind::ModifierType, id)];
        pairs.extend(
            current
                .option_ids
                .iter()
                .map(|o| (EntityKind::ModifierOption, *o)),
        );
        self.mirror.delete_entities(&self.pool, &pairs).await;
        if !affected.is_empty() {
            self.mirror.sync_products(&self.pool, &affected).await?;
        }

        self.notifier.catalog_changed().await;
        Ok(closed)
    }

    /// Soft-delete a printer group and clear it from referencing products.
    /// Canonical-only — nothing to drop on the POS side.
    pub async fn delete_printer_group(&self, id: i64) -> Option<u64> {
        match self.try_delete_printer_group(id).await {
            Ok(count) => Some(count),
            Err(e) => {
                tracing::error!("printer group delete failed: {e}");
                None
            }
        }
    }

    async fn try_delete_printer_group(&self, id: i64) -> Result<u64, UpsertError> {
        if printer_group::find_by_id(&self.pool, id).await?.is_none() {
            return Ok(0);
        }

        let all_products = product::find_all(&self.pool).await?;
        let affected: Vec<Product> = all_products
            .into_iter()
            .filter(|p| p.printer_group_id == Some(id))
            .map(|mut p| {
                p.printer_group_id = None;
                p
            })
            .collect();

        let now = now_millis();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| UpsertError::Storage(RepoError::from(e)))?;
        let closed = temporal::close_tx::<PrinterGroup>(&mut tx, id, now).await?;
        for product in &affected {
            temporal::replace_tx(&mut tx, product, now).await?;
        }
        tx.commit()
            .await
            .map_err(|e| UpsertError::Storage(RepoError::from(e)))?;

        self.notifier.catalog_changed().await;
        Ok(closed)
    }

    /// Soft-delete a category and detach it from referencing products
    pub async fn delete_category(&self, id: i64) -> Option<u64> {
        match self.try_delete_category(id).await {
            Ok(count) => Some(count),
            Err(e) => {
                tracing::error!("category delete failed: {e}");
                None
            }
        }
    }

    async fn try_delete_category(&self, id: i64) -> Result<u64, UpsertError> {
        if category::find_by_id(&self.pool, id).await?.is_none() {
            return Ok(0);
        }

        let all_products = product::find_all(&self.pool).await?;
        let affected: Vec<Product> = all_products
            .into_iter()
            .filter(|p| p.category_id == Some(id))
            .map(|mut p| {
                p.category_id = None;
                p
            })
            .collect();

        let now = now_millis();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| UpsertError::Storage(RepoError::from(e)))?;
        let closed = temporal::close_tx::<Category>(&mut tx, id, now).await?;
        for product in &affected {
            temporal::replace_tx(&mut tx, product, now).await?;
        }
        tx.commit()
            .await
            .map_err(|e| UpsertError::Storage(RepoError::from(e)))?;

        self.notifier.catalog_changed().await;
        Ok(closed)
    }

    // =========================================================================
    // Boot-time reconciliation
    // =========================================================================

    /// Lazily re-check mirror consistency over the whole active catalog:
    /// entities sync only when their mapping is missing, stale or dirty.
    /// Modifier types go first so items can reference their lists.
    pub async fn sync_catalog(&self) -> Option<()> {
        match self.try_sync_catalog().await {
            Ok(()) => Some(()),
            Err(e) => {
                tracing::error!("catalog mirror reconciliation failed: {e}");
                None
            }
        }
    }

    async fn try_sync_catalog(&self) -> Result<(), UpsertError> {
        let types = modifier_type::find_all(&self.pool).await?;
        let mut type_entries: Vec<ModifierTypeWithOptions> = Vec::with_capacity(types.len());
        for modifier_type in types {
            let options =
                modifier_option::find_by_ids(&self.pool, &modifier_type.option_ids).await?;
            type_entries.push(ModifierTypeWithOptions {
                modifier_type,
                options,
            });
        }
        let upserted_types = self
            .mirror
            .sync_modifier_types(&self.pool, &type_entries)
            .await?;

        let products = product::find_all(&self.pool).await?;
        let mut product_entries: Vec<ProductWithInstances> = Vec::with_capacity(products.len());
        for product in products {
            let instances =
                product_instance::find_by_ids(&self.pool, &product.instance_ids).await?;
            product_entries.push(ProductWithInstances { product, instances });
        }
        let upserted_products = self
            .mirror
            .sync_products(&self.pool, &product_entries)
            .await?;

        tracing::info!(
            modifier_objects = upserted_types,
            product_objects = upserted_products,
            "catalog mirror reconciled"
        );
        Ok(())
    }
}
