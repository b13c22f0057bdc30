//! Change detection
//!
//! Classifies a proposed update against the active version: no-op (skip the
//! write entirely), direct update, or cascading update. A cascade means the
//! change alters the externally-visible representation of the product's
//! instances (price, printer routing, effective modifier set) and every
//! owned instance must re-sync even though its own stored fields are
//! unchanged.

use std::collections::HashMap;

use shared::models::{
    ModifierOption, ModifierOptionPatch, ModifierRef, ModifierType, ModifierTypeUpdate, Product,
    ProductInstance, ProductInstancePatch, ProductUpdate,
};

/// Outcome of comparing a product update against its active version
#[derive(Debug, Clone)]
pub struct ProductChange {
    /// Merged snapshot the new version would hold
    pub next: Product,
    /// Any compared field differs
    pub field_changed: bool,
    /// Owned instances are dependent-dirty and must be re-synced
    pub cascade: bool,
}

/// Field-by-field compare of the incoming optional fields against the
/// active version
pub fn detect_product_change(current: &Product, update: &ProductUpdate) -> ProductChange {
    let next = update.apply(current);
    let field_changed = next != *current;
    let cascade = next.price != current.price
        || next.printer_group_id != current.printer_group_id
        || modifier_set_changed(&current.modifiers, &next.modifiers);
    ProductChange {
        next,
        field_changed,
        cascade,
    }
}

/// Effective modifier set comparison: symmetric difference of the
/// modifier-type ids plus the per-modifier override fields. Pure reordering
/// changes the stored list but not the effective set.
fn modifier_set_changed(current: &[ModifierRef], next: &[ModifierRef]) -> bool {
    if current.len() != next.len() {
        return true;
    }
    let by_id: HashMap<i64, &ModifierRef> =
        current.iter().map(|m| (m.modifier_type_id, m)).collect();
    next.iter().any(|m| match by_id.get(&m.modifier_type_id) {
        Some(existing) => **existing != *m,
        None => true,
    })
}

/// No-op detection for an explicit instance patch
pub fn instance_patch_is_noop(current: &ProductInstance, patch: &ProductInstancePatch) -> bool {
    patch.apply(current) == *current
}

/// No-op detection for a modifier type update
pub fn modifier_type_change(
    current: &ModifierType,
    update: &ModifierTypeUpdate,
) -> (ModifierType, bool) {
    let next = update.apply(current);
    let changed = next != *current;
    (next, changed)
}

/// No-op detection for a modifier option patch
pub fn option_patch_is_noop(current: &ModifierOption, patch: &ModifierOptionPatch) -> bool {
    patch.apply(current) == *current
}
