//! Canonical entity → POS catalog object translation
//!
//! A product maps to an ITEM plus one ITEM_VARIATION per instance; a
//! modifier type to a MODIFIER_LIST plus one MODIFIER per option. Objects
//! without a persisted mapping are tagged with a `#`-prefixed temporary
//! client id so the upsert response can hand back the assigned id.

use std::collections::HashMap;

use shared::models::{ModifierOption, ModifierType, Product, ProductInstance};
use shared::pos::{CatalogObject, CatalogObjectData};

use super::store::EntityKind;

/// A catalog object paired with its canonical origin
#[derive(Debug, Clone)]
pub struct TranslatedObject {
    pub kind: EntityKind,
    pub logical_id: i64,
    pub object: CatalogObject,
    /// Temporary client id for objects the POS has not seen yet
    pub client_id: Option<String>,
}

fn object_id(
    kind: EntityKind,
    logical_id: i64,
    mappings: &HashMap<(EntityKind, i64), String>,
) -> (String, Option<String>) {
    match mappings.get(&(kind, logical_id)) {
        Some(external) => (external.clone(), None),
        None => {
            let client_id = format!("#{}", uuid::Uuid::new_v4());
            (client_id.clone(), Some(client_id))
        }
    }
}

/// Item + variations for one product
pub fn product_objects(
    product: &Product,
    instances: &[ProductInstance],
    mappings: &HashMap<(EntityKind, i64), String>,
) -> Vec<TranslatedObject> {
    let (item_id, item_client_id) = object_id(EntityKind::Product, product.id, mappings);

    // Modifier lists attach by external id; types not yet mirrored are
    // skipped and pick up on the next sync after they exist in the POS.
    let mut modifier_list_ids = Vec::with_capacity(product.modifiers.len());
    for mref in &product.modifiers {
        match mappings.get(&(EntityKind::ModifierType, mref.modifier_type_id)) {
            Some(external) => modifier_list_ids.push(external.clone()),
            None => tracing::warn!(
                product_id = product.id,
                modifier_type_id = mref.modifier_type_id,
                "modifier type not mirrored yet, omitting from item"
            ),
        }
    }

    let mut objects = Vec::with_capacity(1 + instances.len());
    objects.push(TranslatedObject {
        kind: EntityKind::Product,
        logical_id: product.id,
        client_id: item_client_id,
        object: CatalogObject {
            id: item_id.clone(),
            version: 0,
            data: CatalogObjectData::Item {
                name: product.name.clone(),
                ordinal: product.sort_order,
                present_at_pos: product.display.show_on_pos,
                present_online: product.display.show_online,
                modifier_list_ids,
            },
        },
    });

    for instance in instances {
        let (variation_id, variation_client_id) =
            object_id(EntityKind::ProductInstance, instance.id, mappings);
        objects.push(TranslatedObject {
            kind: EntityKind::ProductInstance,
            logical_id: instance.id,
            client_id: variation_client_id,
            object: CatalogObject {
                id: variation_id,
                version: 0,
                data: CatalogObjectData::ItemVariation {
                    item_id: item_id.clone(),
                    name: instance.name.clone(),
                    ordinal: instance.sort_order,
                    // The POS stores absolute prices; parent price changes
                    // therefore dirty every variation.
                    price_cents: product.price + instance.price_adjustment,
                    sku: instance.sku.clone(),
                },
            },
        });
    }

    objects
}

/// Modifier list + modifiers for one modifier type
pub fn modifier_type_objects(
    modifier_type: &ModifierType,
    options: &[ModifierOption],
    mappings: &HashMap<(EntityKind, i64), String>,
) -> Vec<TranslatedObject> {
    let (list_id, list_client_id) =
        object_id(EntityKind::ModifierType, modifier_type.id, mappings);

    let mut objects = Vec::with_capacity(1 + options.len());
    objects.push(TranslatedObject {
        kind: EntityKind::ModifierType,
        logical_id: modifier_type.id,
        client_id: list_client_id,
        object: CatalogObject {
            id: list_id.clone(),
            version: 0,
            data: CatalogObjectData::ModifierList {
                name: modifier_type.name.clone(),
                ordinal: modifier_type.sort_order,
                selection_min: modifier_type.selection_min,
                selection_max: modifier_type.selection_max,
            },
        },
    });

    for option in options {
        let (modifier_id, modifier_client_id) =
            object_id(EntityKind::ModifierOption, option.id, mappings);
        objects.push(TranslatedObject {
            kind: EntityKind::ModifierOption,
            logical_id: option.id,
            client_id: modifier_client_id,
            object: CatalogObject {
                id: modifier_id,
                version: 0,
                data: CatalogObjectData::Modifier {
                    modifier_list_id: list_id.clone(),
                    name: option.name.clone(),
                    ordinal: option.sort_order,
                    price_cents: option.price_delta,
                },
            },
        });
    }

    objects
}
