//! Product Model

use serde::{Deserialize, Serialize};

use super::availability::AvailabilityRule;

/// Product entity
///
/// `instance_ids` is the ordered list of owned [`ProductInstance`] logical
/// ids; `modifiers` the ordered modifier-type references with per-product
/// overrides. Prices are cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category_id: Option<i64>,
    pub price: i64,
    pub printer_group_id: Option<i64>,
    #[serde(default)]
    pub modifiers: Vec<ModifierRef>,
    #[serde(default)]
    pub display: DisplayFlags,
    pub disabled_window: Option<DisabledWindow>,
    pub availability: Option<AvailabilityRule>,
    #[serde(default)]
    pub instance_ids: Vec<i64>,
    #[serde(default)]
    pub sort_order: i32,
}

/// Modifier-type reference embedded on a product
///
/// `required`/`max_selections` override the modifier type's own settings for
/// this product; `None` inherits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierRef {
    pub modifier_type_id: i64,
    pub required: Option<bool>,
    pub max_selections: Option<i32>,
}

/// Where the product is visible
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayFlags {
    pub show_on_pos: bool,
    pub show_online: bool,
}

impl Default for DisplayFlags {
    fn default() -> Self {
        Self {
            show_on_pos: true,
            show_online: true,
        }
    }
}

/// Temporary sale stop: product is off the menu for `[from, until)` millis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisabledWindow {
    pub from: i64,
    pub until: i64,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub category_id: Option<i64>,
    pub price: i64,
    pub printer_group_id: Option<i64>,
    #[serde(default)]
    pub modifiers: Vec<ModifierRef>,
    pub display: Option<DisplayFlags>,
    pub disabled_window: Option<DisabledWindow>,
    pub availability: Option<AvailabilityRule>,
    pub sort_order: Option<i32>,
}

/// Update product payload — `None` fields carry forward from the active
/// version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub category_id: Option<i64>,
    pub price: Option<i64>,
    pub printer_group_id: Option<i64>,
    pub modifiers: Option<Vec<ModifierRef>>,
    pub display: Option<DisplayFlags>,
    pub disabled_window: Option<DisabledWindow>,
    pub availability: Option<AvailabilityRule>,
    pub sort_order: Option<i32>,
}

impl Product {
    pub fn from_create(id: i64, data: ProductCreate) -> Self {
        Self {
            id,
            name: data.name,
            category_id: data.category_id,
            price: data.price,
            printer_group_id: data.printer_group_id,
            modifiers: data.modifiers,
            display: data.display.unwrap_or_default(),
            disabled_window: data.disabled_window,
            availability: data.availability,
            instance_ids: vec![],
            sort_order: data.sort_order.unwrap_or(0),
        }
    }
}

impl ProductUpdate {
    /// Merge the partial over the active snapshot (COALESCE semantics)
    pub fn apply(&self, current: &Product) -> Product {
        Product {
            id: current.id,
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            category_id: self.category_id.or(current.category_id),
            price: self.price.unwrap_or(current.price),
            printer_group_id: self.printer_group_id.or(current.printer_group_id),
            modifiers: self
                .modifiers
                .clone()
                .unwrap_or_else(|| current.modifiers.clone()),
            display: self.display.clone().unwrap_or_else(|| current.display.clone()),
            disabled_window: self
                .disabled_window
                .clone()
                .or_else(|| current.disabled_window.clone()),
            availability: self
                .availability
                .clone()
                .or_else(|| current.availability.clone()),
            instance_ids: current.instance_ids.clone(),
            sort_order: self.sort_order.unwrap_or(current.sort_order),
        }
    }
}

/// Product instance entity (size/variant of a product)
///
/// Externally-visible price is `product.price + price_adjustment`, which is
/// why parent price changes force instances to re-sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInstance {
    pub id: i64,
    pub product_id: i64,
    pub name: String,
    #[serde(default)]
    pub price_adjustment: i64,
    pub sku: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
}

/// Create instance payload (nested under a product upsert)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductInstanceCreate {
    pub name: String,
    #[serde(default)]
    pub price_adjustment: i64,
    pub sku: Option<String>,
    pub sort_order: Option<i32>,
}

/// Explicit instance update (object-with-id entry in a product upsert)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductInstancePatch {
    pub id: i64,
    pub name: Option<String>,
    pub price_adjustment: Option<i64>,
    pub sku: Option<String>,
    pub sort_order: Option<i32>,
}

impl ProductInstance {
    pub fn from_create(id: i64, product_id: i64, data: ProductInstanceCreate) -> Self {
        Self {
            id,
            product_id,
            name: data.name,
            price_adjustment: data.price_adjustment,
            sku: data.sku,
            sort_order: data.sort_order.unwrap_or(0),
        }
    }
}

impl ProductInstancePatch {
    pub fn apply(&self, current: &ProductInstance) -> ProductInstance {
        ProductInstance {
            id: current.id,
            product_id: current.product_id,
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            price_adjustment: self.price_adjustment.unwrap_or(current.price_adjustment),
            sku: self.sku.clone().or_else(|| current.sku.clone()),
            sort_order: self.sort_order.unwrap_or(current.sort_order),
        }
    }
}

/// Orchestrator output: product with its owned instances in roster order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductWithInstances {
    pub product: Product,
    pub instances: Vec<ProductInstance>,
}
