//! Batch upsert request shapes
//!
//! Requests are discriminated by shape, not by tag: an object with an `id`
//! is an update, one without is a create. Nested instance/option entries add
//! a third form — a bare id number, meaning "keep as is". Variant order in
//! the untagged enums matters: serde tries them top to bottom, and only the
//! update forms require `id`.

use serde::{Deserialize, Serialize};

use super::category::{CategoryCreate, CategoryUpdate};
use super::modifier::{
    ModifierOptionCreate, ModifierOptionPatch, ModifierTypeCreate, ModifierTypeUpdate,
};
use super::printer_group::{PrinterGroupCreate, PrinterGroupUpdate};
use super::product::{ProductCreate, ProductInstanceCreate, ProductInstancePatch, ProductUpdate};

// ── Product ──

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductUpsert {
    Update(ProductUpdateRequest),
    Create(ProductCreateRequest),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductUpdateRequest {
    pub id: i64,
    #[serde(flatten)]
    pub data: ProductUpdate,
    /// Full replacement roster when present; omitted = leave instances alone
    pub instances: Option<Vec<InstanceEntry>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreateRequest {
    #[serde(flatten)]
    pub data: ProductCreate,
    #[serde(default)]
    pub instances: Vec<ProductInstanceCreate>,
}

/// Entry in a product update's instance roster
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InstanceEntry {
    /// Bare id — keep unchanged
    Keep(i64),
    /// Object with id — explicit update
    Update(ProductInstancePatch),
    /// Object without id — create and attach
    Create(ProductInstanceCreate),
}

// ── Modifier type ──

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModifierTypeUpsert {
    Update(ModifierTypeUpdateRequest),
    Create(ModifierTypeCreateRequest),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierTypeUpdateRequest {
    pub id: i64,
    #[serde(flatten)]
    pub data: ModifierTypeUpdate,
    pub options: Option<Vec<OptionEntry>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierTypeCreateRequest {
    #[serde(flatten)]
    pub data: ModifierTypeCreate,
    #[serde(default)]
    pub options: Vec<ModifierOptionCreate>,
}

/// Entry in a modifier type's option roster
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionEntry {
    Keep(i64),
    Update(ModifierOptionPatch),
    Create(ModifierOptionCreate),
}

// ── Category ──

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryUpsert {
    Update(CategoryUpdateRequest),
    Create(CategoryCreate),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryUpdateRequest {
    pub id: i64,
    #[serde(flatten)]
    pub data: CategoryUpdate,
}

// ── Printer group ──

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrinterGroupUpsert {
    Update(PrinterGroupUpdateRequest),
    Create(PrinterGroupCreate),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrinterGroupUpdateRequest {
    pub id: i64,
    #[serde(flatten)]
    pub data: PrinterGroupUpdate,
}
