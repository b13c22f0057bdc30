//! Modifier Model
//!
//! A modifier type ("Spice level", "Toppings") owns an ordered list of
//! options. Option prices are cent deltas on top of the product price.

use serde::{Deserialize, Serialize};

/// Modifier type entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierType {
    pub id: i64,
    pub name: String,
    /// Minimum selections a guest must make (0 = optional)
    #[serde(default)]
    pub selection_min: i32,
    /// Maximum selections (`None` = unlimited)
    pub selection_max: Option<i32>,
    #[serde(default)]
    pub option_ids: Vec<i64>,
    #[serde(default)]
    pub sort_order: i32,
}

/// Create modifier type payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierTypeCreate {
    pub name: String,
    pub selection_min: Option<i32>,
    pub selection_max: Option<i32>,
    pub sort_order: Option<i32>,
}

/// Update modifier type payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierTypeUpdate {
    pub name: Option<String>,
    pub selection_min: Option<i32>,
    pub selection_max: Option<i32>,
    pub sort_order: Option<i32>,
}

impl ModifierType {
    pub fn from_create(id: i64, data: ModifierTypeCreate) -> Self {
        Self {
            id,
            name: data.name,
            selection_min: data.selection_min.unwrap_or(0),
            selection_max: data.selection_max,
            option_ids: vec![],
            sort_order: data.sort_order.unwrap_or(0),
        }
    }
}

impl ModifierTypeUpdate {
    pub fn apply(&self, current: &ModifierType) -> ModifierType {
        ModifierType {
            id: current.id,
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            selection_min: self.selection_min.unwrap_or(current.selection_min),
            selection_max: self.selection_max.or(current.selection_max),
            option_ids: current.option_ids.clone(),
            sort_order: self.sort_order.unwrap_or(current.sort_order),
        }
    }
}

/// Modifier option entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierOption {
    pub id: i64,
    pub modifier_type_id: i64,
    pub name: String,
    /// Price delta in cents (positive = surcharge)
    #[serde(default)]
    pub price_delta: i64,
    #[serde(default)]
    pub sort_order: i32,
}

/// Create option payload (nested under a modifier-type upsert)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierOptionCreate {
    pub name: String,
    #[serde(default)]
    pub price_delta: i64,
    pub sort_order: Option<i32>,
}

/// Explicit option update (object-with-id entry)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierOptionPatch {
    pub id: i64,
    pub name: Option<String>,
    pub price_delta: Option<i64>,
    pub sort_order: Option<i32>,
}

impl ModifierOption {
    pub fn from_create(id: i64, modifier_type_id: i64, data: ModifierOptionCreate) -> Self {
        Self {
            id,
            modifier_type_id,
            name: data.name,
            price_delta: data.price_delta,
            sort_order: data.sort_order.unwrap_or(0),
        }
    }
}

impl ModifierOptionPatch {
    pub fn apply(&self, current: &ModifierOption) -> ModifierOption {
        ModifierOption {
            id: current.id,
            modifier_type_id: current.modifier_type_id,
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            price_delta: self.price_delta.unwrap_or(current.price_delta),
            sort_order: self.sort_order.unwrap_or(current.sort_order),
        }
    }
}

/// Orchestrator output: modifier type with its options in roster order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierTypeWithOptions {
    pub modifier_type: ModifierType,
    pub options: Vec<ModifierOption>,
}
