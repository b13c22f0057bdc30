//! Category Model

use serde::{Deserialize, Serialize};

/// Category entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub sort_order: i32,
    /// Shown as a tab in menus
    #[serde(default = "default_true")]
    pub is_display: bool,
}

fn default_true() -> bool {
    true
}

/// Create category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
    pub sort_order: Option<i32>,
    pub is_display: Option<bool>,
}

/// Update category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub sort_order: Option<i32>,
    pub is_display: Option<bool>,
}

impl Category {
    pub fn from_create(id: i64, data: CategoryCreate) -> Self {
        Self {
            id,
            name: data.name,
            sort_order: data.sort_order.unwrap_or(0),
            is_display: data.is_display.unwrap_or(true),
        }
    }
}

impl CategoryUpdate {
    pub fn apply(&self, current: &Category) -> Category {
        Category {
            id: current.id,
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            sort_order: self.sort_order.unwrap_or(current.sort_order),
            is_display: self.is_display.unwrap_or(current.is_display),
        }
    }
}
