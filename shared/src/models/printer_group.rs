//! Printer Group Model
//!
//! Kitchen routing: products reference a printer group, the print pipeline
//! resolves it to physical printer names. Canonical-only — the external POS
//! catalog has no printer-routing concept, so printer groups never sync.

use serde::{Deserialize, Serialize};

/// Printer group entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrinterGroup {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub printer_names: Vec<String>,
    #[serde(default)]
    pub sort_order: i32,
}

/// Create printer group payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrinterGroupCreate {
    pub name: String,
    #[serde(default)]
    pub printer_names: Vec<String>,
    pub sort_order: Option<i32>,
}

/// Update printer group payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrinterGroupUpdate {
    pub name: Option<String>,
    pub printer_names: Option<Vec<String>>,
    pub sort_order: Option<i32>,
}

impl PrinterGroup {
    pub fn from_create(id: i64, data: PrinterGroupCreate) -> Self {
        Self {
            id,
            name: data.name,
            printer_names: data.printer_names,
            sort_order: data.sort_order.unwrap_or(0),
        }
    }
}

impl PrinterGroupUpdate {
    pub fn apply(&self, current: &PrinterGroup) -> PrinterGroup {
        PrinterGroup {
            id: current.id,
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            printer_names: self
                .printer_names
                .clone()
                .unwrap_or_else(|| current.printer_names.clone()),
            sort_order: self.sort_order.unwrap_or(current.sort_order),
        }
    }
}
