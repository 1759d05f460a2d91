use serde::{Deserialize, Serialize};
use time::Date;

use crate::models::{iso_date, InventoryItem, InventoryPatch, ItemCategory, NewInventoryItem};

/// Manual add. Manual entries are fully trusted.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub name: String,
    #[serde(default)]
    pub category: ItemCategory,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    pub unit: String,
    #[serde(default, with = "iso_date::option")]
    pub expiry_date: Option<Date>,
}

fn default_quantity() -> f64 {
    1.0
}

fn full_confidence() -> f64 {
    1.0
}

impl AddItemRequest {
    pub fn into_new_item(self) -> Result<NewInventoryItem, String> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err("name is required".into());
        }
        let unit = self.unit.trim().to_string();
        if unit.is_empty() {
            return Err("unit is required".into());
        }
        if !self.quantity.is_finite() || self.quantity < 0.0 {
            return Err("quantity must be a non-negative number".into());
        }
        Ok(NewInventoryItem {
            name,
            category: self.category,
            quantity: self.quantity,
            unit,
            expiry_date: self.expiry_date,
            confidence: 1.0,
        })
    }
}

pub fn validate_patch(patch: &InventoryPatch) -> Result<(), String> {
    match patch.quantity {
        Some(q) if !q.is_finite() || q < 0.0 => {
            Err("quantity must be a non-negative number".into())
        }
        _ => Ok(()),
    }
}

/// `POST /inventory/scan` JSON body. Entries may be bare base64 or data URLs.
#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub images_b64: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub photos: usize,
    pub items: Vec<InventoryItem>,
}

/// `POST /inventory/confirm`: the scan result as the user accepted it.
#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub items: Vec<ConfirmItem>,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmItem {
    pub name: String,
    #[serde(default)]
    pub category: ItemCategory,
    pub quantity: f64,
    pub unit: String,
    #[serde(default, with = "iso_date::option")]
    pub expiry_date: Option<Date>,
    #[serde(default = "full_confidence")]
    pub confidence: f64,
}

impl From<ConfirmItem> for NewInventoryItem {
    fn from(c: ConfirmItem) -> Self {
        Self {
            name: c.name,
            category: c.category,
            quantity: c.quantity.max(0.0),
            unit: c.unit,
            expiry_date: c.expiry_date,
            confidence: c.confidence.clamp(0.0, 1.0),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConfirmResponse {
    pub added: Vec<InventoryItem>,
    pub inventory_count: usize,
}
