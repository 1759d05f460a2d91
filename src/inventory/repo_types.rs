use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::models::{InventoryItem, ItemCategory};

#[derive(Debug, Clone, FromRow)]
pub struct InventoryRow {
    pub id: Uuid,
    pub family_id: Uuid,
    pub name: String,
    pub category: String,
    pub quantity: f64,
    pub unit: String,
    pub expiry_date: Option<Date>,
    pub confidence: f64,
    pub added_at: OffsetDateTime,
}

impl From<InventoryRow> for InventoryItem {
    fn from(r: InventoryRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            category: ItemCategory::parse_or_other(&r.category),
            quantity: r.quantity,
            unit: r.unit,
            expiry_date: r.expiry_date,
            confidence: r.confidence,
            added_at: r.added_at,
        }
    }
}
