use std::collections::HashMap;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::models::{DetectedItem, InventoryItem};

/// Two detections are the same item iff their keys are equal.
pub fn merge_key(name: &str, unit: &str) -> String {
    format!("{}-{}", name.to_lowercase(), unit.to_lowercase())
}

/// Collapses detections from several photos of one fridge session.
///
/// Colliding keys keep the larger quantity and the mean of the stored and
/// incoming confidence. The mean is taken pairwise on insert, so with three
/// or more detections of one key the result depends on arrival order and is
/// not the mean of all of them. Output follows first-seen key order.
pub fn merge_detected_items(items: impl IntoIterator<Item = DetectedItem>) -> Vec<InventoryItem> {
    let mut order: Vec<DetectedItem> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in items {
        let key = merge_key(&item.name, &item.unit);
        match index.get(&key) {
            Some(&i) => {
                let existing = &mut order[i];
                existing.quantity = existing.quantity.max(item.quantity);
                existing.confidence = (existing.confidence + item.confidence) / 2.0;
            }
            None => {
                index.insert(key, order.len());
                order.push(item);
            }
        }
    }

    let now = OffsetDateTime::now_utc();
    order
        .into_iter()
        .map(|d| InventoryItem {
            id: Uuid::new_v4(),
            name: d.name,
            category: d.category,
            quantity: d.quantity,
            unit: d.unit,
            expiry_date: None,
            confidence: d.confidence,
            added_at: now,
        })
        .collect()
}
