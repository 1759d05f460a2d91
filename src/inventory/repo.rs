use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::inventory::repo_types::InventoryRow;
use crate::models::{tag_str, InventoryItem, InventoryPatch, NewInventoryItem};

const ITEM_COLUMNS: &str =
    "id, family_id, name, category, quantity, unit, expiry_date, confidence, added_at";

pub async fn list_by_family(db: &PgPool, family_id: Uuid) -> anyhow::Result<Vec<InventoryItem>> {
    let rows = sqlx::query_as::<_, InventoryRow>(&format!(
        r#"
        SELECT {}
        FROM inventory_items
        WHERE family_id = $1
        ORDER BY category ASC, added_at ASC
        "#,
        ITEM_COLUMNS
    ))
    .bind(family_id)
    .fetch_all(db)
    .await?;
    Ok(rows.into_iter().map(InventoryItem::from).collect())
}

async fn insert_one(
    tx: &mut Transaction<'_, Postgres>,
    family_id: Uuid,
    item: &NewInventoryItem,
) -> anyhow::Result<InventoryRow> {
    let row = sqlx::query_as::<_, InventoryRow>(&format!(
        r#"
        INSERT INTO inventory_items (family_id, name, category, quantity, unit, expiry_date, confidence)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {}
        "#,
        ITEM_COLUMNS
    ))
    .bind(family_id)
    .bind(&item.name)
    .bind(tag_str(&item.category))
    .bind(item.quantity.max(0.0))
    .bind(&item.unit)
    .bind(item.expiry_date)
    .bind(item.confidence.clamp(0.0, 1.0))
    .fetch_one(&mut **tx)
    .await?;
    Ok(row)
}

pub async fn insert(
    db: &PgPool,
    family_id: Uuid,
    item: &NewInventoryItem,
) -> anyhow::Result<InventoryItem> {
    let mut saved = insert_many(db, family_id, std::slice::from_ref(item)).await?;
    saved
        .pop()
        .ok_or_else(|| anyhow::anyhow!("insert returned no row"))
}

/// All or nothing: one failing row rolls back the whole batch.
pub async fn insert_many(
    db: &PgPool,
    family_id: Uuid,
    items: &[NewInventoryItem],
) -> anyhow::Result<Vec<InventoryItem>> {
    let mut tx = db.begin().await?;
    let mut saved = Vec::with_capacity(items.len());
    for item in items {
        saved.push(insert_one(&mut tx, family_id, item).await?.into());
    }
    tx.commit().await?;
    Ok(saved)
}

/// `None` when no item has this id.
pub async fn update(
    db: &PgPool,
    item_id: Uuid,
    patch: &InventoryPatch,
) -> anyhow::Result<Option<InventoryItem>> {
    let row = sqlx::query_as::<_, InventoryRow>(&format!(
        r#"
        UPDATE inventory_items
        SET quantity = COALESCE($2, quantity), expiry_date = $3
        WHERE id = $1
        RETURNING {}
        "#,
        ITEM_COLUMNS
    ))
    .bind(item_id)
    .bind(patch.quantity.map(|q| q.max(0.0)))
    .bind(patch.expiry_date)
    .fetch_optional(db)
    .await?;
    Ok(row.map(InventoryItem::from))
}

/// Deleting an id that is not there is not an error.
pub async fn delete(db: &PgPool, item_id: Uuid) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM inventory_items WHERE id = $1")
        .bind(item_id)
        .execute(db)
        .await?;
    Ok(())
}
