use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::ShoppingListEntry;

#[derive(Debug, Clone, FromRow)]
pub struct ShoppingRow {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub alternatives: Vec<String>,
}

impl From<ShoppingRow> for ShoppingListEntry {
    fn from(r: ShoppingRow) -> Self {
        Self {
            name: r.name,
            quantity: r.quantity,
            unit: r.unit,
            alternatives: r.alternatives,
        }
    }
}

/// Open (not yet purchased) entries in the order they were first added.
pub async fn list_open(db: &PgPool, family_id: Uuid) -> anyhow::Result<Vec<ShoppingListEntry>> {
    let rows = sqlx::query_as::<_, ShoppingRow>(
        r#"
        SELECT name, quantity, unit, alternatives
        FROM shopping_list_items
        WHERE family_id = $1 AND is_purchased = FALSE
        ORDER BY created_at ASC
        "#,
    )
    .bind(family_id)
    .fetch_all(db)
    .await?;
    Ok(rows.into_iter().map(ShoppingListEntry::from).collect())
}

/// Upserts on the case-insensitive (family, name, unit) key. A re-added entry is reopened and its
/// quantity summed, matching the in-memory list.
pub async fn upsert_many(
    db: &PgPool,
    family_id: Uuid,
    entries: &[ShoppingListEntry],
) -> anyhow::Result<()> {
    let mut tx = db.begin().await?;
    for e in entries {
        sqlx::query(
            r#"
            INSERT INTO shopping_list_items (family_id, name, quantity, unit, alternatives)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (family_id, lower(name), lower(unit)) DO UPDATE
            SET quantity = CASE WHEN shopping_list_items.is_purchased
                                THEN EXCLUDED.quantity
                                ELSE shopping_list_items.quantity + EXCLUDED.quantity END,
                alternatives = CASE WHEN cardinality(EXCLUDED.alternatives) > 0
                                    THEN EXCLUDED.alternatives
                                    ELSE shopping_list_items.alternatives END,
                is_purchased = FALSE
            "#,
        )
        .bind(family_id)
        .bind(&e.name)
        .bind(e.quantity)
        .bind(&e.unit)
        .bind(&e.alternatives)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

pub async fn delete_one(db: &PgPool, family_id: Uuid, name: &str, unit: &str) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        DELETE FROM shopping_list_items
        WHERE family_id = $1 AND lower(name) = lower($2) AND lower(unit) = lower($3)
        "#,
    )
    .bind(family_id)
    .bind(name)
    .bind(unit)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn delete_all(db: &PgPool, family_id: Uuid) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM shopping_list_items WHERE family_id = $1")
        .bind(family_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn mark_purchased(
    db: &PgPool,
    family_id: Uuid,
    name: &str,
    unit: &str,
) -> anyhow::Result<bool> {
    let res = sqlx::query(
        r#"
        UPDATE shopping_list_items
        SET is_purchased = TRUE
        WHERE family_id = $1 AND lower(name) = lower($2) AND lower(unit) = lower($3)
        "#,
    )
    .bind(family_id)
    .bind(name)
    .bind(unit)
    .execute(db)
    .await?;
    Ok(res.rows_affected() > 0)
}
