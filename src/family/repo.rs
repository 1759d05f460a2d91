use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::family::repo_types::{FamilyRow, MemberRow};
use crate::models::{tag_str, tag_strs, Family, FamilyMember, NewFamily};

const FAMILY_COLUMNS: &str = "id, name, cooking_skill_level, budget_range, preferred_language, \
     meal_time_breakfast, meal_time_lunch, meal_time_dinner, created_at, updated_at";

const MEMBER_COLUMNS: &str = "id, family_id, name, age, dietary_restrictions, allergies, \
     health_conditions, spice_level, favorite_cuisines, disliked_ingredients";

async fn members_of(db: &PgPool, family_id: Uuid) -> anyhow::Result<Vec<MemberRow>> {
    let rows = sqlx::query_as::<_, MemberRow>(&format!(
        "SELECT {} FROM family_members WHERE family_id = $1 ORDER BY position ASC, created_at ASC",
        MEMBER_COLUMNS
    ))
    .bind(family_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Single-family mode: the oldest family is the household.
pub async fn find_default(db: &PgPool) -> anyhow::Result<Option<Family>> {
    let row = sqlx::query_as::<_, FamilyRow>(&format!(
        "SELECT {} FROM families ORDER BY created_at ASC LIMIT 1",
        FAMILY_COLUMNS
    ))
    .fetch_optional(db)
    .await?;

    match row {
        Some(row) => {
            let members = members_of(db, row.id).await?;
            Ok(Some(row.into_family(members)))
        }
        None => Ok(None),
    }
}

pub async fn find_by_id(db: &PgPool, family_id: Uuid) -> anyhow::Result<Option<Family>> {
    let row = sqlx::query_as::<_, FamilyRow>(&format!(
        "SELECT {} FROM families WHERE id = $1",
        FAMILY_COLUMNS
    ))
    .bind(family_id)
    .fetch_optional(db)
    .await?;

    match row {
        Some(row) => {
            let members = members_of(db, row.id).await?;
            Ok(Some(row.into_family(members)))
        }
        None => Ok(None),
    }
}

async fn insert_members(
    tx: &mut Transaction<'_, Postgres>,
    family_id: Uuid,
    members: &[FamilyMember],
) -> anyhow::Result<()> {
    for (position, m) in members.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO family_members
                (id, family_id, position, name, age, dietary_restrictions, allergies,
                 health_conditions, spice_level, favorite_cuisines, disliked_ingredients)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(m.id)
        .bind(family_id)
        .bind(position as i32)
        .bind(&m.name)
        .bind(m.age as i16)
        .bind(tag_strs(&m.dietary_restrictions))
        .bind(tag_strs(&m.allergies))
        .bind(tag_strs(&m.health_conditions))
        .bind(tag_str(&m.preferences.spice_level))
        .bind(tag_strs(&m.preferences.favorite_cuisines))
        .bind(&m.preferences.disliked_ingredients)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

pub async fn create(db: &PgPool, family: &NewFamily) -> anyhow::Result<Family> {
    let mut tx = db.begin().await?;
    let prefs = &family.preferences;

    let row = sqlx::query_as::<_, FamilyRow>(&format!(
        r#"
        INSERT INTO families
            (name, cooking_skill_level, budget_range, preferred_language,
             meal_time_breakfast, meal_time_lunch, meal_time_dinner)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {}
        "#,
        FAMILY_COLUMNS
    ))
    .bind(&family.name)
    .bind(tag_str(&prefs.cooking_skill_level))
    .bind(tag_str(&prefs.budget_range))
    .bind(tag_str(&prefs.preferred_language))
    .bind(&prefs.meal_times.breakfast)
    .bind(&prefs.meal_times.lunch)
    .bind(&prefs.meal_times.dinner)
    .fetch_one(&mut *tx)
    .await?;

    insert_members(&mut tx, row.id, &family.members).await?;
    tx.commit().await?;

    let family_id = row.id;
    find_by_id(db, family_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("family {} vanished after insert", family_id))
}

/// Rewrites the family row and replaces its member list.
pub async fn update(db: &PgPool, family: &Family) -> anyhow::Result<Family> {
    let mut tx = db.begin().await?;
    let prefs = &family.preferences;

    let updated = sqlx::query(
        r#"
        UPDATE families
        SET name = $2, cooking_skill_level = $3, budget_range = $4, preferred_language = $5,
            meal_time_breakfast = $6, meal_time_lunch = $7, meal_time_dinner = $8,
            updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(family.id)
    .bind(&family.name)
    .bind(tag_str(&prefs.cooking_skill_level))
    .bind(tag_str(&prefs.budget_range))
    .bind(tag_str(&prefs.preferred_language))
    .bind(&prefs.meal_times.breakfast)
    .bind(&prefs.meal_times.lunch)
    .bind(&prefs.meal_times.dinner)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        anyhow::bail!("family {} not found", family.id);
    }

    sqlx::query("DELETE FROM family_members WHERE family_id = $1")
        .bind(family.id)
        .execute(&mut *tx)
        .await?;
    insert_members(&mut tx, family.id, &family.members).await?;
    tx.commit().await?;

    find_by_id(db, family.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("family {} vanished after update", family.id))
}
