use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::models::{
    parse_tag, parse_tags, BudgetRange, CookingSkill, Family, FamilyMember, FamilyPreferences,
    MealTimes, MemberPreferences,
};

#[derive(Debug, Clone, FromRow)]
pub struct FamilyRow {
    pub id: Uuid,
    pub name: String,
    pub cooking_skill_level: String,
    pub budget_range: String,
    pub preferred_language: String,
    pub meal_time_breakfast: String,
    pub meal_time_lunch: String,
    pub meal_time_dinner: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct MemberRow {
    pub id: Uuid,
    pub family_id: Uuid,
    pub name: String,
    pub age: i16,
    pub dietary_restrictions: Vec<String>,
    pub allergies: Vec<String>,
    pub health_conditions: Vec<String>,
    pub spice_level: String,
    pub favorite_cuisines: Vec<String>,
    pub disliked_ingredients: Vec<String>,
}

impl From<MemberRow> for FamilyMember {
    fn from(r: MemberRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            age: r.age.clamp(0, u8::MAX as i16) as u8,
            dietary_restrictions: parse_tags(&r.dietary_restrictions),
            allergies: parse_tags(&r.allergies),
            health_conditions: parse_tags(&r.health_conditions),
            preferences: MemberPreferences {
                spice_level: parse_tag(&r.spice_level).unwrap_or_default(),
                favorite_cuisines: parse_tags(&r.favorite_cuisines),
                disliked_ingredients: r.disliked_ingredients,
            },
        }
    }
}

impl FamilyRow {
    pub fn into_family(self, members: Vec<MemberRow>) -> Family {
        Family {
            id: self.id,
            name: self.name,
            members: members.into_iter().map(FamilyMember::from).collect(),
            preferences: FamilyPreferences {
                cooking_skill_level: parse_tag(&self.cooking_skill_level)
                    .unwrap_or(CookingSkill::Intermediate),
                budget_range: parse_tag(&self.budget_range).unwrap_or(BudgetRange::Medium),
                meal_times: MealTimes {
                    breakfast: self.meal_time_breakfast,
                    lunch: self.meal_time_lunch,
                    dinner: self.meal_time_dinner,
                },
                preferred_language: parse_tag(&self.preferred_language).unwrap_or_default(),
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
