use serde::{de::DeserializeOwned, Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

time::serde::format_description!(pub iso_date, Date, "[year]-[month]-[day]");

/// Single-family mode: every backend row hangs off this family id.
pub const DEFAULT_FAMILY_ID: Uuid = Uuid::from_u128(1);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum InterfaceLanguage {
    #[default]
    #[serde(rename = "en")]
    En,
    #[serde(rename = "zh-HK")]
    ZhHk,
    #[serde(rename = "fil")]
    Fil,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CookingSkill {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BudgetRange {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpiceLevel {
    #[default]
    None,
    Mild,
    Medium,
    Hot,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Cuisine {
    Chinese,
    Cantonese,
    Sichuan,
    Western,
    Italian,
    Japanese,
    Korean,
    Thai,
    Vietnamese,
    Indian,
    Mexican,
    Fusion,
}

impl Cuisine {
    /// Case-insensitive lookup; `None` for anything outside the closed set.
    pub fn parse(raw: &str) -> Option<Self> {
        parse_tag(&raw.trim().to_lowercase())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum DietaryRestriction {
    Vegetarian,
    Vegan,
    Pescatarian,
    Halal,
    Kosher,
    LowSodium,
    LowSugar,
    LowFat,
    Keto,
    GlutenFree,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Allergy {
    Nuts,
    Peanuts,
    Dairy,
    Eggs,
    Shellfish,
    Fish,
    Soy,
    Wheat,
    Sesame,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum HealthCondition {
    Diabetes,
    Hypertension,
    HeartDisease,
    KidneyDisease,
    HighCholesterol,
    Gout,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Vegetables,
    Fruits,
    Meat,
    Seafood,
    Dairy,
    Grains,
    Condiments,
    Beverages,
    Snacks,
    Frozen,
    Canned,
    #[default]
    Other,
}

impl ItemCategory {
    /// Exact match against the closed set, anything else lands in `Other`.
    pub fn parse_or_other(raw: &str) -> Self {
        parse_tag(raw).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MealTimes {
    pub breakfast: String,
    pub lunch: String,
    pub dinner: String,
}

impl Default for MealTimes {
    fn default() -> Self {
        Self {
            breakfast: "08:00".into(),
            lunch: "12:30".into(),
            dinner: "19:00".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemberPreferences {
    pub spice_level: SpiceLevel,
    #[serde(default)]
    pub favorite_cuisines: Vec<Cuisine>,
    #[serde(default)]
    pub disliked_ingredients: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FamilyMember {
    pub id: Uuid,
    pub name: String,
    pub age: u8,
    #[serde(default)]
    pub dietary_restrictions: Vec<DietaryRestriction>,
    #[serde(default)]
    pub allergies: Vec<Allergy>,
    #[serde(default)]
    pub health_conditions: Vec<HealthCondition>,
    pub preferences: MemberPreferences,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FamilyPreferences {
    pub cooking_skill_level: CookingSkill,
    pub budget_range: BudgetRange,
    #[serde(default)]
    pub meal_times: MealTimes,
    #[serde(default)]
    pub preferred_language: InterfaceLanguage,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Family {
    pub id: Uuid,
    pub name: String,
    pub members: Vec<FamilyMember>,
    pub preferences: FamilyPreferences,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Family {
    /// Union of all members' restrictions, first-seen member order.
    pub fn dietary_restrictions(&self) -> Vec<DietaryRestriction> {
        let mut out = Vec::new();
        for r in self.members.iter().flat_map(|m| m.dietary_restrictions.iter()) {
            if !out.contains(r) {
                out.push(*r);
            }
        }
        out
    }

    pub fn allergies(&self) -> Vec<Allergy> {
        let mut out = Vec::new();
        for a in self.members.iter().flat_map(|m| m.allergies.iter()) {
            if !out.contains(a) {
                out.push(*a);
            }
        }
        out
    }

    pub fn favorite_cuisines(&self) -> Vec<Cuisine> {
        let mut out = Vec::new();
        for c in self
            .members
            .iter()
            .flat_map(|m| m.preferences.favorite_cuisines.iter())
        {
            if !out.contains(c) {
                out.push(*c);
            }
        }
        out
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryItem {
    pub id: Uuid,
    pub name: String,
    pub category: ItemCategory,
    pub quantity: f64,
    pub unit: String,
    #[serde(default, with = "iso_date::option", skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<time::Date>,
    pub confidence: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub added_at: OffsetDateTime,
}

/// Edit of a stored item. Quantity is kept when absent; the expiry date is
/// always replaced, so leaving it out clears it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryPatch {
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default, with = "iso_date::option")]
    pub expiry_date: Option<time::Date>,
}

impl InventoryItem {
    pub fn apply_patch(&mut self, patch: &InventoryPatch) {
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        self.expiry_date = patch.expiry_date;
    }
}

/// A family before the store has given it an id and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewFamily {
    pub name: String,
    pub members: Vec<FamilyMember>,
    pub preferences: FamilyPreferences,
}

impl NewFamily {
    pub fn into_family(self, id: Uuid, now: OffsetDateTime) -> Family {
        Family {
            id,
            name: self.name,
            members: self.members,
            preferences: self.preferences,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewInventoryItem {
    pub name: String,
    pub category: ItemCategory,
    pub quantity: f64,
    pub unit: String,
    #[serde(default, with = "iso_date::option", skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<time::Date>,
    pub confidence: f64,
}

/// Vision output for one item, before merge and before it gets an id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectedItem {
    pub name: String,
    pub category: ItemCategory,
    pub quantity: f64,
    pub unit: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeIngredient {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub alternatives: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeStep {
    pub step: u32,
    pub instruction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NutritionInfo {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
    pub sodium: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    pub id: String,
    pub title: String,
    pub description: String,
    pub cuisine: Cuisine,
    pub difficulty: Difficulty,
    pub cooking_time: u32,
    pub servings: u32,
    pub ingredients: Vec<RecipeIngredient>,
    pub instructions: Vec<RecipeStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition_info: Option<NutritionInfo>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub match_score: u8,
    pub available_ingredients: usize,
    pub total_ingredients: usize,
}

impl Recipe {
    pub fn missing_ingredients(&self) -> Vec<RecipeIngredient> {
        self.ingredients
            .iter()
            .filter(|i| !i.available)
            .cloned()
            .collect()
    }

    /// Plain-text card for pasting into a chat app. Labels follow `language`;
    /// Filipino has no translation and uses English.
    pub fn share_text(&self, language: InterfaceLanguage) -> String {
        let (heading, servings, ingredients, steps) = match language {
            InterfaceLanguage::ZhHk => ("食譜分享", "人份", "材料：", "步驟："),
            InterfaceLanguage::En | InterfaceLanguage::Fil => {
                ("Recipe Share", "servings", "Ingredients:", "Steps:")
            }
        };

        let mut out = format!(
            "📖 {}\n\n{}\n⏱ {}min | 👥 {} {}\n\n{}\n",
            heading, self.title, self.cooking_time, self.servings, servings, ingredients
        );
        for i in &self.ingredients {
            out.push_str(&format!("• {} - {} {}\n", i.name, i.quantity, i.unit));
        }
        out.push_str(&format!("\n{}\n", steps));
        for s in &self.instructions {
            out.push_str(&format!("{}. {}\n", s.step, s.instruction));
        }
        out
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShoppingListEntry {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    #[serde(default)]
    pub alternatives: Vec<String>,
}

impl From<RecipeIngredient> for ShoppingListEntry {
    fn from(i: RecipeIngredient) -> Self {
        Self {
            name: i.name,
            quantity: i.quantity,
            unit: i.unit,
            alternatives: i.alternatives,
        }
    }
}

/// Parses a serde-renamed unit enum from its wire string.
pub fn parse_tag<T: DeserializeOwned>(raw: &str) -> Option<T> {
    serde_json::from_value(serde_json::Value::String(raw.to_string())).ok()
}

/// Wire string of a serde-renamed unit enum, as stored in text columns.
pub fn tag_str<T: Serialize>(tag: &T) -> String {
    match serde_json::to_value(tag) {
        Ok(serde_json::Value::String(s)) => s,
        _ => String::new(),
    }
}

/// Unknown tags are dropped rather than failing the whole row.
pub fn parse_tags<T: DeserializeOwned>(raw: &[String]) -> Vec<T> {
    raw.iter().filter_map(|s| parse_tag(s)).collect()
}

pub fn tag_strs<T: Serialize>(tags: &[T]) -> Vec<String> {
    tags.iter().map(tag_str).collect()
}
