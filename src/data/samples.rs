//! Bundled household used when no backend is configured or it fails.

use rand::Rng;
use time::macros::{date, datetime};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::models::{
    Allergy, BudgetRange, CookingSkill, Cuisine, DietaryRestriction, Difficulty, Family,
    FamilyMember, FamilyPreferences, HealthCondition, InterfaceLanguage, InventoryItem,
    ItemCategory, MealTimes, MemberPreferences, Recipe, RecipeIngredient, RecipeStep, SpiceLevel,
};

const SAMPLE_ADDED_AT: OffsetDateTime = datetime!(2024-01-10 10:00 UTC);
const SAMPLE_CREATED_AT: OffsetDateTime = datetime!(2024-01-01 00:00 UTC);

#[allow(clippy::too_many_arguments)]
fn member(
    n: u128,
    name: &str,
    age: u8,
    dietary_restrictions: Vec<DietaryRestriction>,
    allergies: Vec<Allergy>,
    health_conditions: Vec<HealthCondition>,
    spice_level: SpiceLevel,
    favorite_cuisines: Vec<Cuisine>,
    disliked: &[&str],
) -> FamilyMember {
    FamilyMember {
        id: Uuid::from_u128(0x100 + n),
        name: name.into(),
        age,
        dietary_restrictions,
        allergies,
        health_conditions,
        preferences: MemberPreferences {
            spice_level,
            favorite_cuisines,
            disliked_ingredients: disliked.iter().map(|s| s.to_string()).collect(),
        },
    }
}

pub fn sample_family() -> Family {
    Family {
        id: Uuid::from_u128(0x10),
        name: "The Lees".into(),
        members: vec![
            member(
                1,
                "John",
                35,
                vec![],
                vec![Allergy::Nuts],
                vec![],
                SpiceLevel::Medium,
                vec![Cuisine::Chinese, Cuisine::Western],
                &["mushrooms"],
            ),
            member(
                2,
                "Mary",
                32,
                vec![DietaryRestriction::Vegetarian],
                vec![],
                vec![HealthCondition::Diabetes],
                SpiceLevel::Mild,
                vec![Cuisine::Chinese, Cuisine::Japanese],
                &["spicy food"],
            ),
            member(
                3,
                "Emma",
                8,
                vec![],
                vec![Allergy::Dairy],
                vec![],
                SpiceLevel::None,
                vec![Cuisine::Western, Cuisine::Japanese],
                &["vegetables"],
            ),
        ],
        preferences: FamilyPreferences {
            cooking_skill_level: CookingSkill::Intermediate,
            budget_range: BudgetRange::Medium,
            meal_times: MealTimes::default(),
            preferred_language: InterfaceLanguage::En,
        },
        created_at: SAMPLE_CREATED_AT,
        updated_at: SAMPLE_CREATED_AT,
    }
}

fn stock(
    n: u128,
    name: &str,
    category: ItemCategory,
    quantity: f64,
    unit: &str,
    expiry_date: Option<Date>,
    confidence: f64,
) -> InventoryItem {
    InventoryItem {
        id: Uuid::from_u128(0x200 + n),
        name: name.into(),
        category,
        quantity,
        unit: unit.into(),
        expiry_date,
        confidence,
        added_at: SAMPLE_ADDED_AT,
    }
}

pub fn sample_inventory() -> Vec<InventoryItem> {
    use ItemCategory::*;
    vec![
        stock(1, "Chicken Breast", Meat, 2.0, "pieces", Some(date!(2024-01-15)), 0.95),
        stock(2, "Broccoli", Vegetables, 1.0, "head", Some(date!(2024-01-12)), 0.92),
        stock(3, "Rice", Grains, 500.0, "g", None, 0.98),
        stock(4, "Soy Sauce", Condiments, 1.0, "bottle", None, 0.99),
        stock(5, "Eggs", Dairy, 6.0, "pieces", Some(date!(2024-01-20)), 0.97),
        stock(6, "Tomatoes", Vegetables, 3.0, "pieces", Some(date!(2024-01-14)), 0.94),
        stock(7, "Onion", Vegetables, 2.0, "pieces", None, 0.96),
        stock(8, "Garlic", Vegetables, 1.0, "bulb", None, 0.93),
    ]
}

fn ingredient(name: &str, quantity: f64, unit: &str, available: bool) -> RecipeIngredient {
    RecipeIngredient {
        name: name.into(),
        quantity,
        unit: unit.into(),
        available,
        alternatives: Vec::new(),
    }
}

fn steps(instructions: &[&str]) -> Vec<RecipeStep> {
    instructions
        .iter()
        .enumerate()
        .map(|(i, text)| RecipeStep {
            step: i as u32 + 1,
            instruction: text.to_string(),
            duration: None,
            temperature: None,
            image_url: None,
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn recipe(
    id: &str,
    title: &str,
    description: &str,
    cuisine: Cuisine,
    cooking_time: u32,
    servings: u32,
    ingredients: Vec<RecipeIngredient>,
    instructions: &[&str],
    tags: &[&str],
) -> Recipe {
    let available = ingredients.iter().filter(|i| i.available).count();
    let total = ingredients.len();
    Recipe {
        id: id.into(),
        title: title.into(),
        description: description.into(),
        cuisine,
        difficulty: Difficulty::Easy,
        cooking_time,
        servings,
        ingredients,
        instructions: steps(instructions),
        nutrition_info: None,
        tags: tags.iter().map(|s| s.to_string()).collect(),
        image_url: None,
        match_score: crate::recipes::matching::match_score(available, total),
        available_ingredients: available,
        total_ingredients: total,
    }
}

pub fn sample_recipes() -> Vec<Recipe> {
    vec![
        recipe(
            "recipe-1",
            "Chicken and Broccoli Stir Fry",
            "A simple and healthy stir fry with tender chicken and fresh broccoli",
            Cuisine::Chinese,
            20,
            3,
            vec![
                ingredient("Chicken Breast", 2.0, "pieces", true),
                ingredient("Broccoli", 1.0, "head", true),
                ingredient("Soy Sauce", 2.0, "tbsp", true),
                ingredient("Garlic", 2.0, "cloves", true),
                ingredient("Rice", 1.0, "cup", true),
            ],
            &[
                "Cut chicken into bite-sized pieces",
                "Cut broccoli into florets",
                "Heat oil in wok over high heat",
                "Stir fry chicken until cooked through",
                "Add broccoli and garlic, stir fry for 2 minutes",
                "Add soy sauce and serve over rice",
            ],
            &["quick", "healthy", "family-friendly"],
        ),
        recipe(
            "recipe-2",
            "Tomato and Egg Scramble",
            "Classic Cantonese home-style dish with fresh tomatoes and fluffy eggs",
            Cuisine::Cantonese,
            15,
            2,
            vec![
                ingredient("Eggs", 4.0, "pieces", true),
                ingredient("Tomatoes", 2.0, "pieces", true),
                ingredient("Onion", 0.5, "piece", true),
                ingredient("Sugar", 1.0, "tsp", false),
                ingredient("Salt", 0.5, "tsp", false),
            ],
            &[
                "Beat eggs with salt",
                "Cut tomatoes into wedges",
                "Dice onion finely",
                "Scramble eggs until just set, remove from pan",
                "Stir fry onion and tomatoes until soft",
                "Add eggs back and gently combine",
            ],
            &["comfort-food", "quick", "cantonese"],
        ),
        recipe(
            "recipe-3",
            "Simple Fried Rice",
            "Easy fried rice using leftover rice and available ingredients",
            Cuisine::Chinese,
            10,
            2,
            vec![
                ingredient("Rice", 2.0, "cups", true),
                ingredient("Eggs", 2.0, "pieces", true),
                ingredient("Soy Sauce", 2.0, "tbsp", true),
                ingredient("Garlic", 1.0, "clove", true),
                ingredient("Green Onions", 2.0, "stalks", false),
            ],
            &[
                "Heat oil in wok",
                "Scramble eggs and set aside",
                "Stir fry garlic until fragrant",
                "Add rice and break up clumps",
                "Add soy sauce and eggs",
                "Garnish with green onions if available",
            ],
            &["leftover-rice", "quick", "simple"],
        ),
    ]
}

/// Sample recipes with a uniformly random match score in `60..=100`.
pub fn sample_recipes_with_random_scores() -> Vec<Recipe> {
    let mut rng = rand::thread_rng();
    sample_recipes()
        .into_iter()
        .map(|mut r| {
            r.match_score = rng.gen_range(60..=100);
            r
        })
        .collect()
}
