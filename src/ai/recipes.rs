use async_trait::async_trait;
use serde_json::Value;
use time::OffsetDateTime;
use tracing::{info, instrument};

use super::client::{ChatClient, ChatCompletionRequest, ChatMessage};
use super::decode::{decode_model_json, MalformedModelResponse};
use super::vision::{loose_number, non_empty_str};
use super::{AiError, RecipeModel, RecipeRequest};
use crate::models::{
    parse_tag, tag_str, Cuisine, Difficulty, NutritionInfo, Recipe, RecipeIngredient, RecipeStep,
};
use crate::recipes::matching::annotate_ingredients;

const SYSTEM_PROMPT: &str = r#"You are an expert chef and nutritionist who knows Hong Kong home cooking as well as international cuisines.

You write practical, family-friendly recipes around the ingredients a family already has.

RULES:
1. Reply with ONLY valid JSON, no markdown and no explanations
2. Offer 3-5 different recipes
3. Use as many of the available ingredients as you can
4. Dietary restrictions and allergies are absolute
5. Give specific ingredient names and quantities
6. Write clear step-by-step instructions
7. Keep Hong Kong tastes and local ingredients in mind
8. Keep recipes doable in a home kitchen

Output format:
{
  "recipes": [
    {
      "title": "Recipe Name",
      "description": "Brief description",
      "cuisine": "chinese|western|japanese|etc",
      "difficulty": "easy|medium|hard",
      "cookingTime": 30,
      "servings": 4,
      "ingredients": [
        {"name": "Chicken Breast", "quantity": 2, "unit": "pieces", "alternatives": ["Pork", "Tofu"]}
      ],
      "instructions": [
        {"instruction": "Step description", "duration": 5, "temperature": 180}
      ],
      "tags": ["quick", "healthy", "family-friendly"]
    }
  ]
}"#;

const RECIPE_COUNT: u32 = 3;

pub fn build_user_prompt(request: &RecipeRequest) -> String {
    fn bullets<I: IntoIterator<Item = String>>(items: I) -> String {
        items
            .into_iter()
            .map(|s| format!("- {}", s))
            .collect::<Vec<_>>()
            .join("\n")
    }

    let mut prompt = format!(
        "Generate {} recipes for {} people with these requirements:\n\n",
        RECIPE_COUNT, request.servings
    );
    prompt.push_str("AVAILABLE INGREDIENTS:\n");
    prompt.push_str(&bullets(request.available_ingredients.iter().cloned()));
    prompt.push_str("\n\nCUISINE PREFERENCES:\n");
    prompt.push_str(&bullets(request.cuisine_types.iter().map(tag_str)));

    if !request.dietary_restrictions.is_empty() {
        prompt.push_str("\n\nDIETARY RESTRICTIONS (MUST FOLLOW):\n");
        prompt.push_str(&bullets(request.dietary_restrictions.iter().map(tag_str)));
    }
    if !request.allergies.is_empty() {
        prompt.push_str("\n\nALLERGIES (MUST AVOID):\n");
        prompt.push_str(&bullets(request.allergies.iter().map(tag_str)));
    }

    prompt.push_str(
        "\n\nREQUIREMENTS:\n\
         1. Prefer the available ingredients\n\
         2. Suggest realistic alternatives for anything missing\n\
         3. Suit Hong Kong families\n\
         4. Follow the selected cuisine styles\n\
         5. Number the cooking steps clearly\n\
         6. Estimate cooking times\n\
         7. Add useful tags (quick, healthy, budget-friendly, ...)\n\n\
         Return ONLY the JSON response, no other text.",
    );
    prompt
}

pub struct OpenAiRecipes {
    client: ChatClient,
    model: String,
}

impl OpenAiRecipes {
    pub fn new(client: ChatClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl RecipeModel for OpenAiRecipes {
    fn is_configured(&self) -> bool {
        self.client.is_configured()
    }

    #[instrument(skip(self, request), fields(model = %self.model, ingredients = request.available_ingredients.len()))]
    async fn generate_recipes(&self, request: &RecipeRequest) -> Result<Vec<Recipe>, AiError> {
        let chat = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(build_user_prompt(request)),
            ],
            max_tokens: 3000,
            temperature: 0.7,
        };
        let content = self.client.complete(&chat).await?;
        let recipes = parse_recipe_reply(&content, request)?;
        info!(recipes = recipes.len(), "recipes generated");
        Ok(recipes)
    }
}

/// Decodes a recipe reply and scores every recipe against the request's
/// available ingredients.
pub fn parse_recipe_reply(
    content: &str,
    request: &RecipeRequest,
) -> Result<Vec<Recipe>, MalformedModelResponse> {
    let parsed: Value = decode_model_json(content)?;
    let raw_recipes = match &parsed {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => map
            .get("recipes")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default(),
        _ => &[],
    };

    let stamp = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    Ok(raw_recipes
        .iter()
        .enumerate()
        .map(|(index, raw)| build_recipe(raw, format!("ai-{}-{}", stamp, index), request))
        .collect())
}

fn field<'a>(raw: &'a Value, camel: &str, snake: &str) -> &'a Value {
    match raw.get(camel) {
        Some(v) if !v.is_null() => v,
        _ => &raw[snake],
    }
}

fn positive_u32(v: &Value) -> Option<u32> {
    loose_number(v)
        .filter(|n| *n > 0.0)
        .map(|n| n.round() as u32)
}

fn string_list(v: &Value) -> Vec<String> {
    v.as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|s| s.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn build_recipe(raw: &Value, id: String, request: &RecipeRequest) -> Recipe {
    let cuisine = raw["cuisine"]
        .as_str()
        .and_then(Cuisine::parse)
        .or_else(|| request.cuisine_types.first().copied())
        .unwrap_or(Cuisine::Fusion);
    let difficulty = raw["difficulty"]
        .as_str()
        .and_then(|d| parse_tag::<Difficulty>(&d.to_lowercase()))
        .unwrap_or_default();

    let ingredients = raw["ingredients"]
        .as_array()
        .map(|items| items.iter().filter_map(build_ingredient).collect())
        .unwrap_or_default();
    let summary = annotate_ingredients(ingredients, &request.available_ingredients);

    Recipe {
        id,
        title: non_empty_str(&raw["title"])
            .unwrap_or("Untitled Recipe")
            .to_string(),
        description: raw["description"].as_str().unwrap_or_default().to_string(),
        cuisine,
        difficulty,
        cooking_time: positive_u32(field(raw, "cookingTime", "cooking_time")).unwrap_or(30),
        servings: positive_u32(&raw["servings"]).unwrap_or(request.servings),
        ingredients: summary.ingredients,
        instructions: raw["instructions"]
            .as_array()
            .map(|steps| {
                steps
                    .iter()
                    .enumerate()
                    .map(|(i, s)| build_step(s, i as u32 + 1))
                    .collect()
            })
            .unwrap_or_default(),
        nutrition_info: serde_json::from_value::<NutritionInfo>(
            field(raw, "nutritionInfo", "nutrition_info").clone(),
        )
        .ok(),
        tags: string_list(&raw["tags"]),
        image_url: non_empty_str(field(raw, "imageUrl", "image_url")).map(str::to_string),
        match_score: summary.score,
        available_ingredients: summary.available,
        total_ingredients: summary.total,
    }
}

fn build_ingredient(raw: &Value) -> Option<RecipeIngredient> {
    if let Some(name) = non_empty_str(raw) {
        return Some(RecipeIngredient {
            name: name.to_string(),
            quantity: 1.0,
            unit: "piece".to_string(),
            available: false,
            alternatives: Vec::new(),
        });
    }
    let name = non_empty_str(&raw["name"])?;
    Some(RecipeIngredient {
        name: name.to_string(),
        quantity: loose_number(&raw["quantity"])
            .filter(|q| *q != 0.0)
            .unwrap_or(1.0),
        unit: non_empty_str(&raw["unit"]).unwrap_or("piece").to_string(),
        available: false,
        alternatives: string_list(&raw["alternatives"]),
    })
}

fn build_step(raw: &Value, step: u32) -> RecipeStep {
    if let Some(text) = raw.as_str() {
        return RecipeStep {
            step,
            instruction: text.to_string(),
            duration: None,
            temperature: None,
            image_url: None,
        };
    }
    let image_url = [
        field(raw, "imageUrl", "image_url"),
        &raw["photoUrl"],
    ]
    .into_iter()
    .find_map(non_empty_str)
    .map(str::to_string);

    RecipeStep {
        step,
        instruction: raw["instruction"].as_str().unwrap_or_default().to_string(),
        duration: positive_u32(&raw["duration"]),
        temperature: positive_u32(&raw["temperature"]),
        image_url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Allergy, DietaryRestriction};

    fn request() -> RecipeRequest {
        RecipeRequest {
            available_ingredients: vec![
                "Chicken Breast".into(),
                "Broccoli".into(),
                "Soy".into(),
            ],
            cuisine_types: vec![Cuisine::Cantonese, Cuisine::Western],
            dietary_restrictions: vec![],
            allergies: vec![Allergy::Peanuts],
            servings: 3,
        }
    }

    const RECORDED_REPLY: &str = r#"```json
{
  "recipes": [
    {
      "title": "Chicken and Broccoli Stir Fry",
      "description": "Quick weeknight stir fry",
      "cuisine": "Chinese",
      "difficulty": "easy",
      "cookingTime": 20,
      "servings": 4,
      "ingredients": [
        {"name": "Chicken Breast", "quantity": 2, "unit": "pieces", "alternatives": ["Pork", "Tofu"]},
        {"name": "Broccoli", "quantity": 1, "unit": "head"},
        {"name": "Soy Sauce", "quantity": 2, "unit": "tbsp"},
        {"name": "Ginger", "quantity": 1, "unit": "thumb"}
      ],
      "instructions": [
        {"instruction": "Slice the chicken", "duration": 5},
        {"instruction": "Stir fry everything", "duration": 8, "temperature": 200}
      ],
      "tags": ["quick", "healthy"]
    }
  ]
}
```"#;

    #[test]
    fn parses_recorded_reply_and_scores_it() {
        let recipes = parse_recipe_reply(RECORDED_REPLY, &request()).unwrap();
        assert_eq!(recipes.len(), 1);
        let r = &recipes[0];
        assert!(r.id.starts_with("ai-") && r.id.ends_with("-0"));
        assert_eq!(r.cuisine, Cuisine::Chinese);
        assert_eq!(r.difficulty, Difficulty::Easy);
        assert_eq!(r.cooking_time, 20);
        assert_eq!(r.servings, 4);
        assert_eq!(r.total_ingredients, 4);
        // "Soy" in the fridge satisfies "Soy Sauce"
        assert_eq!(r.available_ingredients, 3);
        assert_eq!(r.match_score, 75);
        assert!(!r.ingredients[3].available);
        assert_eq!(r.ingredients[0].alternatives, vec!["Pork", "Tofu"]);
        assert_eq!(r.instructions[1].step, 2);
        assert_eq!(r.instructions[1].temperature, Some(200));
        assert_eq!(r.tags, vec!["quick", "healthy"]);
    }

    #[test]
    fn top_level_array_and_defaults() {
        let reply = r#"[{"cuisine": "martian", "ingredients": ["Broccoli", "Tofu"], "instructions": ["Boil", "Serve"]}]"#;
        let recipes = parse_recipe_reply(reply, &request()).unwrap();
        let r = &recipes[0];
        assert_eq!(r.title, "Untitled Recipe");
        assert_eq!(r.description, "");
        assert_eq!(r.cuisine, Cuisine::Cantonese);
        assert_eq!(r.difficulty, Difficulty::Medium);
        assert_eq!(r.cooking_time, 30);
        assert_eq!(r.servings, 3);
        assert_eq!(r.ingredients[0].unit, "piece");
        assert_eq!(r.ingredients[0].quantity, 1.0);
        assert_eq!(r.match_score, 50);
        assert_eq!(r.instructions[0].instruction, "Boil");
        assert_eq!(r.instructions[1].step, 2);
    }

    #[test]
    fn no_cuisine_preference_defaults_to_fusion() {
        let mut req = request();
        req.cuisine_types.clear();
        let recipes = parse_recipe_reply(r#"{"recipes": [{"title": "Soup"}]}"#, &req).unwrap();
        assert_eq!(recipes[0].cuisine, Cuisine::Fusion);
        assert_eq!(recipes[0].match_score, 0);
    }

    #[test]
    fn object_without_recipes_key_is_empty() {
        let recipes = parse_recipe_reply(r#"{"dishes": []}"#, &request()).unwrap();
        assert!(recipes.is_empty());
    }

    #[test]
    fn malformed_reply_is_an_error() {
        let err = parse_recipe_reply("Sorry, I cannot help with that.", &request()).unwrap_err();
        assert!(err.to_string().contains("malformed"));
    }

    #[test]
    fn prompt_lists_sections_only_when_present() {
        let prompt = build_user_prompt(&request());
        assert!(prompt.contains("for 3 people"));
        assert!(prompt.contains("- Chicken Breast"));
        assert!(prompt.contains("- cantonese"));
        assert!(prompt.contains("ALLERGIES (MUST AVOID):\n- peanuts"));
        assert!(!prompt.contains("DIETARY RESTRICTIONS"));

        let mut req = request();
        req.dietary_restrictions = vec![DietaryRestriction::GlutenFree];
        req.allergies.clear();
        let prompt = build_user_prompt(&req);
        assert!(prompt.contains("DIETARY RESTRICTIONS (MUST FOLLOW):\n- gluten-free"));
        assert!(!prompt.contains("ALLERGIES"));
    }
}
