//! Vision and text-generation model access.
//!
//! Both models are reached through an OpenAI-compatible chat-completions
//! endpoint. Reply decoding lives in [`decode`] so it can be tested against
//! recorded replies without a network.

use async_trait::async_trait;

use crate::models::{Allergy, Cuisine, DetectedItem, DietaryRestriction, Recipe};

pub mod client;
pub mod decode;
pub mod recipes;
pub mod vision;

pub use decode::MalformedModelResponse;

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("model API key not configured")]
    MissingApiKey,
    #[error("model request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("model API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("no content received from model")]
    EmptyContent,
    #[error(transparent)]
    Malformed(#[from] MalformedModelResponse),
}

/// What the recipe model gets asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeRequest {
    pub available_ingredients: Vec<String>,
    pub cuisine_types: Vec<Cuisine>,
    pub dietary_restrictions: Vec<DietaryRestriction>,
    pub allergies: Vec<Allergy>,
    pub servings: u32,
}

#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Detects food items in one base64-encoded JPEG.
    async fn analyze_photo(&self, image_b64: &str) -> Result<Vec<DetectedItem>, AiError>;
}

#[async_trait]
pub trait RecipeModel: Send + Sync {
    /// Whether a credential is present; callers skip the model entirely if not.
    fn is_configured(&self) -> bool;

    async fn generate_recipes(&self, request: &RecipeRequest) -> Result<Vec<Recipe>, AiError>;
}
