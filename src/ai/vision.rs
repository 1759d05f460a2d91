use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, instrument, warn};

use super::client::{ChatClient, ChatCompletionRequest, ChatMessage};
use super::decode::{decode_model_json, MalformedModelResponse};
use super::{AiError, VisionModel};
use crate::inventory::merge::merge_detected_items;
use crate::models::{DetectedItem, InventoryItem, ItemCategory};

const VISION_PROMPT: &str = r#"You are the assistant inside a smart fridge. Look at this photo of the fridge and list EVERY food item you can see.

For each item give:
- name: the item name in English
- category: exactly one of vegetables, fruits, meat, seafood, dairy, grains, condiments, beverages, snacks, frozen, canned, other
- quantity: a reasonable estimate of how many or how much
- unit: a fitting unit (pieces, g, kg, ml, l, bottle, head, bulb, ...)
- confidence: how sure you are, from 0.0 to 1.0

Reply with ONLY a JSON array and nothing else, for example:
[
  {"name": "Chicken Breast", "category": "meat", "quantity": 2, "unit": "pieces", "confidence": 0.95}
]

Use specific names ("Chicken Breast", not "Chicken"), estimate quantities conservatively and leave out anything you cannot see clearly."#;

pub struct OpenAiVision {
    client: ChatClient,
    model: String,
}

impl OpenAiVision {
    pub fn new(client: ChatClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl VisionModel for OpenAiVision {
    #[instrument(skip(self, image_b64), fields(model = %self.model))]
    async fn analyze_photo(&self, image_b64: &str) -> Result<Vec<DetectedItem>, AiError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user_with_image(VISION_PROMPT, image_b64)],
            max_tokens: 2000,
            temperature: 0.3,
        };
        let content = self.client.complete(&request).await?;
        Ok(parse_vision_reply(&content)?)
    }
}

/// Decodes a vision reply; anything other than a top-level array is empty.
pub fn parse_vision_reply(content: &str) -> Result<Vec<DetectedItem>, MalformedModelResponse> {
    let parsed: Value = decode_model_json(content)?;
    Ok(parsed
        .as_array()
        .map(|items| items.iter().map(normalize_detected).collect())
        .unwrap_or_default())
}

/// Reads a number the way the model tends to send it, numeric strings included.
pub(crate) fn loose_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn non_empty_str(v: &Value) -> Option<&str> {
    v.as_str().filter(|s| !s.is_empty())
}

fn normalize_detected(raw: &Value) -> DetectedItem {
    let quantity = loose_number(&raw["quantity"])
        .filter(|q| *q != 0.0 && !q.is_nan())
        .unwrap_or(1.0)
        .max(0.0);
    let confidence = loose_number(&raw["confidence"])
        .filter(|c| *c != 0.0 && !c.is_nan())
        .unwrap_or(0.5)
        .clamp(0.0, 1.0);

    DetectedItem {
        name: non_empty_str(&raw["name"]).unwrap_or("Unknown Item").to_string(),
        category: raw["category"]
            .as_str()
            .map(ItemCategory::parse_or_other)
            .unwrap_or_default(),
        quantity,
        unit: non_empty_str(&raw["unit"]).unwrap_or("pieces").to_string(),
        confidence,
    }
}

/// Analyzes photos one after another and merges what they saw.
///
/// A photo whose analysis fails is logged and left out; the rest still count.
pub async fn analyze_photos(vision: &dyn VisionModel, photos: &[String]) -> Vec<InventoryItem> {
    let mut detected = Vec::new();
    for (i, photo) in photos.iter().enumerate() {
        match vision.analyze_photo(photo).await {
            Ok(items) => {
                info!(photo = i + 1, items = items.len(), "photo analyzed");
                detected.extend(items);
            }
            Err(e) => warn!(photo = i + 1, error = %e, "photo analysis failed; skipping"),
        }
    }
    merge_detected_items(detected)
}
