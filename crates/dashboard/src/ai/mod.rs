//! Generative-AI helpers for the dashboard forms.
//!
//! - [`AiAssistant::describe_product`] drafts marketing copy for a product.
//! - [`AiAssistant::estimate_capacity`] estimates how many units of a product
//!   fit in one self-delivery vehicle.
//!
//! The model is asked to answer with a single JSON object. The first balanced
//! `{...}` in the reply text is parsed, so surrounding prose or code fences
//! are tolerated.

mod client;
pub mod error;
pub mod types;

pub use client::ClaudeClient;
pub use error::AiError;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tracing::instrument;

use vendor_hub_core::VehicleType;

use types::Message;

const DESCRIPTION_SYSTEM_PROMPT: &str = "You write product copy for small online shops. \
Answer with one JSON object and nothing else.";

const CAPACITY_SYSTEM_PROMPT: &str = "You plan deliveries for small shops. \
Answer with one JSON object and nothing else.";

/// Input for a product description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductDescriptionRequest {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    /// Free-form traits: ingredients, materials, sizes.
    #[serde(default)]
    pub attributes: Vec<String>,
}

/// Generated product copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDescription {
    pub short_description: String,
    pub full_description: String,
}

/// Input for a vehicle capacity estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityRequest {
    pub length_cm: Decimal,
    pub width_cm: Decimal,
    pub height_cm: Decimal,
    pub weight_kg: Decimal,
    pub vehicle: VehicleType,
}

/// How many units fit in one vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityEstimate {
    pub vehicle: VehicleType,
    /// Units that fit by cargo volume.
    pub by_volume: u32,
    /// Units that fit by load weight.
    pub by_weight: u32,
    /// The binding limit: the smaller of the two counts.
    pub quantity: u32,
    pub rationale: String,
}

#[derive(Debug, Deserialize)]
struct CapacityReply {
    by_volume: u32,
    by_weight: u32,
    #[serde(default)]
    rationale: String,
}

/// Runs the AI helper flows against a [`ClaudeClient`].
#[derive(Clone)]
pub struct AiAssistant {
    client: ClaudeClient,
}

impl AiAssistant {
    #[must_use]
    pub const fn new(client: ClaudeClient) -> Self {
        Self { client }
    }

    /// Draft a short and a full description for a product.
    ///
    /// # Errors
    ///
    /// - `AiError::InvalidInput` if the name is blank
    /// - `AiError::Parse` if the reply has no usable JSON object
    /// - any client error from the API call
    #[instrument(skip(self, request), fields(product = %request.name))]
    pub async fn describe_product(
        &self,
        request: &ProductDescriptionRequest,
    ) -> Result<ProductDescription, AiError> {
        if request.name.trim().is_empty() {
            return Err(AiError::InvalidInput("product name is required".to_string()));
        }
        let reply = self
            .client
            .chat(
                vec![Message::user(description_prompt(request))],
                Some(DESCRIPTION_SYSTEM_PROMPT.to_string()),
            )
            .await?;
        let description: ProductDescription = parse_reply(&reply.text())?;
        if description.short_description.trim().is_empty()
            || description.full_description.trim().is_empty()
        {
            return Err(AiError::Parse("reply has an empty description".to_string()));
        }
        Ok(description)
    }

    /// Estimate how many units fit in one vehicle.
    ///
    /// # Errors
    ///
    /// - `AiError::InvalidInput` if a dimension or the weight is not positive
    /// - `AiError::Parse` if the reply has no usable JSON object
    /// - any client error from the API call
    #[instrument(skip(self, request), fields(vehicle = %request.vehicle))]
    pub async fn estimate_capacity(
        &self,
        request: &CapacityRequest,
    ) -> Result<CapacityEstimate, AiError> {
        for (field, value) in [
            ("length_cm", request.length_cm),
            ("width_cm", request.width_cm),
            ("height_cm", request.height_cm),
            ("weight_kg", request.weight_kg),
        ] {
            if value <= Decimal::ZERO {
                return Err(AiError::InvalidInput(format!("{field} must be greater than 0")));
            }
        }

        let reply = self
            .client
            .chat(
                vec![Message::user(capacity_prompt(request))],
                Some(CAPACITY_SYSTEM_PROMPT.to_string()),
            )
            .await?;
        let parsed: CapacityReply = parse_reply(&reply.text())?;
        Ok(CapacityEstimate {
            vehicle: request.vehicle,
            by_volume: parsed.by_volume,
            by_weight: parsed.by_weight,
            quantity: parsed.by_volume.min(parsed.by_weight),
            rationale: parsed.rationale,
        })
    }
}

fn description_prompt(request: &ProductDescriptionRequest) -> String {
    let mut prompt = format!("Product name: {}\n", request.name.trim());
    if let Some(category) = request.category.as_deref().filter(|c| !c.trim().is_empty()) {
        prompt.push_str(&format!("Category: {}\n", category.trim()));
    }
    if !request.attributes.is_empty() {
        prompt.push_str(&format!("Details: {}\n", request.attributes.join("; ")));
    }
    prompt.push_str(
        "\nWrite a one-sentence short_description (at most 160 characters) and a \
         full_description of two or three short paragraphs. Respond as \
         {\"short_description\": \"...\", \"full_description\": \"...\"}.",
    );
    prompt
}

/// Cargo space the model is told to assume for each vehicle.
const fn vehicle_profile(vehicle: VehicleType) -> &'static str {
    match vehicle {
        VehicleType::Bike => "a motorbike with a rear delivery box of about 45 x 40 x 40 cm and a 30 kg load limit",
        VehicleType::Car => "a small hatchback with about 300 litres of cargo space and a 250 kg load limit",
    }
}

fn capacity_prompt(request: &CapacityRequest) -> String {
    format!(
        "Vehicle: {}.\n\
         One unit measures {} x {} x {} cm and weighs {} kg.\n\
         Count how many whole units fit by volume (by_volume) and how many the \
         vehicle can carry by weight (by_weight), allowing for packing gaps. \
         Respond as {{\"by_volume\": <integer>, \"by_weight\": <integer>, \
         \"rationale\": \"<one sentence>\"}}.",
        vehicle_profile(request.vehicle),
        request.length_cm.normalize(),
        request.width_cm.normalize(),
        request.height_cm.normalize(),
        request.weight_kg.normalize(),
    )
}

fn parse_reply<T: DeserializeOwned>(text: &str) -> Result<T, AiError> {
    let json = first_json_object(text)
        .ok_or_else(|| AiError::Parse("reply contains no JSON object".to_string()))?;
    serde_json::from_str(json).map_err(|e| AiError::Parse(format!("unexpected reply shape: {e}")))
}

/// The first balanced `{...}` in `text`, skipping braces inside strings.
fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text.get(start..)?.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return text.get(start..=start + offset);
                }
            }
            _ => {}
        }
    }
    None
}
