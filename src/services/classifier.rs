use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};

use crate::core::pipeline::{BandClassifier, ClassifierError};
use crate::models::{BandAssignment, PropertyRecord};

/// Criteria the oracle is nudged toward when the caller supplies none
pub const DEFAULT_CRITERIA_HINTS: [&str; 3] =
    ["furnishing_level", "rent_per_sqft", "amenities_count"];

/// Band classification oracle client
///
/// Renders the subject and its comparables into a deterministic natural-
/// language instruction, sends it to a messages-style LLM endpoint, and
/// validates the structured JSON reply. The call is a single bounded-
/// timeout request; retries, if wanted, belong to the caller's collaborator
/// layer, not here.
#[derive(Debug, Clone)]
pub struct LlmBandClassifier {
    api_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    criteria_hints: Vec<String>,
    client: Client,
}

impl LlmBandClassifier {
    pub fn new(
        api_url: String,
        api_key: String,
        model: String,
        timeout_secs: u64,
        max_tokens: u32,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_url,
            api_key,
            model,
            max_tokens,
            criteria_hints: DEFAULT_CRITERIA_HINTS
                .iter()
                .map(|hint| hint.to_string())
                .collect(),
            client,
        }
    }

    /// Replace the default criteria hints
    pub fn with_criteria_hints(mut self, hints: Vec<String>) -> Self {
        if !hints.is_empty() {
            self.criteria_hints = hints;
        }
        self
    }
}

impl BandClassifier for LlmBandClassifier {
    async fn classify(
        &self,
        subject: &PropertyRecord,
        comparables: &[PropertyRecord],
    ) -> Result<BandAssignment, ClassifierError> {
        let instruction = build_instruction(subject, comparables, &self.criteria_hints);

        let payload = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [{ "role": "user", "content": instruction }],
        });

        tracing::debug!(
            "Requesting band classification for {} with {} comparables",
            subject.id,
            comparables.len()
        );

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&payload)
            .send()
            .await
            .map_err(|e| ClassifierError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ClassifierError::Unavailable(format!(
                "oracle returned status {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ClassifierError::InvalidResponse(e.to_string()))?;

        let text = body
            .get("content")
            .and_then(|content| content.as_array())
            .and_then(|blocks| blocks.first())
            .and_then(|block| block.get("text"))
            .and_then(|text| text.as_str())
            .ok_or_else(|| {
                ClassifierError::InvalidResponse("missing text content block".to_string())
            })?;

        parse_assignment(text)
    }
}

/// Render the classification instruction for a subject and its comparables
///
/// Output is fully determined by its inputs; the same properties always
/// produce the same instruction.
fn build_instruction(
    subject: &PropertyRecord,
    comparables: &[PropertyRecord],
    criteria_hints: &[String],
) -> String {
    let mut prompt = format!(
        "You are a property analysis expert. Your task is to categorize rental \
properties into 5 market bands (L1 to L5) based on their features and market \
positioning.

L5 = Best/Premium properties
L4 = High-quality properties
L3 = Mid-range properties
L2 = Basic properties
L1 = Minimal/Entry-level properties

Criteria hints (you can use these or discover better ones):
{}

Comparable properties to analyze:
",
        criteria_hints.join(", ")
    );

    for record in comparables {
        prompt.push_str(&format!(
            "
Property ID: {}
- Furniture: {}
- Appliances: {}
- Amenities: {}
- Current Rent: {}
- Area: {} sqft
",
            record.id,
            list_or_none(&record.amenities.furniture_items),
            list_or_none(&record.amenities.appliances),
            list_or_none(&record.amenities.amenities),
            record
                .current_rent
                .map(|rent| rent.to_string())
                .unwrap_or_else(|| "Not set".to_string()),
            record.structural.area_sqft,
        ));
    }

    prompt.push_str(&format!(
        "
Subject property to classify:
Property ID: {}
- Furniture: {}
- Appliances: {}
- Amenities: {}
- Area: {} sqft

Task:
1. Categorize the comparable properties into bands L1-L5
2. Decide which criteria are most relevant for the categorization
3. Place the subject property into the appropriate band
4. Provide a confidence score and a brief rationale

Reply with a single JSON object and nothing else, using exactly these keys:
- \"bands\": object mapping band labels (L1-L5) to arrays of property ids
- \"criteriaUsed\": array of the criteria you used
- \"rationale\": brief explanation of your categorization logic
- \"subjectBand\": the band assigned to the subject property
- \"confidence\": your confidence between 0 and 1
",
        subject.id,
        list_or_none(&subject.amenities.furniture_items),
        list_or_none(&subject.amenities.appliances),
        list_or_none(&subject.amenities.amenities),
        subject.structural.area_sqft,
    ));

    prompt
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(", ")
    }
}

/// Parse and validate the oracle's reply text into a band assignment
///
/// Models tend to wrap JSON in prose or markdown fences, so the reply is
/// trimmed to its outermost object before parsing. Anything that does not
/// deserialize into the expected schema, or carries a confidence outside
/// [0, 1], is a schema violation.
fn parse_assignment(text: &str) -> Result<BandAssignment, ClassifierError> {
    let start = text.find('{');
    let end = text.rfind('}');

    let (start, end) = match (start, end) {
        (Some(start), Some(end)) if start < end => (start, end),
        _ => {
            return Err(ClassifierError::InvalidResponse(
                "reply contains no JSON object".to_string(),
            ))
        }
    };

    let assignment: BandAssignment = serde_json::from_str(&text[start..=end])
        .map_err(|e| ClassifierError::InvalidResponse(e.to_string()))?;

    if !(0.0..=1.0).contains(&assignment.confidence) {
        return Err(ClassifierError::InvalidResponse(format!(
            "confidence {} outside [0, 1]",
            assignment.confidence
        )));
    }

    Ok(assignment)
}
