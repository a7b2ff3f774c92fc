//! Gemini `generateContent` client using structured JSON output.

use super::{AdvisoryError, AdvisoryRequest, SuggestionProvider};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
    timeout: Duration,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String, endpoint: String, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[async_trait]
impl SuggestionProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn suggest(&self, request: AdvisoryRequest<'_>) -> Result<Vec<String>, AdvisoryError> {
        let body = request_body(&build_prompt(&request));
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|err| AdvisoryError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdvisoryError::Status {
                status: status.as_u16(),
            });
        }

        let payload = response
            .text()
            .await
            .map_err(|err| AdvisoryError::Transport(err.to_string()))?;
        parse_generate_content(&payload)
    }
}

pub(crate) fn build_prompt(request: &AdvisoryRequest<'_>) -> String {
    let product = request.product;
    format!(
        "Analyze this product sustainability data and provide 2-3 specific, actionable \
         suggestions to improve sustainability.\n\n\
         Product Analysis:\n\
         - Product: {name}\n\
         - Materials: {materials}\n\
         - Weight: {weight}g\n\
         - Transport: {transport}\n\
         - Packaging: {packaging}\n\
         - GWP: {gwp}\n\
         - Cost: {cost}\n\
         - Circularity: {circularity}%\n\
         - Sustainability Score: {score:.1}/100 (Rating: {rating})\n\n\
         Each suggestion should be specific and actionable, under 50 characters, and focused \
         on the most impactful improvements.\n\
         Examples: \"Use recycled materials\", \"Switch to rail transport\", \"Reduce packaging\"",
        name = product.name,
        materials = product.materials.join(", "),
        weight = product.weight_grams,
        transport = product.transport,
        packaging = product.packaging,
        gwp = product.gwp,
        cost = product.cost,
        circularity = product.circularity,
        score = request.score,
        rating = request.rating,
    )
}

fn request_body(prompt: &str) -> serde_json::Value {
    json!({
        "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "suggestions": { "type": "ARRAY", "items": { "type": "STRING" } }
                },
                "required": ["suggestions"]
            }
        }
    })
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SuggestionsList {
    suggestions: Vec<String>,
}

pub(crate) fn parse_generate_content(payload: &str) -> Result<Vec<String>, AdvisoryError> {
    let response: GenerateContentResponse = serde_json::from_str(payload)
        .map_err(|err| AdvisoryError::Malformed(format!("response envelope: {err}")))?;

    let text = response
        .candidates
        .into_iter()
        .filter_map(|candidate| candidate.content)
        .flat_map(|content| content.parts)
        .find_map(|part| part.text)
        .ok_or_else(|| AdvisoryError::Malformed("response carried no text part".to_string()))?;

    let list: SuggestionsList = serde_json::from_str(&text)
        .map_err(|err| AdvisoryError::Malformed(format!("structured output: {err}")))?;
    Ok(list.suggestions)
}
