// Copyright 2025 AgentReplay (https://github.com/agentreplay)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Inference service clients

use crate::error::InferenceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sitescan_core::InferenceConfig;
use tracing::debug;

/// One request in, one (possibly empty) response out
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn generate(&self, prompt: String) -> Result<InferenceResponse, InferenceError>;

    fn model_name(&self) -> &str;
}

/// Response content as returned by the service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InferenceResponse {
    /// Text parts of the first candidate; empty when the service returned none
    pub parts: Vec<String>,
    pub usage: Option<TokenUsage>,
    pub model: String,
}

impl InferenceResponse {
    pub fn text(&self) -> String {
        self.parts.concat()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.iter().all(|part| part.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Gemini `generateContent` client
pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
    max_output_tokens: u32,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        let defaults = InferenceConfig::default();
        Self {
            api_key,
            model,
            base_url: defaults.base_url,
            temperature: defaults.temperature,
            max_output_tokens: defaults.max_output_tokens,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &InferenceConfig) -> Result<Self, InferenceError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(InferenceError::MissingApiKey)?;

        Ok(Self::new(api_key, config.model.clone())
            .with_base_url(config.base_url.clone())
            .with_generation_config(config.temperature, config.max_output_tokens))
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_generation_config(mut self, temperature: f32, max_output_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_output_tokens = max_output_tokens;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl InferenceClient for GeminiClient {
    async fn generate(&self, prompt: String) -> Result<InferenceResponse, InferenceError> {
        let request = serde_json::json!({
            "contents": [
                {
                    "parts": [{ "text": prompt }]
                }
            ],
            "generationConfig": {
                "temperature": self.temperature,
                "maxOutputTokens": self.max_output_tokens
            }
        });

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(InferenceError::RateLimitExceeded);
            }
            return Err(InferenceError::ApiError(format!("{}: {}", status, error_text)));
        }

        let response_data: Value = response.json().await?;
        let parsed = parse_generate_response(&response_data, &self.model);

        debug!(
            model = %self.model,
            parts = parsed.parts.len(),
            prompt_tokens = parsed.usage.map(|u| u.prompt_tokens),
            "Received inference response"
        );

        Ok(parsed)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Extract the first candidate's text parts and usage metadata
pub(crate) fn parse_generate_response(data: &Value, model: &str) -> InferenceResponse {
    let parts = data["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part["text"].as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let usage = data.get("usageMetadata").map(|usage| TokenUsage {
        prompt_tokens: usage["promptTokenCount"].as_u64().unwrap_or(0) as u32,
        completion_tokens: usage["candidatesTokenCount"].as_u64().unwrap_or(0) as u32,
        total_tokens: usage["totalTokenCount"].as_u64().unwrap_or(0) as u32,
    });

    InferenceResponse {
        parts,
        usage,
        model: data["modelVersion"]
            .as_str()
            .unwrap_or(model)
            .to_string(),
    }
}
