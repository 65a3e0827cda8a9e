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

//! Gemini client and gateway against a mock HTTP server

use mockito::Matcher;
use rust_decimal::Decimal;
use serde_json::json;
use sitescan_core::{CostConfig, ReportVariant};
use sitescan_inference::{GatewayError, GeminiClient, InferenceClient, InferenceError, InferenceGateway};
use std::sync::Arc;

const GENERATE_PATH: &str = r"^/models/gemini-1\.5-flash:generateContent";

fn client(server: &mockito::Server) -> GeminiClient {
    GeminiClient::new("test-key".to_string(), "gemini-1.5-flash".to_string())
        .with_base_url(server.url())
}

#[tokio::test]
async fn sends_prompt_and_reads_candidate_parts() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Regex(GENERATE_PATH.to_string()))
        .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
        .match_body(Matcher::PartialJson(json!({
            "contents": [{ "parts": [{ "text": "hallo" }] }],
            "generationConfig": { "maxOutputTokens": 4096 }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "{\"missedOpportunities\":[]}" }] }
                }],
                "usageMetadata": {
                    "promptTokenCount": 2,
                    "candidatesTokenCount": 8,
                    "totalTokenCount": 10
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let response = client(&server).generate("hallo".to_string()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(response.text(), "{\"missedOpportunities\":[]}");
    assert_eq!(response.usage.map(|u| u.total_tokens), Some(10));
}

#[tokio::test]
async fn rate_limit_maps_to_dedicated_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", Matcher::Regex(GENERATE_PATH.to_string()))
        .match_query(Matcher::Any)
        .with_status(429)
        .with_body("quota")
        .create_async()
        .await;

    let err = client(&server).generate("hallo".to_string()).await.unwrap_err();
    assert!(matches!(err, InferenceError::RateLimitExceeded));
}

#[tokio::test]
async fn server_error_surfaces_as_generation_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", Matcher::Regex(GENERATE_PATH.to_string()))
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("backend unavailable")
        .create_async()
        .await;

    let mut gateway = InferenceGateway::new(Arc::new(client(&server)), &CostConfig::default());
    let err = gateway
        .generate(ReportVariant::Narrative, "hallo".to_string())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GatewayError::NarrativeGenerationFailed(ref message) if message.contains("backend unavailable")
    ));
    assert_eq!(gateway.cost_tracker().current_spend(), Decimal::ZERO);
}

#[tokio::test]
async fn blocked_prompt_is_an_empty_response() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", Matcher::Regex(GENERATE_PATH.to_string()))
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "promptFeedback": { "blockReason": "SAFETY" } }).to_string())
        .create_async()
        .await;

    let mut gateway = InferenceGateway::new(Arc::new(client(&server)), &CostConfig::default());
    let err = gateway
        .invoke(ReportVariant::Insights, "hallo".to_string())
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::EmptyResponse));
    assert_eq!(gateway.cost_tracker().request_count(), 0);
}
