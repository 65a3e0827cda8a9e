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

use rust_decimal::Decimal;
use sitescan_core::ReportVariant;
use thiserror::Error;

/// Failures raised by an inference transport
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Missing API key for inference service")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Categorized gateway failures; callers substitute a fallback report on any of them
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(
        "AI budget exceeded: spent €{current_spend} with €{average_cost} expected per request, limit €{max_budget}"
    )]
    BudgetExceeded {
        current_spend: Decimal,
        average_cost: Decimal,
        max_budget: Decimal,
    },

    #[error("Inference service returned an empty response")]
    EmptyResponse,

    #[error("Insight generation failed: {0}")]
    InsightGenerationFailed(String),

    #[error("Narrative generation failed: {0}")]
    NarrativeGenerationFailed(String),

    #[error("Enterprise generation failed: {0}")]
    EnterpriseGenerationFailed(String),

    #[error("Failed to parse {variant} response: {reason}")]
    ParseFailed {
        variant: ReportVariant,
        reason: String,
    },
}

impl GatewayError {
    /// Transport or service failure for `variant`
    pub fn generation_failed(variant: ReportVariant, source: &InferenceError) -> Self {
        let message = source.to_string();
        match variant {
            ReportVariant::Insights => GatewayError::InsightGenerationFailed(message),
            ReportVariant::Narrative => GatewayError::NarrativeGenerationFailed(message),
            ReportVariant::Enterprise => GatewayError::EnterpriseGenerationFailed(message),
        }
    }

    pub fn parse_failed(variant: ReportVariant, reason: impl Into<String>) -> Self {
        GatewayError::ParseFailed {
            variant,
            reason: reason.into(),
        }
    }

    /// The monetary cap was hit; no call was attempted
    pub fn is_budget_stop(&self) -> bool {
        matches!(self, GatewayError::BudgetExceeded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_failure_is_categorized_per_variant() {
        let source = InferenceError::RateLimitExceeded;
        assert!(matches!(
            GatewayError::generation_failed(ReportVariant::Insights, &source),
            GatewayError::InsightGenerationFailed(ref m) if m == "Rate limit exceeded"
        ));
        assert!(matches!(
            GatewayError::generation_failed(ReportVariant::Narrative, &source),
            GatewayError::NarrativeGenerationFailed(_)
        ));
        assert!(matches!(
            GatewayError::generation_failed(ReportVariant::Enterprise, &source),
            GatewayError::EnterpriseGenerationFailed(_)
        ));
    }

    #[test]
    fn test_budget_stop() {
        let err = GatewayError::BudgetExceeded {
            current_spend: Decimal::ONE,
            average_cost: Decimal::ZERO,
            max_budget: Decimal::new(10, 2),
        };
        assert!(err.is_budget_stop());
        assert_eq!(
            err.to_string(),
            "AI budget exceeded: spent €1 with €0 expected per request, limit €0.10"
        );
        assert!(!GatewayError::EmptyResponse.is_budget_stop());
    }
}
