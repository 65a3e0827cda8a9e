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

//! Inference gateway
//!
//! One gateway per scan. Each call is budget-checked, sent once (no retry)
//! and, when a response arrives, booked against the scan's cost tracker.
//! Every failure surfaces as a [`GatewayError`]; fallback is the caller's job.

use crate::client::{InferenceClient, TokenUsage};
use crate::cost::{CostModel, CostTracker};
use crate::error::GatewayError;
use crate::parse;
use rust_decimal::Decimal;
use sitescan_core::{
    AiInsights, CostConfig, EnterpriseNarrative, NarrativeReport, ReportVariant, StructuredReport,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Unparsed response of one billed call
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub variant: ReportVariant,
    pub text: String,
    pub prompt_chars: usize,
    pub usage: Option<TokenUsage>,
    pub model: String,
    /// Estimated cost booked for this call
    pub cost_eur: Decimal,
}

pub struct InferenceGateway {
    client: Arc<dyn InferenceClient>,
    cost_model: CostModel,
    tracker: CostTracker,
}

impl InferenceGateway {
    pub fn new(client: Arc<dyn InferenceClient>, cost_config: &CostConfig) -> Self {
        Self {
            client,
            cost_model: CostModel::from_config(cost_config),
            tracker: CostTracker::from_config(cost_config),
        }
    }

    /// Continue from an existing tracker, e.g. one restored with [`CostTracker::resume`]
    pub fn with_tracker(
        client: Arc<dyn InferenceClient>,
        cost_model: CostModel,
        tracker: CostTracker,
    ) -> Self {
        Self {
            client,
            cost_model,
            tracker,
        }
    }

    pub fn can_afford(&self) -> bool {
        self.tracker.can_afford()
    }

    pub fn cost_tracker(&self) -> &CostTracker {
        &self.tracker
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    /// Send `prompt` once.
    ///
    /// Spend is booked only when the service answered with content; budget
    /// stops, transport failures and empty responses leave it untouched.
    pub async fn invoke(
        &mut self,
        variant: ReportVariant,
        prompt: String,
    ) -> Result<RawResponse, GatewayError> {
        if !self.tracker.can_afford() {
            warn!(
                variant = %variant,
                current_spend = %self.tracker.current_spend(),
                max_budget = %self.tracker.max_budget_eur(),
                "AI budget exhausted, skipping inference call"
            );
            return Err(GatewayError::BudgetExceeded {
                current_spend: self.tracker.current_spend(),
                average_cost: self.tracker.average_cost_per_request(),
                max_budget: self.tracker.max_budget_eur(),
            });
        }

        let prompt_chars = prompt.chars().count();
        debug!(variant = %variant, prompt_chars, model = %self.client.model_name(), "Invoking inference service");

        let response = self.client.generate(prompt).await.map_err(|e| {
            warn!(variant = %variant, error = %e, "Inference call failed");
            GatewayError::generation_failed(variant, &e)
        })?;

        if response.is_empty() || parse::strip_code_fences(&response.text()).is_empty() {
            warn!(variant = %variant, "Inference service returned no content");
            return Err(GatewayError::EmptyResponse);
        }

        let cost_eur = self.record_spend(prompt_chars);

        Ok(RawResponse {
            variant,
            text: response.text(),
            prompt_chars,
            usage: response.usage,
            model: response.model,
            cost_eur,
        })
    }

    /// Book the estimated cost of a call with a prompt of `prompt_chars` characters
    pub fn record_spend(&mut self, prompt_chars: usize) -> Decimal {
        let cost = self.cost_model.estimate_cost_eur(prompt_chars);
        self.tracker.record(cost);

        info!(
            cost_eur = %cost,
            current_spend = %self.tracker.current_spend(),
            requests = self.tracker.request_count(),
            remaining_eur = %self.tracker.remaining_eur(),
            "Recorded inference spend"
        );

        cost
    }

    pub fn parse_insights(&self, raw: &str) -> Result<AiInsights, GatewayError> {
        parse::parse_insights(raw)
    }

    pub fn parse_narrative(&self, raw: &str) -> Result<NarrativeReport, GatewayError> {
        parse::parse_narrative(raw)
    }

    pub fn parse_enterprise(&self, raw: &str) -> Result<EnterpriseNarrative, GatewayError> {
        parse::parse_enterprise(raw)
    }

    pub fn parse(&self, variant: ReportVariant, raw: &str) -> Result<StructuredReport, GatewayError> {
        parse::parse_report(variant, raw).map_err(|e| {
            warn!(variant = %variant, error = %e, "Could not parse inference response");
            e
        })
    }

    /// [`invoke`](Self::invoke) followed by [`parse`](Self::parse)
    pub async fn generate(
        &mut self,
        variant: ReportVariant,
        prompt: String,
    ) -> Result<StructuredReport, GatewayError> {
        let raw = self.invoke(variant, prompt).await?;
        self.parse(variant, &raw.text)
    }
}
