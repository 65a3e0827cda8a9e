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

//! Per-scan cost tracking
//!
//! Costs are estimated from prompt length alone (no calibration against
//! invoices) and accumulated as exact decimals.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use sitescan_core::CostConfig;

const TOKENS_PER_RATE_UNIT: Decimal = dec!(1000000);

/// Non-finite values are rejected by `PipelineConfig::validate`
fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

/// Prompt length -> estimated EUR cost of one call
#[derive(Debug, Clone, PartialEq)]
pub struct CostModel {
    chars_per_token: Decimal,
    output_token_estimate: Decimal,
    input_rate_usd_per_million: Decimal,
    output_rate_usd_per_million: Decimal,
    usd_to_eur: Decimal,
}

impl CostModel {
    pub fn from_config(config: &CostConfig) -> Self {
        Self {
            chars_per_token: Decimal::from(config.chars_per_token.max(1)),
            output_token_estimate: Decimal::from(config.output_token_estimate),
            input_rate_usd_per_million: to_decimal(config.input_rate_usd_per_million),
            output_rate_usd_per_million: to_decimal(config.output_rate_usd_per_million),
            usd_to_eur: to_decimal(config.usd_to_eur),
        }
    }

    pub fn estimate_cost_eur(&self, prompt_chars: usize) -> Decimal {
        let input_tokens = Decimal::from(prompt_chars) / self.chars_per_token;
        let input_usd = input_tokens * self.input_rate_usd_per_million / TOKENS_PER_RATE_UNIT;
        let output_usd =
            self.output_token_estimate * self.output_rate_usd_per_million / TOKENS_PER_RATE_UNIT;
        (input_usd + output_usd) * self.usd_to_eur
    }
}

impl Default for CostModel {
    fn default() -> Self {
        Self::from_config(&CostConfig::default())
    }
}

/// Running spend of one scan
///
/// `current_spend` only grows. Mutated by the owning gateway after each
/// billed call.
#[derive(Debug, Clone, PartialEq)]
pub struct CostTracker {
    max_budget_eur: Decimal,
    current_spend: Decimal,
    request_count: u32,
    average_cost_per_request: Decimal,
}

impl CostTracker {
    pub fn new(max_budget_eur: Decimal) -> Self {
        Self {
            max_budget_eur,
            current_spend: Decimal::ZERO,
            request_count: 0,
            average_cost_per_request: Decimal::ZERO,
        }
    }

    pub fn from_config(config: &CostConfig) -> Self {
        Self::new(to_decimal(config.max_budget_eur))
    }

    /// Restore a tracker from persisted totals
    pub fn resume(max_budget_eur: Decimal, current_spend: Decimal, request_count: u32) -> Self {
        let current_spend = current_spend.max(Decimal::ZERO);
        let average_cost_per_request = if request_count == 0 {
            Decimal::ZERO
        } else {
            current_spend / Decimal::from(request_count)
        };

        Self {
            max_budget_eur,
            current_spend,
            request_count,
            average_cost_per_request,
        }
    }

    /// Whether one more average-cost request stays within the cap
    pub fn can_afford(&self) -> bool {
        self.current_spend + self.average_cost_per_request <= self.max_budget_eur
    }

    /// Book one billed call; negative costs are ignored
    pub fn record(&mut self, cost_eur: Decimal) {
        self.current_spend += cost_eur.max(Decimal::ZERO);
        self.request_count = self.request_count.saturating_add(1);
        self.average_cost_per_request = self.current_spend / Decimal::from(self.request_count);
    }

    pub fn remaining_eur(&self) -> Decimal {
        (self.max_budget_eur - self.current_spend).max(Decimal::ZERO)
    }

    pub fn max_budget_eur(&self) -> Decimal {
        self.max_budget_eur
    }

    pub fn current_spend(&self) -> Decimal {
        self.current_spend
    }

    pub fn request_count(&self) -> u32 {
        self.request_count
    }

    pub fn average_cost_per_request(&self) -> Decimal {
        self.average_cost_per_request
    }

    pub fn snapshot(&self) -> CostSnapshot {
        CostSnapshot {
            max_budget_eur: self.max_budget_eur,
            current_spend_eur: self.current_spend,
            request_count: self.request_count,
            average_cost_per_request_eur: self.average_cost_per_request,
            remaining_eur: self.remaining_eur(),
        }
    }
}

/// Serializable view of a [`CostTracker`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostSnapshot {
    pub max_budget_eur: Decimal,
    pub current_spend_eur: Decimal,
    pub request_count: u32,
    pub average_cost_per_request_eur: Decimal,
    pub remaining_eur: Decimal,
}

impl From<CostSnapshot> for CostTracker {
    fn from(snapshot: CostSnapshot) -> Self {
        CostTracker::resume(
            snapshot.max_budget_eur,
            snapshot.current_spend_eur,
            snapshot.request_count,
        )
    }
}
