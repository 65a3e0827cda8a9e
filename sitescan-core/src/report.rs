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

//! Structured report results
//!
//! Each result is built once from a validated inference response (or from the
//! pattern-based fallback) and never mutated afterwards.

use crate::variant::ReportVariant;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Confidence applied when the response omits one
pub const DEFAULT_CONFIDENCE: u8 = 75;

fn default_confidence() -> u8 {
    DEFAULT_CONFIDENCE
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MissedOpportunity {
    pub title: String,
    pub description: String,
    pub impact: String,
    pub effort: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthorityEnhancement {
    pub area: String,
    pub recommendation: String,
    pub impact: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CitabilityImprovement {
    pub element: String,
    pub current_state: String,
    pub improvement: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PriorityAction {
    pub action: String,
    /// Free text; numeric ranks are kept as their decimal form
    #[serde(deserialize_with = "string_or_number")]
    pub priority: String,
    pub timeframe: String,
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Insight-set result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiInsights {
    pub missed_opportunities: Vec<MissedOpportunity>,
    #[serde(default)]
    pub authority_enhancements: Vec<AuthorityEnhancement>,
    #[serde(default)]
    pub citability_improvements: Vec<CitabilityImprovement>,
    #[serde(default)]
    pub implementation_priority: Vec<PriorityAction>,
    #[serde(default = "default_confidence")]
    pub confidence: u8,
    #[serde(default = "Utc::now")]
    pub generated_at: DateTime<Utc>,
}

/// Personal narrative result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeReport {
    pub executive_summary: String,
    #[serde(default)]
    pub detailed_analysis: String,
    #[serde(default)]
    pub implementation_roadmap: String,
    #[serde(default)]
    pub conclusion_next_steps: String,
    pub word_count: u32,
    #[serde(default = "Utc::now")]
    pub generated_at: DateTime<Utc>,
}

impl NarrativeReport {
    pub fn sections(&self) -> [&str; 4] {
        [
            &self.executive_summary,
            &self.detailed_analysis,
            &self.implementation_roadmap,
            &self.conclusion_next_steps,
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnterpriseMetrics {
    pub roi_estimate: String,
    pub timeframe: String,
    /// Ranked, most important first
    pub priority_actions: Vec<String>,
}

/// Enterprise strategic narrative result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterpriseNarrative {
    pub executive_summary: String,
    #[serde(default)]
    pub multi_page_analysis: String,
    #[serde(default)]
    pub competitive_positioning: String,
    #[serde(default)]
    pub strategic_roadmap: String,
    #[serde(default)]
    pub metrics: EnterpriseMetrics,
    pub word_count: u32,
    #[serde(default = "Utc::now")]
    pub generated_at: DateTime<Utc>,
}

impl EnterpriseNarrative {
    pub fn sections(&self) -> [&str; 4] {
        [
            &self.executive_summary,
            &self.multi_page_analysis,
            &self.competitive_positioning,
            &self.strategic_roadmap,
        ]
    }
}

/// One of the three validated results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", content = "report", rename_all = "lowercase")]
pub enum StructuredReport {
    Insights(AiInsights),
    Narrative(NarrativeReport),
    Enterprise(EnterpriseNarrative),
}

impl StructuredReport {
    pub fn variant(&self) -> ReportVariant {
        match self {
            StructuredReport::Insights(_) => ReportVariant::Insights,
            StructuredReport::Narrative(_) => ReportVariant::Narrative,
            StructuredReport::Enterprise(_) => ReportVariant::Enterprise,
        }
    }

    pub fn as_insights(&self) -> Option<&AiInsights> {
        match self {
            StructuredReport::Insights(insights) => Some(insights),
            _ => None,
        }
    }

    pub fn as_narrative(&self) -> Option<&NarrativeReport> {
        match self {
            StructuredReport::Narrative(narrative) => Some(narrative),
            _ => None,
        }
    }

    pub fn as_enterprise(&self) -> Option<&EnterpriseNarrative> {
        match self {
            StructuredReport::Enterprise(enterprise) => Some(enterprise),
            _ => None,
        }
    }
}

/// Whitespace-separated word count over several text sections
pub fn count_words(sections: &[&str]) -> u32 {
    sections
        .iter()
        .map(|section| section.split_whitespace().count())
        .sum::<usize>() as u32
}
