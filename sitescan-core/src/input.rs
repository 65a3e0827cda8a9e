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

//! Input bundle handed to a prompt builder
//!
//! Everything here is produced upstream by the scan-execution pipeline. A
//! [`PromptInput`] is built per request, passed to exactly one builder call
//! and then dropped.

use crate::report::{AiInsights, NarrativeReport};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Finding severity as reported by a scan module
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

/// Single finding from a scan module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleFinding {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

/// Result of one scan module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleResult {
    pub name: String,
    /// Module score, 0-100
    pub score: u8,
    #[serde(default)]
    pub findings: Vec<ModuleFinding>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentQualityAssessment {
    pub overall_score: u8,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
}

/// Signals extracted from the page content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnrichedContentSummary {
    pub authority_signals: Vec<String>,
    pub time_signals: Vec<String>,
    pub quality_signals: Vec<String>,
    pub business_signals: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_quality: Option<ContentQualityAssessment>,
    pub missed_opportunities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSample {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub word_count: u32,
    #[serde(default)]
    pub score: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompetitiveContext {
    pub competitors: Vec<String>,
    pub market_position: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryBenchmark {
    pub industry: String,
    pub average_score: f64,
    pub percentile: u8,
}

/// Multi-page data only available to enterprise scans
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnterpriseFeatures {
    pub page_samples: Vec<PageSample>,
    /// Pattern name -> score (0-100)
    pub site_wide_patterns: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitive_context: Option<CompetitiveContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry_benchmark: Option<IndustryBenchmark>,
}

/// Typed input for one builder call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptInput {
    pub url: String,
    pub module_results: Option<Vec<ModuleResult>>,
    pub enriched_content: Option<EnrichedContentSummary>,
    /// Insight result from an earlier stage, consumed by narrative builders
    pub prior_insights: Option<AiInsights>,
    /// Business-tier narrative, consumed by the enterprise builder
    pub prior_narrative: Option<NarrativeReport>,
    pub enterprise: Option<EnterpriseFeatures>,
}

impl PromptInput {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_module_results(mut self, results: Vec<ModuleResult>) -> Self {
        self.module_results = Some(results);
        self
    }

    pub fn with_enriched_content(mut self, summary: EnrichedContentSummary) -> Self {
        self.enriched_content = Some(summary);
        self
    }

    pub fn with_prior_insights(mut self, insights: AiInsights) -> Self {
        self.prior_insights = Some(insights);
        self
    }

    pub fn with_prior_narrative(mut self, narrative: NarrativeReport) -> Self {
        self.prior_narrative = Some(narrative);
        self
    }

    pub fn with_enterprise(mut self, features: EnterpriseFeatures) -> Self {
        self.enterprise = Some(features);
        self
    }

    /// All findings across modules, in module order
    pub fn findings(&self) -> impl Iterator<Item = (&ModuleResult, &ModuleFinding)> {
        self.module_results
            .iter()
            .flatten()
            .flat_map(|module| module.findings.iter().map(move |finding| (module, finding)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(name: &str, findings: Vec<ModuleFinding>) -> ModuleResult {
        ModuleResult {
            name: name.to_string(),
            score: 60,
            findings,
        }
    }

    fn finding(title: &str, severity: Severity) -> ModuleFinding {
        ModuleFinding {
            title: title.to_string(),
            description: String::new(),
            severity,
            recommendation: None,
        }
    }

    #[test]
    fn test_findings_iterates_all_modules() {
        let input = PromptInput::new("https://example.com").with_module_results(vec![
            module("schema", vec![finding("No FAQ schema", Severity::High)]),
            module("content", vec![]),
            module("meta", vec![finding("Short title", Severity::Low)]),
        ]);

        let titles: Vec<_> = input.findings().map(|(_, f)| f.title.as_str()).collect();
        assert_eq!(titles, vec!["No FAQ schema", "Short title"]);
    }

    #[test]
    fn test_findings_empty_without_modules() {
        let input = PromptInput::new("https://example.com");
        assert_eq!(input.findings().count(), 0);
    }

    #[test]
    fn test_module_result_camel_case() {
        let json = r#"{"name":"schema","score":40,"findings":[{"title":"x","severity":"critical"}]}"#;
        let parsed: ModuleResult = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.findings[0].severity, Severity::Critical);
        assert!(parsed.findings[0].description.is_empty());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::Medium > Severity::Low);
    }
}
