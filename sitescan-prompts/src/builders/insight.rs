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

use super::{metadata_section, BudgetedComposer, PromptBuilder};
use crate::error::PromptError;
use crate::templates::{
    DataSection, InstructionSet, Persona, PromptConfig, ResponseSchema, SectionHeader, TaskSpec,
    ToneSet,
};
use sitescan_core::{BudgetConfig, PromptInput, ReportVariant, Severity};

/// Severe findings promoted into the task's focus list
const MAX_FINDING_FOCUS_POINTS: usize = 5;

const BASE_FOCUS_POINTS: [&str; 4] = [
    "Ontbrekende gestructureerde data en FAQ-markup",
    "Signalen van autoriteit en expertise (auteur, bronnen, keurmerken)",
    "Citeerbaarheid van kernpassages voor AI-assistenten",
    "Actualiteit van de content",
];

/// Lightweight insight extraction from scan findings
#[derive(Debug, Clone, Default)]
pub struct InsightPromptBuilder {
    inner: BudgetedComposer,
}

impl InsightPromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_budget(budget: BudgetConfig) -> Result<Self, PromptError> {
        Ok(Self {
            inner: BudgetedComposer::with_budget(budget)?,
        })
    }

    pub fn with_composer(inner: BudgetedComposer) -> Self {
        Self { inner }
    }

    fn prompt_config(&self, input: &PromptInput) -> Result<PromptConfig, PromptError> {
        let results = input.module_results.as_deref().unwrap_or(&[]);

        let mut config = PromptConfig::new(Persona::Analyst, task(input), ResponseSchema::Insights)
            .section(metadata_section(&input.url))
            .section(DataSection::json(
                SectionHeader::ScanResults,
                serde_json::to_value(results)?,
            ));

        if let Some(content) = &input.enriched_content {
            config = config.section(
                DataSection::json(SectionHeader::ContentAnalysis, serde_json::to_value(content)?)
                    .with_priority_fields(&["contentQuality", "missedOpportunities"]),
            );
        }

        Ok(config
            .tone(ToneSet::Analytical)
            .instructions(InstructionSet::JsonOnly))
    }
}

impl PromptBuilder for InsightPromptBuilder {
    fn variant(&self) -> ReportVariant {
        ReportVariant::Insights
    }

    fn build(&self, input: &PromptInput) -> Result<String, PromptError> {
        let config = self.prompt_config(input)?;
        self.inner.render(self.variant(), &config)
    }
}

fn task(input: &PromptInput) -> TaskSpec {
    let severe = input
        .findings()
        .filter(|(_, finding)| finding.severity >= Severity::High)
        .take(MAX_FINDING_FOCUS_POINTS)
        .map(|(module, finding)| format!("{}: {}", module.name, finding.title));

    TaskSpec::new(format!(
        "Analyseer de scanresultaten en de content van {} en benoem concrete, uitvoerbare kansen om vaker gevonden en geciteerd te worden door AI-assistenten.",
        input.url
    ))
    .with_focus_points(
        BASE_FOCUS_POINTS
            .iter()
            .map(|p| p.to_string())
            .chain(severe),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitescan_core::{EnrichedContentSummary, ModuleFinding, ModuleResult, TruncationStrategy};

    fn results() -> Vec<ModuleResult> {
        vec![ModuleResult {
            name: "schema".to_string(),
            score: 40,
            findings: vec![
                ModuleFinding {
                    title: "Geen FAQ-schema".to_string(),
                    description: String::new(),
                    severity: Severity::Critical,
                    recommendation: None,
                },
                ModuleFinding {
                    title: "Korte meta description".to_string(),
                    description: String::new(),
                    severity: Severity::Low,
                    recommendation: None,
                },
            ],
        }]
    }

    #[test]
    fn test_severe_findings_become_focus_points() {
        let input = PromptInput::new("https://example.com").with_module_results(results());
        let prompt = InsightPromptBuilder::new().build(&input).unwrap();
        assert!(prompt.contains("5. schema: Geen FAQ-schema"));
        assert!(!prompt.contains(". schema: Korte meta description"));
    }

    #[test]
    fn test_missing_results_render_as_empty_array() {
        let prompt = InsightPromptBuilder::new()
            .build(&PromptInput::new("https://example.com"))
            .unwrap();
        assert!(prompt.contains("=== SCAN RESULTATEN ===\n[]"));
        assert!(!prompt.contains("CONTENT ANALYSE"));
    }

    #[test]
    fn test_enriched_content_is_included() {
        let input = PromptInput::new("https://example.com").with_enriched_content(
            EnrichedContentSummary {
                authority_signals: vec!["KvK-nummer".to_string()],
                ..Default::default()
            },
        );
        let prompt = InsightPromptBuilder::new().build(&input).unwrap();
        assert!(prompt.contains("=== CONTENT ANALYSE ==="));
        assert!(prompt.contains("KvK-nummer"));
    }

    #[test]
    fn test_small_budget_is_respected() {
        let budget = BudgetConfig::new(600, 100, TruncationStrategy::Salient);
        let builder = InsightPromptBuilder::with_budget(budget).unwrap();
        let many: Vec<ModuleResult> = (0..50)
            .map(|i| ModuleResult {
                name: format!("module-{}", i),
                ..results()[0].clone()
            })
            .collect();
        let prompt = builder
            .build(&PromptInput::new("https://example.com").with_module_results(many))
            .unwrap();
        assert!(prompt.chars().count().div_ceil(4) <= 500);
    }

    #[test]
    fn test_invalid_budget_is_rejected() {
        let budget = BudgetConfig::new(100, 100, TruncationStrategy::Tail);
        assert!(matches!(
            InsightPromptBuilder::with_budget(budget),
            Err(PromptError::InvalidBudget(_))
        ));
    }
}
