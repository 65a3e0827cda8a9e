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
use crate::budget::SectionPriority;
use crate::error::PromptError;
use crate::templates::{
    DataSection, InstructionSet, Persona, PromptConfig, ResponseSchema, SectionHeader,
    StructureItem, TaskSpec, ToneSet,
};
use sitescan_core::{BudgetConfig, PromptInput, ReportVariant};

/// Personal narrative report for the site owner
#[derive(Debug, Clone, Default)]
pub struct NarrativePromptBuilder {
    inner: BudgetedComposer,
}

impl NarrativePromptBuilder {
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
        let task = TaskSpec::new(format!(
            "Schrijf een persoonlijk rapport voor de eigenaar van {}. Leg uit hoe AI-assistenten de website nu zien, wat de belangrijkste verbeterpunten zijn en in welke volgorde ze aangepakt moeten worden.",
            input.url
        ))
        .with_focus_points([
            "Begin met wat al goed gaat",
            "Vertaal de AI-inzichten naar concrete stappen",
            "Maak de roadmap haalbaar voor een klein team",
        ]);

        let mut config = PromptConfig::new(Persona::PersonalReport, task, ResponseSchema::Narrative)
            .section(metadata_section(&input.url));

        if let Some(insights) = &input.prior_insights {
            config = config.section(
                DataSection::json(SectionHeader::AiInsights, serde_json::to_value(insights)?)
                    .with_priority_fields(&["missedOpportunities", "implementationPriority"]),
            );
        }

        config = config.section(DataSection::json(
            SectionHeader::ScanResults,
            serde_json::to_value(input.module_results.as_deref().unwrap_or(&[]))?,
        ));

        if let Some(content) = &input.enriched_content {
            config = config.section(
                DataSection::json(SectionHeader::ContentAnalysis, serde_json::to_value(content)?)
                    .with_priority(SectionPriority::Low)
                    .with_priority_fields(&["contentQuality"]),
            );
        }

        Ok(config
            .tone(ToneSet::Personal)
            .structure(vec![
                StructureItem::new(
                    "Samenvatting",
                    &["Huidige AI-zichtbaarheid in een paar zinnen", "De drie belangrijkste kansen"],
                ),
                StructureItem::new(
                    "Gedetailleerde analyse",
                    &["Per aandachtsgebied: bevinding, gevolg, oplossing"],
                ),
                StructureItem::new(
                    "Implementatie roadmap",
                    &["Deze week", "Deze maand", "Komend kwartaal"],
                ),
                StructureItem::new("Conclusie en volgende stappen", &[]),
            ])
            .instructions(InstructionSet::Narrative))
    }
}

impl PromptBuilder for NarrativePromptBuilder {
    fn variant(&self) -> ReportVariant {
        ReportVariant::Narrative
    }

    fn build(&self, input: &PromptInput) -> Result<String, PromptError> {
        let config = self.prompt_config(input)?;
        self.inner.render(self.variant(), &config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitescan_core::{AiInsights, MissedOpportunity};

    fn insights() -> AiInsights {
        AiInsights {
            missed_opportunities: vec![MissedOpportunity {
                title: "FAQ-sectie ontbreekt".to_string(),
                ..Default::default()
            }],
            authority_enhancements: vec![],
            citability_improvements: vec![],
            implementation_priority: vec![],
            confidence: 80,
            generated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_prompt_uses_personal_persona_and_structure() {
        let input = PromptInput::new("https://bakkerij.nl").with_prior_insights(insights());
        let prompt = NarrativePromptBuilder::new().build(&input).unwrap();
        assert!(prompt.starts_with(Persona::PersonalReport.text()));
        assert!(prompt.contains("=== AI INZICHTEN ==="));
        assert!(prompt.contains("FAQ-sectie ontbreekt"));
        assert!(prompt.contains("=== STRUCTUUR ===\n1. Samenvatting"));
        assert!(prompt.contains("\"executiveSummary\""));
    }

    #[test]
    fn test_insights_section_precedes_scan_results() {
        let input = PromptInput::new("https://bakkerij.nl").with_prior_insights(insights());
        let prompt = NarrativePromptBuilder::new().build(&input).unwrap();
        let insights_at = prompt.find("=== AI INZICHTEN ===").unwrap();
        let results_at = prompt.find("=== SCAN RESULTATEN ===").unwrap();
        assert!(insights_at < results_at);
    }

    #[test]
    fn test_variant() {
        assert_eq!(NarrativePromptBuilder::new().variant(), ReportVariant::Narrative);
    }
}
