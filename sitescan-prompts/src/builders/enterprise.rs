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

/// Strategic narrative built on top of a business-tier report
#[derive(Debug, Clone, Default)]
pub struct EnterprisePromptBuilder {
    inner: BudgetedComposer,
}

impl EnterprisePromptBuilder {
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
        let page_count = input
            .enterprise
            .as_ref()
            .map(|e| e.page_samples.len())
            .unwrap_or(0);

        let task = TaskSpec::new(format!(
            "Stel voor {} een strategisch enterprise-rapport op. Bouw voort op het bestaande business rapport en de analyse van {} pagina's, en vertaal de patronen naar een roadmap met meetbare resultaten.",
            input.url, page_count
        ))
        .with_focus_points([
            "Patronen die op meerdere pagina's terugkomen",
            "Positie ten opzichte van concurrenten en de branche",
            "ROI-inschatting met onderbouwing",
            "Gerangschikte prioriteiten voor het komende jaar",
        ]);

        let mut config = PromptConfig::new(
            Persona::EnterpriseConsultant,
            task,
            ResponseSchema::Enterprise,
        )
        .section(metadata_section(&input.url));

        if let Some(narrative) = &input.prior_narrative {
            config = config.section(
                DataSection::json(SectionHeader::BusinessReport, serde_json::to_value(narrative)?)
                    .with_priority_fields(&["executiveSummary", "implementationRoadmap"]),
            );
        }

        if let Some(features) = &input.enterprise {
            config = config
                .section(DataSection::json(
                    SectionHeader::MultiPageAnalysis,
                    serde_json::to_value(&features.page_samples)?,
                ))
                .section(DataSection::json(
                    SectionHeader::SiteWidePatterns,
                    serde_json::to_value(&features.site_wide_patterns)?,
                ));

            if let Some(competition) = &features.competitive_context {
                config = config.section(
                    DataSection::json(
                        SectionHeader::CompetitiveContext,
                        serde_json::to_value(competition)?,
                    )
                    .with_priority(SectionPriority::Low)
                    .with_priority_fields(&["marketPosition"]),
                );
            }

            if let Some(benchmark) = &features.industry_benchmark {
                config = config.section(
                    DataSection::json(SectionHeader::IndustryBenchmark, serde_json::to_value(benchmark)?)
                        .with_priority(SectionPriority::Low),
                );
            }
        }

        Ok(config
            .tone(ToneSet::Executive)
            .structure(vec![
                StructureItem::new(
                    "Executive summary",
                    &["Kernboodschap voor de directie", "Belangrijkste risico en kans"],
                ),
                StructureItem::new(
                    "Multi-page analyse",
                    &["Site-brede patronen", "Uitschieters naar boven en beneden"],
                ),
                StructureItem::new(
                    "Concurrentiepositie",
                    &["Vergelijking met concurrenten", "Plaats in de branche-benchmark"],
                ),
                StructureItem::new(
                    "Strategische roadmap",
                    &["Per kwartaal", "Verantwoordelijk team per stap"],
                ),
            ])
            .instructions(InstructionSet::Enterprise))
    }
}

impl PromptBuilder for EnterprisePromptBuilder {
    fn variant(&self) -> ReportVariant {
        ReportVariant::Enterprise
    }

    fn build(&self, input: &PromptInput) -> Result<String, PromptError> {
        let config = self.prompt_config(input)?;
        self.inner.render(self.variant(), &config)
    }
}
