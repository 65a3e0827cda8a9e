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

//! Prompt builders, one per report variant

mod enterprise;
mod insight;
mod narrative;

pub use enterprise::EnterprisePromptBuilder;
pub use insight::InsightPromptBuilder;
pub use narrative::NarrativePromptBuilder;

use crate::budget::{render_sections, ContentBudgeter};
use crate::error::PromptError;
use crate::templates::{DataSection, PromptComposer, PromptConfig, SectionHeader};
use chrono::{SecondsFormat, Utc};
use sitescan_core::{BudgetConfig, PromptBudgetConfig, PromptInput, ReportVariant};
use tracing::debug;

/// Turns an input bundle into one budgeted prompt string
pub trait PromptBuilder: Send + Sync {
    fn variant(&self) -> ReportVariant;

    fn build(&self, input: &PromptInput) -> Result<String, PromptError>;
}

/// Composer plus the whole-prompt budget every builder output passes through
#[derive(Debug, Clone, Default)]
pub struct BudgetedComposer {
    composer: PromptComposer,
    budgeter: ContentBudgeter,
}

impl BudgetedComposer {
    pub fn new(budget: BudgetConfig, section_budget: BudgetConfig) -> Result<Self, PromptError> {
        Ok(Self {
            composer: PromptComposer::new(section_budget)?,
            budgeter: ContentBudgeter::new(budget)?,
        })
    }

    pub fn from_config(config: &PromptBudgetConfig) -> Result<Self, PromptError> {
        Self::new(config.budget(), config.section_budget())
    }

    /// Keeps the default per-section budget
    pub fn with_budget(budget: BudgetConfig) -> Result<Self, PromptError> {
        Ok(Self {
            composer: PromptComposer::default(),
            budgeter: ContentBudgeter::new(budget)?,
        })
    }

    pub fn budgeter(&self) -> &ContentBudgeter {
        &self.budgeter
    }

    /// Compose, drop optional sections that do not fit, then cut the result
    pub fn render(&self, variant: ReportVariant, config: &PromptConfig) -> Result<String, PromptError> {
        let sections = self.composer.compose_sections(config)?;
        let composed = sections.len();
        let sections = self.budgeter.limit_sections(sections);
        let prompt = self.budgeter.limit_content(&render_sections(&sections));

        debug!(
            variant = %variant,
            sections = sections.len(),
            dropped_sections = composed - sections.len(),
            estimated_tokens = self.budgeter.estimate_tokens(&prompt).estimated_tokens,
            "Built prompt"
        );

        Ok(prompt)
    }
}

/// Subject URL and generation time
pub(crate) fn metadata_section(url: &str) -> DataSection {
    DataSection::text(
        SectionHeader::ScanMetadata,
        format!(
            "Website: {}\nAnalysedatum: {}",
            url,
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
        ),
    )
    .with_priority(crate::budget::SectionPriority::High)
}
