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

//! Sitescan Core
//!
//! Shared data model for the AI report pipeline: the input bundle handed to
//! prompt builders, the structured results parsed from inference responses,
//! report variants and pipeline configuration.

pub mod config;
pub mod error;
pub mod input;
pub mod report;
pub mod variant;

pub use config::{
    BudgetConfig, CostConfig, InferenceConfig, LoggingConfig, PipelineConfig,
    PromptBudgetConfig, TruncationStrategy, DEFAULT_CHARS_PER_TOKEN,
};
pub use error::{ConfigError, Result};
pub use input::{
    CompetitiveContext, ContentQualityAssessment, EnrichedContentSummary, EnterpriseFeatures,
    IndustryBenchmark, ModuleFinding, ModuleResult, PageSample, PromptInput, Severity,
};
pub use report::{
    count_words, AiInsights, AuthorityEnhancement, CitabilityImprovement, EnterpriseMetrics,
    EnterpriseNarrative, MissedOpportunity, NarrativeReport, PriorityAction, StructuredReport,
    DEFAULT_CONFIDENCE,
};
pub use variant::ReportVariant;
