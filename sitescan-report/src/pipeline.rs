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

//! Composition root for report generation
//!
//! Owns the builder registry and configuration. Each scan gets its own
//! [`InferenceGateway`]; failures on the AI path degrade to the
//! pattern-based reports in [`crate::fallback`].

use crate::fallback;
use anyhow::Context;
use sitescan_core::{PipelineConfig, PromptInput, ReportVariant, StructuredReport};
use sitescan_inference::{GatewayError, GeminiClient, InferenceClient, InferenceGateway};
use sitescan_prompts::{BuilderRegistry, PromptError};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Prompt error: {0}")]
    Prompt(#[from] PromptError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

/// Where a report came from
#[derive(Debug, Clone, PartialEq)]
pub enum ReportSource {
    Ai,
    Fallback { reason: String },
}

#[derive(Debug, Clone)]
pub struct ReportOutcome {
    pub report: StructuredReport,
    pub source: ReportSource,
}

impl ReportOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, ReportSource::Fallback { .. })
    }
}

#[derive(Debug)]
pub struct ReportPipeline {
    config: PipelineConfig,
    registry: BuilderRegistry,
}

impl ReportPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, ReportError> {
        let registry = BuilderRegistry::with_budgets(&config.prompt)?;
        Ok(Self { config, registry })
    }

    /// Config file (if any) overlaid with environment variables
    pub fn load(config_file: Option<PathBuf>) -> anyhow::Result<Self> {
        let config = PipelineConfig::load(config_file).context("Failed to load configuration")?;
        Ok(Self::new(config)?)
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Self::load(None)
    }

    /// Pipeline plus a Gemini client built from the environment
    pub fn from_env_with_gemini() -> anyhow::Result<(Self, Arc<dyn InferenceClient>)> {
        let pipeline = Self::from_env()?;
        let client = GeminiClient::from_config(&pipeline.config.inference)
            .context("Failed to create Gemini client")?;
        Ok((pipeline, Arc::new(client)))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn registry(&self) -> &BuilderRegistry {
        &self.registry
    }

    /// Fresh gateway with its own cost tracker
    pub fn gateway_for_scan(&self, client: Arc<dyn InferenceClient>) -> InferenceGateway {
        InferenceGateway::new(client, &self.config.cost)
    }

    /// Build, send and parse one report. Never fails: any error yields the
    /// pattern-based report for `variant`.
    pub async fn run(
        &self,
        gateway: &mut InferenceGateway,
        variant: ReportVariant,
        input: &PromptInput,
    ) -> ReportOutcome {
        match self.try_run(gateway, variant, input).await {
            Ok(report) => {
                info!(variant = %variant, url = %input.url, "AI report generated");
                ReportOutcome {
                    report,
                    source: ReportSource::Ai,
                }
            }
            Err(e) => {
                warn!(
                    variant = %variant,
                    url = %input.url,
                    error = %e,
                    "AI report unavailable, using pattern-based fallback"
                );
                ReportOutcome {
                    report: fallback::fallback_report(variant, input),
                    source: ReportSource::Fallback {
                        reason: e.to_string(),
                    },
                }
            }
        }
    }

    /// Like [`run`](Self::run) but surfaces the error instead of falling back
    pub async fn try_run(
        &self,
        gateway: &mut InferenceGateway,
        variant: ReportVariant,
        input: &PromptInput,
    ) -> Result<StructuredReport, ReportError> {
        let builder = self.registry.create_variant(variant)?;
        let prompt = builder.build(input)?;
        Ok(gateway.generate(variant, prompt).await?)
    }
}
