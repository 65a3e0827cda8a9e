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

//! Sitescan Report
//!
//! Wires prompt builders and the inference gateway into a report pipeline
//! that always produces a report: AI-generated when possible, pattern-based
//! otherwise.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sitescan_core::{PromptInput, ReportVariant};
//! use sitescan_report::{init_tracing, ReportPipeline};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let (pipeline, client) = ReportPipeline::from_env_with_gemini()?;
//! init_tracing(&pipeline.config().logging);
//!
//! let mut gateway = pipeline.gateway_for_scan(client);
//! let input = PromptInput::new("https://example.com");
//! let outcome = pipeline.run(&mut gateway, ReportVariant::Insights, &input).await;
//! println!("fallback: {}", outcome.is_fallback());
//! # Ok(())
//! # }
//! ```

pub mod fallback;
pub mod pipeline;
pub mod telemetry;

pub use fallback::{fallback_report, FALLBACK_CONFIDENCE};
pub use pipeline::{ReportError, ReportOutcome, ReportPipeline, ReportSource};
pub use telemetry::init_tracing;
