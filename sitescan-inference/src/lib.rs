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

//! Sitescan Inference
//!
//! Budgeted access to the external generative-AI service: the
//! [`InferenceClient`] seam and its Gemini implementation, the per-scan
//! [`CostTracker`], response parsing, and the [`InferenceGateway`] tying them
//! together.

pub mod client;
pub mod cost;
pub mod error;
pub mod gateway;
pub mod parse;

pub use client::{GeminiClient, InferenceClient, InferenceResponse, TokenUsage};
pub use cost::{CostModel, CostSnapshot, CostTracker};
pub use error::{GatewayError, InferenceError};
pub use gateway::{InferenceGateway, RawResponse};
pub use parse::{parse_enterprise, parse_insights, parse_narrative, parse_report, strip_code_fences};
