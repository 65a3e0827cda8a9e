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

//! Sitescan Prompts
//!
//! Builds the natural-language requests sent to the inference service:
//!
//! - [`budget`]: token estimation and truncation against a fixed budget
//! - [`templates`]: personas, section labels, schemas and the composer
//! - [`builders`]: one prompt builder per report variant
//! - [`registry`]: runtime selection of a builder by variant key
//!
//! ## Example
//!
//! ```rust,no_run
//! use sitescan_prompts::BuilderRegistry;
//! use sitescan_core::PromptInput;
//!
//! # fn example() -> Result<(), sitescan_prompts::PromptError> {
//! let registry = BuilderRegistry::with_default_builders();
//! let builder = registry.create("insights")?;
//! let prompt = builder.build(&PromptInput::new("https://example.com"))?;
//! # Ok(())
//! # }
//! ```

pub mod budget;
pub mod builders;
pub mod error;
pub mod registry;
pub mod templates;

pub use budget::{
    render_sections, ContentBudgeter, PromptSection, SectionPriority, TokenEstimate,
};
pub use builders::{
    BudgetedComposer, EnterprisePromptBuilder, InsightPromptBuilder, NarrativePromptBuilder,
    PromptBuilder,
};
pub use error::PromptError;
pub use registry::{BuilderFactory, BuilderRegistry};
pub use templates::{
    InstructionSet, Persona, PromptComposer, PromptConfig, ResponseSchema, SectionHeader, ToneSet,
};
