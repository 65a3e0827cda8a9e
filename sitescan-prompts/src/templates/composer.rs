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

use super::format::{
    format_focus_points, format_instructions, format_json_schema, format_structure,
    format_tone_guidelines, section_header, StructureItem,
};
use super::{InstructionSet, Persona, ResponseSchema, SectionHeader, ToneSet};
use crate::budget::{render_sections, ContentBudgeter, PromptSection, SectionPriority};
use crate::error::PromptError;
use serde_json::Value;
use sitescan_core::{BudgetConfig, PromptBudgetConfig};

/// Payload of a data section
#[derive(Debug, Clone, PartialEq)]
pub enum SectionData {
    Json(Value),
    Text(String),
}

/// Labelled data block placed between the persona and the task
#[derive(Debug, Clone, PartialEq)]
pub struct DataSection {
    pub header: SectionHeader,
    pub data: SectionData,
    pub priority: SectionPriority,
    /// Object keys kept first when structured data is limited
    pub priority_fields: Vec<&'static str>,
}

impl DataSection {
    pub fn json(header: SectionHeader, data: Value) -> Self {
        Self {
            header,
            data: SectionData::Json(data),
            priority: SectionPriority::Medium,
            priority_fields: Vec::new(),
        }
    }

    pub fn text(header: SectionHeader, text: impl Into<String>) -> Self {
        Self {
            header,
            data: SectionData::Text(text.into()),
            priority: SectionPriority::Medium,
            priority_fields: Vec::new(),
        }
    }

    pub fn with_priority(mut self, priority: SectionPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_priority_fields(mut self, fields: &[&'static str]) -> Self {
        self.priority_fields = fields.to_vec();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    pub description: String,
    pub focus_points: Vec<String>,
}

impl TaskSpec {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            focus_points: Vec::new(),
        }
    }

    pub fn with_focus_points<S: Into<String>>(mut self, points: impl IntoIterator<Item = S>) -> Self {
        self.focus_points = points.into_iter().map(Into::into).collect();
        self
    }
}

/// Everything a builder declares about its prompt
#[derive(Debug, Clone)]
pub struct PromptConfig {
    pub persona: Persona,
    pub sections: Vec<DataSection>,
    pub task: TaskSpec,
    pub tone: Option<ToneSet>,
    pub structure: Vec<StructureItem>,
    pub response_schema: ResponseSchema,
    pub instructions: Option<InstructionSet>,
}

impl PromptConfig {
    pub fn new(persona: Persona, task: TaskSpec, response_schema: ResponseSchema) -> Self {
        Self {
            persona,
            sections: Vec::new(),
            task,
            tone: None,
            structure: Vec::new(),
            response_schema,
            instructions: None,
        }
    }

    pub fn section(mut self, section: DataSection) -> Self {
        self.sections.push(section);
        self
    }

    pub fn tone(mut self, tone: ToneSet) -> Self {
        self.tone = Some(tone);
        self
    }

    pub fn structure(mut self, items: Vec<StructureItem>) -> Self {
        self.structure = items;
        self
    }

    pub fn instructions(mut self, instructions: InstructionSet) -> Self {
        self.instructions = Some(instructions);
        self
    }
}

/// Renders a [`PromptConfig`] into prioritized sections.
///
/// Every data section is limited against the per-section budget before it is
/// rendered. Order: persona, data sections, task, tone, structure, response
/// format.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    section_budgeter: ContentBudgeter,
}

impl PromptComposer {
    pub fn new(section_budget: BudgetConfig) -> Result<Self, PromptError> {
        Ok(Self {
            section_budgeter: ContentBudgeter::new(section_budget)?,
        })
    }

    pub fn section_budgeter(&self) -> &ContentBudgeter {
        &self.section_budgeter
    }

    pub fn compose_sections(&self, config: &PromptConfig) -> Result<Vec<PromptSection>, PromptError> {
        let mut sections = Vec::with_capacity(config.sections.len() + 5);

        sections.push(PromptSection::new(
            "persona",
            config.persona.text(),
            SectionPriority::High,
        ));

        for data in &config.sections {
            let body = self.render_data(data)?;
            sections.push(PromptSection::new(
                data.header.label(),
                format!("{}\n{}", data.header.render(), body),
                data.priority,
            ));
        }

        let mut task = format!("{}\n{}", SectionHeader::Task.render(), config.task.description);
        if !config.task.focus_points.is_empty() {
            task.push_str("\n\nFocus op:\n");
            task.push_str(&format_focus_points(&config.task.focus_points));
        }
        sections.push(PromptSection::new(
            SectionHeader::Task.label(),
            task,
            SectionPriority::High,
        ));

        if let Some(tone) = config.tone {
            sections.push(PromptSection::new(
                SectionHeader::Tone.label(),
                format!(
                    "{}\n{}",
                    SectionHeader::Tone.render(),
                    format_tone_guidelines(tone.guidelines())
                ),
                SectionPriority::Low,
            ));
        }

        if !config.structure.is_empty() {
            sections.push(PromptSection::new(
                SectionHeader::Structure.label(),
                format!(
                    "{}\n{}",
                    SectionHeader::Structure.render(),
                    format_structure(&config.structure)
                ),
                SectionPriority::Low,
            ));
        }

        let mut response = format!(
            "{}\nAntwoord in exact dit JSON-formaat:\n{}",
            section_header(SectionHeader::ResponseFormat.label()),
            format_json_schema(&config.response_schema.template())
        );
        if let Some(instructions) = config.instructions {
            response.push_str("\n\n");
            response.push_str(&format_instructions(instructions.instructions()));
        }
        sections.push(PromptSection::new(
            SectionHeader::ResponseFormat.label(),
            response,
            SectionPriority::High,
        ));

        Ok(sections)
    }

    pub fn compose(&self, config: &PromptConfig) -> Result<String, PromptError> {
        Ok(render_sections(&self.compose_sections(config)?))
    }

    fn render_data(&self, section: &DataSection) -> Result<String, PromptError> {
        let rendered = match &section.data {
            SectionData::Json(value) => {
                let limited = self
                    .section_budgeter
                    .limit_structured_data(value, &section.priority_fields);
                serde_json::to_string_pretty(&limited)?
            }
            SectionData::Text(text) => text.clone(),
        };
        Ok(self.section_budgeter.limit_content(&rendered))
    }
}

impl Default for PromptComposer {
    /// 3000 tokens per section, tail cuts
    fn default() -> Self {
        Self {
            section_budgeter: ContentBudgeter::from_valid(
                PromptBudgetConfig::default().section_budget(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sitescan_core::TruncationStrategy;

    fn composer(max_tokens: usize) -> PromptComposer {
        PromptComposer::new(BudgetConfig::new(max_tokens, 0, TruncationStrategy::Tail)).unwrap()
    }

    fn config() -> PromptConfig {
        PromptConfig::new(
            Persona::Analyst,
            TaskSpec::new("Analyseer de scan.").with_focus_points(["Schema", "Auteur"]),
            ResponseSchema::Insights,
        )
        .section(DataSection::json(SectionHeader::ScanResults, json!([])))
        .tone(ToneSet::Analytical)
        .structure(vec![StructureItem::new("Kansen", &["Impact"])])
        .instructions(InstructionSet::JsonOnly)
    }

    #[test]
    fn test_section_order_and_priorities() {
        let sections = composer(3000).compose_sections(&config()).unwrap();
        let titles: Vec<_> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "persona",
                "SCAN RESULTATEN",
                "TAAK",
                "TOON EN STIJL",
                "STRUCTUUR",
                "RESPONSE FORMAAT"
            ]
        );
        assert_eq!(sections[0].priority, SectionPriority::High);
        assert_eq!(sections[1].priority, SectionPriority::Medium);
        assert_eq!(sections[3].priority, SectionPriority::Low);
        assert_eq!(sections[5].priority, SectionPriority::High);
    }

    #[test]
    fn test_empty_data_renders_verbatim() {
        let prompt = composer(3000).compose(&config()).unwrap();
        assert!(prompt.starts_with(Persona::Analyst.text()));
        assert!(prompt.contains("=== SCAN RESULTATEN ===\n[]"));
        assert!(prompt.contains("Focus op:\n1. Schema\n2. Auteur"));
        assert!(prompt.contains("INSTRUCTIES:\n- "));
    }

    #[test]
    fn test_optional_sections_are_omitted() {
        let config = PromptConfig::new(
            Persona::PersonalReport,
            TaskSpec::new("Schrijf."),
            ResponseSchema::Narrative,
        );
        let prompt = composer(3000).compose(&config).unwrap();
        assert!(!prompt.contains("TOON EN STIJL"));
        assert!(!prompt.contains("STRUCTUUR"));
        assert!(!prompt.contains("INSTRUCTIES"));
        assert!(!prompt.contains("Focus op"));
    }

    #[test]
    fn test_oversized_text_section_is_limited() {
        let long = "woord ".repeat(5000);
        let config = config().section(DataSection::text(SectionHeader::ContentAnalysis, long));
        let composer = composer(200);
        let sections = composer.compose_sections(&config).unwrap();
        let content = sections
            .iter()
            .find(|s| s.title == "CONTENT ANALYSE")
            .unwrap();
        // header + newline on top of at most 200 tokens of body
        assert!(content.content.chars().count() <= 200 * 4 + 40);
    }
}
