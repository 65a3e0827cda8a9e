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

//! Template Library
//!
//! Fixed prompt vocabulary (personas, section labels, tone guidelines,
//! response schemas, instruction sets) plus the formatting helpers and the
//! [`PromptComposer`] every builder routes through.

pub mod composer;
pub mod format;

pub use composer::{DataSection, PromptComposer, PromptConfig, SectionData, TaskSpec};
pub use format::{
    format_focus_points, format_instructions, format_json_schema, format_structure,
    format_tone_guidelines, section_header, StructureItem,
};

use serde_json::{json, Value};

/// Who the model is asked to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Persona {
    Analyst,
    PersonalReport,
    EnterpriseConsultant,
}

impl Persona {
    pub fn text(&self) -> &'static str {
        match self {
            Persona::Analyst => {
                "Je bent een senior analist op het gebied van AI-zoekmachines. Je beoordeelt websites op hun vindbaarheid en citeerbaarheid in AI-assistenten zoals ChatGPT, Perplexity en Google AI Overviews."
            }
            Persona::PersonalReport => {
                "Je bent een ervaren digitale strategie-adviseur. Je schrijft een persoonlijk en begrijpelijk rapport voor de eigenaar van deze website, zonder onnodig jargon."
            }
            Persona::EnterpriseConsultant => {
                "Je bent een senior strategisch consultant voor enterprise-organisaties, gespecialiseerd in AI-zichtbaarheid, contentstrategie en concurrentiepositie over complete websites."
            }
        }
    }
}

/// Closed set of section labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionHeader {
    ScanMetadata,
    ScanResults,
    ContentAnalysis,
    AiInsights,
    BusinessReport,
    MultiPageAnalysis,
    SiteWidePatterns,
    CompetitiveContext,
    IndustryBenchmark,
    Task,
    Tone,
    Structure,
    ResponseFormat,
}

impl SectionHeader {
    pub fn label(&self) -> &'static str {
        match self {
            SectionHeader::ScanMetadata => "SCAN METADATA",
            SectionHeader::ScanResults => "SCAN RESULTATEN",
            SectionHeader::ContentAnalysis => "CONTENT ANALYSE",
            SectionHeader::AiInsights => "AI INZICHTEN",
            SectionHeader::BusinessReport => "BUSINESS RAPPORT",
            SectionHeader::MultiPageAnalysis => "MULTI-PAGE ANALYSE",
            SectionHeader::SiteWidePatterns => "SITE-BREDE PATRONEN",
            SectionHeader::CompetitiveContext => "CONCURRENTIE CONTEXT",
            SectionHeader::IndustryBenchmark => "BRANCHE BENCHMARK",
            SectionHeader::Task => "TAAK",
            SectionHeader::Tone => "TOON EN STIJL",
            SectionHeader::Structure => "STRUCTUUR",
            SectionHeader::ResponseFormat => "RESPONSE FORMAAT",
        }
    }

    pub fn render(&self) -> String {
        section_header(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToneSet {
    Analytical,
    Personal,
    Executive,
}

impl ToneSet {
    pub fn guidelines(&self) -> &'static [&'static str] {
        match self {
            ToneSet::Analytical => &[
                "Feitelijk en precies; elke bewering volgt uit de scanresultaten",
                "Concreet: noem de pagina, het element of de ontbrekende markup",
                "Geen marketingtaal of superlatieven",
            ],
            ToneSet::Personal => &[
                "Spreek de lezer direct aan met 'je' en 'jouw website'",
                "Leg technische begrippen in een halve zin uit",
                "Bemoedigend maar eerlijk over zwakke punten",
                "Vertaal bevindingen naar wat het de ondernemer oplevert",
            ],
            ToneSet::Executive => &[
                "Zakelijk en to-the-point, geschikt voor directie en MT",
                "Koppel elke aanbeveling aan bedrijfsimpact of risico",
                "Onderbouw met cijfers uit de benchmark en site-brede patronen",
                "Denk in kwartalen en verantwoordelijke teams",
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseSchema {
    Insights,
    Narrative,
    Enterprise,
}

impl ResponseSchema {
    /// Field name -> description, in the shape the response must take
    pub fn template(&self) -> Value {
        match self {
            ResponseSchema::Insights => json!({
                "missedOpportunities": [{
                    "title": "korte titel van de gemiste kans",
                    "description": "wat er ontbreekt en waarom het telt",
                    "impact": "hoog | middel | laag",
                    "effort": "hoog | middel | laag"
                }],
                "authorityEnhancements": [{
                    "area": "onderdeel van de autoriteit (auteur, bronnen, keurmerken)",
                    "recommendation": "concrete verbetering",
                    "impact": "hoog | middel | laag"
                }],
                "citabilityImprovements": [{
                    "element": "pagina-element of contentblok",
                    "currentState": "huidige situatie",
                    "improvement": "voorgestelde aanpassing"
                }],
                "implementationPriority": [{
                    "action": "uit te voeren actie",
                    "priority": "1 = hoogste prioriteit",
                    "timeframe": "bijvoorbeeld 'deze week' of '1-3 maanden'"
                }],
                "confidence": "getal tussen 0 en 100"
            }),
            ResponseSchema::Narrative => json!({
                "executiveSummary": "samenvatting van de belangrijkste conclusies",
                "detailedAnalysis": "uitgebreide analyse per aandachtsgebied",
                "implementationRoadmap": "stappenplan in volgorde van uitvoering",
                "conclusionNextSteps": "afsluiting met de eerstvolgende stappen",
                "wordCount": "totaal aantal woorden van de vier secties"
            }),
            ResponseSchema::Enterprise => json!({
                "executiveSummary": "strategische samenvatting voor het management",
                "multiPageAnalysis": "analyse van patronen over alle onderzochte pagina's",
                "competitivePositioning": "positie ten opzichte van concurrenten en benchmark",
                "strategicRoadmap": "roadmap per kwartaal met verantwoordelijke teams",
                "metrics": {
                    "roiEstimate": "verwachte opbrengst, onderbouwd",
                    "timeframe": "termijn waarop resultaat zichtbaar wordt",
                    "priorityActions": ["acties gerangschikt van belangrijk naar minder belangrijk"]
                },
                "wordCount": "totaal aantal woorden van de vier secties"
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstructionSet {
    JsonOnly,
    Narrative,
    Enterprise,
}

impl InstructionSet {
    pub fn instructions(&self) -> &'static [&'static str] {
        match self {
            InstructionSet::JsonOnly => &[
                "Antwoord uitsluitend met geldige JSON in exact het bovenstaande formaat",
                "Geen tekst, uitleg of markdown buiten de JSON",
                "Baseer elke bevinding op de aangeleverde data; verzin geen cijfers",
                "Schrijf alle tekstvelden in het Nederlands",
            ],
            InstructionSet::Narrative => &[
                "Antwoord uitsluitend met geldige JSON in exact het bovenstaande formaat",
                "Schrijf elke sectie als lopende tekst in alinea's, zonder opsommingstekens",
                "Mik op 800 tot 1200 woorden voor de vier secties samen",
                "Verwijs naar concrete bevindingen uit de scan en de AI-inzichten",
                "Schrijf in het Nederlands",
            ],
            InstructionSet::Enterprise => &[
                "Antwoord uitsluitend met geldige JSON in exact het bovenstaande formaat",
                "Schrijf elke sectie als lopende tekst voor een managementpubliek",
                "Mik op 1500 tot 2000 woorden voor de vier secties samen",
                "Rangschik priorityActions van meest naar minst belangrijk",
                "Onderbouw de ROI-inschatting met de aangeleverde benchmark en patronen",
                "Schrijf in het Nederlands",
            ],
        }
    }
}
