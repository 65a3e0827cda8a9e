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

//! Pattern-based reports used when AI generation is unavailable
//!
//! Everything here is derived from the input bundle alone. Apart from the
//! generation timestamp the output is a pure function of the input.

use chrono::Utc;
use sitescan_core::{
    count_words, AiInsights, AuthorityEnhancement, CitabilityImprovement, EnterpriseMetrics,
    EnterpriseNarrative, MissedOpportunity, ModuleFinding, ModuleResult, NarrativeReport,
    PriorityAction, PromptInput, ReportVariant, Severity, StructuredReport,
};

/// Confidence reported for pattern-based insights
pub const FALLBACK_CONFIDENCE: u8 = 50;

/// Upper bound on findings promoted to opportunities and actions
const MAX_PRIORITY_FINDINGS: usize = 5;

/// Pages and patterns below this score count as weak
const WEAK_SCORE: f64 = 50.0;

pub fn fallback_report(variant: ReportVariant, input: &PromptInput) -> StructuredReport {
    match variant {
        ReportVariant::Insights => StructuredReport::Insights(fallback_insights(input)),
        ReportVariant::Narrative => StructuredReport::Narrative(fallback_narrative(input)),
        ReportVariant::Enterprise => StructuredReport::Enterprise(fallback_enterprise(input)),
    }
}

pub fn fallback_insights(input: &PromptInput) -> AiInsights {
    let severe = severe_findings(input);

    let mut missed_opportunities: Vec<MissedOpportunity> = severe
        .iter()
        .map(|(_, finding)| MissedOpportunity {
            title: finding.title.clone(),
            description: describe(finding),
            impact: "hoog".to_string(),
            effort: "middel".to_string(),
        })
        .collect();

    let mut authority_enhancements = Vec::new();
    let mut citability_improvements = Vec::new();

    if let Some(content) = &input.enriched_content {
        missed_opportunities.extend(content.missed_opportunities.iter().map(|title| {
            MissedOpportunity {
                title: title.clone(),
                description: "Gesignaleerd in de contentanalyse".to_string(),
                impact: "middel".to_string(),
                effort: "middel".to_string(),
            }
        }));

        if content.authority_signals.is_empty() {
            authority_enhancements.push(AuthorityEnhancement {
                area: "Auteur en bronnen".to_string(),
                recommendation: "Voeg auteursinformatie, bronvermeldingen en keurmerken toe"
                    .to_string(),
                impact: "hoog".to_string(),
            });
        }
        if content.time_signals.is_empty() {
            authority_enhancements.push(AuthorityEnhancement {
                area: "Actualiteit".to_string(),
                recommendation: "Toon publicatie- en bijwerkdatums bij de content".to_string(),
                impact: "middel".to_string(),
            });
        }

        if let Some(quality) = &content.content_quality {
            citability_improvements.extend(quality.weaknesses.iter().map(|weakness| {
                CitabilityImprovement {
                    element: weakness.clone(),
                    current_state: "Zwak punt volgens de contentanalyse".to_string(),
                    improvement: "Herschrijf dit onderdeel met concrete feiten en cijfers"
                        .to_string(),
                }
            }));
        }
    }

    AiInsights {
        missed_opportunities,
        authority_enhancements,
        citability_improvements,
        implementation_priority: priority_actions(&severe),
        confidence: FALLBACK_CONFIDENCE,
        generated_at: Utc::now(),
    }
}

pub fn fallback_narrative(input: &PromptInput) -> NarrativeReport {
    let modules = input.module_results.as_deref().unwrap_or(&[]);
    let severe = severe_findings(input);

    let executive_summary = match average(modules.iter().map(|m| f64::from(m.score))) {
        Some(avg) => format!(
            "De AI-zichtbaarheid van {} scoort gemiddeld {:.0}/100 over {} onderdelen. {}",
            input.url,
            avg,
            modules.len(),
            urgency_sentence(severe.len())
        ),
        None => format!(
            "Voor {} zijn nog geen scanresultaten beschikbaar. Dit rapport bevat daarom algemene aanbevelingen.",
            input.url
        ),
    };

    let detailed_analysis = if modules.is_empty() {
        "Zodra de scan is afgerond, volgt hier per onderdeel een toelichting.".to_string()
    } else {
        modules
            .iter()
            .map(describe_module)
            .collect::<Vec<_>>()
            .join(" ")
    };

    let implementation_roadmap = roadmap(&priority_actions(&severe));

    let conclusion_next_steps = "Begin met de punten die deze week op de planning staan en herhaal de scan na de aanpassingen om de voortgang te meten.".to_string();

    let word_count = count_words(&[
        executive_summary.as_str(),
        detailed_analysis.as_str(),
        implementation_roadmap.as_str(),
        conclusion_next_steps.as_str(),
    ]);

    NarrativeReport {
        executive_summary,
        detailed_analysis,
        implementation_roadmap,
        conclusion_next_steps,
        word_count,
        generated_at: Utc::now(),
    }
}

pub fn fallback_enterprise(input: &PromptInput) -> EnterpriseNarrative {
    let features = input.enterprise.clone().unwrap_or_default();
    let pages = &features.page_samples;
    let page_average = average(pages.iter().map(|p| f64::from(p.score)));

    let executive_summary = {
        let mut summary = match &input.prior_narrative {
            Some(narrative) => narrative.executive_summary.clone(),
            None => format!("Strategische analyse van {}.", input.url),
        };
        if let Some(avg) = page_average {
            summary.push_str(&format!(
                " Over {} onderzochte pagina's is de gemiddelde score {:.0}/100.",
                pages.len(),
                avg
            ));
        }
        summary
    };

    let multi_page_analysis = match (page_average, pages.iter().min_by_key(|p| p.score)) {
        (Some(avg), Some(weakest)) => {
            let mut text = format!(
                "Er zijn {} pagina's geanalyseerd met een gemiddelde score van {:.0}/100. De zwakste pagina is {} met een score van {}/100.",
                pages.len(),
                avg,
                weakest.url,
                weakest.score
            );
            if !features.site_wide_patterns.is_empty() {
                let patterns = features
                    .site_wide_patterns
                    .iter()
                    .map(|(name, score)| format!("{} ({:.0})", name, score))
                    .collect::<Vec<_>>()
                    .join(", ");
                text.push_str(&format!(" Site-brede patronen: {}.", patterns));
            }
            text
        }
        _ => "Er zijn geen paginavoorbeelden beschikbaar voor een multi-page analyse.".to_string(),
    };

    let competitive_positioning = match (&features.industry_benchmark, &features.competitive_context) {
        (Some(benchmark), competition) => {
            let mut text = format!(
                "In de branche {} ligt de gemiddelde score op {:.0}/100; deze website bevindt zich rond het {}e percentiel.",
                benchmark.industry, benchmark.average_score, benchmark.percentile
            );
            if let Some(competition) = competition {
                text.push_str(&format!(
                    " Marktpositie: {}.",
                    competition.market_position
                ));
            }
            text
        }
        (None, Some(competition)) => format!(
            "Marktpositie: {}. Vergeleken concurrenten: {}.",
            competition.market_position,
            competition.competitors.join(", ")
        ),
        (None, None) => "Er is geen concurrentie- of benchmarkdata beschikbaar.".to_string(),
    };

    let mut priority_actions: Vec<String> = severe_findings(input)
        .iter()
        .map(|(module, finding)| format!("{}: {}", module.name, finding.title))
        .collect();
    priority_actions.extend(
        features
            .site_wide_patterns
            .iter()
            .filter(|(_, score)| **score < WEAK_SCORE)
            .map(|(name, _)| format!("Verbeter site-breed: {}", name)),
    );

    let strategic_roadmap = if priority_actions.is_empty() {
        "Kwartaal 1: borg de huidige kwaliteit. Kwartaal 2: breid gestructureerde data uit naar alle sjablonen. Kwartaal 3: meet de AI-zichtbaarheid opnieuw.".to_string()
    } else {
        format!(
            "Kwartaal 1: {}. Kwartaal 2: rol de verbeteringen uit over alle pagina's. Kwartaal 3: meet de AI-zichtbaarheid opnieuw en stel bij.",
            priority_actions
                .iter()
                .take(3)
                .cloned()
                .collect::<Vec<_>>()
                .join("; ")
        )
    };

    let word_count = count_words(&[
        executive_summary.as_str(),
        multi_page_analysis.as_str(),
        competitive_positioning.as_str(),
        strategic_roadmap.as_str(),
    ]);

    EnterpriseNarrative {
        executive_summary,
        multi_page_analysis,
        competitive_positioning,
        strategic_roadmap,
        metrics: EnterpriseMetrics {
            roi_estimate: "Niet te bepalen zonder AI-analyse".to_string(),
            timeframe: "3-6 maanden".to_string(),
            priority_actions,
        },
        word_count,
        generated_at: Utc::now(),
    }
}

/// High and critical findings, most severe first, module order otherwise kept
fn severe_findings(input: &PromptInput) -> Vec<(&ModuleResult, &ModuleFinding)> {
    let mut severe: Vec<_> = input
        .findings()
        .filter(|(_, finding)| finding.severity >= Severity::High)
        .collect();
    severe.sort_by(|a, b| b.1.severity.cmp(&a.1.severity));
    severe.truncate(MAX_PRIORITY_FINDINGS);
    severe
}

fn priority_actions(severe: &[(&ModuleResult, &ModuleFinding)]) -> Vec<PriorityAction> {
    severe
        .iter()
        .enumerate()
        .map(|(rank, (_, finding))| PriorityAction {
            action: finding
                .recommendation
                .clone()
                .unwrap_or_else(|| format!("Los op: {}", finding.title)),
            priority: (rank + 1).to_string(),
            timeframe: match finding.severity {
                Severity::Critical => "deze week",
                _ => "deze maand",
            }
            .to_string(),
        })
        .collect()
}

fn roadmap(actions: &[PriorityAction]) -> String {
    if actions.is_empty() {
        return "Er zijn geen urgente acties. Houd de huidige kwaliteit vast en herhaal de scan over drie maanden.".to_string();
    }
    actions
        .iter()
        .map(|a| format!("{}. {} ({}).", a.priority, a.action, a.timeframe))
        .collect::<Vec<_>>()
        .join(" ")
}

fn describe(finding: &ModuleFinding) -> String {
    match (&finding.recommendation, finding.description.is_empty()) {
        (Some(recommendation), true) => recommendation.clone(),
        (Some(recommendation), false) => format!("{} {}", finding.description, recommendation),
        (None, _) => finding.description.clone(),
    }
}

fn describe_module(module: &ModuleResult) -> String {
    let verdict = match module.score {
        80..=u8::MAX => "sterk",
        60..=79 => "redelijk",
        _ => "een aandachtspunt",
    };
    format!(
        "{} scoort {}/100 en is daarmee {} ({} bevindingen).",
        module.name,
        module.score,
        verdict,
        module.findings.len()
    )
}

fn urgency_sentence(severe: usize) -> String {
    match severe {
        0 => "Er zijn geen urgente problemen gevonden.".to_string(),
        1 => "Er is 1 urgent verbeterpunt gevonden.".to_string(),
        n => format!("Er zijn {} urgente verbeterpunten gevonden.", n),
    }
}

fn average(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}
