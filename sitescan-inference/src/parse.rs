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

//! Response parsing and validation
//!
//! Strips Markdown fences, checks the variant's required fields and lets
//! serde fill the optional ones with their documented defaults.

use crate::error::GatewayError;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use sitescan_core::{
    count_words, AiInsights, EnterpriseNarrative, NarrativeReport, ReportVariant,
    StructuredReport,
};

/// Remove a surrounding ```` ```json ```` or bare ```` ``` ```` fence
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

pub fn parse_insights(raw: &str) -> Result<AiInsights, GatewayError> {
    let variant = ReportVariant::Insights;
    let mut object = parse_object(variant, raw)?;

    if !object
        .get("missedOpportunities")
        .map(Value::is_array)
        .unwrap_or(false)
    {
        return Err(GatewayError::parse_failed(
            variant,
            "missedOpportunities must be an array",
        ));
    }

    // Unreadable confidence values fall back to the default
    if let Some(raw_confidence) = object.remove("confidence") {
        if let Some(confidence) = normalize_confidence(&raw_confidence) {
            object.insert("confidence".to_string(), json!(confidence));
        }
    }

    deserialize(variant, object)
}

pub fn parse_narrative(raw: &str) -> Result<NarrativeReport, GatewayError> {
    let variant = ReportVariant::Narrative;
    let mut object = parse_object(variant, raw)?;
    require_summary(variant, &object)?;

    let provided = take_word_count(&mut object);
    let mut report: NarrativeReport = deserialize(variant, object)?;
    report.word_count = provided.unwrap_or_else(|| count_words(&report.sections()));
    Ok(report)
}

pub fn parse_enterprise(raw: &str) -> Result<EnterpriseNarrative, GatewayError> {
    let variant = ReportVariant::Enterprise;
    let mut object = parse_object(variant, raw)?;
    require_summary(variant, &object)?;

    if let Some(Value::Object(metrics)) = object.get_mut("metrics") {
        metrics.retain(|_, v| !v.is_null());
    }

    let provided = take_word_count(&mut object);
    let mut report: EnterpriseNarrative = deserialize(variant, object)?;
    report.word_count = provided.unwrap_or_else(|| count_words(&report.sections()));
    Ok(report)
}

pub fn parse_report(variant: ReportVariant, raw: &str) -> Result<StructuredReport, GatewayError> {
    Ok(match variant {
        ReportVariant::Insights => StructuredReport::Insights(parse_insights(raw)?),
        ReportVariant::Narrative => StructuredReport::Narrative(parse_narrative(raw)?),
        ReportVariant::Enterprise => StructuredReport::Enterprise(parse_enterprise(raw)?),
    })
}

/// Fence-stripped JSON object with `null` fields removed
///
/// Empty bodies are rejected by the gateway before billing, so one reaching
/// this point is a parse failure.
fn parse_object(variant: ReportVariant, raw: &str) -> Result<Map<String, Value>, GatewayError> {
    let body = strip_code_fences(raw);
    if body.is_empty() {
        return Err(GatewayError::parse_failed(variant, "response body is empty"));
    }

    let value: Value = serde_json::from_str(body)
        .map_err(|e| GatewayError::parse_failed(variant, format!("invalid JSON: {}", e)))?;

    match value {
        Value::Object(mut object) => {
            object.retain(|_, v| !v.is_null());
            Ok(object)
        }
        other => Err(GatewayError::parse_failed(
            variant,
            format!("expected a JSON object, got {}", type_name(&other)),
        )),
    }
}

fn deserialize<T: DeserializeOwned>(
    variant: ReportVariant,
    object: Map<String, Value>,
) -> Result<T, GatewayError> {
    serde_json::from_value(Value::Object(object))
        .map_err(|e| GatewayError::parse_failed(variant, e.to_string()))
}

fn require_summary(variant: ReportVariant, object: &Map<String, Value>) -> Result<(), GatewayError> {
    match object.get("executiveSummary").and_then(Value::as_str) {
        Some(summary) if !summary.trim().is_empty() => Ok(()),
        _ => Err(GatewayError::parse_failed(
            variant,
            "executiveSummary must be a non-empty string",
        )),
    }
}

/// Integer word count from the response, if any; leaves a placeholder behind
fn take_word_count(object: &mut Map<String, Value>) -> Option<u32> {
    let provided = object
        .get("wordCount")
        .and_then(Value::as_u64)
        .map(|n| n.min(u64::from(u32::MAX)) as u32);
    object.insert("wordCount".to_string(), json!(0));
    provided
}

/// Accepts integers, fractions and numeric strings; clamps to 0..=100
fn normalize_confidence(value: &Value) -> Option<u8> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok()?,
        _ => return None,
    };
    if !number.is_finite() {
        return None;
    }
    Some(number.round().clamp(0.0, 100.0) as u8)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitescan_core::DEFAULT_CONFIDENCE;

    #[test]
    fn test_strip_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  ```\n{\"a\":1}\n```  \n"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```json{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
        assert_eq!(strip_code_fences("```json\n{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn test_fenced_insights_keep_confidence() {
        let raw = "```json\n{\"confidence\":85,\"missedOpportunities\":[]}\n```";
        let insights = parse_insights(raw).unwrap();
        assert_eq!(insights.confidence, 85);
        assert!(insights.missed_opportunities.is_empty());
    }

    #[test]
    fn test_insight_defaults() {
        let raw = r#"{"missedOpportunities":[{"title":"FAQ"}],"authorityEnhancements":null}"#;
        let insights = parse_insights(raw).unwrap();
        assert_eq!(insights.confidence, DEFAULT_CONFIDENCE);
        assert!(insights.authority_enhancements.is_empty());
        assert!(insights.implementation_priority.is_empty());
    }

    #[test]
    fn test_confidence_normalization() {
        let raw = r#"{"missedOpportunities":[],"confidence":"82.6%"}"#;
        assert_eq!(parse_insights(raw).unwrap().confidence, 83);
        let raw = r#"{"missedOpportunities":[],"confidence":140}"#;
        assert_eq!(parse_insights(raw).unwrap().confidence, 100);
        let raw = r#"{"missedOpportunities":[],"confidence":"hoog"}"#;
        assert_eq!(parse_insights(raw).unwrap().confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn test_insights_require_array() {
        for raw in [
            r#"{"confidence":85}"#,
            r#"{"missedOpportunities":"geen"}"#,
            r#"[1,2]"#,
            "niet eens json",
        ] {
            assert!(
                matches!(
                    parse_insights(raw),
                    Err(GatewayError::ParseFailed { variant: ReportVariant::Insights, .. })
                ),
                "{}",
                raw
            );
        }
    }

    #[test]
    fn test_empty_body_is_parse_failure() {
        assert!(matches!(
            parse_insights("  "),
            Err(GatewayError::ParseFailed { variant: ReportVariant::Insights, .. })
        ));
        assert!(matches!(
            parse_narrative("```json\n```"),
            Err(GatewayError::ParseFailed { variant: ReportVariant::Narrative, .. })
        ));
    }

    #[test]
    fn test_narrative_word_count_defaults_to_computed() {
        let raw = r#"{"executiveSummary":"Een twee drie.","detailedAnalysis":"Vier vijf."}"#;
        let report = parse_narrative(raw).unwrap();
        assert_eq!(report.word_count, 5);
        assert!(report.conclusion_next_steps.is_empty());

        let raw = r#"{"executiveSummary":"Een.","wordCount":1100}"#;
        assert_eq!(parse_narrative(raw).unwrap().word_count, 1100);
    }

    #[test]
    fn test_narrative_requires_summary() {
        let raw = r#"{"executiveSummary":"   ","detailedAnalysis":"tekst"}"#;
        assert!(matches!(
            parse_narrative(raw),
            Err(GatewayError::ParseFailed { variant: ReportVariant::Narrative, .. })
        ));
    }

    #[test]
    fn test_enterprise_metrics_defaults() {
        let raw = r#"{
            "executiveSummary": "Strategie.",
            "metrics": {"roiEstimate": "15%", "priorityActions": null}
        }"#;
        let report = parse_enterprise(raw).unwrap();
        assert_eq!(report.metrics.roi_estimate, "15%");
        assert!(report.metrics.priority_actions.is_empty());
        assert!(report.metrics.timeframe.is_empty());
        assert_eq!(report.word_count, 1);
    }

    #[test]
    fn test_parse_report_dispatches_on_variant() {
        let report =
            parse_report(ReportVariant::Narrative, r#"{"executiveSummary":"Kort."}"#).unwrap();
        assert_eq!(report.variant(), ReportVariant::Narrative);
    }
}
