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

//! Content Budgeter
//!
//! Estimates the token cost of prompt text and cuts it down to a configured
//! budget. Estimates are character based (`ceil(chars / chars_per_token)`),
//! which keeps them O(n) in the text length and independent of any tokenizer.
//!
//! Free text is cut with one of three strategies:
//! - **tail**: keep a prefix, backing off to a line break near the cut
//! - **head+tail**: keep equal-sized prefix and suffix around a marker
//! - **salient**: keep the head (persona and instructions live there), then
//!   append the task, response-format and structure sections in that fixed
//!   order until the budget runs out
//!
//! The salient strategy is a heuristic. Regions are ranked by the fixed scan
//! order of [`SALIENT_SECTION_PATTERNS`], not by a computed relevance score.
//!
//! Structured JSON is reduced field by field (objects) or by item count
//! (arrays), and whole prompt sections can be dropped by priority.

use crate::error::PromptError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sitescan_core::{BudgetConfig, TruncationStrategy, DEFAULT_CHARS_PER_TOKEN};
use std::sync::OnceLock;
use tracing::debug;

/// Characters held back from every cut for the marker text
pub const TRUNCATION_SAFETY_CHARS: usize = 100;

/// Appended after tail and salient cuts
pub const TRUNCATION_MARKER: &str =
    "\n\n[... inhoud ingekort om binnen het tokenbudget te blijven ...]";

/// Joins head and tail in head+tail cuts
pub const MIDDLE_OMITTED_MARKER: &str = "\n\n[... middengedeelte weggelaten ...]\n\n";

/// Share of the budget always spent on the head in salient cuts
pub const SALIENT_HEAD_RATIO: f64 = 0.3;

/// Assumed token cost of one array item when limiting arrays
pub const AVG_ITEM_TOKENS: usize = 100;

/// Cap for the string field that overflows an object budget
pub const STRING_FIELD_CAP: usize = 200;

/// Cap for the array field that overflows an object budget
pub const ARRAY_FIELD_CAP: usize = 3;

/// Section headers kept by salient cuts, in scan order
pub const SALIENT_SECTION_PATTERNS: [&str; 3] = [
    r"(?m)^=== TAAK ===",
    r"(?m)^=== RESPONSE FORMAAT ===",
    r"(?m)^=== STRUCTUUR ===",
];

const SECTION_BOUNDARY_PATTERN: &str = r"(?m)^=== [^\n]+ ===";

const REGION_SEPARATOR: &str = "\n\n";

fn salient_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        SALIENT_SECTION_PATTERNS
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect()
    })
}

fn section_boundary() -> Option<&'static Regex> {
    static BOUNDARY: OnceLock<Option<Regex>> = OnceLock::new();
    BOUNDARY
        .get_or_init(|| Regex::new(SECTION_BOUNDARY_PATTERN).ok())
        .as_ref()
}

/// Derived token estimate for a piece of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEstimate {
    pub estimated_tokens: usize,
    pub character_count: usize,
    pub within_limit: bool,
}

/// Drop order for [`ContentBudgeter::limit_sections`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionPriority {
    High,
    Medium,
    Low,
}

/// A rendered part of a prompt
///
/// `content` is the full rendered text including its header; `title` only
/// identifies the section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSection {
    pub title: String,
    pub content: String,
    pub priority: SectionPriority,
}

impl PromptSection {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        priority: SectionPriority,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            priority,
        }
    }
}

/// Joins sections in insertion order
pub fn render_sections(sections: &[PromptSection]) -> String {
    sections
        .iter()
        .map(|section| section.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Token estimator and truncation engine for one budget
#[derive(Debug, Clone)]
pub struct ContentBudgeter {
    config: BudgetConfig,
    chars_per_token: usize,
}

impl ContentBudgeter {
    pub fn new(config: BudgetConfig) -> Result<Self, PromptError> {
        config
            .validate()
            .map_err(|e| PromptError::InvalidBudget(e.to_string()))?;

        Ok(Self::from_valid(config))
    }

    /// `config` must already satisfy [`BudgetConfig::validate`]
    pub(crate) fn from_valid(config: BudgetConfig) -> Self {
        Self {
            config,
            chars_per_token: DEFAULT_CHARS_PER_TOKEN,
        }
    }

    /// Override the characters-per-token ratio (minimum 1)
    pub fn with_chars_per_token(mut self, chars_per_token: usize) -> Self {
        self.chars_per_token = chars_per_token.max(1);
        self
    }

    pub fn config(&self) -> &BudgetConfig {
        &self.config
    }

    pub fn chars_per_token(&self) -> usize {
        self.chars_per_token
    }

    pub fn available_budget(&self) -> usize {
        self.config.available_budget()
    }

    fn budget_chars(&self) -> usize {
        self.available_budget().saturating_mul(self.chars_per_token)
    }

    pub fn estimate_tokens(&self, text: &str) -> TokenEstimate {
        let character_count = text.chars().count();
        let estimated_tokens = character_count.div_ceil(self.chars_per_token);

        TokenEstimate {
            estimated_tokens,
            character_count,
            within_limit: estimated_tokens <= self.available_budget(),
        }
    }

    /// Cut `text` to the available budget using the configured strategy
    ///
    /// Text already within budget is returned unchanged, so the operation is
    /// idempotent.
    pub fn limit_content(&self, text: &str) -> String {
        let estimate = self.estimate_tokens(text);
        if estimate.within_limit {
            return text.to_string();
        }

        let budget_chars = self.budget_chars();
        let limited = if budget_chars <= TRUNCATION_SAFETY_CHARS {
            // No room for a marker
            take_chars(text, budget_chars).to_string()
        } else {
            match self.config.strategy {
                TruncationStrategy::Tail => tail_cut(text, budget_chars),
                TruncationStrategy::HeadTail => head_tail_cut(text, budget_chars),
                TruncationStrategy::Salient => salient_cut(text, budget_chars),
            }
        };

        debug!(
            strategy = ?self.config.strategy,
            original_tokens = estimate.estimated_tokens,
            limited_tokens = self.estimate_tokens(&limited).estimated_tokens,
            available = self.available_budget(),
            "Truncated content to token budget"
        );

        limited
    }

    /// Reduce JSON data to the available budget
    ///
    /// Arrays keep a prefix of `available / AVG_ITEM_TOKENS` items. Objects
    /// keep `priority_fields` first, then the remaining fields in declaration
    /// order while the serialized form fits. The first field that does not
    /// fit is capped (strings to [`STRING_FIELD_CAP`] chars, arrays to
    /// [`ARRAY_FIELD_CAP`] items) and every later field is dropped. Other
    /// values are returned unchanged.
    pub fn limit_structured_data(&self, data: &Value, priority_fields: &[&str]) -> Value {
        match data {
            Value::Array(items) => {
                if self.fits(data) {
                    return data.clone();
                }
                let keep = self.available_budget() / AVG_ITEM_TOKENS;
                debug!(
                    original_items = items.len(),
                    kept_items = keep,
                    "Limited array to token budget"
                );
                Value::Array(items.iter().take(keep).cloned().collect())
            }
            Value::Object(map) => {
                if self.fits(data) {
                    return data.clone();
                }
                Value::Object(self.limit_object(map, priority_fields))
            }
            _ => data.clone(),
        }
    }

    fn limit_object(&self, map: &Map<String, Value>, priority_fields: &[&str]) -> Map<String, Value> {
        let mut limited = Map::new();

        for field in priority_fields {
            if let Some(value) = map.get(*field) {
                limited.insert((*field).to_string(), value.clone());
            }
        }

        for (key, value) in map {
            if limited.contains_key(key) {
                continue;
            }

            // The candidate is always the last entry, so removing it keeps order
            limited.insert(key.clone(), value.clone());
            if self.fits_object(&limited) {
                continue;
            }
            limited.remove(key);

            match value {
                Value::String(s) => {
                    limited.insert(key.clone(), Value::String(cap_string(s, STRING_FIELD_CAP)));
                }
                Value::Array(items) => {
                    limited.insert(
                        key.clone(),
                        Value::Array(items.iter().take(ARRAY_FIELD_CAP).cloned().collect()),
                    );
                }
                _ => {}
            }

            debug!(
                overflow_field = %key,
                kept_fields = limited.len(),
                total_fields = map.len(),
                "Limited object to token budget"
            );
            break;
        }

        limited
    }

    /// Drop low, then medium priority sections (last first) until the
    /// rendered text fits. High priority sections are never dropped.
    pub fn limit_sections(&self, sections: Vec<PromptSection>) -> Vec<PromptSection> {
        let mut kept = sections;

        loop {
            if self.estimate_tokens(&render_sections(&kept)).within_limit {
                return kept;
            }

            let victim = kept
                .iter()
                .rposition(|s| s.priority == SectionPriority::Low)
                .or_else(|| kept.iter().rposition(|s| s.priority == SectionPriority::Medium));

            match victim {
                Some(index) => {
                    let dropped = kept.remove(index);
                    debug!(section = %dropped.title, priority = ?dropped.priority, "Dropped prompt section");
                }
                None => return kept,
            }
        }
    }

    fn fits(&self, value: &Value) -> bool {
        let serialized = serde_json::to_string(value).unwrap_or_default();
        self.estimate_tokens(&serialized).within_limit
    }

    fn fits_object(&self, map: &Map<String, Value>) -> bool {
        let serialized = serde_json::to_string(map).unwrap_or_default();
        self.estimate_tokens(&serialized).within_limit
    }
}

impl Default for ContentBudgeter {
    /// 12000 tokens, 1000 reserved, salient strategy
    fn default() -> Self {
        Self::from_valid(BudgetConfig::default())
    }
}

fn tail_cut(text: &str, budget_chars: usize) -> String {
    let window = budget_chars - TRUNCATION_SAFETY_CHARS;
    let mut prefix = take_chars(text, window);

    let min_keep = window - window / 10;
    if let Some(newline) = prefix.rfind('\n') {
        if prefix[..newline].chars().count() >= min_keep {
            prefix = &prefix[..newline];
        }
    }

    format!("{}{}", prefix, TRUNCATION_MARKER)
}

fn head_tail_cut(text: &str, budget_chars: usize) -> String {
    let half = (budget_chars - TRUNCATION_SAFETY_CHARS) / 2;
    format!(
        "{}{}{}",
        take_chars(text, half),
        MIDDLE_OMITTED_MARKER,
        last_chars(text, half)
    )
}

fn salient_cut(text: &str, budget_chars: usize) -> String {
    let content_budget = budget_chars - TRUNCATION_SAFETY_CHARS;
    let head_chars = (content_budget as f64 * SALIENT_HEAD_RATIO) as usize;
    let head = take_chars(text, head_chars);
    let head_end = head.len();

    let mut limited = head.to_string();
    let mut remaining = content_budget - head.chars().count();
    let separator_chars = REGION_SEPARATOR.chars().count();
    let mut appended: Vec<(usize, usize)> = Vec::new();

    for pattern in salient_patterns() {
        if remaining <= separator_chars {
            break;
        }

        let Some(found) = pattern.find(text) else {
            continue;
        };

        let start = found.start().max(head_end);
        let end = next_section_start(text, found.end()).unwrap_or(text.len());
        if start >= end || appended.iter().any(|&(s, e)| start < e && s < end) {
            continue;
        }

        let region = &text[start..end];
        remaining -= separator_chars;
        let region_chars = region.chars().count();

        limited.push_str(REGION_SEPARATOR);
        if region_chars <= remaining {
            limited.push_str(region);
            remaining -= region_chars;
        } else {
            limited.push_str(take_chars(region, remaining));
            remaining = 0;
        }
        appended.push((start, end));
    }

    if appended.is_empty() {
        return tail_cut(text, budget_chars);
    }

    limited.push_str(TRUNCATION_MARKER);
    limited
}

fn next_section_start(text: &str, from: usize) -> Option<usize> {
    section_boundary()?
        .find_at(text, from)
        .map(|found| found.start())
}

/// Prefix of at most `n` chars, cut on a char boundary
pub(crate) fn take_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn last_chars(s: &str, n: usize) -> &str {
    let total = s.chars().count();
    if n >= total {
        return s;
    }
    match s.char_indices().nth(total - n) {
        Some((idx, _)) => &s[idx..],
        None => "",
    }
}

fn cap_string(s: &str, cap: usize) -> String {
    if s.chars().count() <= cap {
        return s.to_string();
    }
    format!("{}...", take_chars(s, cap))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn budgeter(max: usize, reserve: usize, strategy: TruncationStrategy) -> ContentBudgeter {
        ContentBudgeter::new(BudgetConfig::new(max, reserve, strategy)).unwrap()
    }

    fn prompt_with_sections(filler_lines: usize) -> String {
        let mut text = String::from("Je bent een ervaren analist.\n\n=== SCAN RESULTATEN ===\n");
        for i in 0..filler_lines {
            text.push_str(&format!("regel {} met bevindingen over de website\n", i));
        }
        text.push_str("\n=== TAAK ===\nAnalyseer de resultaten.\n");
        text.push_str("\n=== RESPONSE FORMAAT ===\n{\"confidence\": \"getal\"}\n");
        text
    }

    #[test]
    fn test_markers_fit_safety_window() {
        assert!(TRUNCATION_MARKER.chars().count() < TRUNCATION_SAFETY_CHARS);
        assert!(MIDDLE_OMITTED_MARKER.chars().count() < TRUNCATION_SAFETY_CHARS);
    }

    #[test]
    fn test_invalid_budget_rejected() {
        let result = ContentBudgeter::new(BudgetConfig::new(100, 100, TruncationStrategy::Tail));
        assert!(matches!(result, Err(PromptError::InvalidBudget(_))));
    }

    #[test]
    fn test_empty_string_estimate() {
        let b = budgeter(10, 5, TruncationStrategy::Tail);
        let estimate = b.estimate_tokens("");
        assert_eq!(estimate.estimated_tokens, 0);
        assert_eq!(estimate.character_count, 0);
        assert!(estimate.within_limit);
        assert_eq!(b.limit_content(""), "");
    }

    #[test]
    fn test_estimate_rounds_up() {
        let b = budgeter(100, 0, TruncationStrategy::Tail);
        assert_eq!(b.estimate_tokens("abcde").estimated_tokens, 2);
        assert_eq!(b.estimate_tokens("abcd").estimated_tokens, 1);
        // Multi-byte chars count once
        assert_eq!(b.estimate_tokens("ëëëë").character_count, 4);
    }

    #[test]
    fn test_within_limit_unchanged() {
        let b = budgeter(1000, 100, TruncationStrategy::Salient);
        let text = "korte tekst";
        assert_eq!(b.limit_content(text), text);
    }

    #[test]
    fn test_tail_cut_backs_off_to_newline() {
        let b = budgeter(100, 0, TruncationStrategy::Tail);
        let text = prompt_with_sections(40);
        let limited = b.limit_content(&text);

        assert!(limited.ends_with(TRUNCATION_MARKER));
        assert!(b.estimate_tokens(&limited).within_limit);
        let body = limited.strip_suffix(TRUNCATION_MARKER).unwrap();
        // Cut landed on a line break, so the last kept line is complete
        assert!(text.contains(&format!("{}\n", body)));
    }

    #[test]
    fn test_tail_cut_without_late_newline_keeps_full_window() {
        let b = budgeter(100, 0, TruncationStrategy::Tail);
        let text = format!("kop\n{}", "z".repeat(2000));
        let limited = b.limit_content(&text);

        let body = limited.strip_suffix(TRUNCATION_MARKER).unwrap();
        assert_eq!(body.chars().count(), 400 - TRUNCATION_SAFETY_CHARS);
        assert!(body.starts_with("kop\nzzz"));
        assert!(b.estimate_tokens(&limited).within_limit);
    }

    #[test]
    fn test_head_tail_keeps_both_ends() {
        let b = budgeter(100, 0, TruncationStrategy::HeadTail);
        let text = prompt_with_sections(40);
        let limited = b.limit_content(&text);

        assert!(limited.starts_with("Je bent een ervaren analist."));
        assert!(limited.contains(MIDDLE_OMITTED_MARKER));
        assert!(limited.ends_with("{\"confidence\": \"getal\"}\n"));
        assert!(b.estimate_tokens(&limited).within_limit);
    }

    #[test]
    fn test_salient_keeps_task_and_response_format() {
        let b = budgeter(150, 0, TruncationStrategy::Salient);
        let text = prompt_with_sections(80);
        let limited = b.limit_content(&text);

        assert!(limited.starts_with("Je bent een ervaren analist."));
        assert!(limited.contains("=== TAAK ===\nAnalyseer de resultaten."));
        assert!(limited.contains("=== RESPONSE FORMAAT ==="));
        assert!(limited.ends_with(TRUNCATION_MARKER));
        assert!(b.estimate_tokens(&limited).within_limit);

        let task = limited.find("=== TAAK ===").unwrap();
        let format = limited.find("=== RESPONSE FORMAAT ===").unwrap();
        assert!(task < format);
    }

    #[test]
    fn test_salient_without_known_sections_falls_back_to_tail() {
        let b = budgeter(100, 0, TruncationStrategy::Salient);
        let text = "x".repeat(2000);
        let limited = b.limit_content(&text);
        assert_eq!(limited, tail_cut(&text, 400));
        let body = limited.strip_suffix(TRUNCATION_MARKER).unwrap();
        assert_eq!(body.len(), 400 - TRUNCATION_SAFETY_CHARS);
    }

    #[test]
    fn test_tiny_budget_hard_prefix() {
        let b = budgeter(10, 0, TruncationStrategy::Salient);
        let limited = b.limit_content(&"y".repeat(500));
        assert_eq!(limited, "y".repeat(40));
    }

    #[test]
    fn test_structured_within_budget_is_deep_equal() {
        let b = budgeter(1000, 0, TruncationStrategy::Tail);
        let data = json!({"a": 1, "b": {"c": [1, 2, 3]}, "d": "tekst"});
        assert_eq!(b.limit_structured_data(&data, &[]), data);
    }

    #[test]
    fn test_structured_priority_field_retained() {
        let b = budgeter(60, 0, TruncationStrategy::Tail);
        let data = json!({
            "b": "x".repeat(2000),
            "a": "klein",
            "c": "y".repeat(2000),
        });

        let limited = b.limit_structured_data(&data, &["a"]);
        let obj = limited.as_object().unwrap();
        assert_eq!(obj.get("a"), Some(&json!("klein")));
        assert_eq!(obj.keys().next().map(String::as_str), Some("a"));
        // First overflowing field is capped, later ones dropped
        let capped = obj.get("b").and_then(Value::as_str).unwrap();
        assert_eq!(capped.chars().count(), STRING_FIELD_CAP + 3);
        assert!(obj.get("c").is_none());
    }

    #[test]
    fn test_structured_overflowing_array_capped() {
        let b = budgeter(30, 0, TruncationStrategy::Tail);
        let data = json!({
            "url": "https://example.com",
            "items": (0..100).map(|i| format!("item-{}", i)).collect::<Vec<_>>(),
            "later": "weg",
        });

        let limited = b.limit_structured_data(&data, &[]);
        let obj = limited.as_object().unwrap();
        assert_eq!(obj["items"].as_array().unwrap().len(), ARRAY_FIELD_CAP);
        assert!(obj.get("later").is_none());
    }

    #[test]
    fn test_structured_array_keeps_fixed_prefix() {
        let b = budgeter(300, 0, TruncationStrategy::Tail);
        let data = Value::Array((0..500).map(|i| json!({"id": i, "name": "module"})).collect());
        let limited = b.limit_structured_data(&data, &[]);
        let items = limited.as_array().unwrap();
        assert_eq!(items.len(), 300 / AVG_ITEM_TOKENS);
        assert_eq!(items[0]["id"], 0);
    }

    #[test]
    fn test_structured_scalars_unchanged() {
        let b = budgeter(2, 0, TruncationStrategy::Tail);
        assert_eq!(b.limit_structured_data(&Value::Null, &[]), Value::Null);
        let long = json!("z".repeat(100));
        assert_eq!(b.limit_structured_data(&long, &[]), long);
    }

    #[test]
    fn test_limit_sections_drops_low_then_medium() {
        let b = budgeter(32, 0, TruncationStrategy::Tail);
        let sections = vec![
            PromptSection::new("persona", "p".repeat(40), SectionPriority::High),
            PromptSection::new("data", "d".repeat(40), SectionPriority::Medium),
            PromptSection::new("tone", "t".repeat(40), SectionPriority::Low),
            PromptSection::new("task", "k".repeat(40), SectionPriority::High),
        ];

        let kept = b.limit_sections(sections);
        let titles: Vec<_> = kept.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["persona", "data", "task"]);
    }

    #[test]
    fn test_limit_sections_never_drops_high() {
        let b = budgeter(5, 0, TruncationStrategy::Tail);
        let sections = vec![
            PromptSection::new("persona", "p".repeat(100), SectionPriority::High),
            PromptSection::new("tone", "t".repeat(100), SectionPriority::Low),
        ];
        let kept = b.limit_sections(sections);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "persona");
    }

    fn strategy() -> impl Strategy<Value = TruncationStrategy> {
        prop_oneof![
            Just(TruncationStrategy::Tail),
            Just(TruncationStrategy::HeadTail),
            Just(TruncationStrategy::Salient),
        ]
    }

    fn prompt_text() -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop_oneof![
                "[a-zA-Z0-9 éëü]{0,80}\n",
                Just("=== TAAK ===\n".to_string()),
                Just("=== RESPONSE FORMAAT ===\n".to_string()),
                Just("=== STRUCTUUR ===\n".to_string()),
                Just("=== SCAN RESULTATEN ===\n".to_string()),
            ],
            0..120,
        )
        .prop_map(|parts| parts.concat())
    }

    proptest! {
        #[test]
        fn prop_limited_content_fits_and_is_idempotent(
            text in prompt_text(),
            max in 1usize..600,
            reserve_ratio in 0.0f64..0.9,
            strategy in strategy(),
        ) {
            let reserve = ((max as f64) * reserve_ratio) as usize;
            prop_assume!(reserve < max);
            let b = budgeter(max, reserve, strategy);

            let limited = b.limit_content(&text);
            prop_assert!(b.estimate_tokens(&limited).within_limit || limited == text);
            prop_assert_eq!(b.limit_content(&limited), limited);
        }

        #[test]
        fn prop_available_budget_is_difference(max in 1usize..100_000, reserve in 0usize..100_000) {
            prop_assume!(reserve < max);
            let b = budgeter(max, reserve, TruncationStrategy::Tail);
            prop_assert_eq!(b.available_budget(), max - reserve);
            prop_assert!(b.estimate_tokens("").within_limit);
        }
    }
}
