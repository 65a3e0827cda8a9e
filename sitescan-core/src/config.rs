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

//! Pipeline configuration
//!
//! Every knob of the report pipeline lives here with a serde default, so a
//! partial TOML file (or none at all) still yields a usable configuration.
//! The cost constants are approximations carried over as defaults; they are
//! not calibrated against real invoices.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Conservative characters-per-token ratio used for every estimate
pub const DEFAULT_CHARS_PER_TOKEN: usize = 4;

/// How the Content Budgeter cuts text that does not fit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncationStrategy {
    /// Keep a prefix
    Tail,
    /// Keep equal-sized prefix and suffix
    HeadTail,
    /// Keep the head plus known important sections
    #[default]
    Salient,
}

impl TruncationStrategy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "tail" => Some(TruncationStrategy::Tail),
            "head_tail" | "headtail" => Some(TruncationStrategy::HeadTail),
            "salient" => Some(TruncationStrategy::Salient),
            _ => None,
        }
    }
}

/// Token budget for one piece of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetConfig {
    pub max_tokens: usize,
    pub reserve_tokens: usize,
    pub strategy: TruncationStrategy,
}

impl BudgetConfig {
    pub fn new(max_tokens: usize, reserve_tokens: usize, strategy: TruncationStrategy) -> Self {
        Self {
            max_tokens,
            reserve_tokens,
            strategy,
        }
    }

    /// `max_tokens - reserve_tokens`, never negative
    pub fn available_budget(&self) -> usize {
        self.max_tokens.saturating_sub(self.reserve_tokens)
    }

    pub fn validate(&self) -> Result<()> {
        if self.reserve_tokens >= self.max_tokens {
            return Err(ConfigError::Invalid(format!(
                "reserve_tokens ({}) must be smaller than max_tokens ({})",
                self.reserve_tokens, self.max_tokens
            )));
        }
        Ok(())
    }
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self::new(
            default_prompt_max_tokens(),
            default_prompt_reserve_tokens(),
            TruncationStrategy::default(),
        )
    }
}

/// Pipeline configuration root
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub prompt: PromptBudgetConfig,
    #[serde(default)]
    pub cost: CostConfig,
    #[serde(default)]
    pub inference: InferenceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PromptBudgetConfig {
    /// Context ceiling for a complete prompt
    #[serde(default = "default_prompt_max_tokens")]
    pub max_tokens: usize,

    /// Tokens held back from the ceiling
    #[serde(default = "default_prompt_reserve_tokens")]
    pub reserve_tokens: usize,

    #[serde(default)]
    pub strategy: TruncationStrategy,

    /// Ceiling for each data section before the whole prompt is budgeted
    #[serde(default = "default_section_max_tokens")]
    pub section_max_tokens: usize,
}

impl PromptBudgetConfig {
    pub fn budget(&self) -> BudgetConfig {
        BudgetConfig::new(self.max_tokens, self.reserve_tokens, self.strategy)
    }

    /// Per-section budget: no reserve, plain prefix cuts
    pub fn section_budget(&self) -> BudgetConfig {
        BudgetConfig::new(self.section_max_tokens, 0, TruncationStrategy::Tail)
    }
}

impl Default for PromptBudgetConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_prompt_max_tokens(),
            reserve_tokens: default_prompt_reserve_tokens(),
            strategy: TruncationStrategy::default(),
            section_max_tokens: default_section_max_tokens(),
        }
    }
}

/// Cost model and per-scan monetary cap
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CostConfig {
    /// Hard cap for all inference calls of one scan, in EUR
    #[serde(default = "default_max_budget_eur")]
    pub max_budget_eur: f64,

    #[serde(default = "default_chars_per_token")]
    pub chars_per_token: usize,

    /// Output tokens assumed for every call
    #[serde(default = "default_output_token_estimate")]
    pub output_token_estimate: u32,

    #[serde(default = "default_input_rate")]
    pub input_rate_usd_per_million: f64,

    #[serde(default = "default_output_rate")]
    pub output_rate_usd_per_million: f64,

    #[serde(default = "default_usd_to_eur")]
    pub usd_to_eur: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            max_budget_eur: default_max_budget_eur(),
            chars_per_token: default_chars_per_token(),
            output_token_estimate: default_output_token_estimate(),
            input_rate_usd_per_million: default_input_rate(),
            output_rate_usd_per_million: default_output_rate(),
            usd_to_eur: default_usd_to_eur(),
        }
    }
}

/// Connection settings for the generative-AI service
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InferenceConfig {
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default filter directive when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default values
fn default_prompt_max_tokens() -> usize {
    12_000
}

fn default_prompt_reserve_tokens() -> usize {
    1_000
}

fn default_section_max_tokens() -> usize {
    3_000
}

fn default_max_budget_eur() -> f64 {
    0.10
}

fn default_chars_per_token() -> usize {
    DEFAULT_CHARS_PER_TOKEN
}

fn default_output_token_estimate() -> u32 {
    500
}

fn default_input_rate() -> f64 {
    0.075
}

fn default_output_rate() -> f64 {
    0.30
}

fn default_usd_to_eur() -> f64 {
    0.92
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_output_tokens() -> u32 {
    4096
}

fn default_log_level() -> String {
    "info".to_string()
}

impl PipelineConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from environment variables
    ///
    /// Supported environment variables:
    /// - SITESCAN_GEMINI_API_KEY (or GEMINI_API_KEY): inference API key
    /// - SITESCAN_MODEL: model identifier (default: gemini-1.5-flash)
    /// - SITESCAN_API_BASE_URL: inference API base URL
    /// - SITESCAN_MAX_BUDGET_EUR: per-scan spend cap (default: 0.10)
    /// - SITESCAN_PROMPT_MAX_TOKENS: prompt ceiling (default: 12000)
    /// - SITESCAN_PROMPT_RESERVE_TOKENS: tokens held back (default: 1000)
    /// - SITESCAN_TRUNCATION_STRATEGY: tail | head_tail | salient
    /// - SITESCAN_LOG_LEVEL: default log filter (default: info)
    /// - SITESCAN_LOG_JSON: JSON log output (default: false)
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        if let Ok(key) =
            std::env::var("SITESCAN_GEMINI_API_KEY").or_else(|_| std::env::var("GEMINI_API_KEY"))
        {
            if !key.trim().is_empty() {
                self.inference.api_key = Some(key);
            }
        }

        if let Ok(model) = std::env::var("SITESCAN_MODEL") {
            self.inference.model = model;
        }

        if let Ok(url) = std::env::var("SITESCAN_API_BASE_URL") {
            self.inference.base_url = url;
        }

        if let Ok(budget) = std::env::var("SITESCAN_MAX_BUDGET_EUR") {
            if let Ok(val) = budget.parse() {
                self.cost.max_budget_eur = val;
            }
        }

        if let Ok(max_tokens) = std::env::var("SITESCAN_PROMPT_MAX_TOKENS") {
            if let Ok(val) = max_tokens.parse() {
                self.prompt.max_tokens = val;
            }
        }

        if let Ok(reserve) = std::env::var("SITESCAN_PROMPT_RESERVE_TOKENS") {
            if let Ok(val) = reserve.parse() {
                self.prompt.reserve_tokens = val;
            }
        }

        if let Ok(strategy) = std::env::var("SITESCAN_TRUNCATION_STRATEGY") {
            match TruncationStrategy::parse(&strategy) {
                Some(parsed) => self.prompt.strategy = parsed,
                None => tracing::warn!("Unknown truncation strategy {:?}, keeping default", strategy),
            }
        }

        if let Ok(level) = std::env::var("SITESCAN_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(json) = std::env::var("SITESCAN_LOG_JSON") {
            self.logging.json = json.parse().unwrap_or(false);
        }
    }

    /// Load configuration with priority: env > file > defaults
    pub fn load(config_file: Option<PathBuf>) -> Result<Self> {
        let mut config = if let Some(path) = config_file {
            if path.exists() {
                tracing::info!("Loading configuration from file: {:?}", path);
                Self::from_file(&path)?
            } else {
                tracing::warn!("Config file not found: {:?}, using defaults", path);
                Self::default()
            }
        } else {
            Self::default()
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.prompt.budget().validate()?;

        if self.prompt.section_max_tokens == 0 {
            return Err(ConfigError::Invalid(
                "section_max_tokens must be greater than zero".to_string(),
            ));
        }

        if self.cost.chars_per_token == 0 {
            return Err(ConfigError::Invalid(
                "chars_per_token must be greater than zero".to_string(),
            ));
        }

        let budget = self.cost.max_budget_eur;
        if !budget.is_finite() || budget <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "max_budget_eur must be a positive number, got {}",
                budget
            )));
        }

        let rates = [
            ("input_rate_usd_per_million", self.cost.input_rate_usd_per_million),
            ("output_rate_usd_per_million", self.cost.output_rate_usd_per_million),
            ("usd_to_eur", self.cost.usd_to_eur),
        ];
        for (name, value) in rates {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.prompt.max_tokens, 12_000);
        assert_eq!(config.prompt.reserve_tokens, 1_000);
        assert_eq!(config.prompt.budget().available_budget(), 11_000);
        assert_eq!(config.cost.output_token_estimate, 500);
        assert_eq!(config.cost.chars_per_token, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_available_budget_saturates() {
        let budget = BudgetConfig::new(100, 200, TruncationStrategy::Tail);
        assert_eq!(budget.available_budget(), 0);
        assert!(budget.validate().is_err());
    }

    #[test]
    fn test_reserve_equal_to_max_rejected() {
        let mut config = PipelineConfig::default();
        config.prompt.reserve_tokens = config.prompt.max_tokens;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_negative_rate_rejected() {
        let mut config = PipelineConfig::default();
        config.cost.usd_to_eur = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_budget_rejected() {
        let mut config = PipelineConfig::default();
        config.cost.max_budget_eur = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(ref m)) if m.contains("max_budget_eur")));

        config.cost.max_budget_eur = -0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[prompt]
max_tokens = 8000
strategy = "head_tail"

[cost]
max_budget_eur = 0.25
"#
        )
        .unwrap();

        let config = PipelineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.prompt.max_tokens, 8000);
        assert_eq!(config.prompt.reserve_tokens, 1_000);
        assert_eq!(config.prompt.strategy, TruncationStrategy::HeadTail);
        assert_eq!(config.cost.max_budget_eur, 0.25);
        assert_eq!(config.cost.output_token_estimate, 500);
        assert_eq!(config.inference.model, "gemini-1.5-flash");
    }

    #[test]
    fn test_invalid_toml_reports_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[prompt\nmax_tokens = ").unwrap();
        assert!(matches!(
            PipelineConfig::from_file(file.path()),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!(TruncationStrategy::parse("tail"), Some(TruncationStrategy::Tail));
        assert_eq!(
            TruncationStrategy::parse("head-tail"),
            Some(TruncationStrategy::HeadTail)
        );
        assert_eq!(
            TruncationStrategy::parse("Salient"),
            Some(TruncationStrategy::Salient)
        );
        assert_eq!(TruncationStrategy::parse("semantic"), None);
    }
}
