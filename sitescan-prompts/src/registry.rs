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

//! Builder registry
//!
//! Maps a variant key to a zero-argument constructor so callers can pick a
//! builder at runtime. Registration happens explicitly at startup; tests build
//! their own registry.

use crate::builders::{
    BudgetedComposer, EnterprisePromptBuilder, InsightPromptBuilder, NarrativePromptBuilder,
    PromptBuilder,
};
use crate::error::PromptError;
use parking_lot::RwLock;
use sitescan_core::{PromptBudgetConfig, ReportVariant};
use std::sync::Arc;
use tracing::debug;

pub type BuilderFactory = Arc<dyn Fn() -> Box<dyn PromptBuilder> + Send + Sync>;

/// Registration order is preserved; re-registering a key keeps its slot
#[derive(Default)]
pub struct BuilderRegistry {
    factories: RwLock<Vec<(String, BuilderFactory)>>,
}

impl BuilderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the three report builders on default budgets
    pub fn with_default_builders() -> Self {
        let registry = Self::new();
        registry.register(ReportVariant::Insights.as_str(), || {
            Box::new(InsightPromptBuilder::new())
        });
        registry.register(ReportVariant::Narrative.as_str(), || {
            Box::new(NarrativePromptBuilder::new())
        });
        registry.register(ReportVariant::Enterprise.as_str(), || {
            Box::new(EnterprisePromptBuilder::new())
        });
        registry
    }

    /// Registry with the three report builders sharing one budget configuration
    pub fn with_budgets(config: &PromptBudgetConfig) -> Result<Self, PromptError> {
        let composer = BudgetedComposer::from_config(config)?;
        let registry = Self::new();

        let c = composer.clone();
        registry.register(ReportVariant::Insights.as_str(), move || {
            Box::new(InsightPromptBuilder::with_composer(c.clone()))
        });
        let c = composer.clone();
        registry.register(ReportVariant::Narrative.as_str(), move || {
            Box::new(NarrativePromptBuilder::with_composer(c.clone()))
        });
        registry.register(ReportVariant::Enterprise.as_str(), move || {
            Box::new(EnterprisePromptBuilder::with_composer(composer.clone()))
        });

        Ok(registry)
    }

    /// Last registration for a key wins
    pub fn register<F>(&self, key: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn PromptBuilder> + Send + Sync + 'static,
    {
        let key = key.into();
        let factory: BuilderFactory = Arc::new(factory);
        let mut factories = self.factories.write();

        match factories.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => {
                debug!(key = %key, "Replacing prompt builder registration");
                entry.1 = factory;
            }
            None => {
                debug!(key = %key, "Registered prompt builder");
                factories.push((key, factory));
            }
        }
    }

    pub fn create(&self, key: &str) -> Result<Box<dyn PromptBuilder>, PromptError> {
        let factory = {
            let factories = self.factories.read();
            factories
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, f)| Arc::clone(f))
                .ok_or_else(|| PromptError::UnknownVariant {
                    key: key.to_string(),
                    registered: factories.iter().map(|(k, _)| k.clone()).collect(),
                })?
        };
        Ok(factory())
    }

    pub fn create_variant(&self, variant: ReportVariant) -> Result<Box<dyn PromptBuilder>, PromptError> {
        self.create(variant.as_str())
    }

    /// Keys in registration order
    pub fn keys(&self) -> Vec<String> {
        self.factories.read().iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.factories.read().iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.factories.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.read().is_empty()
    }

    pub fn clear(&self) {
        self.factories.write().clear();
    }
}

impl std::fmt::Debug for BuilderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuilderRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_builders_registered_in_order() {
        let registry = BuilderRegistry::with_default_builders();
        assert_eq!(registry.keys(), vec!["insights", "narrative", "enterprise"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_create_returns_matching_variant() {
        let registry = BuilderRegistry::with_default_builders();
        for variant in ReportVariant::ALL {
            let builder = registry.create_variant(variant).unwrap();
            assert_eq!(builder.variant(), variant);
        }
    }

    #[test]
    fn test_reregistration_keeps_slot_and_replaces_factory() {
        let registry = BuilderRegistry::with_default_builders();
        registry.register("insights", || Box::new(NarrativePromptBuilder::new()));

        assert_eq!(registry.keys(), vec!["insights", "narrative", "enterprise"]);
        let builder = registry.create("insights").unwrap();
        assert_eq!(builder.variant(), ReportVariant::Narrative);
    }

    #[test]
    fn test_unknown_key_lists_registered_keys() {
        let registry = BuilderRegistry::new();
        registry.register("narrative", || Box::new(NarrativePromptBuilder::new()));
        registry.register("insights", || Box::new(InsightPromptBuilder::new()));

        match registry.create("unknown") {
            Err(PromptError::UnknownVariant { key, registered }) => {
                assert_eq!(key, "unknown");
                assert_eq!(registered, vec!["narrative", "insights"]);
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("expected UnknownVariant"),
        }
    }

    #[test]
    fn test_clear_empties_registry() {
        let registry = BuilderRegistry::with_default_builders();
        registry.clear();
        assert!(registry.is_empty());
        assert!(!registry.contains("insights"));

        let err = registry.create("insights").err().unwrap();
        assert!(matches!(
            &err,
            PromptError::UnknownVariant { registered, .. } if registered.is_empty()
        ));
        assert_eq!(
            err.to_string(),
            "Unknown prompt builder variant 'insights'; registered variants: []"
        );
    }

    #[test]
    fn test_with_budgets_rejects_invalid_config() {
        let config = PromptBudgetConfig {
            max_tokens: 100,
            reserve_tokens: 200,
            ..Default::default()
        };
        assert!(BuilderRegistry::with_budgets(&config).is_err());
    }
}
