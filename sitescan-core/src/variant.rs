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

//! Report variants produced by the AI pipeline

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three report kinds a scan can request from the inference service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportVariant {
    /// Lightweight insight extraction (opportunities, enhancements, priorities)
    Insights,
    /// Personal narrative report
    Narrative,
    /// Enterprise strategic narrative
    Enterprise,
}

impl ReportVariant {
    pub const ALL: [ReportVariant; 3] = [
        ReportVariant::Insights,
        ReportVariant::Narrative,
        ReportVariant::Enterprise,
    ];

    /// Registry key for this variant
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportVariant::Insights => "insights",
            ReportVariant::Narrative => "narrative",
            ReportVariant::Enterprise => "enterprise",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "insights" => Some(ReportVariant::Insights),
            "narrative" => Some(ReportVariant::Narrative),
            "enterprise" => Some(ReportVariant::Enterprise),
            _ => None,
        }
    }

    /// Human-readable label used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            ReportVariant::Insights => "Insight",
            ReportVariant::Narrative => "Narrative",
            ReportVariant::Enterprise => "Enterprise",
        }
    }
}

impl fmt::Display for ReportVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_keys_roundtrip() {
        for variant in ReportVariant::ALL {
            assert_eq!(ReportVariant::parse(variant.as_str()), Some(variant));
        }
        assert_eq!(ReportVariant::parse(" Narrative "), Some(ReportVariant::Narrative));
        assert_eq!(ReportVariant::parse("pdf"), None);
    }

    #[test]
    fn test_variant_serde_lowercase() {
        let json = serde_json::to_string(&ReportVariant::Enterprise).unwrap();
        assert_eq!(json, "\"enterprise\"");
    }
}
