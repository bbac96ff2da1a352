// Dashboard Models - the derived intelligence profile rendered by the panels

use super::intelligence::Strength;
use crate::utils::iso_millis;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of entries kept in `recent_insights`.
pub const MAX_RECENT_INSIGHTS: usize = 10;

/// `time_to_close` placeholder; there is no timeline estimation yet.
pub const TIME_TO_CLOSE_PENDING: &str = "Analyzing...";

/// One row of the competitor panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorEntry {
    pub company: String,
    pub strength: Strength,
    pub market_share: String,
}

/// Deal metrics from the latest analysis that reported a deal probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesMetrics {
    pub deal_probability: f64,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default = "default_time_to_close")]
    pub time_to_close: String,
}

fn default_time_to_close() -> String {
    TIME_TO_CLOSE_PENDING.to_string()
}

/// Whether an insight is something to lean into or something to watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightType {
    Opportunity,
    Risk,
}

impl InsightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightType::Opportunity => "opportunity",
            InsightType::Risk => "risk",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub insight: String,
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub insight_type: InsightType,
}

/// The aggregate profile built up over a conversation.
///
/// Invariants maintained by the reducer:
/// - `target_companies` has no duplicates and only shrinks on reset
/// - `recent_insights` is newest-first and never longer than [`MAX_RECENT_INSIGHTS`]
/// - `user_company` is never cleared by an automatic update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    #[serde(default)]
    pub user_company: Option<String>,
    #[serde(default)]
    pub target_companies: Vec<String>,
    #[serde(default)]
    pub competitor_analysis: Vec<CompetitorEntry>,
    #[serde(default)]
    pub sales_metrics: Option<SalesMetrics>,
    #[serde(default)]
    pub recent_insights: Vec<Insight>,
    /// Reserved; the engine never populates it
    #[serde(default)]
    pub industry_trends: Vec<String>,
}

impl DashboardState {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Most recently added analysis target.
    pub fn latest_target(&self) -> Option<&str> {
        self.target_companies.last().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_empty() {
        let state = DashboardState::default();
        assert!(state.is_empty());
        assert!(state.latest_target().is_none());
    }

    #[test]
    fn test_insight_type_serializes_as_type_field() {
        let insight = Insight {
            insight: "Champion on the buying committee".to_string(),
            timestamp: crate::utils::now_millis(),
            insight_type: InsightType::Opportunity,
        };
        let json = serde_json::to_value(&insight).unwrap();
        assert_eq!(json["type"], "opportunity");
    }

    #[test]
    fn test_sales_metrics_defaults_time_to_close() {
        let metrics: SalesMetrics = serde_json::from_str(r#"{"dealProbability": 40}"#).unwrap();
        assert_eq!(metrics.time_to_close, TIME_TO_CLOSE_PENDING);
        assert_eq!(metrics.confidence, 0.0);
    }

    #[test]
    fn test_latest_target() {
        let state = DashboardState {
            target_companies: vec!["Initech".to_string(), "Hooli".to_string()],
            ..Default::default()
        };
        assert_eq!(state.latest_target(), Some("Hooli"));
    }
}
