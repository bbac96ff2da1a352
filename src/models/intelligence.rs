// Intelligence Models - canonical shape of one analysis of a target company

use serde::{Deserialize, Serialize};

/// Placeholder market share when the backend does not report one.
pub const UNKNOWN_MARKET_SHARE: &str = "Unknown";

/// Relative competitive strength of a competitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    High,
    #[default]
    Medium,
    Low,
}

impl Strength {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strength::High => "high",
            Strength::Medium => "medium",
            Strength::Low => "low",
        }
    }
}

impl std::fmt::Display for Strength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Strength {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" | "strong" => Ok(Strength::High),
            "medium" | "moderate" => Ok(Strength::Medium),
            "low" | "weak" => Ok(Strength::Low),
            _ => Err(format!(
                "Invalid strength: '{}'. Expected 'high', 'medium', or 'low'",
                s
            )),
        }
    }
}

/// A competitor of the analysed company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competitor {
    pub name: String,
    #[serde(default)]
    pub strength: Strength,
    #[serde(default = "default_market_share")]
    pub market_share: String,
}

fn default_market_share() -> String {
    UNKNOWN_MARKET_SHARE.to_string()
}

/// Normalized backend response for one target company.
///
/// Every field is optional in practice: an empty list or `None` means the
/// backend did not report it, and the reducer leaves the matching dashboard
/// field alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct IntelligencePayload {
    #[serde(default)]
    pub competitors: Vec<Competitor>,
    /// Likelihood of closing, 0-100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deal_probability: Option<f64>,
    /// Backend confidence in its own analysis, 0-100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub talking_points: Vec<String>,
    #[serde(default)]
    pub pain_points: Vec<String>,
}

impl IntelligencePayload {
    /// True when the payload carries nothing the reducer would apply.
    pub fn is_empty(&self) -> bool {
        self.competitors.is_empty()
            && self.deal_probability.is_none()
            && self.confidence_score.is_none()
            && self.talking_points.is_empty()
            && self.pain_points.is_empty()
    }
}
