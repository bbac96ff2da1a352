// Data models matching the frontend TypeScript types

pub mod chat;
pub mod dashboard;
pub mod intelligence;

pub use chat::{ChatMessage, Sender};
pub use dashboard::{
    CompetitorEntry, DashboardState, Insight, InsightType, SalesMetrics, MAX_RECENT_INSIGHTS,
    TIME_TO_CLOSE_PENDING,
};
pub use intelligence::{Competitor, IntelligencePayload, Strength, UNKNOWN_MARKET_SHARE};
