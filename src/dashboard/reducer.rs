// Dashboard reducer - folds one analysis into the dashboard state

use crate::models::{
    CompetitorEntry, DashboardState, Insight, InsightType, IntelligencePayload, SalesMetrics,
    MAX_RECENT_INSIGHTS, TIME_TO_CLOSE_PENDING,
};
use crate::utils::now_millis;
use chrono::{DateTime, SubsecRound, Utc};

/// Apply `payload` for `target` to `state`, stamping new insights with the
/// current time.
pub fn reduce(state: &DashboardState, payload: &IntelligencePayload, target: &str) -> DashboardState {
    reduce_at(state, payload, target, now_millis())
}

/// Apply `payload` for `target` to `state` with an explicit clock.
///
/// - `target` is appended to `target_companies` unless already present
/// - non-empty competitors replace `competitor_analysis` wholesale
/// - a finite deal probability replaces `sales_metrics` wholesale
/// - talking points (opportunities) then pain points (risks) are prepended to
///   `recent_insights`, which is cut back to [`MAX_RECENT_INSIGHTS`]
///
/// The input state is never modified.
pub fn reduce_at(
    state: &DashboardState,
    payload: &IntelligencePayload,
    target: &str,
    now: DateTime<Utc>,
) -> DashboardState {
    let mut next = state.clone();

    if !target.trim().is_empty() && !next.target_companies.iter().any(|t| t == target) {
        next.target_companies.push(target.to_string());
    }

    if !payload.competitors.is_empty() {
        next.competitor_analysis = payload
            .competitors
            .iter()
            .map(|c| CompetitorEntry {
                company: c.name.clone(),
                strength: c.strength,
                market_share: c.market_share.clone(),
            })
            .collect();
    }

    if let Some(deal_probability) = payload.deal_probability.filter(|p| p.is_finite()) {
        next.sales_metrics = Some(SalesMetrics {
            deal_probability,
            confidence: payload
                .confidence_score
                .filter(|c| c.is_finite())
                .unwrap_or(0.0),
            time_to_close: TIME_TO_CLOSE_PENDING.to_string(),
        });
    }

    let timestamp = now.trunc_subsecs(3);
    let opportunities = payload
        .talking_points
        .iter()
        .map(|text| (text, InsightType::Opportunity));
    let risks = payload.pain_points.iter().map(|text| (text, InsightType::Risk));

    let mut insights: Vec<Insight> = opportunities
        .chain(risks)
        .map(|(text, insight_type)| Insight {
            insight: text.clone(),
            timestamp,
            insight_type,
        })
        .collect();

    if !insights.is_empty() {
        insights.extend(next.recent_insights.iter().cloned());
        insights.truncate(MAX_RECENT_INSIGHTS);
        next.recent_insights = insights;
    }

    next
}
