//! Behavioural tests for the dashboard engine

use super::*;
use crate::file_storage::{DashboardRepository, MemoryStore};
use crate::models::{
    ChatMessage, Competitor, DashboardState, IntelligencePayload, Strength, MAX_RECENT_INSIGHTS,
};
use crate::parsers::HeuristicExtractor;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

fn points(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{} {}", prefix, i)).collect()
}

fn rich_payload(seed: usize) -> IntelligencePayload {
    IntelligencePayload {
        competitors: vec![Competitor {
            name: format!("Rival {}", seed),
            strength: Strength::High,
            market_share: format!("{}%", seed * 3),
        }],
        deal_probability: Some((seed * 7 % 101) as f64),
        confidence_score: if seed % 2 == 0 { Some(60.0) } else { None },
        talking_points: points("opportunity", seed % 4),
        pain_points: points("risk", seed % 3),
    }
}

#[test]
fn test_target_accumulation_is_idempotent() {
    let sequences: &[&[&str]] = &[
        &["Initech"],
        &["Initech", "Initech"],
        &["Initech", "Hooli", "Initech", "Globex", "Hooli"],
        &["initech", "Initech"],
        &["Société Générale", "Ørsted", "Société Générale"],
    ];

    for sequence in sequences {
        let mut state = DashboardState::default();
        for (i, target) in sequence.iter().enumerate() {
            state = reduce_at(&state, &IntelligencePayload::default(), target, at(i as i64));
        }

        let mut expected: Vec<String> = Vec::new();
        for target in sequence.iter() {
            if !expected.iter().any(|t| t == target) {
                expected.push(target.to_string());
            }
        }
        assert_eq!(state.target_companies, expected, "sequence {:?}", sequence);

        let again = reduce_at(&state, &IntelligencePayload::default(), sequence[0], at(99));
        assert_eq!(again.target_companies, state.target_companies);
    }
}

#[test]
fn test_targets_never_shrink() {
    let mut state = DashboardState::default();
    let mut previous_len = 0;
    for seed in 0..20 {
        let target = format!("Company {}", seed % 6);
        state = reduce_at(&state, &rich_payload(seed), &target, at(seed as i64));
        assert!(state.target_companies.len() >= previous_len);
        previous_len = state.target_companies.len();
    }
    assert_eq!(state.target_companies.len(), 6);
}

#[test]
fn test_recent_insights_are_capped_newest_first() {
    for per_turn in [0usize, 1, 3, 9, 10, 11, 25] {
        let mut state = DashboardState::default();
        for turn in 0..4 {
            let payload = IntelligencePayload {
                talking_points: points(&format!("turn {}", turn), per_turn),
                ..Default::default()
            };
            state = reduce_at(&state, &payload, "Initech", at(turn));
            assert!(state.recent_insights.len() <= MAX_RECENT_INSIGHTS);
        }

        let expected_len = (per_turn * 4).min(MAX_RECENT_INSIGHTS);
        assert_eq!(state.recent_insights.len(), expected_len, "{} per turn", per_turn);

        if per_turn > 0 {
            assert_eq!(state.recent_insights[0].insight, "turn 3 0");
            assert!(state
                .recent_insights
                .windows(2)
                .all(|pair| pair[0].timestamp >= pair[1].timestamp));
        }
    }
}

#[test]
fn test_user_company_set_once_wins() {
    let store = DashboardStore::new(DashboardRepository::new(Arc::new(MemoryStore::new())));

    for name in ["Globex", "Hooli", "Initech"] {
        store.resolve_user_company(name);
        store.apply_intelligence(&rich_payload(3), "Initech");
    }

    assert_eq!(store.state().user_company.as_deref(), Some("Globex"));

    store.reset();
    store.resolve_user_company("Hooli");
    assert_eq!(store.state().user_company.as_deref(), Some("Hooli"));
}

#[test]
fn test_reducer_never_clears_user_company() {
    let mut state = DashboardState {
        user_company: Some("Globex".to_string()),
        ..Default::default()
    };
    for seed in 0..10 {
        state = reduce_at(&state, &rich_payload(seed), "Initech", at(seed as i64));
        assert_eq!(state.user_company.as_deref(), Some("Globex"));
    }
}

#[test]
fn test_snapshot_round_trip() {
    let repo = DashboardRepository::new(Arc::new(MemoryStore::new()));

    let mut state = DashboardState {
        user_company: Some("Globex".to_string()),
        ..Default::default()
    };
    for seed in 0..12 {
        let now = at(seed as i64) + Duration::milliseconds(seed as i64 * 37);
        state = reduce_at(&state, &rich_payload(seed), &format!("Target {}", seed), now);

        assert!(repo.save(&state));
        assert_eq!(repo.load().as_ref(), Some(&state), "after seed {}", seed);
    }
}

#[test]
fn test_single_message_reconstruction_matches_reducer() {
    for seed in 0..8 {
        let payload = rich_payload(seed);
        let msg = ChatMessage::assistant("Here's the latest intelligence on Initech", Some(payload.clone()));

        for mode in [ReconstructionMode::FullReplay, ReconstructionMode::LatestOnly] {
            let rebuilt = reconstruct(std::slice::from_ref(&msg), mode);
            let direct = reduce_at(&DashboardState::default(), &payload, "Initech", msg.timestamp);
            assert_eq!(rebuilt, direct, "seed {} mode {}", seed, mode);
        }
    }
}

#[test]
fn test_full_replay_is_left_fold_of_transcript() {
    let targets = ["Initech", "Hooli", "Initech", "Globex"];
    let mut transcript = vec![ChatMessage::user("We are Acme Corp")];
    let mut expected = DashboardState {
        user_company: Some("Acme Corp".to_string()),
        ..Default::default()
    };

    for (seed, target) in targets.iter().enumerate() {
        let mut question = ChatMessage::user(format!("Tell me about {}", target));
        question.timestamp = at(seed as i64 * 10);
        let mut answer = ChatMessage::assistant(
            format!("Here's the latest intelligence on {}", target),
            Some(rich_payload(seed + 1)),
        );
        answer.timestamp = at(seed as i64 * 10 + 5);

        expected = reduce_at(&expected, &rich_payload(seed + 1), target, answer.timestamp);
        transcript.push(question);
        transcript.push(answer);
    }

    let rebuilt = reconstruct_with(&transcript, ReconstructionMode::FullReplay, &HeuristicExtractor);
    assert_eq!(rebuilt, expected);
    assert_eq!(rebuilt.target_companies, vec!["Initech", "Hooli", "Globex"]);
}

#[test]
fn test_reducer_is_total() {
    let odd_payloads = vec![
        IntelligencePayload::default(),
        IntelligencePayload {
            competitors: vec![Competitor {
                name: String::new(),
                strength: Strength::Low,
                market_share: String::new(),
            }],
            deal_probability: Some(f64::NAN),
            confidence_score: Some(f64::INFINITY),
            talking_points: vec![String::new(); 50],
            pain_points: vec!["🚀".repeat(1000)],
        },
        IntelligencePayload {
            deal_probability: Some(-1.0),
            ..Default::default()
        },
    ];

    let mut state = DashboardState::default();
    for payload in &odd_payloads {
        for target in ["", "   ", "Initech", "Ünïcödé Çørp"] {
            state = reduce_at(&state, payload, target, at(0));
            assert!(state.recent_insights.len() <= MAX_RECENT_INSIGHTS);
        }
    }
    assert_eq!(state.target_companies, vec!["Initech", "Ünïcödé Çørp"]);
}
