// Intelligence normalizer - turns loosely-shaped backend JSON into an IntelligencePayload
//
// The backend is a language model behind an HTTP endpoint, so field names,
// number formats and nesting drift between responses. Everything here is
// lenient: missing or malformed parts degrade to "not reported" and the rest
// of the payload is still used.

use crate::models::{Competitor, IntelligencePayload, Strength, UNKNOWN_MARKET_SHARE};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static JSON_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```(?:json|JSON)?\s*\n([\s\S]*?)```").expect("json block pattern is valid")
});

/// Keys that mark an object as an analysis rather than an envelope around one.
const PAYLOAD_KEYS: &[&str] = &[
    "competitiveLandscape",
    "competitive_landscape",
    "dealProbability",
    "deal_probability",
    "confidenceScore",
    "confidence_score",
    "talkingPoints",
    "talking_points",
    "painPoints",
    "pain_points",
];

/// Envelope keys some backends wrap the analysis in.
const ENVELOPE_KEYS: &[&str] = &["intelligence", "analysis", "data", "result"];

/// Extract fenced JSON code blocks from markdown content.
pub fn extract_json_blocks(content: &str) -> Vec<String> {
    JSON_BLOCK_RE
        .captures_iter(content)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().trim().to_string()))
        .filter(|block| !block.is_empty())
        .collect()
}

/// Normalize a backend response given as text.
///
/// Accepts a bare JSON document or prose with a fenced JSON block. Anything
/// else yields the empty payload.
pub fn normalize_text(raw: &str) -> IntelligencePayload {
    if let Ok(value) = serde_json::from_str::<Value>(raw.trim()) {
        return normalize(&value);
    }

    for block in extract_json_blocks(raw) {
        if let Ok(value) = serde_json::from_str::<Value>(&block) {
            return normalize(&value);
        }
    }

    log::debug!("Backend response contained no parseable JSON ({} bytes)", raw.len());
    IntelligencePayload::default()
}

/// Normalize a parsed backend response. Never fails.
///
/// A JSON string is treated as a text response and searched for JSON.
pub fn normalize(raw: &Value) -> IntelligencePayload {
    if let Value::String(text) = raw {
        return normalize_text(text);
    }
    let raw = unwrap_envelope(raw);

    IntelligencePayload {
        competitors: competitors(raw),
        deal_probability: field(raw, &["dealProbability", "deal_probability"]).and_then(score),
        confidence_score: field(raw, &["confidenceScore", "confidence_score"]).and_then(score),
        talking_points: points(field(raw, &["talkingPoints", "talking_points"])),
        pain_points: points(field(raw, &["painPoints", "pain_points"])),
    }
}

fn unwrap_envelope(raw: &Value) -> &Value {
    let has_payload_keys = |v: &Value| PAYLOAD_KEYS.iter().any(|key| v.get(*key).is_some());
    if has_payload_keys(raw) {
        return raw;
    }

    ENVELOPE_KEYS
        .iter()
        .filter_map(|key| raw.get(*key))
        .find(|inner| inner.is_object() && has_payload_keys(inner))
        .unwrap_or(raw)
}

/// First present, non-null field among `names`.
fn field<'a>(value: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| value.get(*name))
        .find(|v| !v.is_null())
}

fn competitors(raw: &Value) -> Vec<Competitor> {
    let Some(list) = field(raw, &["competitiveLandscape", "competitive_landscape"])
        .and_then(|landscape| landscape.get("competitors"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    list.iter().filter_map(competitor).collect()
}

fn competitor(entry: &Value) -> Option<Competitor> {
    let name = entry.get("name")?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }

    let strength = field(entry, &["strength"])
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Strength>().ok())
        .unwrap_or_default();

    let market_share = match field(entry, &["marketShare", "market_share"]) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => UNKNOWN_MARKET_SHARE.to_string(),
    };

    Some(Competitor {
        name: name.to_string(),
        strength,
        market_share,
    })
}

/// A 0-100 score from a number or numeric string ("72", "72%").
fn score(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok()?,
        _ => return None,
    };

    n.is_finite().then(|| n.clamp(0.0, 100.0))
}

fn points(value: Option<&Value>) -> Vec<String> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.as_str()),
            Value::Object(_) => item.get("text").and_then(Value::as_str),
            _ => None,
        })
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
