// Entity extraction - pull company names and sales context out of chat turns
//
// Heuristic and pattern based. Callers go through the `EntityExtractor` trait
// so a different detection strategy can be dropped in without touching the
// reducer or persistence code.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Phrases that mark an utterance as the user talking about their own employer.
pub const SELF_REFERENTIAL_PHRASES: &[&str] = &[
    "our company",
    "we are",
    "my company",
    "i work for",
    "i'm from",
    "i represent",
];

/// A capitalized phrase ("Initech", "Acme Corp", "Procter & Gamble") or a
/// domain-like token ("acme.io").
const COMPANY_NAME: &str = r"(?:\p{Lu}[\p{L}\p{N}&'\-]*(?:\.[\p{L}\p{N}]+)*(?:\s+(?:&\s+)?\p{Lu}[\p{L}\p{N}&'\-]*(?:\.[\p{L}\p{N}]+)*)*|[\p{L}\p{N}\-]+(?:\.[\p{L}\p{N}\-]+)*\.(?:com|io|ai|co|net|org|dev|app))";

static SELF_COMPANY_RE: LazyLock<Regex> = LazyLock::new(|| {
    let phrases = SELF_REFERENTIAL_PHRASES
        .iter()
        .map(|phrase| regex::escape(phrase).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(
        r"(?i:{})(?:\s*,)?(?:\s+(?i:is|called|named|at|with))?\s+(?P<name>{})",
        phrases, COMPANY_NAME
    ))
    .expect("self-company pattern is valid")
});

static TARGET_CUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?i:on|about|for|into|analy[sz]e|research|against|targeting|to|pitching|prospecting|vs\.?|versus)\s+(?:(?i:the)\s+)?(?P<name>{})",
        COMPANY_NAME
    ))
    .expect("target cue pattern is valid")
});

static DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[\p{L}\p{N}\-]+(?:\.[\p{L}\p{N}\-]+)*\.(?:com|io|ai|co|net|org|dev|app)\b")
        .expect("domain pattern is valid")
});

static CAPITALIZED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\p{Lu}[\p{L}\p{N}&'\-]*(?:\.[\p{L}\p{N}]+)*(?:\s+(?:&\s+)?\p{Lu}[\p{L}\p{N}&'\-]*(?:\.[\p{L}\p{N}]+)*)*")
        .expect("capitalized phrase pattern is valid")
});

static SALES_CONTEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?i:selling|sell|pitching|pitch|offering|offer|proposing|propose|renewal\s+of)\s+(?P<ctx>[^.!?\n]+)")
        .expect("sales context pattern is valid")
});

/// Capitalized words that start sentences or address the assistant rather
/// than name a company. Only stripped from the front of a sentence.
const STOPWORDS: &[&str] = &[
    "I", "I'm", "I'd", "I've", "I'll", "We", "We're", "We've", "Our", "My", "Me", "You", "Your",
    "The", "A", "An", "Hi", "Hello", "Hey", "Thanks", "Thank", "Please", "Tell", "Show", "Give",
    "What", "What's", "Who", "How", "Why", "When", "Where", "Which", "Can", "Could", "Would",
    "Should", "Is", "Are", "Do", "Does", "Let", "Let's", "Here", "Here's", "This", "That", "It",
    "It's", "And", "But", "So", "Also", "Any", "Find", "Get", "Help", "Analyze", "Analyse",
    "Research", "Compare", "Looking", "OK", "Okay", "Yes", "No", "Great", "Sure", "Now", "Then",
];

/// Leading words dropped from a name wherever it appears.
const ARTICLES: &[&str] = &["The", "A", "An"];

/// Capitalized words that are never a company on their own.
const CALENDAR_WORDS: &[&str] = &[
    "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday", "Today",
    "Tomorrow", "Yesterday", "January", "February", "March", "April", "May", "June", "July",
    "August", "September", "October", "November", "December",
];

/// Best-effort structured reading of one chat utterance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedEntities {
    /// Company the user wants analysed
    pub company: Option<String>,
    /// What is being sold or proposed, if mentioned
    pub sales_context: Option<String>,
    /// Whether the user talked about their own employer
    pub is_self_referential: bool,
}

/// Strategy for reading entities out of chat text.
pub trait EntityExtractor: Send + Sync {
    /// Extract the analysis target, sales context and self-reference flag.
    fn extract(&self, utterance: &str) -> ExtractedEntities;

    /// Extract the user's own company from a self-referential utterance.
    fn extract_user_company(&self, utterance: &str) -> Option<String>;
}

/// The pattern-based extractor used by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicExtractor;

impl EntityExtractor for HeuristicExtractor {
    fn extract(&self, utterance: &str) -> ExtractedEntities {
        extract(utterance)
    }

    fn extract_user_company(&self, utterance: &str) -> Option<String> {
        extract_user_company(utterance)
    }
}

/// Fold typographic apostrophes so "I’m from" matches like "I'm from".
fn normalize(utterance: &str) -> String {
    utterance.replace(['\u{2019}', '\u{2018}'], "'")
}

/// True iff the utterance contains any of [`SELF_REFERENTIAL_PHRASES`].
pub fn is_self_referential(utterance: &str) -> bool {
    let lower = normalize(utterance).to_lowercase();
    SELF_REFERENTIAL_PHRASES
        .iter()
        .any(|phrase| lower.contains(phrase))
}

/// Extract the company named right after a self-referential phrase.
pub fn extract_user_company(utterance: &str) -> Option<String> {
    let text = normalize(utterance);
    SELF_COMPANY_RE
        .captures_iter(&text)
        .filter_map(|cap| cap.name("name"))
        .find_map(|m| clean_candidate(m.as_str(), false))
}

/// Extract target company, sales context and the self-reference flag.
pub fn extract(utterance: &str) -> ExtractedEntities {
    let text = normalize(utterance);
    let is_self_referential = is_self_referential(&text);
    let user_company = if is_self_referential {
        extract_user_company(&text)
    } else {
        None
    };

    ExtractedEntities {
        company: extract_target(&text, user_company.as_deref()),
        sales_context: extract_sales_context(&text),
        is_self_referential,
    }
}

fn extract_target(text: &str, user_company: Option<&str>) -> Option<String> {
    let not_self = |name: &String| user_company.map_or(true, |own| !name.eq_ignore_ascii_case(own));

    // 1. A name introduced by a cue word ("intel on X", "about X")
    let cued = TARGET_CUE_RE
        .captures_iter(text)
        .filter_map(|cap| cap.name("name"))
        .filter_map(|m| clean_candidate(m.as_str(), false))
        .find(|name| not_self(name));
    if cued.is_some() {
        return cued;
    }

    // 2. A domain-like token
    let domain = DOMAIN_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .find(|name| not_self(name));
    if domain.is_some() {
        return domain;
    }

    // 3. Any capitalized phrase that isn't a sentence opener
    CAPITALIZED_RE
        .find_iter(text)
        .filter_map(|m| clean_candidate(m.as_str(), starts_sentence(text, m.start())))
        .find(|name| not_self(name))
}

/// Whether byte offset `at` is the first word of `text` or of a sentence in it.
fn starts_sentence(text: &str, at: usize) -> bool {
    matches!(
        text[..at].trim_end().chars().last(),
        None | Some('.' | '!' | '?' | ':' | ';')
    )
}

fn extract_sales_context(text: &str) -> Option<String> {
    SALES_CONTEXT_RE
        .captures(text)
        .and_then(|cap| cap.name("ctx"))
        .map(|m| m.as_str().trim().trim_end_matches([',', ';', ':']).trim().to_string())
        .filter(|ctx| !ctx.is_empty())
}

/// Drop leading articles (and leading stopwords when the match opens a
/// sentence) plus trailing punctuation/possessives from a raw match.
fn clean_candidate(raw: &str, sentence_start: bool) -> Option<String> {
    let words: Vec<&str> = raw.split_whitespace().collect();
    let leading = if sentence_start { STOPWORDS } else { ARTICLES };
    let start = words.iter().position(|word| !leading.contains(word))?;

    let joined = words[start..].join(" ");
    let mut name = joined.trim_end_matches(['.', ',', ';', ':', '!', '?', '\'', '-', '&']);
    if let Some(stripped) = name.strip_suffix("'s") {
        name = stripped;
    }
    let name = name.trim();

    if name.is_empty() || STOPWORDS.contains(&name) || CALENDAR_WORDS.contains(&name) {
        None
    } else {
        Some(name.to_string())
    }
}
