//! Turns raw model text into a `CandidateAnalysis`.
//!
//! The model is an untrusted oracle: replies drift between clean JSON,
//! fenced JSON, prose with a number buried in it, and garbage. This parser is
//! total: any input string produces an analysis with scores in [0, 100] and
//! a recommendation from the closed label set. Missing fields degrade to
//! defaults (0 scores, empty lists, EM_ANALISE); nothing here ever errors.

use serde::Deserialize;
use serde_json::Value;

use crate::models::analysis::{CandidateAnalysis, Recommendation};

/// Free-text fallback keeps at most this many chars of the reply as analysis.
const FALLBACK_ANALYSIS_CHARS: usize = 500;

/// Loose mirror of the schema the prompt asks for. Every field is optional
/// and untyped so a partially-conforming reply still lands here.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAnalysis {
    compatibility_score: Value,
    cultural_fit_score: Value,
    professional_fit_score: Value,
    analysis: Value,
    red_flags: Value,
    strengths: Value,
    recommendation: Value,
    suggested_questions: Value,
}

/// Parses one model reply. Never fails.
pub fn parse_analysis(text: &str) -> CandidateAnalysis {
    let stripped = strip_json_fences(text);

    match serde_json::from_str::<RawAnalysis>(stripped) {
        Ok(raw) => from_raw(raw),
        Err(_) => from_free_text(text),
    }
}

fn from_raw(raw: RawAnalysis) -> CandidateAnalysis {
    CandidateAnalysis {
        compatibility_score: coerce_score(&raw.compatibility_score),
        cultural_fit_score: coerce_score(&raw.cultural_fit_score),
        professional_fit_score: coerce_score(&raw.professional_fit_score),
        analysis: coerce_text(&raw.analysis),
        red_flags: coerce_string_list(&raw.red_flags),
        strengths: coerce_string_list(&raw.strengths),
        suggested_questions: coerce_string_list(&raw.suggested_questions),
        recommendation: coerce_recommendation(&raw.recommendation),
    }
}

/// Fallback for replies that are not JSON at all: salvage the first plausible
/// score from the prose and keep a truncated copy of the text as the analysis.
fn from_free_text(text: &str) -> CandidateAnalysis {
    CandidateAnalysis {
        compatibility_score: extract_score(text).unwrap_or(0.0),
        cultural_fit_score: 0.0,
        professional_fit_score: 0.0,
        analysis: text.chars().take(FALLBACK_ANALYSIS_CHARS).collect(),
        red_flags: vec![],
        strengths: vec![],
        suggested_questions: vec![],
        recommendation: match_recommendation(text),
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Coerces a JSON value into a score in [0, 100]. Numbers are clamped;
/// strings go through the same salvage path as free text ("85%", "about 85").
fn coerce_score(value: &Value) -> f64 {
    match value {
        Value::Number(n) => clamp_score(n.as_f64().unwrap_or(0.0)),
        Value::String(s) => extract_score(s).unwrap_or(0.0),
        _ => 0.0,
    }
}

fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}

fn coerce_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        _ => String::new(),
    }
}

/// Accepts an array of strings, or a lone string, as a list. Non-string
/// array elements are dropped rather than stringified.
fn coerce_string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::to_string)
            .collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s.clone()],
        _ => vec![],
    }
}

fn coerce_recommendation(value: &Value) -> Recommendation {
    match value {
        Value::String(s) => match_recommendation(s),
        _ => Recommendation::EmAnalise,
    }
}

/// Maps a free-form label onto the closed set. Negative labels are checked
/// first so "NAO_RECOMENDADO" never matches on its "RECOMENDADO" suffix.
/// Legacy labels from older deployments (APROVADO/REPROVADO) map across.
fn match_recommendation(label: &str) -> Recommendation {
    let normalized = label.to_uppercase().replace('Ã', "A").replace('_', " ");

    if normalized.contains("NAO RECOMEND")
        || normalized.contains("NOT RECOMMEND")
        || normalized.contains("REPROV")
    {
        Recommendation::NaoRecomendado
    } else if normalized.contains("RECOMEND")
        || normalized.contains("RECOMMEND")
        || normalized.contains("APROV")
    {
        Recommendation::Recomendado
    } else {
        Recommendation::EmAnalise
    }
}

/// Finds the most plausible score in prose. A number glued to a percent sign
/// wins; otherwise the first number in [0, 100]. Bare numbers above 100
/// (years, salaries) are ignored, percent values are clamped.
fn extract_score(text: &str) -> Option<f64> {
    let mut first_in_range: Option<f64> = None;

    for (token, has_percent) in number_tokens(text) {
        let Ok(value) = token.parse::<f64>() else {
            continue;
        };
        if has_percent {
            return Some(clamp_score(value));
        }
        if first_in_range.is_none() && (0.0..=100.0).contains(&value) {
            first_in_range = Some(value);
        }
    }

    first_in_range
}

/// Yields each numeric token in the text along with whether a '%' follows it.
fn number_tokens(text: &str) -> Vec<(String, bool)> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if !c.is_ascii_digit() {
            continue;
        }
        let mut token = String::new();
        token.push(c);
        let mut seen_dot = false;
        while let Some(&next) = chars.peek() {
            if next.is_ascii_digit() || (next == '.' && !seen_dot) {
                seen_dot |= next == '.';
                token.push(next);
                chars.next();
            } else {
                break;
            }
        }
        // Trailing dot is sentence punctuation, not a decimal point.
        if token.ends_with('.') {
            token.pop();
        }
        let has_percent = matches!(chars.peek(), Some('%'));
        tokens.push((token, has_percent));
    }

    tokens
}
