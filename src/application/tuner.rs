//! Directive parameter tuning
//!
//! Rewrites directive arguments from hints in the latest user utterance, then
//! unconditionally clamps the result-count limit. Untouched keys pass through
//! unchanged.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

/// Hard ceiling on rows fed back into the model, regardless of what the model
/// or the user requested.
pub const MAX_ITEMS: u64 = 12;

static WANT_SEVEN_DAYS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b7\b.*\bdays?\b|\bweek\b|\bnext\s+7\b").expect("pattern compiles"));
static WANT_TEN_LD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b10\s*LD\b").expect("pattern compiles"));
static ASK_CLOSEST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(closest|nearest)\b").expect("pattern compiles"));

/// Apply user-utterance heuristics to directive arguments.
///
/// Heuristics are additive; the limit clamp runs last and is absolute, so a
/// `limit` of 1000 (or none at all) always comes out as [`MAX_ITEMS`].
pub fn apply_user_hints(args: &Map<String, Value>, user: &str) -> Map<String, Value> {
    let mut out = args.clone();

    if WANT_SEVEN_DAYS.is_match(user) {
        out.insert("date_min".to_string(), Value::from("now"));
        out.insert("date_max".to_string(), Value::from("+7"));
    }
    if WANT_TEN_LD.is_match(user) {
        out.insert("dist_max".to_string(), Value::from("10LD"));
    }
    if ASK_CLOSEST.is_match(user) {
        out.insert("sort".to_string(), Value::from("dist"));
    }

    if limit_of(&out).is_none_or(|n| n == 0 || n > MAX_ITEMS) {
        out.insert("limit".to_string(), Value::from(MAX_ITEMS));
    }
    out
}

/// Numeric view of the limit argument; unparsable values count as absent.
fn limit_of(args: &Map<String, Value>) -> Option<u64> {
    match args.get("limit")? {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
