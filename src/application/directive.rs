//! Embedded tool-call directive extraction
//!
//! The model requests close-approach data by emitting, on its own line,
//! `CAD_CALL {json}`. The grammar is strict but the parser is tolerant: a
//! present token with an unparsable blob degrades to "no directive" rather
//! than failing the request, because the producer is an unreliable model,
//! not a trusted peer.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::warn;

static CAD_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*CAD_CALL[ \t]+(\{.*\})[ \t]*$").expect("directive pattern compiles")
});

/// A parsed tool invocation extracted from assistant text.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    /// The exact matched line, replayed verbatim into the next model turn so
    /// the model sees precisely what it previously emitted.
    pub raw: String,
    pub args: Map<String, Value>,
}

/// Extract at most one directive from assistant free text.
pub fn extract_directive(text: &str) -> Option<Directive> {
    let captures = CAD_CALL.captures(text)?;
    let raw = captures.get(0)?.as_str().to_string();
    let blob = captures.get(1)?.as_str();

    match serde_json::from_str::<Map<String, Value>>(blob) {
        Ok(args) => Some(Directive { raw, args }),
        Err(error) => {
            warn!(
                %error,
                blob = %truncate(blob, 120),
                "Directive token present but arguments failed to parse; treating as absent"
            );
            None
        }
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
