//! Close-approach query construction
//!
//! Two entry points build the same kebab-case parameter set the service
//! expects: `from_tuned` for tuned directive arguments coming out of the
//! orchestrator, and `from_query_params` for the caller-facing proxy
//! endpoint, which additionally accepts snake_case aliases and defaults the
//! near-Earth-only filter on.

use serde_json::{Map, Value};
use std::collections::HashMap;

/// Optional filter keys passed through from a tuned directive when non-empty.
const OPTIONAL_KEYS: [&str; 9] = [
    "limit", "v-rel-min", "v-rel-max", "h-min", "h-max", "pha", "neo", "diameter", "fullname",
];

/// Optional query parameters accepted by the proxy endpoint, in either
/// spelling; normalized to kebab-case before forwarding.
const ALIASED_KEYS: [&str; 13] = [
    "limit",
    "des",
    "v-rel-min",
    "v_rel_min",
    "v-rel-max",
    "v_rel_max",
    "h-min",
    "h_min",
    "h-max",
    "h_max",
    "pha",
    "diameter",
    "fullname",
];

/// Ordered close-approach service query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CadQuery {
    pairs: Vec<(String, String)>,
}

impl CadQuery {
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Resolved parameters as a JSON object, for echoing in response metadata.
    pub fn as_params_object(&self) -> Map<String, Value> {
        self.pairs
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect()
    }

    /// Insert or replace a parameter, keeping first-insertion order.
    fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key.to_string(), value)),
        }
    }

    /// Build a query from tuned directive arguments, with defaults for every
    /// required filter. An empty designation is omitted entirely; the service
    /// treats an empty `des` differently from an absent one.
    pub fn from_tuned(args: &Map<String, Value>) -> Self {
        let mut query = CadQuery { pairs: Vec::new() };
        query.set("date-min", arg_string(args, "date_min").unwrap_or_else(|| "now".into()));
        query.set("date-max", arg_string(args, "date_max").unwrap_or_else(|| "+60".into()));
        query.set("dist-max", arg_string(args, "dist_max").unwrap_or_else(|| "0.05".into()));
        query.set("body", arg_string(args, "body").unwrap_or_else(|| "Earth".into()));
        query.set("sort", arg_string(args, "sort").unwrap_or_else(|| "date".into()));

        if let Some(des) = arg_string(args, "des") {
            query.set("des", des);
        }
        for key in OPTIONAL_KEYS {
            if let Some(value) = arg_string(args, key) {
                query.set(key, value);
            }
        }
        query
    }

    /// Build a query from proxy-endpoint parameters, accepting snake_case and
    /// kebab-case interchangeably. Near-Earth-only defaults on here.
    pub fn from_query_params(params: &HashMap<String, String>) -> Self {
        let mut query = CadQuery { pairs: Vec::new() };
        query.set(
            "date-min",
            first_non_empty(params, &["date-min", "date_min"]).unwrap_or_else(|| "now".into()),
        );
        query.set(
            "date-max",
            first_non_empty(params, &["date-max", "date_max"]).unwrap_or_else(|| "+60".into()),
        );
        query.set(
            "dist-max",
            first_non_empty(params, &["dist-max", "dist_max"]).unwrap_or_else(|| "0.05".into()),
        );
        query.set(
            "body",
            first_non_empty(params, &["body"]).unwrap_or_else(|| "Earth".into()),
        );
        query.set(
            "sort",
            first_non_empty(params, &["sort"]).unwrap_or_else(|| "date".into()),
        );
        query.set(
            "neo",
            first_non_empty(params, &["neo"]).unwrap_or_else(|| "true".into()),
        );

        for key in ALIASED_KEYS {
            if let Some(value) = params.get(key).map(String::as_str) {
                if !value.trim().is_empty() {
                    query.set(&key.replace('_', "-"), value);
                }
            }
        }
        query
    }
}

/// Non-empty trimmed string form of a directive argument. Strings are used
/// as-is; numbers and booleans render bare; null counts as absent.
fn arg_string(args: &Map<String, Value>, key: &str) -> Option<String> {
    let rendered = match args.get(key)? {
        Value::String(s) => s.clone(),
        Value::Null => return None,
        other => other.to_string(),
    };
    let trimmed = rendered.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn first_non_empty(params: &HashMap<String, String>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| params.get(*k))
        .find(|v| !v.trim().is_empty())
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object literal")
    }

    fn get<'a>(query: &'a CadQuery, key: &str) -> Option<&'a str> {
        query
            .pairs()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn tuned_query_applies_defaults() {
        let query = CadQuery::from_tuned(&Map::new());
        assert_eq!(get(&query, "date-min"), Some("now"));
        assert_eq!(get(&query, "date-max"), Some("+60"));
        assert_eq!(get(&query, "dist-max"), Some("0.05"));
        assert_eq!(get(&query, "body"), Some("Earth"));
        assert_eq!(get(&query, "sort"), Some("date"));
        assert_eq!(get(&query, "des"), None);
    }

    #[test]
    fn empty_designation_is_omitted_not_sent_empty() {
        let query = CadQuery::from_tuned(&args(json!({"des": "  "})));
        assert_eq!(get(&query, "des"), None);

        let query = CadQuery::from_tuned(&args(json!({"des": "433"})));
        assert_eq!(get(&query, "des"), Some("433"));
    }

    #[test]
    fn optional_filters_pass_through_only_when_non_empty() {
        let query = CadQuery::from_tuned(&args(json!({
            "limit": 12,
            "pha": "true",
            "h-max": "",
            "neo": null,
        })));
        assert_eq!(get(&query, "limit"), Some("12"));
        assert_eq!(get(&query, "pha"), Some("true"));
        assert_eq!(get(&query, "h-max"), None);
        assert_eq!(get(&query, "neo"), None);
    }

    #[test]
    fn proxy_query_accepts_both_alias_spellings() {
        let mut params = HashMap::new();
        params.insert("date_min".to_string(), "2025-01-01".to_string());
        params.insert("v_rel_max".to_string(), "20".to_string());
        params.insert("h-min".to_string(), "18".to_string());

        let query = CadQuery::from_query_params(&params);
        assert_eq!(get(&query, "date-min"), Some("2025-01-01"));
        assert_eq!(get(&query, "v-rel-max"), Some("20"));
        assert_eq!(get(&query, "h-min"), Some("18"));
        // near-Earth-only defaults on for the proxy endpoint
        assert_eq!(get(&query, "neo"), Some("true"));
    }

    #[test]
    fn duplicate_alias_spellings_do_not_duplicate_parameters() {
        let mut params = HashMap::new();
        params.insert("v-rel-min".to_string(), "1".to_string());
        params.insert("v_rel_min".to_string(), "2".to_string());

        let query = CadQuery::from_query_params(&params);
        let count = query.pairs().iter().filter(|(k, _)| k == "v-rel-min").count();
        assert_eq!(count, 1);
    }
}
