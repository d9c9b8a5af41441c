//! Request payload sanitization.
//!
//! Every string leaf in an incoming JSON body is scrubbed of script tags,
//! `javascript:` scheme prefixes and inline event-handler attributes before
//! validation or persistence sees it. Runs to a fixpoint per string, so
//! sanitizing an already-sanitized payload returns it unchanged.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

fn get_regex(re: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    re.get_or_init(|| Regex::new(pattern).expect("Invalid regex pattern defined in code"))
}

fn script_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    get_regex(&RE, r"(?is)<script\b[^>]*>.*?</script\s*>")
}

fn script_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    get_regex(&RE, r"(?i)</?script\b[^>]*>")
}

fn js_scheme_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    get_regex(&RE, r"(?i)javascript:")
}

fn event_handler_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    get_regex(&RE, r"(?i)\bon\w+\s*=")
}

/// Strip unsafe markup from a single string, then trim whitespace.
/// Removal is repeated until the string stops changing, so fragments that
/// reassemble into a pattern after one pass cannot survive.
#[must_use]
pub fn sanitize_string(input: &str) -> String {
    let mut current = input.to_string();

    loop {
        let mut next = script_block_re().replace_all(&current, "").into_owned();
        next = script_tag_re().replace_all(&next, "").into_owned();
        next = js_scheme_re().replace_all(&next, "").into_owned();
        next = event_handler_re().replace_all(&next, "").into_owned();

        if next == current {
            break;
        }
        current = next;
    }

    current.trim().to_string()
}

/// Recursively sanitize a JSON payload. Objects and arrays are traversed at
/// arbitrary depth; string leaves are scrubbed; every other value passes
/// through unchanged.
#[must_use]
pub fn sanitize_payload(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(sanitize_string(&s)),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, sanitize_payload(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_payload).collect()),
        other => other,
    }
}
