//! PII/secret scrubbing for audit entries.
//!
//! Persisted records must never contain a raw bearer token or any of the
//! forbidden substrings, case-insensitively. The recorder scrubs rather
//! than trusting callers to omit them: keys that name a secret are dropped
//! outright, string values have secret occurrences replaced.

use serde_json::{Map, Value};

use crate::entry::AuditEntry;

/// Substrings that must never survive into a persisted record
/// (matched case-insensitively).
pub const FORBIDDEN_TERMS: [&str; 4] = ["password", "token", "authorization", "bearer"];

/// Replacement marker. Deliberately contains brackets so that removing a
/// match can never splice surrounding text into a new forbidden term.
pub const REDACTED: &str = "[redacted]";

/// Scrub a whole entry: the rendered route/method/action strings, the meta
/// map (keys and values, recursively), and any caller-supplied secrets such
/// as the raw bearer value of the request.
pub fn scrub_entry(mut entry: AuditEntry, secrets: &[String]) -> AuditEntry {
    entry.route = scrub_text(&entry.route, secrets);
    entry.method = scrub_text(&entry.method, secrets);
    entry.action = scrub_text(&entry.action, secrets);
    entry.entity_type = entry.entity_type.map(|s| scrub_text(&s, secrets));
    entry.entity_id = entry.entity_id.map(|s| scrub_text(&s, secrets));
    entry.meta = scrub_map(entry.meta, secrets);
    entry
}

/// Scrub one string: exact-match secrets first, then the forbidden terms
/// case-insensitively. Each pattern gets a single left-to-right pass and the
/// emitted marker is never re-scanned, so a secret that happens to be a
/// substring of the marker cannot feed back into its own replacement. The
/// bracketed marker cannot splice surrounding text into a new term either.
pub fn scrub_text(text: &str, secrets: &[String]) -> String {
    let mut out = text.to_string();
    for secret in secrets {
        if !secret.is_empty() {
            out = out.replace(secret.as_str(), REDACTED);
        }
    }
    for term in FORBIDDEN_TERMS {
        out = replace_ascii_ci(&out, term);
    }
    out
}

fn scrub_map(map: Map<String, Value>, secrets: &[String]) -> Map<String, Value> {
    let mut scrubbed = Map::new();
    for (key, value) in map {
        // A key that names a secret is dropped entirely; a redacted key
        // would still leak that the field existed under that name.
        if contains_forbidden(&key) || secrets.iter().any(|s| !s.is_empty() && key.contains(s)) {
            continue;
        }
        scrubbed.insert(key, scrub_value(value, secrets));
    }
    scrubbed
}

fn scrub_value(value: Value, secrets: &[String]) -> Value {
    match value {
        Value::String(s) => Value::String(scrub_text(&s, secrets)),
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|v| scrub_value(v, secrets)).collect())
        }
        Value::Object(map) => Value::Object(scrub_map(map, secrets)),
        other => other,
    }
}

fn contains_forbidden(text: &str) -> bool {
    FORBIDDEN_TERMS
        .iter()
        .any(|term| find_ascii_ci(text.as_bytes(), term.as_bytes()).is_some())
}

/// Replace every case-insensitive occurrence of an ASCII needle.
///
/// Byte-level scan: ASCII needle bytes only ever match ASCII haystack
/// bytes, and ASCII bytes are always UTF-8 char boundaries, so slicing at
/// match offsets is safe for arbitrary input.
fn replace_ascii_ci(haystack: &str, needle: &str) -> String {
    let bytes = haystack.as_bytes();
    let mut out = String::with_capacity(haystack.len());
    let mut i = 0;
    while i < bytes.len() {
        match find_ascii_ci(&bytes[i..], needle.as_bytes()) {
            Some(offset) => {
                out.push_str(&haystack[i..i + offset]);
                out.push_str(REDACTED);
                i += offset + needle.len();
            }
            None => {
                out.push_str(&haystack[i..]);
                break;
            }
        }
    }
    out
}

fn find_ascii_ci(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    (0..=haystack.len() - needle.len())
        .find(|&i| haystack[i..i + needle.len()].eq_ignore_ascii_case(needle))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
