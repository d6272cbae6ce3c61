// SPDX-License-Identifier: MIT
//! Interpolator (C2): pure `{var}` / `{a.b.c}` substitution over a context map.
//!
//! No I/O, no shared state — safe to call from any thread, and exhaustively
//! unit-testable (Testable Property 4, §8).

use serde_json::{Map, Value};

/// A placeholder is a run of `[A-Za-z_][A-Za-z0-9_.]*` between `{` and `}`.
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

/// One `{...}` match in a template string.
struct Placeholder {
    /// Byte range of the whole `{...}` token, including braces.
    full: std::ops::Range<usize>,
    /// The path inside the braces, e.g. `a.b.c`.
    path: String,
}

fn scan_placeholders(template: &str) -> Vec<Placeholder> {
    let bytes = template.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'{' {
            let start = i;
            let mut j = i + 1;
            let mut chars = template[j..].chars();
            match chars.next() {
                Some(c) if is_ident_start(c) => {
                    j += c.len_utf8();
                }
                _ => {
                    i += 1;
                    continue;
                }
            }
            while let Some(c) = template[j..].chars().next() {
                if is_ident_continue(c) {
                    j += c.len_utf8();
                } else {
                    break;
                }
            }
            if template[j..].starts_with('}') {
                found.push(Placeholder { full: start..j + 1, path: template[start + 1..j].to_string() });
                i = j + 1;
            } else {
                i = start + 1;
            }
        } else {
            i += 1;
        }
    }
    found
}

/// Walk a dotted path over nested mapping nodes (objects). Arrays are not
/// indexable by this path grammar — only object traversal is supported.
pub fn resolve_path<'a>(ctx: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = ctx;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Render a resolved value as the string that replaces a placeholder.
/// Non-string leaves are stringified (numbers/bools without quotes, objects/arrays as JSON).
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Substitute every `{key}` / `{a.b.c}` placeholder in `template` by resolving
/// it against `ctx`. Missing keys leave the placeholder literal (the caller
/// should log a warning — see [`InterpolationWarning`]).
pub fn interpolate_string(template: &str, ctx: &Value) -> (String, Vec<InterpolationWarning>) {
    let placeholders = scan_placeholders(template);
    if placeholders.is_empty() {
        return (template.to_string(), Vec::new());
    }

    let mut out = String::with_capacity(template.len());
    let mut warnings = Vec::new();
    let mut cursor = 0;
    for p in placeholders {
        out.push_str(&template[cursor..p.full.start]);
        match resolve_path(ctx, &p.path) {
            Some(value) => out.push_str(&stringify(value)),
            None => {
                out.push_str(&template[p.full.clone()]);
                warnings.push(InterpolationWarning { path: p.path });
            }
        }
        cursor = p.full.end;
    }
    out.push_str(&template[cursor..]);
    (out, warnings)
}

/// Emitted when `interpolate_string`/`interpolate_dict` could not resolve a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpolationWarning {
    pub path: String,
}

/// Structurally recurse over a YAML/JSON value, interpolating every string
/// leaf. The whole-value special form `{event_data.payload}` (and any template
/// that is *exactly* one placeholder) resolves to the referenced value
/// verbatim instead of being stringified — this is what enables whole-payload
/// forwarding in `send_event`.
pub fn interpolate_value(config: &Value, ctx: &Value) -> (Value, Vec<InterpolationWarning>) {
    match config {
        Value::String(s) => {
            if let Some(whole) = as_single_placeholder(s) {
                return match resolve_path(ctx, whole) {
                    Some(value) => (value.clone(), Vec::new()),
                    None => (config.clone(), vec![InterpolationWarning { path: whole.to_string() }]),
                };
            }
            let (rendered, warnings) = interpolate_string(s, ctx);
            (Value::String(rendered), warnings)
        }
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            let mut warnings = Vec::new();
            for item in items {
                let (v, w) = interpolate_value(item, ctx);
                out.push(v);
                warnings.extend(w);
            }
            (Value::Array(out), warnings)
        }
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            let mut warnings = Vec::new();
            for (k, v) in map {
                let (rendered, w) = interpolate_value(v, ctx);
                out.insert(k.clone(), rendered);
                warnings.extend(w);
            }
            (Value::Object(out), warnings)
        }
        // Non-string leaves are returned unchanged.
        other => (other.clone(), Vec::new()),
    }
}

/// If `s` is exactly one `{path}` placeholder with nothing else around it,
/// return the path. Used for the whole-value forwarding special case.
fn as_single_placeholder(s: &str) -> Option<&str> {
    let inner = s.strip_prefix('{')?.strip_suffix('}')?;
    if !inner.is_empty()
        && inner.chars().next().is_some_and(is_ident_start)
        && inner.chars().all(is_ident_continue)
    {
        Some(inner)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn substitutes_bare_key() {
        let ctx = json!({"job_id": "j1"});
        let (out, warnings) = interpolate_string("echo {job_id}", &ctx);
        assert_eq!(out, "echo j1");
        assert!(warnings.is_empty());
    }

    #[test]
    fn substitutes_dotted_path() {
        let ctx = json!({"current_job": {"id": "42"}});
        let (out, _) = interpolate_string("job={current_job.id}", &ctx);
        assert_eq!(out, "job=42");
    }

    #[test]
    fn missing_key_leaves_placeholder_literal_and_warns() {
        let ctx = json!({});
        let (out, warnings) = interpolate_string("hi {nope}", &ctx);
        assert_eq!(out, "hi {nope}");
        assert_eq!(warnings, vec![InterpolationWarning { path: "nope".to_string() }]);
    }

    #[test]
    fn non_string_leaf_is_stringified() {
        let ctx = json!({"n": 7});
        let (out, _) = interpolate_string("count={n}", &ctx);
        assert_eq!(out, "count=7");
    }

    #[test]
    fn interpolate_value_recurses_over_nested_structures() {
        let ctx = json!({"a": "X", "b": {"c": "Y"}});
        let config = json!({"k1": "{a}", "list": ["{b.c}", "plain"], "num": 3});
        let (out, warnings) = interpolate_value(&config, &ctx);
        assert_eq!(out, json!({"k1": "X", "list": ["Y", "plain"], "num": 3}));
        assert!(warnings.is_empty());
    }

    #[test]
    fn whole_value_placeholder_forwards_object_not_string() {
        let ctx = json!({"event_data": {"payload": {"k": "v"}}});
        let config = json!("{event_data.payload}");
        let (out, _) = interpolate_value(&config, &ctx);
        assert_eq!(out, json!({"k": "v"}));
    }

    #[test]
    fn idempotent_when_placeholders_fully_resolved() {
        let ctx = json!({"a": "X"});
        let config = json!({"k": "{a}-suffix"});
        let (once, _) = interpolate_value(&config, &ctx);
        let (twice, _) = interpolate_value(&once, &ctx);
        assert_eq!(once, twice);
    }

    #[test]
    fn non_string_input_returned_unchanged() {
        let ctx = json!({});
        let config = json!({"flag": true, "n": 1, "nil": null});
        let (out, warnings) = interpolate_value(&config, &ctx);
        assert_eq!(out, config);
        assert!(warnings.is_empty());
    }
}
