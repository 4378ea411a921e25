//! LaTeX escaping for untrusted request data.
//!
//! Every string leaf of the request body passes through here before it gets
//! anywhere near a template. Escaping happens exactly once, at ingestion;
//! nothing downstream re-escapes.

use serde_json::Value;

/// Escapes one string for safe embedding in LaTeX text.
///
/// Works character-at-a-time so replacement output is never re-scanned:
/// a backslash followed by `&` becomes `\textbackslash{}\&`, not a
/// double-escaped mess. The braces inside `\textasciitilde{}` etc. are
/// produced, not consumed, so they cannot trip the `{`/`}` rules.
pub fn escape_str(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str(r"\&"),
            '%' => out.push_str(r"\%"),
            '$' => out.push_str(r"\$"),
            '#' => out.push_str(r"\#"),
            '_' => out.push_str(r"\_"),
            '{' => out.push_str(r"\{"),
            '}' => out.push_str(r"\}"),
            '~' => out.push_str(r"\textasciitilde{}"),
            '^' => out.push_str(r"\textasciicircum{}"),
            '\\' => out.push_str(r"\textbackslash{}"),
            _ => out.push(ch),
        }
    }
    out
}

/// Recursively escapes every string leaf of a JSON value.
///
/// Structure-preserving: object keys, key order and array order are untouched.
/// Numbers, booleans and null pass through verbatim — they carry no
/// LaTeX-safety guarantee, so templates must not splice them where markup
/// syntax is expected.
pub fn escape_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(escape_str(&s)),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, v)| (key, escape_value(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(escape_value).collect()),
        other @ (Value::Null | Value::Bool(_) | Value::Number(_)) => other,
    }
}
