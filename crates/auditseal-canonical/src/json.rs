//! Canonical JSON serialization.
//!
//! One encoding function is used everywhere a digest is taken. The contract:
//!
//! 1. Object keys are emitted in ASCII-lexicographic (byte) order.
//! 2. Arrays preserve element order; set-valued fields must be sorted by the
//!    caller before encoding (the policy compiler does this).
//! 3. Strings are UTF-8 with minimal escaping.
//! 4. Integers are emitted exactly; no insignificant whitespace anywhere.
//! 5. Absent optional fields are encoded as `null`, never omitted, so that
//!    `{"a":1}` and `{"a":1,"b":null}` cannot collide.
//!
//! The encoding is self-delimiting within a hash pre-image: the structural
//! JSON syntax separates fields unambiguously, so no length prefixes are
//! needed between them.

/// Canonicalizes a JSON value to its unique string form.
///
/// The output is deterministic: semantically identical inputs always produce
/// bytewise identical outputs. This string is the only hash pre-image used
/// for commitments and record hashes.
///
/// # Example
///
/// ```rust
/// use auditseal_canonical::canonicalize;
/// use serde_json::json;
///
/// let value = json!({
///     "zulu": true,
///     "alpha": [3, 2, 1],
///     "bravo": null
/// });
///
/// assert_eq!(canonicalize(&value), r#"{"alpha":[3,2,1],"bravo":null,"zulu":true}"#);
/// ```
pub fn canonicalize(value: &serde_json::Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

fn write_value(out: &mut String, value: &serde_json::Value) {
    match value {
        serde_json::Value::Null => out.push_str("null"),
        serde_json::Value::Bool(true) => out.push_str("true"),
        serde_json::Value::Bool(false) => out.push_str("false"),
        serde_json::Value::Number(n) => write_number(out, n),
        serde_json::Value::String(s) => write_string(out, s),
        serde_json::Value::Array(arr) => write_array(out, arr),
        serde_json::Value::Object(obj) => write_object(out, obj),
    }
}

/// Integers are emitted exactly. Non-integer numbers fall back to the
/// serde_json rendering; record and policy fields are integer-or-string by
/// construction, so the fallback is exercised only by free-form metadata.
fn write_number(out: &mut String, n: &serde_json::Number) {
    if let Some(i) = n.as_i64() {
        out.push_str(&i.to_string());
    } else if let Some(u) = n.as_u64() {
        out.push_str(&u.to_string());
    } else {
        out.push_str(&n.to_string());
    }
}

/// Minimal escaping: `"` and `\` and the control range 0x00-0x1F. Everything
/// else, including non-ASCII code points, passes through as UTF-8.
fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\x08' => out.push_str("\\b"),
            '\x0C' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c < '\x20' => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

fn write_array(out: &mut String, arr: &[serde_json::Value]) {
    out.push('[');
    for (i, element) in arr.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_value(out, element);
    }
    out.push(']');
}

/// Keys sort by raw byte order. For the ASCII keys used throughout the wire
/// formats this equals ASCII-lexicographic order.
fn write_object(out: &mut String, obj: &serde_json::Map<String, serde_json::Value>) {
    let mut entries: Vec<(&String, &serde_json::Value)> = obj.iter().collect();
    entries.sort_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));

    out.push('{');
    for (i, (key, value)) in entries.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_string(out, key);
        out.push(':');
        write_value(out, value);
    }
    out.push('}');
}
