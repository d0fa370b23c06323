//! Canonical JSON encoding - the substrate every hash depends on.
//!
//! Two structurally equal payloads must canonicalize to identical bytes:
//! object keys sorted lexicographically (byte order), no insignificant
//! whitespace, UTF-8, serde_json's shortest round-trip number formatting.

use serde_json::Value;

use crate::error::{LedgerError, LedgerResult};

/// Canonicalize a payload for hashing
///
/// The top level must be a JSON object; anything else cannot be a ledger
/// payload and is rejected before it reaches the hasher.
///
/// # Errors
///
/// Returns `InvalidPayloadShape` if the payload is not an object
pub fn canonicalize(payload: &Value) -> LedgerResult<String> {
    if !payload.is_object() {
        return Err(LedgerError::InvalidPayloadShape {
            reason: format!("expected JSON object, got {}", kind_of(payload)),
        });
    }
    let mut out = String::new();
    write_value(&mut out, payload)?;
    Ok(out)
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn write_value(out: &mut String, v: &Value) -> LedgerResult<()> {
    match v {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => out.push_str(&escape_string(s)?),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item)?;
            }
            out.push(']');
        }
        Value::Object(map) => {
            // Byte-order key sort, independent of insertion order
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&escape_string(key)?);
                out.push(':');
                write_value(out, &map[key.as_str()])?;
            }
            out.push('}');
        }
    }
    Ok(())
}

fn escape_string(s: &str) -> LedgerResult<String> {
    serde_json::to_string(s).map_err(|e| LedgerError::InvalidPayloadShape {
        reason: e.to_string(),
    })
}
