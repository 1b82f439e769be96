//! Canonical hashing shared by every content-addressed record.

use crate::error::RakResult;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

/// Name of the digest algorithm recorded in verification hooks.
pub const HASH_ALGORITHM: &str = "sha256";

static DIGEST_RE: OnceLock<Regex> = OnceLock::new();

fn get_digest_re() -> &'static Regex {
    DIGEST_RE.get_or_init(|| Regex::new(r"^[0-9a-f]{64}$").expect("valid regex"))
}

/// Compute the canonical digest of any serializable value.
///
/// The value is projected to JSON first, so two values that serialize to
/// structurally-equal JSON hash identically regardless of the key order
/// their serializer emitted.
pub fn digest<T: Serialize + ?Sized>(value: &T) -> RakResult<String> {
    let json = serde_json::to_value(value)?;
    Ok(digest_value(&json))
}

/// Compute the canonical digest of an already-built JSON value.
pub fn digest_value(value: &Value) -> String {
    let mut canonical = String::new();
    write_canonical(value, &mut canonical);
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Check that `candidate` has the shape of a digest produced by [`digest`].
pub fn is_canonical_digest(candidate: &str) -> bool {
    get_digest_re().is_match(candidate)
}

/// Produce canonical JSON: sorted object keys, ordered arrays, compact scalars.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
