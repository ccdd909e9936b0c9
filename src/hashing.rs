//! Hashing System - SHA-256 for Quote Reproduction
//!
//! A quote is reproducible from (request, tab snapshot, engine version); the
//! job hash fingerprints exactly that triple.

use sha2::{Sha256, Digest};
use serde::Serialize;
use serde_json::{Value, to_string};

use crate::config::ConfigSnapshot;
use crate::products::QuoteRequest;

/// Lowercase hex SHA-256 digest.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Compact JSON with object keys in byte order at every depth, so a tab or
/// request hashes the same whatever order its fields arrived in.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    to_string(&key_sorted(serde_json::to_value(value)?))
}

fn key_sorted(value: Value) -> Value {
    match value {
        Value::Object(fields) => {
            let mut fields: Vec<(String, Value)> = fields.into_iter().collect();
            fields.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(fields.into_iter().map(|(k, v)| (k, key_sorted(v))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(key_sorted).collect()),
        scalar => scalar,
    }
}

/// Fingerprint of a computed result, for comparing reruns.
pub fn compute_quote_hash<T: Serialize>(quote: &T) -> Result<String, serde_json::Error> {
    let canonical = canonical_json(quote)?;
    Ok(sha256_hex(canonical.as_bytes()))
}

/// Fingerprint of everything a quote depends on: the product's tab name, the
/// tab snapshot, the request and the engine version.
pub fn compute_job_hash(
    request: &QuoteRequest,
    tab: &ConfigSnapshot,
    engine_version: &str,
) -> Result<String, serde_json::Error> {
    let combined = format!(
        "{}:{}:{}:{}",
        request.product().tab(),
        canonical_json(tab)?,
        canonical_json(request)?,
        engine_version
    );
    Ok(sha256_hex(combined.as_bytes()))
}

mod hex {
    use std::fmt::Write;

    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        let bytes = bytes.as_ref();
        bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
            let _ = write!(out, "{:02x}", b);
            out
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> QuoteRequest {
        serde_json::from_str(r#"{"product": "foam", "width": 24, "height": 36, "qty": 4}"#).unwrap()
    }

    #[test]
    fn test_canonical_json_sorted() {
        let obj = json!({"z": 1, "a": 2, "m": 3});
        let canonical = canonical_json(&obj).unwrap();
        assert_eq!(canonical, r#"{"a":2,"m":3,"z":1}"#);
    }

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_job_hash_covers_tab_and_version() {
        let tab = ConfigSnapshot::new().with("FOM3_T1_Rate", 9.0);
        let h = compute_job_hash(&request(), &tab, "1.0.0").unwrap();
        assert_eq!(h, compute_job_hash(&request(), &tab.clone(), "1.0.0").unwrap());
        assert_ne!(h, compute_job_hash(&request(), &ConfigSnapshot::new(), "1.0.0").unwrap());
        assert_ne!(h, compute_job_hash(&request(), &tab, "1.0.1").unwrap());
    }

    #[test]
    fn test_quote_hash_stable() {
        let quote = request().quote(&ConfigSnapshot::new());
        assert_eq!(compute_quote_hash(&quote).unwrap(), compute_quote_hash(&quote).unwrap());
    }
}
