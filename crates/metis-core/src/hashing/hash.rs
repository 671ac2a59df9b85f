//! Hash helpers (blake3, hex).

use blake3::Hasher;
use serde_json::Value;

use super::to_canonical_json;

/// Hashea un string y devuelve hex.
pub fn hash_str(input: &str) -> String {
    let mut h = Hasher::new();
    h.update(input.as_bytes());
    h.finalize().to_hex().to_string()
}

/// Hash del JSON canonicalizado.
pub fn hash_value(value: &Value) -> String {
    hash_str(&to_canonical_json(value))
}

/// Hash de un buffer de píxeles (little endian).
pub fn hash_f64s(values: &[f64]) -> String {
    let mut h = Hasher::new();
    for v in values {
        h.update(&v.to_le_bytes());
    }
    h.finalize().to_hex().to_string()
}
