use serde::Serialize;
use sha2::{Digest, Sha256};

/// SHA-256 over the canonical JSON encoding, as lowercase hex.
///
/// Used to tie logged faults back to the exact input that produced them.
pub fn fingerprint<T: Serialize + ?Sized>(value: &T) -> String {
    match serde_json::to_vec(value) {
        Ok(bytes) => hex::encode(Sha256::digest(&bytes)),
        Err(_) => "unavailable".to_string(),
    }
}
