//! Hash Primitives
//!
//! SHA-256 digests, HMAC-SHA256 keyed digests and secure random hex
//! generation. Every commitment and outcome derivation in the engine
//! bottoms out here.

use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// HMAC-SHA256 instantiation used for keyed outcome derivation.
pub type HmacSha256 = Hmac<Sha256>;

/// Raw digest output (256 bits / 32 bytes).
pub type Digest32 = [u8; 32];

/// Compute the raw SHA-256 digest of `data`.
pub fn sha256(data: &[u8]) -> Digest32 {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute the SHA-256 digest of `data`, lowercase hex-encoded.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Compute the raw HMAC-SHA256 of `message` under `key`.
///
/// Binds a secret key to a message: only the holder of the server seed
/// could have produced the digest a committed outcome derives from.
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> Digest32 {
    let mut mac = HmacSha256::new_from_slice(key)
        .expect("HMAC-SHA256 accepts keys of any length");
    mac.update(message);
    mac.finalize().into_bytes().into()
}

/// Compute the HMAC-SHA256 of `message` under `key`, lowercase hex-encoded.
pub fn hmac_sha256_hex(key: &[u8], message: &[u8]) -> String {
    hex::encode(hmac_sha256(key, message))
}

/// Generate `byte_len` cryptographically secure random bytes, hex-encoded.
///
/// The output string is `2 * byte_len` characters. The only contract is
/// unpredictability and uniformity over the output space.
pub fn secure_random_hex(byte_len: usize) -> String {
    let mut buf = vec![0u8; byte_len];
    OsRng.fill_bytes(&mut buf);
    hex::encode(buf)
}

// =============================================================================
// TESTS
// =============================================================================
