//! Token, hash and clock helpers.

use rand::distr::Alphanumeric;
use rand::{Rng, RngCore};
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

/// Token byte length before hex encoding (32 bytes = 64 hex chars).
const TOKEN_BYTES: usize = 32;

/// Length of generated Ampache passphrases.
pub const PASSPHRASE_LEN: usize = 16;

/// Generate an unguessable session token.
///
/// `rand::rng()` is a CSPRNG reseeded from the OS.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Generate a random alphanumeric passphrase for a new API key.
pub fn generate_passphrase() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(PASSPHRASE_LEN)
        .map(char::from)
        .collect()
}

/// Lowercase hex SHA-256 of a string.
pub fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// Hash stored for an Ampache passphrase.
pub fn passphrase_hash(passphrase: &str) -> String {
    sha256_hex(passphrase)
}

/// Hash under which a session token is stored.
pub fn hash_token(token: &str) -> String {
    sha256_hex(token)
}

/// Token a client sends in the handshake: `sha256(timestamp ‖ passphrase_hash)`.
///
/// `timestamp` is the raw parameter text, not its parsed value.
pub fn handshake_token(timestamp: &str, stored_hash: &str) -> String {
    let mut h = Sha256::new();
    h.update(timestamp.as_bytes());
    h.update(stored_hash.as_bytes());
    hex::encode(h.finalize())
}

/// Constant-time byte comparison to prevent timing attacks.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Current Unix epoch in seconds.
pub fn epoch_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
