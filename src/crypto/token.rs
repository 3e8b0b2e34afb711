use ring::error::Unspecified;
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Random bytes behind a transfer ID (24 hex characters).
pub const TRANSFER_ID_BYTES: usize = 12;
/// Random bytes behind a transfer access token (64 hex characters).
pub const TOKEN_BYTES: usize = 32;
/// Random bytes behind a device ID.
pub const DEVICE_ID_BYTES: usize = 12;

/// Draws `len` bytes from the system CSPRNG and hex encodes them.
pub fn random_hex(len: usize) -> Result<String, Unspecified> {
    let mut buf = vec![0u8; len];
    SystemRandom::new().fill(&mut buf)?;
    Ok(hex::encode(buf))
}

/// SHA-256 hex digest of the trimmed PIN, or an empty string when no PIN
/// was given.
pub fn hash_pin(pin: &str) -> String {
    let pin = pin.trim();
    if pin.is_empty() {
        return String::new();
    }

    let mut hasher = Sha256::new();
    hasher.update(pin.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Compares a caller-supplied token against the stored one without leaking
/// how many leading bytes matched. An empty token never matches.
pub fn tokens_match(supplied: &str, stored: &str) -> bool {
    if supplied.is_empty() {
        return false;
    }
    supplied.as_bytes().ct_eq(stored.as_bytes()).into()
}
