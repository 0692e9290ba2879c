//! Password digest.
//!
//! A single unsalted SHA-256, hex encoded. Stored credentials and the seeding
//! command depend on this exact format.

use sha2::{Digest, Sha256};

/// Minimum accepted password length at sign-up, in characters.
pub const MIN_PASSWORD_LEN: usize = 5;

/// Hex-encoded SHA-256 of the raw password.
pub fn password_digest(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}
