//! Confirmation codes derived from account state.
//!
//! The code proving control of a signup email is never stored. It is
//! `HMAC-SHA256(secret, username || ":" || active_flag)`, hex-encoded, so it
//! stays valid exactly as long as the state it was derived from: the moment
//! the account's active flag flips, every previously issued code stops
//! verifying. No expiry bookkeeping, no cleanup job.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Derive the confirmation code for a user in the given state.
pub fn derive(secret: &str, username: &str, active: bool) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(username.as_bytes());
    mac.update(b":");
    mac.update(if active { b"1" } else { b"0" });
    let digest = mac.finalize().into_bytes();
    format!("{digest:x}")
}

/// Verify a presented code against the code derivable from current state.
///
/// Comparison is constant-time over the full code length so the check leaks
/// nothing about how many leading characters matched.
pub fn verify(secret: &str, username: &str, active: bool, presented: &str) -> bool {
    let expected = derive(secret, username, active);
    if expected.len() != presented.len() {
        return false;
    }
    expected
        .bytes()
        .zip(presented.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
