// ============================
// crates/identity-lib/src/token.rs
// ============================
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
/** Secure token generation for password recovery
This module provides cryptographically secure token generation
for password reset links and codes. */
use rand::RngCore;
use subtle::ConstantTimeEq;

/// Default token size in bytes (32 bytes = 256 bits of entropy)
pub const DEFAULT_TOKEN_BYTES: usize = 32;

/// Default recovery token lifetime in seconds
pub const DEFAULT_RECOVERY_TTL_SECS: u64 = 60 * 60;

/** Generate a cryptographically secure random recovery token
# Returns
A base64 URL-safe encoded string without padding */
pub fn generate_recovery_token() -> String {
    generate_recovery_token_with_size(DEFAULT_TOKEN_BYTES)
}

/** Generate a cryptographically secure random token with specified size
# Arguments
* `bytes` - The size of the random token in bytes
# Returns
A base64 URL-safe encoded string without padding */
pub fn generate_recovery_token_with_size(bytes: usize) -> String {
    let mut buffer = vec![0u8; bytes];
    rand::rng().fill_bytes(&mut buffer);
    URL_SAFE_NO_PAD.encode(buffer)
}

/// Compare two tokens in constant time. Only the length may leak.
pub fn tokens_match(expected: &str, given: &str) -> bool {
    expected.as_bytes().ct_eq(given.as_bytes()).into()
}
