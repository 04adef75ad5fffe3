//! Single-use access token generation
//!
//! Tokens are high-entropy random values known only to the record
//! store and to whichever mail delivery succeeded. A token stays
//! valid until the next issuance overwrites it; no expiry timer
//! exists in this design.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;

/// Raw token size in bytes (160 bits of OS entropy)
pub const TOKEN_BYTES: usize = 20;

/// Generate a fresh access token.
///
/// 20 bytes from the OS RNG, base64-url encoded without padding.
pub fn generate() -> String {
    let mut buf = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_have_expected_length() {
        // 20 bytes -> ceil(20 * 4 / 3) = 27 base64 chars, no padding
        assert_eq!(generate().len(), 27);
    }

    #[test]
    fn tokens_are_url_safe() {
        let token = generate();
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn tokens_differ_between_issuances() {
        let a = generate();
        let b = generate();
        assert_ne!(a, b);
    }
}
