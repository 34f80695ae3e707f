//! PKCE verifier and S256 challenge generation (RFC 7636).

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

// RFC 7636 unreserved characters
const VERIFIER_CHARSET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

pub const MIN_VERIFIER_LENGTH: usize = 43;
pub const MAX_VERIFIER_LENGTH: usize = 128;

/// Generate a cryptographically random code verifier of the given length.
/// `ThreadRng` is a CSPRNG, which RFC 7636 requires here.
pub fn generate_verifier(length: usize) -> Result<String> {
    if !(MIN_VERIFIER_LENGTH..=MAX_VERIFIER_LENGTH).contains(&length) {
        return Err(Error::VerifierLength(length));
    }

    let mut rng = rand::rng();
    Ok((0..length)
        .map(|_| VERIFIER_CHARSET[rng.random_range(0..VERIFIER_CHARSET.len())] as char)
        .collect())
}

/// `challenge = BASE64URL(SHA256(verifier))`, no padding.
pub fn derive_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifier_has_requested_length_and_charset() {
        for length in [MIN_VERIFIER_LENGTH, 64, MAX_VERIFIER_LENGTH] {
            let verifier = generate_verifier(length).unwrap();
            assert_eq!(verifier.len(), length);
            assert!(verifier
                .bytes()
                .all(|b| VERIFIER_CHARSET.contains(&b)));
        }
    }

    #[test]
    fn verifier_length_out_of_range_is_rejected() {
        assert!(matches!(
            generate_verifier(42),
            Err(Error::VerifierLength(42))
        ));
        assert!(matches!(
            generate_verifier(129),
            Err(Error::VerifierLength(129))
        ));
    }

    #[test]
    fn verifiers_are_unique() {
        let a = generate_verifier(64).unwrap();
        let b = generate_verifier(64).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn challenge_is_deterministic() {
        let verifier = generate_verifier(64).unwrap();
        assert_eq!(derive_challenge(&verifier), derive_challenge(&verifier));
    }

    #[test]
    fn distinct_verifiers_produce_distinct_challenges() {
        let a = generate_verifier(64).unwrap();
        let b = generate_verifier(64).unwrap();
        assert_ne!(derive_challenge(&a), derive_challenge(&b));
    }

    #[test]
    fn challenge_matches_known_value() {
        // SHA256("hello"), base64url-encoded without padding
        assert_eq!(
            derive_challenge("hello"),
            "LPJNul-wow4m6DsqxbninhsWHlwfp0JecwQzYpOLmCQ"
        );
    }

    #[test]
    fn challenge_is_base64url_without_padding() {
        let verifier = generate_verifier(128).unwrap();
        let challenge = derive_challenge(&verifier);
        // 32-byte digest encodes to 43 chars with no '=', '+' or '/'
        assert_eq!(challenge.len(), 43);
        assert!(!challenge.contains('+'));
        assert!(!challenge.contains('/'));
        assert!(!challenge.contains('='));
    }
}
