//! GitHub webhook signature verification using HMAC-SHA1.
//!
//! GitHub signs webhook payloads with the App's webhook secret. The signature is
//! provided in the `X-Hub-Signature` header as `sha1=<hex>`.
//!
//! Verification is the first step of webhook processing: a request that fails it
//! must never reach the payload parser, let alone the GitHub API.

use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Parses a GitHub signature header (e.g., "sha1=abc123...") into raw bytes.
///
/// Returns `None` for malformed headers (missing prefix, invalid hex, etc.).
/// Never panics.
///
/// # Examples
///
/// ```
/// use graphql_schema_police::webhooks::parse_signature_header;
///
/// assert!(parse_signature_header("sha1=abcd1234").is_some());
///
/// // Missing prefix
/// assert!(parse_signature_header("abcd1234").is_none());
///
/// // Wrong algorithm
/// assert!(parse_signature_header("sha256=abcd1234").is_none());
///
/// // Bad hex
/// assert!(parse_signature_header("sha1=xyz").is_none());
/// ```
pub fn parse_signature_header(header: &str) -> Option<Vec<u8>> {
    let hex_sig = header.strip_prefix("sha1=")?;
    hex::decode(hex_sig).ok()
}

/// Computes the HMAC-SHA1 signature of a payload using the given secret.
pub fn compute_signature(payload: &[u8], secret: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha1::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

/// Formats a signature as a GitHub-style header value (`sha1=<hex>`).
pub fn format_signature_header(signature: &[u8]) -> String {
    format!("sha1={}", hex::encode(signature))
}

/// Verifies a GitHub webhook signature against the payload and secret.
///
/// Returns `true` only if the header carries exactly the HMAC-SHA1 of `payload`
/// keyed by `secret`. The digest comparison is constant-time.
///
/// # Examples
///
/// ```
/// use graphql_schema_police::webhooks::{
///     compute_signature, format_signature_header, verify_signature,
/// };
///
/// let payload = b"Hello, World!";
/// let secret = b"my-secret-key";
///
/// let header = format_signature_header(&compute_signature(payload, secret));
///
/// assert!(verify_signature(payload, &header, secret));
/// assert!(!verify_signature(payload, &header, b"wrong-secret"));
/// ```
pub fn verify_signature(payload: &[u8], signature_header: &str, secret: &[u8]) -> bool {
    let expected_signature = match parse_signature_header(signature_header) {
        Some(sig) => sig,
        None => return false,
    };

    let mut mac = match HmacSha1::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(payload);

    // verify_slice compares in constant time and rejects length mismatches
    mac.verify_slice(&expected_signature).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ========================================================================
    // Unit tests for known test vectors and edge cases
    // ========================================================================

    #[test]
    fn test_parse_signature_header_valid() {
        let result = parse_signature_header("sha1=1234abcd");
        assert_eq!(result, Some(vec![0x12, 0x34, 0xab, 0xcd]));
    }

    #[test]
    fn test_parse_signature_header_full_length() {
        // Full SHA1 output (40 hex chars = 20 bytes)
        let header = format!("sha1={}", "a".repeat(40));
        let result = parse_signature_header(&header);
        assert_eq!(result.map(|s| s.len()), Some(20));
    }

    #[test]
    fn test_parse_signature_header_rejects_malformed() {
        assert_eq!(parse_signature_header("1234abcd"), None);
        assert_eq!(parse_signature_header("sha256=1234abcd"), None);
        assert_eq!(parse_signature_header("sha1=xyz"), None);
        assert_eq!(parse_signature_header("sha1=abc"), None);
        assert_eq!(parse_signature_header(""), None);
    }

    #[test]
    fn test_parse_signature_header_uppercase_hex() {
        let result = parse_signature_header("sha1=ABCD1234");
        assert_eq!(result, Some(vec![0xab, 0xcd, 0x12, 0x34]));
    }

    /// RFC 2202 test case 2 for HMAC-SHA1.
    #[test]
    fn test_rfc2202_vector() {
        let signature = compute_signature(b"what do ya want for nothing?", b"Jefe");
        assert_eq!(
            format_signature_header(&signature),
            "sha1=effcdf6ae5eb2fa2d27416d5f184df9c259a7c79"
        );
    }

    #[test]
    fn test_verify_signature_wrong_secret() {
        let payload = b"test payload";
        let header = format_signature_header(&compute_signature(payload, b"correct-secret"));

        assert!(verify_signature(payload, &header, b"correct-secret"));
        assert!(!verify_signature(payload, &header, b"wrong-secret"));
    }

    #[test]
    fn test_verify_signature_modified_payload() {
        let secret = b"secret";
        let header = format_signature_header(&compute_signature(b"original payload", secret));

        assert!(verify_signature(b"original payload", &header, secret));
        assert!(!verify_signature(b"modified payload", &header, secret));
    }

    #[test]
    fn test_verify_signature_malformed_header_returns_false() {
        let payload = b"test";
        let secret = b"secret";

        assert!(!verify_signature(payload, "", secret));
        assert!(!verify_signature(payload, "sha1=", secret));
        assert!(!verify_signature(payload, "sha1=invalid", secret));
        assert!(!verify_signature(payload, "not-a-header", secret));
    }

    #[test]
    fn test_verify_signature_rejects_sha256_header() {
        // A correct digest under the wrong algorithm prefix is still rejected.
        let payload = b"test";
        let secret = b"secret";
        let hex_sig = hex::encode(compute_signature(payload, secret));

        assert!(!verify_signature(payload, &format!("sha256={}", hex_sig), secret));
    }

    #[test]
    fn test_verify_signature_rejects_truncated_digest() {
        let payload = b"test";
        let secret = b"secret";
        let signature = compute_signature(payload, secret);
        let header = format_signature_header(&signature[..10]);

        assert!(!verify_signature(payload, &header, secret));
    }

    #[test]
    fn test_verify_signature_empty_payload() {
        let secret = b"secret";
        let header = format_signature_header(&compute_signature(b"", secret));

        assert!(verify_signature(b"", &header, secret));
    }

    #[test]
    fn test_signature_is_20_bytes() {
        assert_eq!(compute_signature(b"any payload", b"any secret").len(), 20);
    }

    // ========================================================================
    // Property-based tests
    // ========================================================================

    proptest! {
        /// verify(payload, sign(payload, secret), secret) holds for all inputs.
        #[test]
        fn prop_sign_verify_roundtrip(payload: Vec<u8>, secret: Vec<u8>) {
            let header = format_signature_header(&compute_signature(&payload, &secret));
            prop_assert!(verify_signature(&payload, &header, &secret));
        }

        /// Flipping any single byte of the body invalidates the signature.
        #[test]
        fn prop_single_byte_body_mutation_fails(
            payload in prop::collection::vec(any::<u8>(), 1..256),
            secret in "[a-zA-Z0-9]{1,32}",
            index: prop::sample::Index,
            flip in 1u8..=255,
        ) {
            let header = format_signature_header(&compute_signature(&payload, secret.as_bytes()));

            let mut mutated = payload.clone();
            let i = index.index(mutated.len());
            mutated[i] ^= flip;

            prop_assert!(!verify_signature(&mutated, &header, secret.as_bytes()));
        }

        /// Flipping any single byte of the signature invalidates it.
        #[test]
        fn prop_single_byte_signature_mutation_fails(
            payload: Vec<u8>,
            secret in "[a-zA-Z0-9]{1,32}",
            index: prop::sample::Index,
            flip in 1u8..=255,
        ) {
            let mut signature = compute_signature(&payload, secret.as_bytes());
            let i = index.index(signature.len());
            signature[i] ^= flip;
            let header = format_signature_header(&signature);

            prop_assert!(!verify_signature(&payload, &header, secret.as_bytes()));
        }

        /// Signing with one secret and verifying with another fails.
        #[test]
        fn prop_wrong_secret_fails(
            payload: Vec<u8>,
            secret1 in "[a-zA-Z0-9]{1,32}",
            secret2 in "[a-zA-Z0-9]{1,32}",
        ) {
            prop_assume!(secret1 != secret2);

            let header = format_signature_header(&compute_signature(&payload, secret1.as_bytes()));
            prop_assert!(!verify_signature(&payload, &header, secret2.as_bytes()));
        }

        /// parse(format(signature)) roundtrips.
        #[test]
        fn prop_format_parse_roundtrip(signature: [u8; 20]) {
            let header = format_signature_header(&signature);
            prop_assert_eq!(parse_signature_header(&header), Some(signature.to_vec()));
        }

        /// Arbitrary headers never cause a panic.
        #[test]
        fn prop_malformed_header_no_panic(header: String, payload: Vec<u8>, secret: Vec<u8>) {
            let _ = parse_signature_header(&header);
            let _ = verify_signature(&payload, &header, &secret);
        }
    }
}
