//! Webhook signature scheme.
//!
//! Deliveries carry a header of the form `t=<unix-ts>,v1=<hex digest>`, where the digest is
//! HMAC-SHA256 over the string `"{t}.{raw body}"` keyed with the shared webhook secret.
//! Comparison uses the Mac's constant-time verification.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Header the provider delivers the signature in.
pub const SIGNATURE_HEADER: &str = "X-Checkout-Signature";

#[derive(Debug, Clone, Error)]
pub enum SignatureError {
    #[error("The signature header is not in 't=..,v1=..' form")]
    MalformedHeader,
    #[error("The signature does not match the payload")]
    VerificationFailed,
}

/// Produces a signature header value for `payload`. Used by the provider side; here it backs the
/// test suites and local tooling.
pub fn sign(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let digest = compute_digest(secret, timestamp, payload);
    format!("t={timestamp},v1={}", hex_encode(&digest))
}

/// Verifies a signature header against the raw request body. Must run before the body is parsed.
pub fn verify(secret: &str, header: &str, payload: &[u8]) -> Result<(), SignatureError> {
    let mut timestamp = None;
    let mut candidates = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", ts)) => timestamp = ts.parse::<i64>().ok(),
            Some(("v1", sig)) => candidates.push(sig),
            _ => {},
        }
    }
    let timestamp = timestamp.ok_or(SignatureError::MalformedHeader)?;
    if candidates.is_empty() {
        return Err(SignatureError::MalformedHeader);
    }
    // The header may carry several v1 entries while the provider rolls its secret; any match
    // passes.
    let mut signed = Vec::with_capacity(payload.len() + 24);
    signed.extend_from_slice(format!("{timestamp}.").as_bytes());
    signed.extend_from_slice(payload);
    for candidate in candidates {
        let Some(bytes) = hex_decode(candidate) else { continue };
        let mut mac = new_mac(secret);
        mac.update(&signed);
        if mac.verify_slice(&bytes).is_ok() {
            return Ok(());
        }
    }
    Err(SignatureError::VerificationFailed)
}

fn compute_digest(secret: &str, timestamp: i64, payload: &[u8]) -> Vec<u8> {
    let mut mac = new_mac(secret);
    mac.update(format!("{timestamp}.").as_bytes());
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

fn new_mac(secret: &str) -> HmacSha256 {
    // HMAC accepts keys of any length
    HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC key of any length is valid")
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hex_decode(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len()).step_by(2).map(|i| u8::from_str_radix(s.get(i..i + 2)?, 16).ok()).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const PAYLOAD: &[u8] = br#"{"id":"evt_1","type":"checkout.session.completed"}"#;

    #[test]
    fn signed_payload_verifies() {
        let header = sign(SECRET, 1_700_000_000, PAYLOAD);
        verify(SECRET, &header, PAYLOAD).expect("signature should verify");
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let header = sign(SECRET, 1_700_000_000, PAYLOAD);
        let tampered = br#"{"id":"evt_1","type":"checkout.session.expired"}"#;
        assert!(matches!(verify(SECRET, &header, tampered), Err(SignatureError::VerificationFailed)));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let header = sign("some_other_secret", 1_700_000_000, PAYLOAD);
        assert!(matches!(verify(SECRET, &header, PAYLOAD), Err(SignatureError::VerificationFailed)));
    }

    #[test]
    fn altered_timestamp_invalidates_the_signature() {
        let header = sign(SECRET, 1_700_000_000, PAYLOAD);
        let forged = header.replace("t=1700000000", "t=1700009999");
        assert!(matches!(verify(SECRET, &forged, PAYLOAD), Err(SignatureError::VerificationFailed)));
    }

    #[test]
    fn malformed_headers_are_rejected() {
        assert!(matches!(verify(SECRET, "", PAYLOAD), Err(SignatureError::MalformedHeader)));
        assert!(matches!(verify(SECRET, "v1=abcd", PAYLOAD), Err(SignatureError::MalformedHeader)));
        assert!(matches!(verify(SECRET, "t=123", PAYLOAD), Err(SignatureError::MalformedHeader)));
    }

    #[test]
    fn hex_roundtrip() {
        assert_eq!(hex_decode(&hex_encode(&[0x00, 0xff, 0x1a])), Some(vec![0x00, 0xff, 0x1a]));
        assert_eq!(hex_decode("abc"), None);
        assert_eq!(hex_decode("zz"), None);
    }
}
