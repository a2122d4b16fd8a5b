//! Slack request signature verification.
//!
//! Implements Slack's signing scheme:
//! <https://api.slack.com/authentication/verifying-requests-from-slack>
//!
//! The signature is `v0=` followed by the hex HMAC-SHA256 of
//! `v0:{timestamp}:{body}` keyed with the app's signing secret.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use tracing::{debug, instrument};

use super::error::SlackError;

/// Header carrying the request signature.
pub const SIGNATURE_HEADER: &str = "x-slack-signature";

/// Header carrying the Unix timestamp the signature covers.
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";

/// Signing scheme version prefix.
const SIGNATURE_VERSION: &str = "v0";

/// Requests older (or newer) than this many seconds are rejected as replays.
const MAX_TIMESTAMP_SKEW_SECS: u64 = 300;

type HmacSha256 = Hmac<Sha256>;

/// Verifies that inbound webhooks were signed with the app's signing secret.
#[derive(Clone)]
pub struct SignatureVerifier {
    signing_secret: SecretString,
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("signing_secret", &"[REDACTED]")
            .finish()
    }
}

impl SignatureVerifier {
    /// Create a verifier for the given signing secret.
    #[must_use]
    pub const fn new(signing_secret: SecretString) -> Self {
        Self { signing_secret }
    }

    /// Verify a request signature against the current time.
    ///
    /// # Arguments
    ///
    /// * `timestamp` - The `X-Slack-Request-Timestamp` header value
    /// * `body` - The raw request body
    /// * `signature` - The `X-Slack-Signature` header value
    ///
    /// # Errors
    ///
    /// Returns `SlackError::InvalidSignature` if the timestamp is malformed or
    /// stale, the signature is malformed, or the signature does not match.
    #[instrument(skip(self, body, signature))]
    pub fn verify(&self, timestamp: &str, body: &[u8], signature: &str) -> Result<(), SlackError> {
        self.verify_at(unix_now()?, timestamp, body, signature)
    }

    /// Verify a request signature as of `now` (Unix seconds).
    ///
    /// # Errors
    ///
    /// See [`SignatureVerifier::verify`].
    pub fn verify_at(
        &self,
        now: i64,
        timestamp: &str,
        body: &[u8],
        signature: &str,
    ) -> Result<(), SlackError> {
        let ts: i64 = timestamp
            .trim()
            .parse()
            .map_err(|_| SlackError::InvalidSignature("Invalid timestamp".to_string()))?;

        // abs_diff cannot overflow on extreme header values
        if now.abs_diff(ts) > MAX_TIMESTAMP_SKEW_SECS {
            return Err(SlackError::InvalidSignature(
                "Request timestamp too old".to_string(),
            ));
        }

        let provided = signature
            .strip_prefix(SIGNATURE_VERSION)
            .and_then(|rest| rest.strip_prefix('='))
            .and_then(|digest| hex::decode(digest).ok())
            .ok_or_else(|| SlackError::InvalidSignature("Malformed signature".to_string()))?;

        // verify_slice compares in constant time
        self.mac_for(timestamp, body)?
            .verify_slice(&provided)
            .map_err(|_| SlackError::InvalidSignature("Signature mismatch".to_string()))?;

        debug!("Slack signature verified");

        Ok(())
    }

    /// Compute the `v0=` signature Slack would send for this body.
    ///
    /// # Errors
    ///
    /// Returns `SlackError::InvalidSignature` if the HMAC cannot be keyed.
    pub fn sign(&self, timestamp: &str, body: &[u8]) -> Result<String, SlackError> {
        let digest = self.mac_for(timestamp, body)?.finalize().into_bytes();
        Ok(format!("{SIGNATURE_VERSION}={}", hex::encode(digest)))
    }

    fn mac_for(&self, timestamp: &str, body: &[u8]) -> Result<HmacSha256, SlackError> {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.expose_secret().as_bytes())
            .map_err(|e| SlackError::InvalidSignature(e.to_string()))?;

        mac.update(SIGNATURE_VERSION.as_bytes());
        mac.update(b":");
        mac.update(timestamp.as_bytes());
        mac.update(b":");
        mac.update(body);

        Ok(mac)
    }
}

/// Current Unix time in seconds.
///
/// # Errors
///
/// Returns `SlackError::InvalidSignature` if the system clock is unusable.
pub fn unix_now() -> Result<i64, SlackError> {
    let now_secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_err(|e| SlackError::InvalidSignature(e.to_string()))?
        .as_secs();

    i64::try_from(now_secs)
        .map_err(|_| SlackError::InvalidSignature("System time overflow".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn verifier() -> SignatureVerifier {
        SignatureVerifier::new(SecretString::from("test-signing-secret".to_string()))
    }

    /// Signature computed independently of `SignatureVerifier::sign`.
    fn reference_signature(timestamp: &str, body: &str) -> String {
        let sig_basestring = format!("v0:{timestamp}:{body}");
        let mut mac =
            Hmac::<Sha256>::new_from_slice(b"test-signing-secret").expect("valid key length");
        mac.update(sig_basestring.as_bytes());
        format!("v0={}", hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn test_sign_matches_reference() {
        let ts = NOW.to_string();
        let signed = verifier().sign(&ts, b"token=abc&text=list").expect("signs");
        assert_eq!(signed, reference_signature(&ts, "token=abc&text=list"));
    }

    #[test]
    fn test_signature_verification_valid() {
        let ts = NOW.to_string();
        let signature = reference_signature(&ts, "test=body");
        assert!(verifier().verify_at(NOW, &ts, b"test=body", &signature).is_ok());
    }

    #[test]
    fn test_signature_verification_uppercase_hex() {
        let ts = NOW.to_string();
        let signature = reference_signature(&ts, "test=body");
        let upper = format!("v0={}", signature.trim_start_matches("v0=").to_uppercase());
        assert!(verifier().verify_at(NOW, &ts, b"test=body", &upper).is_ok());
    }

    #[test]
    fn test_signature_verification_invalid_signature() {
        let ts = NOW.to_string();
        let result = verifier().verify_at(NOW, &ts, b"test=body", "v0=deadbeef");
        assert!(matches!(result, Err(SlackError::InvalidSignature(_))));
    }

    #[test]
    fn test_signature_verification_malformed_signature() {
        let ts = NOW.to_string();
        for signature in ["", "v0=", "v0=not-hex", "v1=abcd", "abcd"] {
            let result = verifier().verify_at(NOW, &ts, b"test=body", signature);
            assert!(
                matches!(result, Err(SlackError::InvalidSignature(_))),
                "{signature:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_signature_verification_invalid_timestamp() {
        let result = verifier().verify_at(NOW, "not-a-number", b"body", "v0=sig");
        assert!(matches!(result, Err(SlackError::InvalidSignature(_))));
    }

    #[test]
    fn test_signature_verification_old_timestamp() {
        let old = (NOW - 600).to_string();
        let signature = reference_signature(&old, "test=body");
        let result = verifier().verify_at(NOW, &old, b"test=body", &signature);
        assert!(matches!(result, Err(SlackError::InvalidSignature(ref m)) if m.contains("too old")));
    }

    #[test]
    fn test_signature_verification_future_timestamp() {
        let future = (NOW + 600).to_string();
        let signature = reference_signature(&future, "test=body");
        assert!(verifier().verify_at(NOW, &future, b"test=body", &signature).is_err());
    }

    #[test]
    fn test_signature_verification_extreme_timestamps() {
        for ts in [i64::MIN, i64::MAX] {
            let result = verifier().verify_at(NOW, &ts.to_string(), b"body", "v0=00");
            assert!(
                matches!(result, Err(SlackError::InvalidSignature(ref m)) if m.contains("too old")),
                "{ts} should be rejected"
            );
        }
    }

    #[test]
    fn test_signature_verification_tampered_body() {
        let ts = NOW.to_string();
        let signature = reference_signature(&ts, "original=body");
        assert!(verifier().verify_at(NOW, &ts, b"tampered=body", &signature).is_err());
    }

    #[test]
    fn test_signature_verification_wrong_secret() {
        let ts = NOW.to_string();
        let other = SignatureVerifier::new(SecretString::from("another-secret".to_string()));
        let signature = other.sign(&ts, b"a=b").expect("signs");
        assert!(verifier().verify_at(NOW, &ts, b"a=b", &signature).is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let debug_output = format!("{:?}", verifier());
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("test-signing-secret"));
    }
}
