//! Stripe webhook signature verification.
//!
//! The `stripe-signature` header looks like `t=1700000000,v1=<hex>,v0=<hex>`.
//! Each `v1` value is an HMAC-SHA256 of `"<t>.<raw body>"` keyed with the
//! endpoint secret. The body must be the exact bytes received; parsing and
//! re-serializing before verification changes them.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;
use std::collections::HashMap;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Event type that confirms a paid boost
pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

/// Metadata key carrying the story id on a checkout session
pub const STORY_ID_METADATA_KEY: &str = "storyId";

#[derive(Error, Debug)]
pub enum SignatureError {
    #[error("missing stripe-signature header")]
    MissingHeader,

    #[error("malformed stripe-signature header")]
    MalformedHeader,

    #[error("webhook secret is not configured")]
    SecretNotConfigured,

    #[error("webhook secret is not a usable HMAC key")]
    InvalidSecret,

    #[error("timestamp outside the tolerance zone")]
    TimestampOutsideTolerance,

    #[error("no signatures found matching the expected signature for payload")]
    NoMatchingSignature,

    #[error("invalid event payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

/// A verified webhook event
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: Value,
}

/// The fields of a checkout session this service reads
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSessionObject {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl WebhookEvent {
    /// Story id from the checkout session metadata, if this is a completed
    /// checkout carrying one.
    pub fn boosted_story_id(&self) -> Option<String> {
        if self.event_type != CHECKOUT_SESSION_COMPLETED {
            return None;
        }
        let session: CheckoutSessionObject =
            serde_json::from_value(self.data.object.clone()).ok()?;
        session
            .metadata
            .get(STORY_ID_METADATA_KEY)
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
    }
}

/// Hex HMAC-SHA256 of `"<timestamp>.<payload>"`.
pub fn compute_signature(
    secret: &str,
    timestamp: i64,
    payload: &[u8],
) -> Result<String, SignatureError> {
    let mac = signing_mac(secret, timestamp, payload)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn signing_mac(
    secret: &str,
    timestamp: i64,
    payload: &[u8],
) -> Result<HmacSha256, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| SignatureError::InvalidSecret)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<Vec<u8>>,
}

fn parse_header(header: &str) -> Result<SignatureHeader, SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for item in header.split(',') {
        let Some((key, value)) = item.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => {
                timestamp = Some(
                    value
                        .parse::<i64>()
                        .map_err(|_| SignatureError::MalformedHeader)?,
                )
            }
            // Unparseable v1 values simply never match
            "v1" => {
                if let Ok(bytes) = hex::decode(value) {
                    signatures.push(bytes);
                }
            }
            _ => {}
        }
    }

    match timestamp {
        Some(timestamp) => Ok(SignatureHeader {
            timestamp,
            signatures,
        }),
        None => Err(SignatureError::MalformedHeader),
    }
}

/// Verify `payload` against the header and decode the event.
///
/// `now` is the current unix time in seconds. A `tolerance_secs` of zero or
/// less disables the timestamp check.
pub fn verify_event(
    payload: &[u8],
    signature_header: Option<&str>,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> Result<WebhookEvent, SignatureError> {
    let header = signature_header
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or(SignatureError::MissingHeader)?;

    if secret.is_empty() {
        return Err(SignatureError::SecretNotConfigured);
    }

    let parsed = parse_header(header)?;

    let mut matched = false;
    for candidate in &parsed.signatures {
        if signing_mac(secret, parsed.timestamp, payload)?
            .verify_slice(candidate)
            .is_ok()
        {
            matched = true;
            break;
        }
    }
    if !matched {
        return Err(SignatureError::NoMatchingSignature);
    }

    if tolerance_secs > 0 && (now - parsed.timestamp).abs() > tolerance_secs {
        return Err(SignatureError::TimestampOutsideTolerance);
    }

    Ok(serde_json::from_slice(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const NOW: i64 = 1_700_000_000;

    fn completed_payload(story_id: &str) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "id": "evt_1",
            "type": CHECKOUT_SESSION_COMPLETED,
            "data": { "object": {
                "id": "cs_test_1",
                "object": "checkout.session",
                "metadata": { "storyId": story_id }
            }}
        }))
        .unwrap()
    }

    fn header_for(payload: &[u8], timestamp: i64) -> String {
        format!(
            "t={},v1={}",
            timestamp,
            compute_signature(SECRET, timestamp, payload).unwrap()
        )
    }

    #[test]
    fn test_valid_signature_decodes_event() {
        let payload = completed_payload("story-1");
        let header = header_for(&payload, NOW);

        let event = verify_event(&payload, Some(&header), SECRET, 300, NOW).unwrap();
        assert_eq!(event.id, "evt_1");
        assert_eq!(event.boosted_story_id().as_deref(), Some("story-1"));
    }

    #[test]
    fn test_any_matching_v1_is_accepted() {
        let payload = completed_payload("story-1");
        let good = compute_signature(SECRET, NOW, &payload).unwrap();
        let header = format!("t={NOW},v1={},v0=deadbeef,v1={good}", "00".repeat(32));

        assert!(verify_event(&payload, Some(&header), SECRET, 300, NOW).is_ok());
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let payload = completed_payload("story-1");
        let header = header_for(&payload, NOW);
        let tampered = completed_payload("story-2");

        let err = verify_event(&tampered, Some(&header), SECRET, 300, NOW).unwrap_err();
        assert!(matches!(err, SignatureError::NoMatchingSignature));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let payload = completed_payload("story-1");
        let header = header_for(&payload, NOW);

        let err = verify_event(&payload, Some(&header), "whsec_other", 300, NOW).unwrap_err();
        assert!(matches!(err, SignatureError::NoMatchingSignature));
    }

    #[test]
    fn test_stale_timestamp_is_rejected() {
        let payload = completed_payload("story-1");
        let header = header_for(&payload, NOW - 301);

        let err = verify_event(&payload, Some(&header), SECRET, 300, NOW).unwrap_err();
        assert!(matches!(err, SignatureError::TimestampOutsideTolerance));

        assert!(verify_event(&payload, Some(&header), SECRET, 0, NOW).is_ok());
    }

    #[test]
    fn test_missing_and_malformed_headers() {
        let payload = completed_payload("story-1");

        assert!(matches!(
            verify_event(&payload, None, SECRET, 300, NOW).unwrap_err(),
            SignatureError::MissingHeader
        ));
        assert!(matches!(
            verify_event(&payload, Some("v1=abc"), SECRET, 300, NOW).unwrap_err(),
            SignatureError::MalformedHeader
        ));
        assert!(matches!(
            verify_event(&payload, Some("t=soon,v1=abc"), SECRET, 300, NOW).unwrap_err(),
            SignatureError::MalformedHeader
        ));
        assert!(matches!(
            verify_event(&payload, Some(&format!("t={NOW}")), SECRET, 300, NOW).unwrap_err(),
            SignatureError::NoMatchingSignature
        ));
    }

    #[test]
    fn test_empty_secret_fails_closed() {
        let payload = completed_payload("story-1");
        let header = format!("t={NOW},v1={}", compute_signature("", NOW, &payload).unwrap());

        let err = verify_event(&payload, Some(&header), "", 300, NOW).unwrap_err();
        assert!(matches!(err, SignatureError::SecretNotConfigured));
    }

    #[test]
    fn test_signed_garbage_is_malformed_payload() {
        let payload = b"not json at all".to_vec();
        let header = header_for(&payload, NOW);

        let err = verify_event(&payload, Some(&header), SECRET, 300, NOW).unwrap_err();
        assert!(matches!(err, SignatureError::MalformedPayload(_)));
    }

    #[test]
    fn test_other_event_types_carry_no_story() {
        let payload = serde_json::to_vec(&serde_json::json!({
            "id": "evt_2",
            "type": "payment_intent.succeeded",
            "data": { "object": { "metadata": { "storyId": "story-1" } } }
        }))
        .unwrap();
        let header = header_for(&payload, NOW);

        let event = verify_event(&payload, Some(&header), SECRET, 300, NOW).unwrap();
        assert_eq!(event.boosted_story_id(), None);
    }
}
