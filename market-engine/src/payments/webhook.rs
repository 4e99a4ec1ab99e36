//! Stripe webhook signature verification and envelope parsing

use super::error::{PaymentError, PaymentResult};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

pub const EVENT_INTENT_SUCCEEDED: &str = "payment_intent.succeeded";
pub const EVENT_INTENT_FAILED: &str = "payment_intent.payment_failed";

/// Verify a `Stripe-Signature` header (`t=<unix>,v1=<hex>`)
///
/// The HMAC-SHA256 of `"<t>.<payload>"` must match one of the `v1` entries
/// and `t` must be within `tolerance_secs` of `now_secs`.
pub fn verify_signature(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
    tolerance_secs: i64,
    now_secs: i64,
) -> PaymentResult<()> {
    let mut timestamp = "";
    let mut signatures = Vec::new();
    for part in sig_header.split(',') {
        let part = part.trim();
        if let Some(t) = part.strip_prefix("t=") {
            timestamp = t;
        } else if let Some(v) = part.strip_prefix("v1=") {
            signatures.push(v);
        }
    }
    if timestamp.is_empty() || signatures.is_empty() {
        return Err(PaymentError::InvalidSignature);
    }

    let matched = signatures.iter().any(|signature| {
        let Ok(sig_bytes) = hex::decode(signature) else {
            return false;
        };
        let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret.as_bytes()) else {
            return false;
        };
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);
        // constant-time compare
        mac.verify_slice(&sig_bytes).is_ok()
    });
    if !matched {
        return Err(PaymentError::InvalidSignature);
    }

    let ts: i64 = timestamp
        .parse()
        .map_err(|_| PaymentError::InvalidSignature)?;
    if tolerance_secs > 0 && now_secs.abs_diff(ts) > tolerance_secs.unsigned_abs() {
        return Err(PaymentError::InvalidSignature);
    }

    Ok(())
}

/// Build a header the way Stripe signs deliveries
pub fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac = match Hmac::<Sha256>::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        // HMAC accepts keys of any length
        Err(_) => return format!("t={}", timestamp),
    };
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    format!(
        "t={},v1={}",
        timestamp,
        hex::encode(mac.finalize().into_bytes())
    )
}

/// Event types the coordinator acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentEventKind {
    Succeeded,
    Failed,
}

impl IntentEventKind {
    fn from_event_type(event_type: &str) -> Option<Self> {
        match event_type {
            EVENT_INTENT_SUCCEEDED => Some(Self::Succeeded),
            EVENT_INTENT_FAILED => Some(Self::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    id: String,
    #[serde(rename = "type", default)]
    event_type: String,
    #[serde(default)]
    data: EnvelopeData,
}

#[derive(Debug, Default, Deserialize)]
struct EnvelopeData {
    #[serde(default)]
    object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct IntentObject {
    #[serde(default)]
    id: String,
}

/// A verified webhook delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEvent {
    pub id: String,
    pub event_type: String,
    /// Set for the intent events the coordinator handles
    pub intent: Option<(IntentEventKind, String)>,
}

/// Parse the envelope and, for intent events, the embedded intent id
pub fn parse_event(payload: &[u8]) -> PaymentResult<WebhookEvent> {
    let envelope: Envelope =
        serde_json::from_slice(payload).map_err(|_| PaymentError::InvalidPayload)?;
    let id = envelope.id.trim().to_string();
    if id.is_empty() {
        return Err(PaymentError::InvalidPayload);
    }

    let intent = match IntentEventKind::from_event_type(envelope.event_type.trim()) {
        Some(kind) => {
            let object: IntentObject = serde_json::from_value(envelope.data.object)
                .map_err(|_| PaymentError::InvalidPayload)?;
            let provider_ref = object.id.trim().to_string();
            if provider_ref.is_empty() {
                return Err(PaymentError::InvalidPayload);
            }
            Some((kind, provider_ref))
        }
        None => None,
    };

    Ok(WebhookEvent {
        id,
        event_type: envelope.event_type,
        intent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test";

    #[test]
    fn test_signature_round_trip() {
        let payload = br#"{"id":"evt_1"}"#;
        let header = sign_payload(payload, SECRET, 1_700_000_000);
        assert!(verify_signature(payload, &header, SECRET, 300, 1_700_000_100).is_ok());
    }

    #[test]
    fn test_signature_rejections() {
        let payload = br#"{"id":"evt_1"}"#;
        let header = sign_payload(payload, SECRET, 1_700_000_000);

        // wrong secret
        assert_eq!(
            verify_signature(payload, &header, "whsec_other", 300, 1_700_000_000),
            Err(PaymentError::InvalidSignature)
        );
        // tampered payload
        assert_eq!(
            verify_signature(br#"{"id":"evt_2"}"#, &header, SECRET, 300, 1_700_000_000),
            Err(PaymentError::InvalidSignature)
        );
        // too old
        assert_eq!(
            verify_signature(payload, &header, SECRET, 300, 1_700_000_301),
            Err(PaymentError::InvalidSignature)
        );
        // malformed header
        for bad in ["", "t=1700000000", "v1=abcd", "t=x,v1=zz"] {
            assert_eq!(
                verify_signature(payload, bad, SECRET, 300, 1_700_000_000),
                Err(PaymentError::InvalidSignature)
            );
        }
    }

    #[test]
    fn test_extreme_timestamps_rejected() {
        let payload = br#"{"id":"evt_1"}"#;
        for (t, now) in [(i64::MIN, 1_700_000_000), (i64::MAX, -1), (i64::MIN, i64::MAX)] {
            let header = sign_payload(payload, SECRET, t);
            assert_eq!(
                verify_signature(payload, &header, SECRET, 300, now),
                Err(PaymentError::InvalidSignature)
            );
        }
        // tolerance 0 skips the window check
        let header = sign_payload(payload, SECRET, i64::MIN);
        assert!(verify_signature(payload, &header, SECRET, 0, 1_700_000_000).is_ok());
    }

    #[test]
    fn test_any_v1_entry_may_match() {
        let payload = br#"{"id":"evt_1"}"#;
        let header = sign_payload(payload, SECRET, 1_700_000_000);
        let rotated = header.replace("v1=", "v1=00ff,v1=");
        assert!(verify_signature(payload, &rotated, SECRET, 300, 1_700_000_000).is_ok());
    }

    #[test]
    fn test_parse_intent_event() {
        let payload = br#"{"id":" evt_1 ","type":"payment_intent.succeeded","data":{"object":{"id":"pi_1","status":"succeeded"}}}"#;
        let event = parse_event(payload).unwrap();
        assert_eq!(event.id, "evt_1");
        assert_eq!(
            event.intent,
            Some((IntentEventKind::Succeeded, "pi_1".to_string()))
        );
    }

    #[test]
    fn test_parse_unknown_event_skips_object() {
        let payload = br#"{"id":"evt_2","type":"charge.refunded","data":{"object":"not-an-intent"}}"#;
        let event = parse_event(payload).unwrap();
        assert_eq!(event.event_type, "charge.refunded");
        assert!(event.intent.is_none());
    }

    #[test]
    fn test_parse_rejects_bad_payloads() {
        let cases: [&[u8]; 4] = [
            b"not json",
            br#"{"type":"payment_intent.succeeded"}"#,
            br#"{"id":"evt_1","type":"payment_intent.payment_failed","data":{"object":{"id":" "}}}"#,
            br#"{"id":"evt_1","type":"payment_intent.succeeded"}"#,
        ];
        for payload in cases {
            assert_eq!(parse_event(payload), Err(PaymentError::InvalidPayload));
        }
    }
}
