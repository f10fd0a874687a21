//! Paystack webhook verification
//!
//! Paystack signs the raw request body with HMAC-SHA512 keyed by the secret
//! key and sends the hex digest in `x-paystack-signature`.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha512;

pub const SIGNATURE_HEADER: &str = "x-paystack-signature";
pub const CHARGE_SUCCESS: &str = "charge.success";

#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl WebhookEvent {
    pub fn reference(&self) -> Option<&str> {
        self.data.get("reference").and_then(|r| r.as_str())
    }
}

/// Constant-time check of the body signature
pub fn verify_signature(payload: &[u8], signature: &str, secret: &str) -> Result<(), &'static str> {
    let mut mac = Hmac::<Sha512>::new_from_slice(secret.as_bytes()).map_err(|_| "HMAC key error")?;
    mac.update(payload);
    let sig_bytes = hex::decode(signature.trim()).map_err(|_| "Invalid signature hex")?;
    mac.verify_slice(&sig_bytes)
        .map_err(|_| "Webhook signature mismatch")
}

#[cfg(test)]
pub(crate) fn sign(payload: &[u8], secret: &str) -> String {
    let mut mac = Hmac::<Sha512>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &[u8] = br#"{"event":"charge.success","data":{"reference":"FOA-abc","amount":3000}}"#;

    #[test]
    fn accepts_valid_signature() {
        let sig = sign(BODY, "sk_test");
        assert!(verify_signature(BODY, &sig, "sk_test").is_ok());
        assert!(verify_signature(BODY, &sig.to_uppercase(), "sk_test").is_ok());
    }

    #[test]
    fn rejects_tampering() {
        let sig = sign(BODY, "sk_test");
        assert_eq!(verify_signature(BODY, &sig, "other"), Err("Webhook signature mismatch"));
        let mut tampered = BODY.to_vec();
        tampered[10] = b'X';
        assert!(verify_signature(&tampered, &sig, "sk_test").is_err());
        assert_eq!(verify_signature(BODY, "zz", "sk_test"), Err("Invalid signature hex"));
    }

    #[test]
    fn event_reference() {
        let event: WebhookEvent = serde_json::from_slice(BODY).unwrap();
        assert_eq!(event.event, CHARGE_SUCCESS);
        assert_eq!(event.reference(), Some("FOA-abc"));
    }
}
