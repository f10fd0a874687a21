//! Paystack REST client (transaction verification only)

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{PaymentError, PaymentGateway, Verification, is_valid_reference};

#[derive(Debug, Deserialize)]
struct Envelope {
    status: bool,
    #[serde(default)]
    message: String,
    data: Option<TransactionData>,
}

#[derive(Debug, Deserialize)]
struct TransactionData {
    status: String,
    reference: String,
    amount: i64,
    currency: String,
}

#[derive(Debug, Clone)]
pub struct PaystackGateway {
    client: reqwest::Client,
    base_url: String,
    secret_key: String,
    public_key: String,
}

impl PaystackGateway {
    pub fn new(
        base_url: impl Into<String>,
        secret_key: impl Into<String>,
        public_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, PaymentError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
            public_key: public_key.into(),
        })
    }

    fn verify_url(&self, reference: &str) -> String {
        format!("{}/transaction/verify/{}", self.base_url, reference)
    }
}

fn parse_verification(body: &[u8]) -> Result<Verification, PaymentError> {
    let envelope: Envelope =
        serde_json::from_slice(body).map_err(|e| PaymentError::Decode(e.to_string()))?;
    if !envelope.status {
        return Err(PaymentError::Provider(envelope.message));
    }
    let data = envelope
        .data
        .ok_or_else(|| PaymentError::Decode("missing transaction data".into()))?;
    Ok(Verification {
        reference: data.reference,
        status: data.status,
        amount_minor: data.amount,
        currency: data.currency,
    })
}

#[async_trait]
impl PaymentGateway for PaystackGateway {
    async fn verify(&self, reference: &str) -> Result<Verification, PaymentError> {
        if !is_valid_reference(reference) {
            return Err(PaymentError::InvalidReference);
        }

        let response = self
            .client
            .get(self.verify_url(reference))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;

        tracing::debug!(reference = %reference, http_status = %status, "Paystack verify response");
        parse_verification(&body)
    }

    fn public_key(&self) -> &str {
        &self.public_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_successful_verification() {
        let body = br#"{
            "status": true,
            "message": "Verification successful",
            "data": {"id": 1, "status": "success", "reference": "FOA-1", "amount": 3000, "currency": "GHS", "paid_at": "2024-07-25T12:00:00.000Z"}
        }"#;
        let v = parse_verification(body).unwrap();
        assert!(v.is_success());
        assert_eq!(v.amount_minor, 3000);
        assert_eq!(v.currency, "GHS");
    }

    #[test]
    fn provider_failure_is_reported() {
        let body = br#"{"status": false, "message": "Transaction reference not found"}"#;
        match parse_verification(body) {
            Err(PaymentError::Provider(msg)) => assert_eq!(msg, "Transaction reference not found"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(parse_verification(b"<html>"), Err(PaymentError::Decode(_))));
    }

    #[test]
    fn verify_url_trims_trailing_slash() {
        let gw = PaystackGateway::new("https://api.paystack.co/", "sk", "pk", Duration::from_secs(1)).unwrap();
        assert_eq!(gw.verify_url("FOA-1"), "https://api.paystack.co/transaction/verify/FOA-1");
        assert_eq!(gw.public_key(), "pk");
    }
}
