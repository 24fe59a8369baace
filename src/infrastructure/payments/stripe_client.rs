use anyhow::Result;
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use sha2::Sha256;
use tracing::error;

use crate::domain::repositories::payment_gateway::PaymentGateway;
use crate::domain::value_objects::checkout::{
    CheckoutSessionCreated, CreateCheckoutSessionRequest,
};
use crate::domain::value_objects::stripe_webhook::{
    StripeCheckoutSession, StripeEvent, StripePaymentIntent, WebhookVerifyError,
};

type HmacSha256 = Hmac<Sha256>;

/// Minimal Stripe client built on reqwest.
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    webhook_secret: String,
    success_url: String,
    cancel_url: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorDetails,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetails {
    #[serde(rename = "type")]
    type_: Option<String>,
    code: Option<String>,
    message: Option<String>,
    param: Option<String>,
    decline_code: Option<String>,
}

impl StripeClient {
    pub fn new(
        secret_key: String,
        webhook_secret: String,
        success_url: String,
        cancel_url: String,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key,
            webhook_secret,
            success_url,
            cancel_url,
        }
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let request_id = resp
            .headers()
            .get("request-id")
            .or_else(|| resp.headers().get("stripe-request-id"))
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        let (error_type, error_code, error_param, error_message, decline_code) =
            match serde_json::from_str::<StripeErrorEnvelope>(&body) {
                Ok(envelope) => {
                    let details = envelope.error;
                    (
                        details.type_,
                        details.code,
                        details.param,
                        details.message,
                        details.decline_code,
                    )
                }
                Err(_) => (None, None, None, None, None),
            };

        error!(
            status = %status,
            stripe_request_id = ?request_id,
            stripe_error_type = ?error_type,
            stripe_error_code = ?error_code,
            stripe_error_param = ?error_param,
            stripe_error_message = ?error_message,
            stripe_decline_code = ?decline_code,
            response_body = %body,
            context = %context,
            "stripe api request failed"
        );

        anyhow::bail!(
            "Stripe API request failed: {} (status {}, request_id={:?})",
            context,
            status,
            request_id
        );
    }
}

#[async_trait]
impl PaymentGateway for StripeClient {
    /// Verifies the webhook signature over the raw body bytes.
    /// https://stripe.com/docs/webhooks/signatures
    fn verify_webhook_signature(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<StripeEvent, WebhookVerifyError> {
        let mut timestamp: Option<&str> = None;
        let mut signature: Option<&str> = None;

        for part in signature_header.split(',') {
            if let Some(rest) = part.strip_prefix("t=") {
                timestamp = Some(rest);
            } else if let Some(rest) = part.strip_prefix("v1=") {
                signature = Some(rest);
            }
        }

        let (Some(timestamp), Some(signature)) = (timestamp, signature) else {
            return Err(WebhookVerifyError::InvalidSignature);
        };

        let provided =
            hex::decode(signature).map_err(|_| WebhookVerifyError::InvalidSignature)?;

        let mut mac = HmacSha256::new_from_slice(self.webhook_secret.as_bytes())
            .map_err(|_| WebhookVerifyError::InvalidSignature)?;
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);

        mac.verify_slice(&provided)
            .map_err(|_| WebhookVerifyError::InvalidSignature)?;

        // Structured parsing happens only after the raw bytes checked out.
        let event: StripeEvent = serde_json::from_slice(payload)?;
        Ok(event)
    }

    async fn retrieve_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<StripePaymentIntent> {
        // https://stripe.com/docs/api/payment_intents/retrieve
        let resp = self
            .http
            .get(format!(
                "https://api.stripe.com/v1/payment_intents/{}",
                payment_intent_id
            ))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "retrieve payment intent").await?;

        let intent: StripePaymentIntent = resp.json().await?;
        Ok(intent)
    }

    /// Creates a Checkout Session from inline price data and returns its id
    /// and redirect URL. https://stripe.com/docs/payments/checkout
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutSessionRequest,
    ) -> Result<CheckoutSessionCreated> {
        let mut body: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            ("success_url".to_string(), self.success_url.clone()),
            ("cancel_url".to_string(), self.cancel_url.clone()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
        ];

        for (idx, item) in request.line_items.iter().enumerate() {
            body.push((
                format!("line_items[{idx}][price_data][currency]"),
                item.currency.clone(),
            ));
            body.push((
                format!("line_items[{idx}][price_data][product_data][name]"),
                item.name.clone(),
            ));
            if let Some(description) = item.description.as_ref() {
                body.push((
                    format!("line_items[{idx}][price_data][product_data][description]"),
                    description.clone(),
                ));
            }
            body.push((
                format!("line_items[{idx}][price_data][unit_amount]"),
                item.unit_amount_minor.to_string(),
            ));
            body.push((format!("line_items[{idx}][quantity]"), item.quantity.to_string()));
        }

        for (key, value) in &request.metadata {
            body.push((format!("metadata[{key}]"), value.clone()));
            // payment_intent.* webhooks read metadata off the intent, not
            // the session, so it has to be propagated at creation time.
            body.push((
                format!("payment_intent_data[metadata][{key}]"),
                value.clone(),
            ));
        }

        let resp = self
            .http
            .post("https://api.stripe.com/v1/checkout/sessions")
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .form(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "create checkout session").await?;

        #[derive(Deserialize)]
        struct CheckoutResp {
            id: String,
            url: Option<String>,
        }

        let parsed: CheckoutResp = resp.json().await?;
        let url = parsed
            .url
            .ok_or_else(|| anyhow::anyhow!("Stripe Checkout session URL is missing"))?;

        Ok(CheckoutSessionCreated { id: parsed.id, url })
    }

    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<Option<StripeCheckoutSession>> {
        // https://stripe.com/docs/api/checkout/sessions/retrieve
        let resp = self
            .http
            .get(format!(
                "https://api.stripe.com/v1/checkout/sessions/{}",
                session_id
            ))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .send()
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = Self::ensure_success(resp, "retrieve checkout session").await?;

        let session: StripeCheckoutSession = resp.json().await?;
        Ok(Some(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEBHOOK_SECRET: &str = "whsec_test_secret";

    fn client() -> StripeClient {
        StripeClient::new(
            "sk_test_123".to_string(),
            WEBHOOK_SECRET.to_string(),
            "https://shop.example/success?session_id={CHECKOUT_SESSION_ID}".to_string(),
            "https://shop.example/cart".to_string(),
        )
    }

    fn sign(payload: &[u8], timestamp: &str, secret: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    fn event_body() -> Vec<u8> {
        br#"{"id":"evt_1","type":"payment_intent.succeeded","data":{"object":{"id":"pi_1","status":"succeeded"}}}"#
            .to_vec()
    }

    #[test]
    fn accepts_a_correctly_signed_payload() {
        let body = event_body();
        let signature = sign(&body, "1700000000", WEBHOOK_SECRET);
        let header = format!("t=1700000000,v1={signature}");

        let event = client().verify_webhook_signature(&body, &header).unwrap();
        assert_eq!(event.type_, "payment_intent.succeeded");
    }

    #[test]
    fn rejects_a_tampered_body() {
        let body = event_body();
        let signature = sign(&body, "1700000000", WEBHOOK_SECRET);
        let header = format!("t=1700000000,v1={signature}");

        let mut tampered = body.clone();
        let last = tampered.len() - 2;
        tampered[last] ^= 0x01;

        let result = client().verify_webhook_signature(&tampered, &header);
        assert!(matches!(result, Err(WebhookVerifyError::InvalidSignature)));
    }

    #[test]
    fn rejects_a_signature_made_with_another_secret() {
        let body = event_body();
        let signature = sign(&body, "1700000000", "whsec_other");
        let header = format!("t=1700000000,v1={signature}");

        let result = client().verify_webhook_signature(&body, &header);
        assert!(matches!(result, Err(WebhookVerifyError::InvalidSignature)));
    }

    #[test]
    fn rejects_a_header_without_signature_parts() {
        let body = event_body();

        for header in ["", "t=1700000000", "v1=abcdef", "junk"] {
            let result = client().verify_webhook_signature(&body, header);
            assert!(matches!(result, Err(WebhookVerifyError::InvalidSignature)));
        }
    }

    #[test]
    fn valid_signature_over_invalid_json_is_malformed_payload() {
        let body = b"not json at all".to_vec();
        let signature = sign(&body, "1700000000", WEBHOOK_SECRET);
        let header = format!("t=1700000000,v1={signature}");

        let result = client().verify_webhook_signature(&body, &header);
        assert!(matches!(result, Err(WebhookVerifyError::MalformedPayload(_))));
    }
}
