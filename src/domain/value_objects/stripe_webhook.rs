use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Signed event envelope pushed by the payment gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeEvent {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub type_: String,
    pub created: Option<i64>,
    pub livemode: Option<bool>,
    pub data: StripeEventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeEventData {
    pub object: Value,
}

impl StripeEvent {
    pub fn event_type(&self) -> StripeEventType {
        StripeEventType::from(self.type_.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StripeEventType {
    PaymentIntentSucceeded,
    PaymentIntentPaymentFailed,
    PaymentIntentCanceled,
    CheckoutSessionCompleted,
    Other(String),
}

impl From<&str> for StripeEventType {
    fn from(value: &str) -> Self {
        match value {
            "payment_intent.succeeded" => StripeEventType::PaymentIntentSucceeded,
            "payment_intent.payment_failed" => StripeEventType::PaymentIntentPaymentFailed,
            "payment_intent.canceled" => StripeEventType::PaymentIntentCanceled,
            "checkout.session.completed" => StripeEventType::CheckoutSessionCompleted,
            other => StripeEventType::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeCheckoutSession {
    pub id: Option<String>,
    pub payment_intent: Option<String>,
    pub customer_email: Option<String>,
    pub amount_total: Option<i64>,
    pub status: Option<String>,
    pub metadata: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripePaymentIntent {
    pub id: String,
    pub status: String,
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub created: Option<i64>,
    pub last_payment_error: Option<Value>,
    pub metadata: Option<HashMap<String, String>>,
}

/// Snapshot of the gateway's payment object at last observed update.
/// Overwritten wholesale on each webhook, never merged field-by-field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentIntentSnapshot {
    pub id: String,
    pub status: String,
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub created: Option<i64>,
    pub last_error: Option<Value>,
}

impl From<&StripePaymentIntent> for PaymentIntentSnapshot {
    fn from(intent: &StripePaymentIntent) -> Self {
        Self {
            id: intent.id.clone(),
            status: intent.status.clone(),
            amount: intent.amount,
            currency: intent.currency.clone(),
            created: intent.created,
            last_error: intent.last_payment_error.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum WebhookVerifyError {
    #[error("invalid webhook signature")]
    InvalidSignature,
    #[error("malformed webhook payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}
