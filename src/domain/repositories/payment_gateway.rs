use anyhow::Result;
use async_trait::async_trait;

use crate::domain::value_objects::checkout::{CheckoutSessionCreated, CreateCheckoutSessionRequest};
use crate::domain::value_objects::stripe_webhook::{
    StripeCheckoutSession, StripeEvent, StripePaymentIntent, WebhookVerifyError,
};

/// Seam over the hosted payment gateway. The webhook flow only ever reads
/// from the gateway; session creation is the one write.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Validates the signature header against the raw request bytes and
    /// decodes the event envelope. Must run on the exact bytes received;
    /// a re-serialized body will not reproduce the signed payload.
    fn verify_webhook_signature(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<StripeEvent, WebhookVerifyError>;

    async fn retrieve_payment_intent(&self, payment_intent_id: &str)
    -> Result<StripePaymentIntent>;

    async fn create_checkout_session(
        &self,
        request: CreateCheckoutSessionRequest,
    ) -> Result<CheckoutSessionCreated>;

    /// Returns `None` when the gateway has no session with this id.
    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<Option<StripeCheckoutSession>>;
}
