use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::entities::orders::UpdateOrderEntity;
use crate::domain::repositories::order_notifications::OrderNotifier;
use crate::domain::repositories::orders::OrderRepository;
use crate::domain::repositories::payment_gateway::PaymentGateway;
use crate::domain::value_objects::enums::order_statuses::OrderStatus;
use crate::domain::value_objects::stripe_webhook::{
    PaymentIntentSnapshot, StripeCheckoutSession, StripeEvent, StripeEventType,
    StripePaymentIntent, WebhookVerifyError,
};

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("invalid webhook signature")]
    InvalidSignature,
    #[error("malformed webhook payload: {0}")]
    MalformedPayload(String),
    #[error("webhook event carries no order id")]
    MissingOrderMetadata,
    #[error("order not found: {0}")]
    OrderNotFound(Uuid),
    #[error("payment gateway request failed")]
    Gateway(#[source] anyhow::Error),
    #[error("order store unavailable")]
    Store(#[source] anyhow::Error),
}

impl WebhookError {
    /// Client faults are 4xx, infrastructure faults 5xx, so the gateway's
    /// retry schedule only redelivers what can actually recover.
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::InvalidSignature
            | WebhookError::MalformedPayload(_)
            | WebhookError::MissingOrderMetadata => StatusCode::BAD_REQUEST,
            WebhookError::OrderNotFound(_) => StatusCode::NOT_FOUND,
            WebhookError::Gateway(_) => StatusCode::BAD_GATEWAY,
            WebhookError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<WebhookVerifyError> for WebhookError {
    fn from(err: WebhookVerifyError) -> Self {
        match err {
            WebhookVerifyError::InvalidSignature => WebhookError::InvalidSignature,
            WebhookVerifyError::MalformedPayload(inner) => {
                WebhookError::MalformedPayload(inner.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// The order row was updated.
    Processed(Uuid),
    /// The order is already in a terminal status; acknowledged untouched.
    SkippedTerminal(Uuid),
    /// Event type this flow does not reconcile; acknowledged untouched.
    Ignored,
}

pub struct StripeWebhookUseCase<R, G, N>
where
    R: OrderRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
    N: OrderNotifier + Send + Sync + 'static,
{
    order_repository: Arc<R>,
    payment_gateway: Arc<G>,
    order_notifier: Arc<N>,
}

impl<R, G, N> StripeWebhookUseCase<R, G, N>
where
    R: OrderRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
    N: OrderNotifier + Send + Sync + 'static,
{
    pub fn new(order_repository: Arc<R>, payment_gateway: Arc<G>, order_notifier: Arc<N>) -> Self {
        Self {
            order_repository,
            payment_gateway,
            order_notifier,
        }
    }

    /// Verifies and dispatches one webhook delivery. Exactly one store
    /// mutation per processed event; nothing is retried here since the
    /// gateway redelivers on any non-2xx response.
    pub async fn handle(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<WebhookOutcome, WebhookError> {
        let event = self
            .payment_gateway
            .verify_webhook_signature(payload, signature_header)
            .map_err(|err| {
                warn!(error = %err, "stripe_webhook: verification failed");
                WebhookError::from(err)
            })?;

        let event_type = event.event_type();
        info!(event_id = ?event.id, event_type = %event.type_, "stripe_webhook: event verified");

        match event_type {
            StripeEventType::PaymentIntentSucceeded
            | StripeEventType::PaymentIntentPaymentFailed
            | StripeEventType::PaymentIntentCanceled => {
                self.handle_payment_intent_event(&event, &event_type).await
            }
            StripeEventType::CheckoutSessionCompleted => {
                self.handle_checkout_completed(&event).await
            }
            StripeEventType::Other(ref other) => {
                debug!(event_type = %other, "stripe_webhook: unhandled event type acknowledged");
                Ok(WebhookOutcome::Ignored)
            }
        }
    }

    async fn handle_payment_intent_event(
        &self,
        event: &StripeEvent,
        event_type: &StripeEventType,
    ) -> Result<WebhookOutcome, WebhookError> {
        let intent: StripePaymentIntent = serde_json::from_value(event.data.object.clone())
            .map_err(|err| WebhookError::MalformedPayload(err.to_string()))?;

        let order_id = Self::order_id_from_metadata(intent.metadata.as_ref())?;

        self.apply_update(event_type, order_id, &intent, None, None)
            .await
    }

    /// The session payload only references the payment intent by id, so the
    /// full intent is fetched from the gateway before mapping.
    async fn handle_checkout_completed(
        &self,
        event: &StripeEvent,
    ) -> Result<WebhookOutcome, WebhookError> {
        let session: StripeCheckoutSession = serde_json::from_value(event.data.object.clone())
            .map_err(|err| WebhookError::MalformedPayload(err.to_string()))?;

        let order_id = Self::order_id_from_metadata(session.metadata.as_ref())?;

        let payment_intent_id = session.payment_intent.clone().ok_or_else(|| {
            WebhookError::MalformedPayload("checkout session has no payment intent".to_string())
        })?;

        let intent = self
            .payment_gateway
            .retrieve_payment_intent(&payment_intent_id)
            .await
            .map_err(|err| {
                error!(
                    %order_id,
                    payment_intent_id = %payment_intent_id,
                    error = ?err,
                    "stripe_webhook: failed to fetch payment intent"
                );
                WebhookError::Gateway(err)
            })?;

        self.apply_update(
            &StripeEventType::CheckoutSessionCompleted,
            order_id,
            &intent,
            session.customer_email.clone(),
            session.id.clone(),
        )
        .await
    }

    async fn apply_update(
        &self,
        event_type: &StripeEventType,
        order_id: Uuid,
        intent: &StripePaymentIntent,
        customer_email: Option<String>,
        stripe_session_id: Option<String>,
    ) -> Result<WebhookOutcome, WebhookError> {
        let status = OrderStatus::from_gateway(event_type, &intent.status);
        let snapshot = PaymentIntentSnapshot::from(intent);
        let snapshot_value = serde_json::to_value(&snapshot)
            .map_err(|err| WebhookError::MalformedPayload(err.to_string()))?;

        let changeset = UpdateOrderEntity {
            status: Some(status.to_string()),
            payment_status: Some(intent.status.clone()),
            payment_intent: Some(snapshot_value),
            payment_intent_id: Some(intent.id.clone()),
            stripe_session_id,
            email: customer_email,
            updated_at: Utc::now(),
        };

        let updated = self
            .order_repository
            .update_unless_terminal(order_id, changeset)
            .await
            .map_err(|err| {
                error!(%order_id, db_error = ?err, "stripe_webhook: order update failed");
                WebhookError::Store(err)
            })?;

        match updated {
            Some(order) => {
                info!(
                    %order_id,
                    status = %status,
                    payment_status = %intent.status,
                    "stripe_webhook: order reconciled"
                );

                match status {
                    OrderStatus::WaitingDelivery => {
                        self.notify_payment_confirmed(
                            &order.email,
                            order_id,
                            order.total_amount_minor,
                        )
                        .await;
                    }
                    OrderStatus::Failed | OrderStatus::Cancelled => {
                        self.notify_status_update(&order.email, order_id, status).await;
                    }
                    _ => {}
                }

                Ok(WebhookOutcome::Processed(order_id))
            }
            None => {
                let existing = self
                    .order_repository
                    .find_by_id(order_id)
                    .await
                    .map_err(WebhookError::Store)?;

                match existing {
                    Some(order) => {
                        info!(
                            %order_id,
                            current_status = %order.status,
                            incoming_status = %status,
                            "stripe_webhook: order already terminal, update skipped"
                        );
                        Ok(WebhookOutcome::SkippedTerminal(order_id))
                    }
                    None => {
                        // A valid payment event for an unknown order points at a
                        // data-integrity problem upstream.
                        warn!(%order_id, "stripe_webhook: no order row for verified event");
                        Err(WebhookError::OrderNotFound(order_id))
                    }
                }
            }
        }
    }

    async fn notify_payment_confirmed(&self, email: &str, order_id: Uuid, amount_minor: i64) {
        if email.is_empty() {
            debug!(%order_id, "stripe_webhook: no customer email, skipping confirmation");
            return;
        }

        if let Err(err) = self
            .order_notifier
            .send_payment_confirmed(email, order_id, amount_minor)
            .await
        {
            warn!(%order_id, error = ?err, "stripe_webhook: confirmation email failed");
        }
    }

    async fn notify_status_update(&self, email: &str, order_id: Uuid, status: OrderStatus) {
        if email.is_empty() {
            return;
        }

        if let Err(err) = self
            .order_notifier
            .send_status_update(email, order_id, status.as_str())
            .await
        {
            warn!(%order_id, error = ?err, "stripe_webhook: status update email failed");
        }
    }

    fn order_id_from_metadata(
        metadata: Option<&std::collections::HashMap<String, String>>,
    ) -> Result<Uuid, WebhookError> {
        metadata
            .and_then(|meta| meta.get("order_id"))
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .ok_or(WebhookError::MissingOrderMetadata)
    }
}
