use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::json;
use tracing::warn;

use crate::application::usecases::stripe_webhook::StripeWebhookUseCase;
use crate::config::config_model::Resend;
use crate::domain::repositories::order_notifications::OrderNotifier;
use crate::domain::repositories::orders::OrderRepository;
use crate::domain::repositories::payment_gateway::PaymentGateway;
use crate::infrastructure::axum_http::error_responses::error_response;
use crate::infrastructure::notifications::resend_mailer::ResendMailer;
use crate::infrastructure::payments::stripe_client::StripeClient;
use crate::infrastructure::postgres::postgres_connection::PgPoolSquad;
use crate::infrastructure::postgres::repositories::orders::OrderPostgres;

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    stripe_client: Arc<StripeClient>,
    resend: Option<Resend>,
) -> Router {
    let order_repository = OrderPostgres::new(Arc::clone(&db_pool));
    let order_notifier = ResendMailer::new(resend);
    let stripe_webhook_usecase = StripeWebhookUseCase::new(
        Arc::new(order_repository),
        stripe_client,
        Arc::new(order_notifier),
    );

    Router::new()
        .route("/stripe", post(handle_stripe_webhook))
        .with_state(Arc::new(stripe_webhook_usecase))
}

/// The body must stay raw until the signature over its exact bytes has been
/// checked, so this handler takes `Bytes` rather than a JSON extractor.
pub async fn handle_stripe_webhook<R, G, N>(
    State(usecase): State<Arc<StripeWebhookUseCase<R, G, N>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    R: OrderRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
    N: OrderNotifier + Send + Sync + 'static,
{
    let Some(signature) = headers
        .get("stripe-signature")
        .and_then(|value| value.to_str().ok())
    else {
        warn!("stripe_webhook: missing stripe-signature header");
        return error_response(
            StatusCode::BAD_REQUEST,
            "missing stripe-signature header".to_string(),
        );
    };

    match usecase.handle(&body, signature).await {
        Ok(_) => (StatusCode::OK, Json(json!({ "received": true }))).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}
