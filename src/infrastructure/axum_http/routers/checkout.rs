use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::application::usecases::checkout::CheckoutUseCase;
use crate::domain::repositories::orders::OrderRepository;
use crate::domain::repositories::payment_gateway::PaymentGateway;
use crate::domain::value_objects::checkout::CreateCheckoutModel;
use crate::infrastructure::axum_http::error_responses::error_response;
use crate::infrastructure::payments::stripe_client::StripeClient;
use crate::infrastructure::postgres::postgres_connection::PgPoolSquad;
use crate::infrastructure::postgres::repositories::orders::OrderPostgres;

pub fn routes(db_pool: Arc<PgPoolSquad>, stripe_client: Arc<StripeClient>) -> Router {
    let order_repository = OrderPostgres::new(Arc::clone(&db_pool));
    let checkout_usecase = CheckoutUseCase::new(Arc::new(order_repository), stripe_client);

    Router::new()
        .route("/sessions", post(create_session))
        .route("/verify", get(verify_session))
        .with_state(Arc::new(checkout_usecase))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutSessionBody {
    pub order_id: Uuid,
    #[serde(flatten)]
    pub checkout: CreateCheckoutModel,
}

pub async fn create_session<R, G>(
    State(checkout_usecase): State<Arc<CheckoutUseCase<R, G>>>,
    Json(body): Json<CreateCheckoutSessionBody>,
) -> Response
where
    R: OrderRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    match checkout_usecase
        .create_session(body.order_id, body.checkout)
        .await
    {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

#[derive(Debug, Deserialize)]
pub struct VerifySessionParams {
    pub session_id: Option<String>,
}

pub async fn verify_session<R, G>(
    State(checkout_usecase): State<Arc<CheckoutUseCase<R, G>>>,
    Query(params): Query<VerifySessionParams>,
) -> Response
where
    R: OrderRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    let Some(session_id) = params.session_id else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "session_id is required".to_string(),
        );
    };

    match checkout_usecase.verify_session(&session_id).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}
