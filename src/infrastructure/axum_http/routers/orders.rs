use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::application::usecases::orders::OrderUseCase;
use crate::auth::{AdminUser, AuthUser};
use crate::domain::repositories::orders::OrderRepository;
use crate::domain::value_objects::orders::{
    CreateOrderModel, CreateOrderResponse, UpdateOrderModel,
};
use crate::infrastructure::axum_http::error_responses::error_response;
use crate::infrastructure::postgres::postgres_connection::PgPoolSquad;
use crate::infrastructure::postgres::repositories::orders::OrderPostgres;

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let order_repository = OrderPostgres::new(Arc::clone(&db_pool));
    let order_usecase = OrderUseCase::new(Arc::new(order_repository));

    Router::new()
        .route("/", post(create_order).get(list_orders))
        .route("/:order_id", get(get_order))
        .route("/update", patch(update_order))
        .with_state(Arc::new(order_usecase))
}

pub async fn create_order<R>(
    State(order_usecase): State<Arc<OrderUseCase<R>>>,
    Json(create_order_model): Json<CreateOrderModel>,
) -> Response
where
    R: OrderRepository + Send + Sync + 'static,
{
    match order_usecase.create_order(create_order_model).await {
        Ok(order_id) => (StatusCode::OK, Json(CreateOrderResponse { order_id })).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersParams {
    pub limit: Option<i64>,
}

pub async fn list_orders<R>(
    State(order_usecase): State<Arc<OrderUseCase<R>>>,
    _admin: AdminUser,
    Query(params): Query<ListOrdersParams>,
) -> Response
where
    R: OrderRepository + Send + Sync + 'static,
{
    match order_usecase.list_orders(params.limit).await {
        Ok(orders) => (StatusCode::OK, Json(orders)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn get_order<R>(
    State(order_usecase): State<Arc<OrderUseCase<R>>>,
    _auth: AuthUser,
    Path(order_id): Path<Uuid>,
) -> Response
where
    R: OrderRepository + Send + Sync + 'static,
{
    match order_usecase.get_order(order_id).await {
        Ok(order) => (StatusCode::OK, Json(order)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}

pub async fn update_order<R>(
    State(order_usecase): State<Arc<OrderUseCase<R>>>,
    _admin: AdminUser,
    Json(update_order_model): Json<UpdateOrderModel>,
) -> Response
where
    R: OrderRepository + Send + Sync + 'static,
{
    match order_usecase.update_order(update_order_model).await {
        Ok(order) => (StatusCode::OK, Json(order)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}
