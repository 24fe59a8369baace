use std::str::FromStr;
use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::entities::orders::UpdateOrderEntity;
use crate::domain::repositories::orders::OrderRepository;
use crate::domain::value_objects::enums::order_statuses::{ALLOWED_ORDER_STATUSES, OrderStatus};
use crate::domain::value_objects::orders::{CreateOrderModel, OrderModel, UpdateOrderModel};

const DEFAULT_LIST_LIMIT: i64 = 50;
const MAX_LIST_LIMIT: i64 = 200;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("{0}")]
    Validation(String),
    #[error("order not found: {0}")]
    NotFound(Uuid),
    #[error("failed to update order")]
    Internal(#[from] anyhow::Error),
}

impl OrderError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            OrderError::Validation(_) => StatusCode::BAD_REQUEST,
            OrderError::NotFound(_) => StatusCode::NOT_FOUND,
            OrderError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub struct OrderUseCase<R>
where
    R: OrderRepository + Send + Sync + 'static,
{
    order_repository: Arc<R>,
}

impl<R> OrderUseCase<R>
where
    R: OrderRepository + Send + Sync + 'static,
{
    pub fn new(order_repository: Arc<R>) -> Self {
        Self { order_repository }
    }

    pub async fn create_order(&self, model: CreateOrderModel) -> Result<Uuid, OrderError> {
        if model.character_name.trim().is_empty() {
            return Err(OrderError::Validation(
                "characterName is required".to_string(),
            ));
        }
        if model.items.is_empty() {
            return Err(OrderError::Validation("no items provided".to_string()));
        }

        let order = self
            .order_repository
            .insert(model.to_entity())
            .await
            .map_err(|err| {
                error!(db_error = ?err, "orders: failed to insert order");
                OrderError::Internal(err)
            })?;

        info!(
            order_id = %order.id,
            character_name = %order.character_name,
            total_amount_minor = order.total_amount_minor,
            currency = %order.currency,
            "orders: order created"
        );

        Ok(order.id)
    }

    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderModel, OrderError> {
        let order = self
            .order_repository
            .find_by_id(order_id)
            .await
            .map_err(OrderError::Internal)?
            .ok_or(OrderError::NotFound(order_id))?;

        Ok(OrderModel::from(order))
    }

    pub async fn list_orders(&self, limit: Option<i64>) -> Result<Vec<OrderModel>, OrderError> {
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);

        let orders = self
            .order_repository
            .list_recent(limit)
            .await
            .map_err(OrderError::Internal)?;

        Ok(orders.into_iter().map(OrderModel::from).collect())
    }

    /// Operator-driven partial update. Unlike the webhook path this is an
    /// unconditional overwrite so an operator can close out any order.
    pub async fn update_order(&self, model: UpdateOrderModel) -> Result<OrderModel, OrderError> {
        let status = OrderStatus::from_str(&model.status).map_err(|_| {
            OrderError::Validation(format!(
                "invalid status '{}', must be one of: {}",
                model.status, ALLOWED_ORDER_STATUSES
            ))
        })?;

        let payment_status = model
            .payment_status
            .clone()
            .or_else(|| model.payment_intent.as_ref().map(|pi| pi.status.clone()));

        let payment_intent_id = model.payment_intent.as_ref().map(|pi| pi.id.clone());
        let payment_intent = match model.payment_intent.as_ref() {
            Some(snapshot) => Some(
                serde_json::to_value(snapshot)
                    .map_err(|err| OrderError::Validation(err.to_string()))?,
            ),
            None => None,
        };

        let changeset = UpdateOrderEntity {
            status: Some(status.to_string()),
            payment_status,
            payment_intent,
            payment_intent_id,
            stripe_session_id: model.stripe_session_id.clone(),
            email: None,
            updated_at: Utc::now(),
        };

        let updated = self
            .order_repository
            .update(model.order_id, changeset)
            .await
            .map_err(|err| {
                error!(order_id = %model.order_id, db_error = ?err, "orders: update failed");
                OrderError::Internal(err)
            })?;

        match updated {
            Some(order) => {
                info!(order_id = %order.id, status = %status, "orders: order updated");
                Ok(OrderModel::from(order))
            }
            None => {
                warn!(order_id = %model.order_id, "orders: update for unknown order");
                Err(OrderError::NotFound(model.order_id))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::orders::OrderEntity;
    use crate::domain::repositories::orders::MockOrderRepository;
    use crate::domain::value_objects::orders::{OrderItemModel, ProductModel};
    use serde_json::json;

    fn order_row(id: Uuid, status: &str) -> OrderEntity {
        let now = Utc::now();
        OrderEntity {
            id,
            character_name: "WitchHunter".to_string(),
            email: String::new(),
            items: json!([]),
            total_amount_minor: 1000,
            currency: "eur".to_string(),
            status: status.to_string(),
            payment_status: None,
            payment_intent: None,
            payment_intent_id: None,
            stripe_session_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn create_model() -> CreateOrderModel {
        CreateOrderModel {
            character_name: "WitchHunter".to_string(),
            items: vec![OrderItemModel {
                product: ProductModel {
                    name: "Divine Orb".to_string(),
                    description: None,
                    price_minor: 500,
                },
                quantity: 2,
            }],
            total_amount_minor: 1000,
            currency: "EUR".to_string(),
            session_id: None,
        }
    }

    #[tokio::test]
    async fn creates_pending_order_with_lowercased_currency() {
        let mut repo = MockOrderRepository::new();
        repo.expect_insert()
            .withf(|entity| {
                entity.status == "pending" && entity.currency == "eur" && entity.email.is_empty()
            })
            .returning(|_| Ok(order_row(Uuid::new_v4(), "pending")));

        let usecase = OrderUseCase::new(Arc::new(repo));
        usecase.create_order(create_model()).await.unwrap();
    }

    #[tokio::test]
    async fn rejects_order_without_items() {
        let usecase = OrderUseCase::new(Arc::new(MockOrderRepository::new()));

        let mut model = create_model();
        model.items.clear();

        let err = usecase.create_order(model).await.unwrap_err();
        assert!(matches!(err, OrderError::Validation(_)));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rejects_status_outside_the_canonical_enum() {
        let usecase = OrderUseCase::new(Arc::new(MockOrderRepository::new()));

        // The American spelling is not part of the validated vocabulary.
        let model = UpdateOrderModel {
            order_id: Uuid::new_v4(),
            status: "canceled".to_string(),
            payment_status: None,
            payment_intent: None,
            stripe_session_id: None,
        };

        let err = usecase.update_order(model).await.unwrap_err();
        assert!(matches!(err, OrderError::Validation(_)));
    }

    #[tokio::test]
    async fn update_for_unknown_order_is_not_found() {
        let order_id = Uuid::new_v4();

        let mut repo = MockOrderRepository::new();
        repo.expect_update().returning(|_, _| Ok(None));

        let usecase = OrderUseCase::new(Arc::new(repo));
        let err = usecase
            .update_order(UpdateOrderModel {
                order_id,
                status: "completed".to_string(),
                payment_status: None,
                payment_intent: None,
                stripe_session_id: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::NotFound(id) if id == order_id));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_applies_status_and_returns_updated_row() {
        let order_id = Uuid::new_v4();

        let mut repo = MockOrderRepository::new();
        repo.expect_update()
            .withf(move |id, changeset| {
                *id == order_id && changeset.status.as_deref() == Some("waiting_delivery")
            })
            .returning(move |id, _| Ok(Some(order_row(id, "waiting_delivery"))));

        let usecase = OrderUseCase::new(Arc::new(repo));
        let updated = usecase
            .update_order(UpdateOrderModel {
                order_id,
                status: "waiting_delivery".to_string(),
                payment_status: None,
                payment_intent: None,
                stripe_session_id: None,
            })
            .await
            .unwrap();

        assert_eq!(updated.status, "waiting_delivery");
    }
}
