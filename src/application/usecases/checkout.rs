use std::collections::HashMap;
use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::entities::orders::UpdateOrderEntity;
use crate::domain::repositories::orders::OrderRepository;
use crate::domain::repositories::payment_gateway::PaymentGateway;
use crate::domain::value_objects::checkout::{
    CheckoutLineItem, CheckoutSessionCreated, CheckoutSessionSummary, CreateCheckoutModel,
    CreateCheckoutSessionRequest,
};

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("{0}")]
    Validation(String),
    #[error("checkout session not found")]
    SessionNotFound,
    #[error("payment gateway request failed")]
    Gateway(#[source] anyhow::Error),
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl CheckoutError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CheckoutError::Validation(_) => StatusCode::BAD_REQUEST,
            CheckoutError::SessionNotFound => StatusCode::NOT_FOUND,
            CheckoutError::Gateway(_) => StatusCode::BAD_GATEWAY,
            CheckoutError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub struct CheckoutUseCase<R, G>
where
    R: OrderRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    order_repository: Arc<R>,
    payment_gateway: Arc<G>,
}

impl<R, G> CheckoutUseCase<R, G>
where
    R: OrderRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    pub fn new(order_repository: Arc<R>, payment_gateway: Arc<G>) -> Self {
        Self {
            order_repository,
            payment_gateway,
        }
    }

    /// Creates a gateway Checkout Session for an existing pending order and
    /// records the session id on the order row. The order id rides along in
    /// the session metadata so webhook deliveries can find their way back.
    pub async fn create_session(
        &self,
        order_id: Uuid,
        model: CreateCheckoutModel,
    ) -> Result<CheckoutSessionCreated, CheckoutError> {
        if model.items.is_empty() {
            return Err(CheckoutError::Validation("no items provided".to_string()));
        }

        let currency = model.currency.to_lowercase();
        let line_items = model
            .items
            .iter()
            .map(|item| CheckoutLineItem {
                name: item.product.name.clone(),
                description: item.product.description.clone(),
                currency: currency.clone(),
                unit_amount_minor: item.product.price_minor,
                quantity: item.quantity,
            })
            .collect();

        let metadata = HashMap::from([
            ("order_id".to_string(), order_id.to_string()),
            ("character_name".to_string(), model.character_name.clone()),
        ]);

        let session = self
            .payment_gateway
            .create_checkout_session(CreateCheckoutSessionRequest {
                line_items,
                metadata,
            })
            .await
            .map_err(|err| {
                error!(%order_id, error = ?err, "checkout: session creation failed");
                CheckoutError::Gateway(err)
            })?;

        let changeset = UpdateOrderEntity {
            stripe_session_id: Some(session.id.clone()),
            updated_at: Utc::now(),
            ..UpdateOrderEntity::new()
        };

        self.order_repository
            .update(order_id, changeset)
            .await
            .map_err(CheckoutError::Internal)?
            .ok_or_else(|| {
                CheckoutError::Validation(format!("order {order_id} does not exist"))
            })?;

        info!(
            %order_id,
            session_id = %session.id,
            currency = %currency,
            "checkout: session created"
        );

        Ok(session)
    }

    pub async fn verify_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSessionSummary, CheckoutError> {
        if session_id.trim().is_empty() {
            return Err(CheckoutError::Validation(
                "session_id is required".to_string(),
            ));
        }

        let session = self
            .payment_gateway
            .retrieve_checkout_session(session_id)
            .await
            .map_err(|err| {
                error!(session_id, error = ?err, "checkout: session retrieval failed");
                CheckoutError::Gateway(err)
            })?
            .ok_or(CheckoutError::SessionNotFound)?;

        Ok(CheckoutSessionSummary {
            status: session.status,
            customer_email: session.customer_email,
            amount_total: session.amount_total,
            metadata: session.metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::orders::OrderEntity;
    use crate::domain::repositories::orders::MockOrderRepository;
    use crate::domain::repositories::payment_gateway::MockPaymentGateway;
    use crate::domain::value_objects::orders::{OrderItemModel, ProductModel};
    use crate::domain::value_objects::stripe_webhook::StripeCheckoutSession;
    use serde_json::json;

    fn checkout_model() -> CreateCheckoutModel {
        CreateCheckoutModel {
            items: vec![OrderItemModel {
                product: ProductModel {
                    name: "Exalted Orb".to_string(),
                    description: Some("Stackable currency".to_string()),
                    price_minor: 350,
                },
                quantity: 10,
            }],
            currency: "USD".to_string(),
            character_name: "WitchHunter".to_string(),
        }
    }

    fn order_row(id: Uuid) -> OrderEntity {
        let now = Utc::now();
        OrderEntity {
            id,
            character_name: "WitchHunter".to_string(),
            email: String::new(),
            items: json!([]),
            total_amount_minor: 3500,
            currency: "usd".to_string(),
            status: "pending".to_string(),
            payment_status: None,
            payment_intent: None,
            payment_intent_id: None,
            stripe_session_id: Some("cs_test_1".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn session_metadata_carries_the_order_id() {
        let order_id = Uuid::new_v4();

        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_create_checkout_session()
            .withf(move |request| {
                request.metadata.get("order_id") == Some(&order_id.to_string())
                    && request.line_items.len() == 1
                    && request.line_items[0].currency == "usd"
                    && request.line_items[0].unit_amount_minor == 350
            })
            .returning(|_| {
                Ok(CheckoutSessionCreated {
                    id: "cs_test_1".to_string(),
                    url: "https://checkout.stripe.com/pay/cs_test_1".to_string(),
                })
            });

        let mut orders = MockOrderRepository::new();
        orders
            .expect_update()
            .withf(move |id, changeset| {
                *id == order_id && changeset.stripe_session_id.as_deref() == Some("cs_test_1")
            })
            .returning(|id, _| Ok(Some(order_row(id))));

        let usecase = CheckoutUseCase::new(Arc::new(orders), Arc::new(gateway));
        let created = usecase
            .create_session(order_id, checkout_model())
            .await
            .unwrap();

        assert_eq!(created.id, "cs_test_1");
    }

    #[tokio::test]
    async fn empty_cart_is_rejected_before_calling_the_gateway() {
        let usecase = CheckoutUseCase::new(
            Arc::new(MockOrderRepository::new()),
            Arc::new(MockPaymentGateway::new()),
        );

        let mut model = checkout_model();
        model.items.clear();

        let err = usecase.create_session(Uuid::new_v4(), model).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Validation(_)));
    }

    #[tokio::test]
    async fn verify_returns_summary_for_known_session() {
        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_retrieve_checkout_session()
            .withf(|id| id == "cs_test_1")
            .returning(|_| {
                Ok(Some(StripeCheckoutSession {
                    id: Some("cs_test_1".to_string()),
                    payment_intent: Some("pi_test_1".to_string()),
                    customer_email: Some("buyer@example.com".to_string()),
                    amount_total: Some(3500),
                    status: Some("complete".to_string()),
                    metadata: None,
                }))
            });

        let usecase =
            CheckoutUseCase::new(Arc::new(MockOrderRepository::new()), Arc::new(gateway));
        let summary = usecase.verify_session("cs_test_1").await.unwrap();

        assert_eq!(summary.customer_email.as_deref(), Some("buyer@example.com"));
        assert_eq!(summary.amount_total, Some(3500));
    }

    #[tokio::test]
    async fn verify_maps_missing_session_to_not_found() {
        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_retrieve_checkout_session()
            .returning(|_| Ok(None));

        let usecase =
            CheckoutUseCase::new(Arc::new(MockOrderRepository::new()), Arc::new(gateway));
        let err = usecase.verify_session("cs_missing").await.unwrap_err();

        assert!(matches!(err, CheckoutError::SessionNotFound));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
