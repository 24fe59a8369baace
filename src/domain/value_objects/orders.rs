use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::entities::orders::{InsertOrderEntity, OrderEntity};
use crate::domain::value_objects::enums::order_statuses::OrderStatus;
use crate::domain::value_objects::stripe_webhook::PaymentIntentSnapshot;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductModel {
    pub name: String,
    pub description: Option<String>,
    /// Unit price in the smallest currency unit.
    pub price_minor: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItemModel {
    pub product: ProductModel,
    pub quantity: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderModel {
    pub character_name: String,
    pub items: Vec<OrderItemModel>,
    pub total_amount_minor: i64,
    pub currency: String,
    pub session_id: Option<String>,
}

impl CreateOrderModel {
    pub fn to_entity(&self) -> InsertOrderEntity {
        let now = Utc::now();

        InsertOrderEntity {
            character_name: self.character_name.clone(),
            email: String::new(),
            items: serde_json::to_value(&self.items).unwrap_or(Value::Array(Vec::new())),
            total_amount_minor: self.total_amount_minor,
            currency: self.currency.to_lowercase(),
            status: OrderStatus::Pending.to_string(),
            payment_status: None,
            payment_intent: None,
            payment_intent_id: None,
            stripe_session_id: self.session_id.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub order_id: Uuid,
}

/// Partial update accepted by the operator PATCH endpoint. Field naming
/// matches the storefront client wire format.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrderModel {
    #[serde(rename = "orderId")]
    pub order_id: Uuid,
    pub status: String,
    pub payment_status: Option<String>,
    #[serde(rename = "paymentIntent")]
    pub payment_intent: Option<PaymentIntentSnapshot>,
    pub stripe_session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderModel {
    pub id: Uuid,
    pub character_name: String,
    pub email: String,
    pub items: Value,
    pub total_amount_minor: i64,
    pub currency: String,
    pub status: String,
    pub payment_status: Option<String>,
    pub payment_intent: Option<Value>,
    pub payment_intent_id: Option<String>,
    pub stripe_session_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OrderEntity> for OrderModel {
    fn from(entity: OrderEntity) -> Self {
        Self {
            id: entity.id,
            character_name: entity.character_name,
            email: entity.email,
            items: entity.items,
            total_amount_minor: entity.total_amount_minor,
            currency: entity.currency,
            status: entity.status,
            payment_status: entity.payment_status,
            payment_intent: entity.payment_intent,
            payment_intent_id: entity.payment_intent_id,
            stripe_session_id: entity.stripe_session_id,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
