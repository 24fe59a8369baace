use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::orders;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = orders)]
pub struct OrderEntity {
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

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = orders)]
pub struct InsertOrderEntity {
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

/// Partial update applied by the reconciliation flow and the operator PATCH
/// endpoint. `None` fields are left untouched; the payment intent snapshot
/// is overwritten wholesale when present.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = orders)]
pub struct UpdateOrderEntity {
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub payment_intent: Option<Value>,
    pub payment_intent_id: Option<String>,
    pub stripe_session_id: Option<String>,
    pub email: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl UpdateOrderEntity {
    pub fn new() -> Self {
        Self {
            status: None,
            payment_status: None,
            payment_intent: None,
            payment_intent_id: None,
            stripe_session_id: None,
            email: None,
            updated_at: Utc::now(),
        }
    }
}

impl Default for UpdateOrderEntity {
    fn default() -> Self {
        Self::new()
    }
}
