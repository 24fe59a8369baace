use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::orders::OrderItemModel;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutModel {
    pub items: Vec<OrderItemModel>,
    pub currency: String,
    pub character_name: String,
}

/// One Checkout line item, priced inline rather than by a catalog price id
/// since product prices are converted per-currency before checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutLineItem {
    pub name: String,
    pub description: Option<String>,
    pub currency: String,
    pub unit_amount_minor: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateCheckoutSessionRequest {
    pub line_items: Vec<CheckoutLineItem>,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckoutSessionCreated {
    pub id: String,
    pub url: String,
}

/// Session summary returned to the success page poller.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSessionSummary {
    pub status: Option<String>,
    pub customer_email: Option<String>,
    pub amount_total: Option<i64>,
    pub metadata: Option<HashMap<String, String>>,
}
