use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::enums::payment_statuses::PaymentStatus;
use crate::domain::value_objects::stripe_webhook::StripeEventType;

/// Fulfillment state of an order as seen by the storefront operator.
/// The canonical vocabulary; the British spelling `cancelled` is
/// authoritative for order status, while the mirrored payment status keeps
/// the gateway's own `canceled`.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    WaitingDelivery,
    Completed,
    Cancelled,
    Failed,
}

pub const ALLOWED_ORDER_STATUSES: &str =
    "pending, processing, waiting_delivery, completed, cancelled, failed";

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::WaitingDelivery => "waiting_delivery",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Failed => "failed",
        }
    }

    /// Terminal states are never regressed by webhook-driven updates.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Completed | OrderStatus::Cancelled | OrderStatus::Failed
        )
    }

    pub fn terminal_statuses() -> Vec<String> {
        [
            OrderStatus::Completed,
            OrderStatus::Cancelled,
            OrderStatus::Failed,
        ]
        .iter()
        .map(|status| status.to_string())
        .collect()
    }

    /// Maps a gateway event type plus the observed payment-intent status to
    /// an order status. An explicit failure event always wins over the
    /// intent status, since the gateway can report a transient `processing`
    /// intent on the same object that just emitted a failure event.
    pub fn from_gateway(event_type: &StripeEventType, intent_status: &str) -> Self {
        let intent_status = PaymentStatus::from_str(intent_status).ok();

        match event_type {
            StripeEventType::PaymentIntentPaymentFailed => OrderStatus::Failed,
            StripeEventType::PaymentIntentSucceeded => OrderStatus::WaitingDelivery,
            StripeEventType::CheckoutSessionCompleted
                if intent_status == Some(PaymentStatus::Succeeded) =>
            {
                OrderStatus::WaitingDelivery
            }
            StripeEventType::PaymentIntentCanceled => OrderStatus::Cancelled,
            _ if intent_status == Some(PaymentStatus::Canceled) => OrderStatus::Cancelled,
            _ => OrderStatus::Processing,
        }
    }
}

impl FromStr for OrderStatus {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "waiting_delivery" => Ok(OrderStatus::WaitingDelivery),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            "failed" => Ok(OrderStatus::Failed),
            _ => Err(()),
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(raw: &str) -> StripeEventType {
        StripeEventType::from(raw)
    }

    #[test]
    fn succeeded_event_maps_to_waiting_delivery() {
        assert_eq!(
            OrderStatus::from_gateway(&event("payment_intent.succeeded"), "succeeded"),
            OrderStatus::WaitingDelivery,
        );
        // The intent status cannot demote an explicit success event.
        assert_eq!(
            OrderStatus::from_gateway(&event("payment_intent.succeeded"), "processing"),
            OrderStatus::WaitingDelivery,
        );
    }

    #[test]
    fn checkout_completed_follows_intent_status() {
        assert_eq!(
            OrderStatus::from_gateway(&event("checkout.session.completed"), "succeeded"),
            OrderStatus::WaitingDelivery,
        );
        assert_eq!(
            OrderStatus::from_gateway(&event("checkout.session.completed"), "processing"),
            OrderStatus::Processing,
        );
        assert_eq!(
            OrderStatus::from_gateway(&event("checkout.session.completed"), "canceled"),
            OrderStatus::Cancelled,
        );
    }

    #[test]
    fn failure_event_wins_over_intent_status() {
        for intent_status in [
            "succeeded",
            "processing",
            "canceled",
            "requires_payment_method",
        ] {
            assert_eq!(
                OrderStatus::from_gateway(&event("payment_intent.payment_failed"), intent_status),
                OrderStatus::Failed,
            );
        }
    }

    #[test]
    fn canceled_event_or_intent_maps_to_cancelled() {
        assert_eq!(
            OrderStatus::from_gateway(&event("payment_intent.canceled"), "canceled"),
            OrderStatus::Cancelled,
        );
        assert_eq!(
            OrderStatus::from_gateway(&event("payment_intent.canceled"), "processing"),
            OrderStatus::Cancelled,
        );
        assert_eq!(
            OrderStatus::from_gateway(&event("charge.refunded"), "canceled"),
            OrderStatus::Cancelled,
        );
    }

    #[test]
    fn in_flight_intent_statuses_map_to_processing() {
        for intent_status in [
            "requires_payment_method",
            "requires_confirmation",
            "requires_action",
            "processing",
        ] {
            assert_eq!(
                OrderStatus::from_gateway(&event("checkout.session.completed"), intent_status),
                OrderStatus::Processing,
            );
        }
    }

    #[test]
    fn unknown_inputs_default_to_processing() {
        assert_eq!(
            OrderStatus::from_gateway(&event("charge.refunded"), "somehow_new_status"),
            OrderStatus::Processing,
        );
    }

    #[test]
    fn mapping_is_deterministic() {
        let event_type = event("checkout.session.completed");
        let first = OrderStatus::from_gateway(&event_type, "succeeded");
        let second = OrderStatus::from_gateway(&event_type, "succeeded");
        assert_eq!(first, second);
    }

    #[test]
    fn round_trips_through_str() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::WaitingDelivery,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
            OrderStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
        assert!("canceled".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn terminal_statuses_are_exactly_the_closed_states() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(OrderStatus::Failed.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Processing.is_terminal());
        assert!(!OrderStatus::WaitingDelivery.is_terminal());
    }
}
