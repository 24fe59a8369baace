pub mod order_notifications;
pub mod orders;
pub mod payment_gateway;
