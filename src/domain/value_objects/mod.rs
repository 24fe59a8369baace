pub mod checkout;
pub mod enums;
pub mod orders;
pub mod stripe_webhook;
