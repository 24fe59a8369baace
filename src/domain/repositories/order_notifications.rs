use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Customer-facing order notifications. Failures here are logged and never
/// fail the triggering request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderNotifier: Send + Sync {
    async fn send_payment_confirmed(
        &self,
        to: &str,
        order_id: Uuid,
        amount_minor: i64,
    ) -> Result<()>;

    async fn send_status_update(&self, to: &str, order_id: Uuid, status: &str) -> Result<()>;
}
