use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::orders::{InsertOrderEntity, OrderEntity, UpdateOrderEntity};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn insert(&self, insert_order_entity: InsertOrderEntity) -> Result<OrderEntity>;

    async fn find_by_id(&self, order_id: Uuid) -> Result<Option<OrderEntity>>;

    async fn list_recent(&self, limit: i64) -> Result<Vec<OrderEntity>>;

    /// Unconditional partial update. Returns `None` when no row matches.
    async fn update(
        &self,
        order_id: Uuid,
        changeset: UpdateOrderEntity,
    ) -> Result<Option<OrderEntity>>;

    /// Single conditional UPDATE that skips rows already in a terminal
    /// status, so late or out-of-order webhook deliveries cannot regress a
    /// closed order. Returns `None` both for missing rows and for skipped
    /// terminal rows; callers disambiguate with `find_by_id`.
    async fn update_unless_terminal(
        &self,
        order_id: Uuid,
        changeset: UpdateOrderEntity,
    ) -> Result<Option<OrderEntity>>;
}
