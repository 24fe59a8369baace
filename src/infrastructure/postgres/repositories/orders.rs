use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::{insert_into, update};
use uuid::Uuid;

use crate::domain::entities::orders::{InsertOrderEntity, OrderEntity, UpdateOrderEntity};
use crate::domain::repositories::orders::OrderRepository;
use crate::domain::value_objects::enums::order_statuses::OrderStatus;
use crate::infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::orders};

pub struct OrderPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl OrderPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl OrderRepository for OrderPostgres {
    async fn insert(&self, insert_order_entity: InsertOrderEntity) -> Result<OrderEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let order = insert_into(orders::table)
            .values(&insert_order_entity)
            .returning(OrderEntity::as_returning())
            .get_result::<OrderEntity>(&mut conn)?;

        Ok(order)
    }

    async fn find_by_id(&self, order_id: Uuid) -> Result<Option<OrderEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let order = orders::table
            .find(order_id)
            .select(OrderEntity::as_select())
            .first::<OrderEntity>(&mut conn)
            .optional()?;

        Ok(order)
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<OrderEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = orders::table
            .order(orders::created_at.desc())
            .limit(limit)
            .select(OrderEntity::as_select())
            .load::<OrderEntity>(&mut conn)?;

        Ok(rows)
    }

    async fn update(
        &self,
        order_id: Uuid,
        changeset: UpdateOrderEntity,
    ) -> Result<Option<OrderEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let order = update(orders::table.find(order_id))
            .set(&changeset)
            .returning(OrderEntity::as_returning())
            .get_result::<OrderEntity>(&mut conn)
            .optional()?;

        Ok(order)
    }

    async fn update_unless_terminal(
        &self,
        order_id: Uuid,
        changeset: UpdateOrderEntity,
    ) -> Result<Option<OrderEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // One conditional statement; the status filter is the per-order
        // serialization point that keeps late deliveries from reopening a
        // closed order.
        let order = update(
            orders::table
                .find(order_id)
                .filter(orders::status.ne_all(OrderStatus::terminal_statuses())),
        )
        .set(&changeset)
        .returning(OrderEntity::as_returning())
        .get_result::<OrderEntity>(&mut conn)
        .optional()?;

        Ok(order)
    }
}
