//! PostgreSQL-backed order store and item catalog (SeaORM)

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set, SqlErr,
};
use tracing::debug;
use uuid::Uuid;

use crate::entities::{items, orders, prelude::*};
use crate::models::item::ItemStatus;
use crate::models::order::{NewOrderRecord, Order, OrderFilter, OrderId, OrderUpdate};
use crate::services::item_catalog::{ItemCatalog, ItemError};
use crate::services::order_store::{OrderStore, StoreError};

#[derive(Clone)]
pub struct SeaOrmOrderStore {
    db: DatabaseConnection,
}

impl SeaOrmOrderStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderStore for SeaOrmOrderStore {
    async fn create(&self, record: NewOrderRecord) -> Result<Order, StoreError> {
        let now = Utc::now().fixed_offset();
        let transaction_id = record.transaction_id.clone();

        let model = orders::ActiveModel {
            id: Set(Uuid::new_v4()),
            transaction_id: Set(record.transaction_id),
            buyer_id: Set(record.buyer_id),
            seller_id: Set(record.seller_id),
            item_id: Set(record.item_id),
            amount: Set(record.amount),
            hashed_otp: Set(record.hashed_otp),
            is_completed: Set(false),
            version: Set(1),
            created_at: Set(now),
            updated_at: Set(now),
        };

        match model.insert(&self.db).await {
            Ok(saved) => Ok(saved.into()),
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    Err(StoreError::DuplicateTransactionId(transaction_id))
                }
                _ => Err(e.into()),
            },
        }
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(Orders::find_by_id(id).one(&self.db).await?.map(Order::from))
    }

    async fn find_by_filter(&self, filter: OrderFilter) -> Result<Vec<Order>, StoreError> {
        let mut query = Orders::find();

        if let Some(buyer_id) = filter.buyer_id {
            query = query.filter(orders::Column::BuyerId.eq(buyer_id));
        }
        if let Some(seller_id) = filter.seller_id {
            query = query.filter(orders::Column::SellerId.eq(seller_id));
        }
        if let Some(is_completed) = filter.is_completed {
            query = query.filter(orders::Column::IsCompleted.eq(is_completed));
        }

        let rows = query
            .order_by_asc(orders::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    async fn update_by_id(
        &self,
        id: OrderId,
        update: OrderUpdate,
        expected_version: i64,
    ) -> Result<Order, StoreError> {
        let mut statement = Orders::update_many()
            .col_expr(
                orders::Column::Version,
                Expr::col(orders::Column::Version).add(1),
            )
            .col_expr(
                orders::Column::UpdatedAt,
                Expr::value(Utc::now().fixed_offset()),
            );

        if let Some(hashed_otp) = update.hashed_otp {
            statement = statement.col_expr(orders::Column::HashedOtp, Expr::value(hashed_otp));
        }
        if let Some(is_completed) = update.is_completed {
            statement = statement.col_expr(orders::Column::IsCompleted, Expr::value(is_completed));
        }

        // Compare-and-set on the version column
        let result = statement
            .filter(orders::Column::Id.eq(id))
            .filter(orders::Column::Version.eq(expected_version))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return match self.find_by_id(id).await? {
                None => Err(StoreError::NotFound(id)),
                Some(current) => {
                    debug!(order_id = %id, expected_version, actual_version = current.version, "Stale order write rejected");
                    Err(StoreError::VersionConflict {
                        id,
                        expected: expected_version,
                        actual: current.version,
                    })
                }
            };
        }

        self.find_by_id(id).await?.ok_or(StoreError::NotFound(id))
    }
}

#[derive(Clone)]
pub struct SeaOrmItemCatalog {
    db: DatabaseConnection,
}

impl SeaOrmItemCatalog {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ItemCatalog for SeaOrmItemCatalog {
    async fn mark_sold(&self, item_id: &str) -> Result<(), ItemError> {
        // Item IDs are opaque to orders; anything that is not one of ours is unknown
        let id = Uuid::parse_str(item_id).map_err(|_| ItemError::NotFound(item_id.to_string()))?;

        let result = Items::update_many()
            .col_expr(
                items::Column::Status,
                Expr::value(ItemStatus::Sold.to_string()),
            )
            .filter(items::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ItemError::NotFound(item_id.to_string()));
        }
        Ok(())
    }
}

