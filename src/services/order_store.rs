//! Order persistence contract and an in-process implementation
//!
//! Updates carry the version the caller read. A write against a stale
//! version is rejected instead of silently overwriting, so concurrent
//! regenerate/complete races become visible. No lock or transaction ever
//! spans more than one order.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

use crate::models::order::{NewOrderRecord, Order, OrderFilter, OrderId, OrderUpdate};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("order {0} not found")]
    NotFound(OrderId),
    #[error("order {id} changed concurrently (expected version {expected}, found {actual})")]
    VersionConflict {
        id: OrderId,
        expected: i64,
        actual: i64,
    },
    #[error("transaction id {0} already exists")]
    DuplicateTransactionId(String),
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a new order at version 1 and assign its storage key
    async fn create(&self, record: NewOrderRecord) -> Result<Order, StoreError>;

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    /// Matching orders in insertion order
    async fn find_by_filter(&self, filter: OrderFilter) -> Result<Vec<Order>, StoreError>;

    /// Apply `update` only if the stored version equals `expected_version`.
    /// Returns the updated order with its version bumped by one.
    async fn update_by_id(
        &self,
        id: OrderId,
        update: OrderUpdate,
        expected_version: i64,
    ) -> Result<Order, StoreError>;
}

/// Orders kept in a vector behind a lock; insertion order is list order
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<Vec<Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.orders.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.read().is_empty()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, record: NewOrderRecord) -> Result<Order, StoreError> {
        let mut orders = self.orders.write();

        if orders
            .iter()
            .any(|o| o.transaction_id == record.transaction_id)
        {
            return Err(StoreError::DuplicateTransactionId(record.transaction_id));
        }

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            transaction_id: record.transaction_id,
            buyer_id: record.buyer_id,
            seller_id: record.seller_id,
            item_id: record.item_id,
            amount: record.amount,
            hashed_otp: record.hashed_otp,
            is_completed: false,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        orders.push(order.clone());

        Ok(order)
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.read().iter().find(|o| o.id == id).cloned())
    }

    async fn find_by_filter(&self, filter: OrderFilter) -> Result<Vec<Order>, StoreError> {
        Ok(self
            .orders
            .read()
            .iter()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect())
    }

    async fn update_by_id(
        &self,
        id: OrderId,
        update: OrderUpdate,
        expected_version: i64,
    ) -> Result<Order, StoreError> {
        let mut orders = self.orders.write();
        let order = orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(StoreError::NotFound(id))?;

        if order.version != expected_version {
            return Err(StoreError::VersionConflict {
                id,
                expected: expected_version,
                actual: order.version,
            });
        }

        if let Some(hashed_otp) = update.hashed_otp {
            order.hashed_otp = hashed_otp;
        }
        if let Some(is_completed) = update.is_completed {
            order.is_completed = is_completed;
        }
        order.version += 1;
        order.updated_at = Utc::now();

        Ok(order.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(transaction_id: &str, buyer: &str, seller: &str) -> NewOrderRecord {
        NewOrderRecord {
            transaction_id: transaction_id.to_string(),
            buyer_id: buyer.to_string(),
            seller_id: seller.to_string(),
            item_id: "item-1".to_string(),
            amount: dec!(25.50),
            hashed_otp: "hash-1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_starts_pending_at_version_one() {
        let store = InMemoryOrderStore::new();
        let order = store.create(record("tx1", "u1", "u2")).await.unwrap();

        assert_eq!(order.version, 1);
        assert!(!order.is_completed);
        assert_eq!(store.len(), 1);

        let found = store.find_by_id(order.id).await.unwrap();
        assert_eq!(found, Some(order));
    }

    #[tokio::test]
    async fn test_duplicate_transaction_id_rejected() {
        let store = InMemoryOrderStore::new();
        store.create(record("tx1", "u1", "u2")).await.unwrap();

        let result = store.create(record("tx1", "u3", "u4")).await;
        assert!(matches!(result, Err(StoreError::DuplicateTransactionId(_))));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_update_bumps_version() {
        let store = InMemoryOrderStore::new();
        let order = store.create(record("tx1", "u1", "u2")).await.unwrap();

        let updated = store
            .update_by_id(order.id, OrderUpdate::replace_otp("hash-2".to_string()), 1)
            .await
            .unwrap();

        assert_eq!(updated.version, 2);
        assert_eq!(updated.hashed_otp, "hash-2");
        assert_eq!(updated.amount, order.amount);
        assert_eq!(updated.item_id, order.item_id);
    }

    #[tokio::test]
    async fn test_stale_version_rejected_without_change() {
        let store = InMemoryOrderStore::new();
        let order = store.create(record("tx1", "u1", "u2")).await.unwrap();
        store
            .update_by_id(order.id, OrderUpdate::replace_otp("hash-2".to_string()), 1)
            .await
            .unwrap();

        let result = store.update_by_id(order.id, OrderUpdate::complete(), 1).await;
        match result {
            Err(StoreError::VersionConflict { expected, actual, .. }) => {
                assert_eq!(expected, 1);
                assert_eq!(actual, 2);
            }
            other => panic!("expected version conflict, got {:?}", other),
        }

        let current = store.find_by_id(order.id).await.unwrap().unwrap();
        assert!(!current.is_completed);
        assert_eq!(current.version, 2);
    }

    #[tokio::test]
    async fn test_update_unknown_order() {
        let store = InMemoryOrderStore::new();
        let result = store
            .update_by_id(Uuid::new_v4(), OrderUpdate::complete(), 1)
            .await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_filter_keeps_insertion_order() {
        let store = InMemoryOrderStore::new();
        let first = store.create(record("tx1", "u1", "u2")).await.unwrap();
        store.create(record("tx2", "u3", "u2")).await.unwrap();
        let third = store.create(record("tx3", "u1", "u4")).await.unwrap();

        let bought = store
            .find_by_filter(OrderFilter::bought_by("u1", false))
            .await
            .unwrap();
        let ids: Vec<_> = bought.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![first.id, third.id]);

        let sold = store
            .find_by_filter(OrderFilter::sold_by("u2", true))
            .await
            .unwrap();
        assert!(sold.is_empty());
    }
}
