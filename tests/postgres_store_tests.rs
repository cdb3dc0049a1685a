//! SeaORM store against a live PostgreSQL.
//!
//! Run with `TEST_DATABASE_URL` pointing at a scratch database and
//! `cargo test -- --ignored`.

mod common;

use campus_market_backend::models::order::{NewOrderRecord, OrderFilter, OrderUpdate};
use campus_market_backend::services::order_store::{OrderStore, StoreError};
use campus_market_backend::services::otp::generate_transaction_id;
use campus_market_backend::services::postgres_store::SeaOrmOrderStore;
use rust_decimal_macros::dec;
use sea_orm_migration::MigratorTrait;

use crate::common::setup_test_db;

async fn store() -> SeaOrmOrderStore {
    let db = setup_test_db().await.expect("Failed to connect to test DB");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    SeaOrmOrderStore::new(db)
}

fn record(buyer: &str, seller: &str) -> NewOrderRecord {
    NewOrderRecord {
        transaction_id: generate_transaction_id(),
        buyer_id: buyer.to_string(),
        seller_id: seller.to_string(),
        item_id: "item-pg".to_string(),
        amount: dec!(42.50),
        hashed_otp: "$2b$04$placeholderplaceholderplaceholderplaceholderpla".to_string(),
    }
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_create_and_find() {
    let store = store().await;
    let buyer = format!("buyer-{}", generate_transaction_id());

    let created = store.create(record(&buyer, "seller-pg")).await.unwrap();
    assert_eq!(created.version, 1);
    assert!(!created.is_completed);

    let found = store.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(found.transaction_id, created.transaction_id);
    assert_eq!(found.amount, dec!(42.50));

    let pending = store
        .find_by_filter(OrderFilter::bought_by(&buyer, false))
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_duplicate_transaction_id() {
    let store = store().await;
    let first = record("buyer-dup", "seller-dup");
    let mut second = record("buyer-dup", "seller-dup");
    second.transaction_id = first.transaction_id.clone();

    store.create(first).await.unwrap();
    let result = store.create(second).await;
    assert!(matches!(result, Err(StoreError::DuplicateTransactionId(_))));
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_versioned_update() {
    let store = store().await;
    let created = store.create(record("buyer-v", "seller-v")).await.unwrap();

    let updated = store
        .update_by_id(created.id, OrderUpdate::complete(), created.version)
        .await
        .unwrap();
    assert!(updated.is_completed);
    assert_eq!(updated.version, 2);

    let stale = store
        .update_by_id(created.id, OrderUpdate::replace_otp("x".to_string()), created.version)
        .await;
    assert!(matches!(
        stale,
        Err(StoreError::VersionConflict { expected: 1, actual: 2, .. })
    ));
}
