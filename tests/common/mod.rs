#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use campus_market_backend::{
    auth::JwtAuthenticator,
    router::build_router,
    services::{
        item_catalog::InMemoryItemCatalog,
        order_store::InMemoryOrderStore,
        otp::{OtpIssuer, MIN_HASH_COST},
    },
    AppState,
};
use sea_orm::{Database, DatabaseConnection, DbErr};
use serde_json::Value;
use std::env;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-jwt-secret";

/// Router over in-memory collaborators, plus handles to inspect them
pub struct TestApp {
    pub router: Router,
    pub items: Arc<InMemoryItemCatalog>,
    pub store: Arc<InMemoryOrderStore>,
    auth: JwtAuthenticator,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryOrderStore::new());
        let items = Arc::new(InMemoryItemCatalog::new());
        let otp = OtpIssuer::new(MIN_HASH_COST).expect("valid cost");

        let state = AppState::new(
            store.clone(),
            items.clone(),
            otp,
            JwtAuthenticator::new(TEST_SECRET),
        );

        Self {
            router: build_router(state),
            items,
            store,
            auth: JwtAuthenticator::new(TEST_SECRET),
        }
    }

    pub fn token_for(&self, user_id: &str) -> String {
        self.auth.issue(user_id, None).expect("token signs")
    }

    /// Send a request as `user` (or anonymously) and decode the JSON reply
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.token_for(user)),
            );
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }
}

/// Set up test database connection
/// Uses TEST_DATABASE_URL environment variable or falls back to default
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let database_url = env::var("TEST_DATABASE_URL").unwrap_or_else(|_| {
        "postgresql://market_user@localhost:5432/campus_market_test".to_string()
    });

    Database::connect(&database_url).await
}
