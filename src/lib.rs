// src/lib.rs

use std::sync::Arc;

use auth::JwtAuthenticator;
use services::{
    checkout::CheckoutSaga, item_catalog::ItemCatalog, order_lifecycle::OrderLifecycle,
    order_store::OrderStore, otp::OtpIssuer,
};

#[derive(Clone)]
pub struct AppState {
    pub orders: OrderLifecycle,
    pub checkout: CheckoutSaga,
    pub auth: Arc<JwtAuthenticator>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn OrderStore>,
        items: Arc<dyn ItemCatalog>,
        otp: OtpIssuer,
        auth: JwtAuthenticator,
    ) -> Self {
        let orders = OrderLifecycle::new(store, otp);
        let checkout = CheckoutSaga::new(orders.clone(), items);
        Self {
            orders,
            checkout,
            auth: Arc::new(auth),
        }
    }
}

pub mod entities {
    pub mod prelude;
    pub mod items;
    pub mod orders;
}

pub mod services {
    pub mod otp;
    pub mod order_store;
    pub mod item_catalog;
    pub mod postgres_store;
    pub mod order_lifecycle;
    pub mod checkout;
}

pub mod models {
    pub mod error;
    pub mod item;
    pub mod order;
}

pub mod handlers {
    pub mod checkout;
    pub mod health;
    pub mod orders;
}

pub mod auth;
pub mod config;
pub mod error;
pub mod router;
