use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{checkout, health, orders};
use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/orders", post(orders::create_order))
        .route("/orders/user", get(orders::get_user_orders))
        .route("/orders/pending", get(orders::get_pending_orders))
        .route(
            "/orders/{order_id}/regenerate-otp",
            put(orders::regenerate_otp),
        )
        .route("/orders/{order_id}/complete", put(orders::complete_order))
        .route("/checkout", post(checkout::checkout));

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
