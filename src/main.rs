use std::sync::Arc;

use campus_market_backend::{
    auth::JwtAuthenticator,
    config::AppConfig,
    router::build_router,
    services::{
        otp::OtpIssuer,
        postgres_store::{SeaOrmItemCatalog, SeaOrmOrderStore},
    },
    AppState,
};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,campus_market_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    // Connect to database
    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    tracing::info!("Running migrations...");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let otp = OtpIssuer::new(config.otp_hash_cost).expect("Invalid OTP hash cost");
    tracing::info!(cost = otp.cost(), "OTP issuer ready");

    let state = AppState::new(
        Arc::new(SeaOrmOrderStore::new(db.clone())),
        Arc::new(SeaOrmItemCatalog::new(db)),
        otp,
        JwtAuthenticator::new(&config.jwt_secret),
    );

    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind listener");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
