//! HTTP boundary.
//!
//! Handlers stay thin: they pull the caller out of the bearer token, hand the
//! payload to [`crate::core`], and wrap the result in [`ApiResponse`]. Every
//! route except register, login and `/health` requires authentication.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod response;

pub use extract::{ApiJson, ApiPath, ApiQuery, AuthUser};
pub use response::ApiResponse;

use crate::{
    config::AppConfig,
    core::auth::TokenIssuer,
    errors::{Error, Result},
};
use axum::{
    Json, Router,
    http::{HeaderValue, Method, StatusCode, Uri, header},
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: DatabaseConnection,
    /// Signs and verifies bearer tokens
    pub tokens: Arc<TokenIssuer>,
    /// Work factor for new password hashes
    pub bcrypt_cost: u32,
}

impl AppState {
    /// Builds the state from an open connection and the loaded configuration.
    pub fn new(db: DatabaseConnection, config: &AppConfig) -> Self {
        Self {
            db,
            tokens: Arc::new(TokenIssuer::new(&config.jwt_secret)),
            bcrypt_cost: config.bcrypt_cost,
        }
    }
}

/// Assembles every route plus the CORS, timeout and tracing layers.
///
/// # Errors
/// Returns `Error::Config` when `FRONTEND_URL` is not a valid header value.
pub fn build_router(state: AppState, config: &AppConfig) -> Result<Router> {
    let origin = HeaderValue::from_str(&config.frontend_url).map_err(|e| Error::Config {
        message: format!("FRONTEND_URL is not a valid origin: {e}"),
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let api = Router::new()
        .nest("/auth", handlers::auth::routes())
        .nest("/inventory", handlers::inventory::routes())
        .nest("/suppliers", handlers::suppliers::routes())
        .nest("/customers", handlers::customers::routes())
        .nest("/sales-orders", handlers::sales_orders::routes())
        .nest("/purchase-orders", handlers::purchase_orders::routes())
        .nest("/reports", handlers::reports::routes());

    Ok(Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(TimeoutLayer::new(config.request_timeout)),
        )
        .with_state(state))
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "OK",
        "message": "Stockroom backend is running",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        ApiResponse::failure("Route not found")
            .with_message(format!("The route {uri} does not exist on this server")),
    )
}
