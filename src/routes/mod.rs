//! Rutas HTTP
//!
//! Cada recurso expone su propio router; `create_router` los combina, aplica
//! la autenticación a las rutas privadas y añade las capas globales.

pub mod attachment_routes;
pub mod auth_routes;
pub mod company_routes;
pub mod driver_routes;
pub mod trip_routes;
pub mod user_routes;
pub mod vehicle_routes;

use axum::{middleware, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::middleware::{auth_middleware, cors_layer};
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .nest("/api/users", user_routes::create_user_router())
        .nest("/api/companies", company_routes::create_company_router())
        .nest("/api/drivers", driver_routes::create_driver_router())
        .nest("/api/vehicles", vehicle_routes::create_vehicle_router())
        .nest("/api/trips", trip_routes::create_trip_router())
        .merge(attachment_routes::create_attachment_router())
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let public = Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth_routes::create_auth_router(&state))
        .merge(attachment_routes::create_upload_router(&state));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(CompressionLayer::new())
        .layer(cors_layer(&state.config.cors_origins))
        .layer(GlobalConcurrencyLimitLayer::new(state.config.max_concurrent_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "drivelog",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
