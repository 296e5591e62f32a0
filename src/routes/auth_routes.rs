use axum::{extract::State, http::StatusCode, middleware, routing::post, Json, Router};

use crate::controllers::AuthController;
use crate::dto::auth_dto::{AuthResponse, SignInRequest, SignUpRequest};
use crate::dto::ApiResponse;
use crate::middleware::rate_limit_middleware;
use crate::state::AppState;
use crate::utils::errors::AppResult;

/// Rutas públicas de autenticación, limitadas por IP
pub fn create_auth_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/sign-up", post(sign_up))
        .route("/sign-in", post(sign_in))
        .route_layer(middleware::from_fn_with_state(
            state.rate_limit.clone(),
            rate_limit_middleware,
        ))
}

async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    let response = AuthController::new(&state).sign_up(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    let response = AuthController::new(&state).sign_in(request).await?;
    Ok(Json(response))
}
