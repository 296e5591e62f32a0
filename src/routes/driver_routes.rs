use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::DriverController;
use crate::dto::driver_dto::{DriverResponse, InviteDriverRequest};
use crate::dto::ApiResponse;
use crate::middleware::AuthenticatedUser;
use crate::models::UserProfile;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub fn create_driver_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_drivers))
        .route("/invite", post(invite_driver))
        .route("/:profile_id", delete(remove_driver))
}

async fn list_drivers(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<DriverResponse>>> {
    let drivers = DriverController::new(&state).list(&user).await?;
    Ok(Json(drivers))
}

async fn invite_driver(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<InviteDriverRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<UserProfile>>)> {
    let response = DriverController::new(&state).invite(&user, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn remove_driver(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(profile_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let response = DriverController::new(&state).remove(&user, profile_id).await?;
    Ok(Json(response))
}
