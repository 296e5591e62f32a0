use axum::{extract::State, routing::get, Extension, Json, Router};

use crate::controllers::UserController;
use crate::dto::auth_dto::{CurrentUserResponse, UpdateProfileRequest};
use crate::dto::ApiResponse;
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub fn create_user_router() -> Router<AppState> {
    Router::new().route("/me", get(get_me).put(update_me))
}

async fn get_me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<CurrentUserResponse>> {
    let response = UserController::new(&state).me(&user).await?;
    Ok(Json(response))
}

async fn update_me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<CurrentUserResponse>>> {
    let response = UserController::new(&state).update_me(&user, request).await?;
    Ok(Json(response))
}
