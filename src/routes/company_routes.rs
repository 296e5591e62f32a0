use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::CompanyController;
use crate::dto::company_dto::{CompanyOverview, CreateCompanyRequest, UpdateCompanyRequest};
use crate::dto::ApiResponse;
use crate::middleware::AuthenticatedUser;
use crate::models::Company;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub fn create_company_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_company))
        .route("/current", get(get_current_company))
        .route("/current/overview", get(get_overview))
        .route("/:id", put(update_company))
}

async fn create_company(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateCompanyRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Company>>)> {
    let response = CompanyController::new(&state).create(&user, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn get_current_company(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<Company>> {
    let company = CompanyController::new(&state).current(&user).await?;
    Ok(Json(company))
}

async fn update_company(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCompanyRequest>,
) -> AppResult<Json<ApiResponse<Company>>> {
    let response = CompanyController::new(&state).update(&user, id, request).await?;
    Ok(Json(response))
}

async fn get_overview(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<CompanyOverview>> {
    let overview = CompanyController::new(&state).overview(&user).await?;
    Ok(Json(overview))
}
