use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::TripController;
use crate::dto::trip_dto::{
    CompanyTripResponse, CreateTripRequest, TripListResponse, TripWithVehicle, UpdateTripRequest,
};
use crate::dto::ApiResponse;
use crate::middleware::AuthenticatedUser;
use crate::models::{TripEntry, TripFilters};
use crate::routes::attachment_routes;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub fn create_trip_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_company_trips).post(create_trip))
        .route("/mine", get(list_my_trips))
        .route("/:id", get(get_trip).put(update_trip).delete(delete_trip))
        .route(
            "/:id/attachments",
            get(attachment_routes::list_attachments).post(attachment_routes::attach_file),
        )
}

async fn create_trip(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateTripRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<TripEntry>>)> {
    let response = TripController::new(&state).create(&user, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_my_trips(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<TripListResponse<TripWithVehicle>>> {
    let trips = TripController::new(&state).mine(&user).await?;
    Ok(Json(trips))
}

async fn list_company_trips(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(filters): Query<TripFilters>,
) -> AppResult<Json<TripListResponse<CompanyTripResponse>>> {
    let trips = TripController::new(&state).company(&user, filters).await?;
    Ok(Json(trips))
}

async fn get_trip(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CompanyTripResponse>> {
    let trip = TripController::new(&state).get(&user, id).await?;
    Ok(Json(trip))
}

async fn update_trip(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTripRequest>,
) -> AppResult<Json<ApiResponse<TripEntry>>> {
    let response = TripController::new(&state).update(&user, id, request).await?;
    Ok(Json(response))
}

async fn delete_trip(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let response = TripController::new(&state).delete(&user, id).await?;
    Ok(Json(response))
}
