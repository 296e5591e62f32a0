use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::AttachmentController;
use crate::dto::attachment_dto::{CreateAttachmentRequest, UploadResponse, UploadUrlResponse};
use crate::dto::ApiResponse;
use crate::middleware::AuthenticatedUser;
use crate::models::Attachment;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};

/// Rutas autenticadas de adjuntos
pub fn create_attachment_router() -> Router<AppState> {
    Router::new()
        .route("/api/uploads/url", post(create_upload_url))
        .route("/api/attachments/:id", delete(delete_attachment))
        .route("/api/attachments/:id/content", get(download_attachment))
}

/// Subida directa; el ticket de la URL sustituye al bearer token
pub fn create_upload_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/uploads/:ticket", post(upload_file))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
}

async fn create_upload_url(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<UploadUrlResponse>> {
    let response = AttachmentController::new(&state).upload_url(&user).await?;
    Ok(Json(response))
}

async fn upload_file(
    State(state): State<AppState>,
    Path(ticket): Path<Uuid>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<(StatusCode, Json<UploadResponse>)> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    let response = AttachmentController::new(&state)
        .upload(ticket, content_type, &body)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub(crate) async fn attach_file(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(trip_id): Path<Uuid>,
    Json(request): Json<CreateAttachmentRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Attachment>>)> {
    let response = AttachmentController::new(&state)
        .attach(&user, trip_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub(crate) async fn list_attachments(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(trip_id): Path<Uuid>,
) -> AppResult<Json<Vec<Attachment>>> {
    let attachments = AttachmentController::new(&state).list(&user, trip_id).await?;
    Ok(Json(attachments))
}

async fn download_attachment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let (attachment, bytes) = AttachmentController::new(&state).content(&user, id).await?;

    let headers = download_headers(&attachment.content_type, &attachment.file_name)?;
    Ok((headers, bytes))
}

/// Tipos que el navegador puede mostrar sin ejecutar contenido
const INLINE_CONTENT_TYPES: &[&str] = &[
    "application/pdf",
    "image/gif",
    "image/jpeg",
    "image/png",
    "image/webp",
];

/// Cabeceras de descarga; lo que no está en la lista se fuerza como `attachment`
fn download_headers(content_type: &str, file_name: &str) -> AppResult<HeaderMap> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let inline = INLINE_CONTENT_TYPES.contains(&essence.as_str());

    let file_name: String = file_name
        .chars()
        .map(|c| if (c.is_ascii_graphic() && c != '"') || c == ' ' { c } else { '_' })
        .collect();
    let disposition = format!(
        "{}; filename=\"{}\"",
        if inline { "inline" } else { "attachment" },
        file_name
    );

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, header_value(content_type)?);
    headers.insert(header::CONTENT_DISPOSITION, header_value(&disposition)?);
    headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    if !inline {
        headers.insert(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("default-src 'none'; sandbox"),
        );
    }
    Ok(headers)
}

fn header_value(value: &str) -> AppResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| AppError::Internal(format!("Cabecera inválida '{}': {}", value, e)))
}

async fn delete_attachment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let response = AttachmentController::new(&state).delete(&user, id).await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value<'a>(headers: &'a HeaderMap, name: header::HeaderName) -> Option<&'a str> {
        headers.get(name).map(|value| value.to_str().unwrap())
    }

    #[test]
    fn test_receipts_are_shown_inline() {
        let headers = download_headers("image/jpeg", "Tankbeleg.jpg").unwrap();
        assert_eq!(
            value(&headers, header::CONTENT_DISPOSITION),
            Some("inline; filename=\"Tankbeleg.jpg\"")
        );
        assert_eq!(value(&headers, header::X_CONTENT_TYPE_OPTIONS), Some("nosniff"));

        let headers = download_headers("application/pdf; charset=binary", "rechnung.pdf").unwrap();
        assert!(value(&headers, header::CONTENT_DISPOSITION)
            .unwrap()
            .starts_with("inline;"));
    }

    #[test]
    fn test_svg_is_downloaded_not_rendered() {
        let headers = download_headers("image/svg+xml", "logo \"x\".svg").unwrap();
        assert_eq!(value(&headers, header::CONTENT_TYPE), Some("image/svg+xml"));
        assert_eq!(
            value(&headers, header::CONTENT_DISPOSITION),
            Some("attachment; filename=\"logo _x_.svg\"")
        );
        assert_eq!(value(&headers, header::X_CONTENT_TYPE_OPTIONS), Some("nosniff"));
        assert!(value(&headers, header::CONTENT_SECURITY_POLICY)
            .unwrap()
            .contains("sandbox"));
    }
}
