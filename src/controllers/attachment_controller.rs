use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::dto::attachment_dto::{CreateAttachmentRequest, UploadResponse, UploadUrlResponse};
use crate::dto::ApiResponse;
use crate::middleware::AuthenticatedUser;
use crate::models::{Attachment, AttachmentKind};
use crate::repositories::Repositories;
use crate::services::authorization_service::AuthorizationService;
use crate::services::blob_storage::LocalBlobStore;
use crate::services::upload_registry::UploadRegistry;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};

pub struct AttachmentController {
    repositories: Repositories,
    blobs: LocalBlobStore,
    uploads: UploadRegistry,
    max_upload_bytes: usize,
}

fn unsupported_type() -> AppError {
    AppError::BadRequest("Only images and PDF files are accepted".to_string())
}

impl AttachmentController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repositories: state.repositories.clone(),
            blobs: state.blobs.clone(),
            uploads: state.uploads.clone(),
            max_upload_bytes: state.config.max_upload_bytes,
        }
    }

    fn authorization(&self) -> AuthorizationService<'_> {
        AuthorizationService::new(&self.repositories)
    }

    /// Emitir un ticket de subida de un solo uso
    pub async fn upload_url(&self, user: &AuthenticatedUser) -> AppResult<UploadUrlResponse> {
        let ticket = self.uploads.issue_ticket(user.user_id).await;
        Ok(UploadUrlResponse {
            upload_url: format!("/api/uploads/{}", ticket.id),
            expires_at: ticket.expires_at,
        })
    }

    /// Guardar el cuerpo de la subida; el ticket es la credencial
    pub async fn upload(
        &self,
        ticket_id: Uuid,
        content_type: Option<&str>,
        body: &[u8],
    ) -> AppResult<UploadResponse> {
        let content_type = content_type
            .filter(|ct| AttachmentKind::from_content_type(ct).is_some())
            .ok_or_else(unsupported_type)?;
        if body.is_empty() {
            return Err(AppError::BadRequest("Upload body is empty".to_string()));
        }
        if body.len() > self.max_upload_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "File exceeds the limit of {} bytes",
                self.max_upload_bytes
            )));
        }

        let ticket = self
            .uploads
            .redeem_ticket(ticket_id)
            .await
            .ok_or_else(|| AppError::Unauthorized("Upload URL is invalid or expired".to_string()))?;

        let storage_id = self.blobs.put(body).await?;
        self.uploads
            .register_blob(storage_id, ticket.user_id, content_type.to_string(), body.len() as i64)
            .await;

        info!("📎 Archivo {} subido ({} bytes)", storage_id, body.len());
        Ok(UploadResponse { storage_id })
    }

    /// Adjuntar a un viaje un archivo subido por el propio usuario
    pub async fn attach(
        &self,
        user: &AuthenticatedUser,
        trip_id: Uuid,
        request: CreateAttachmentRequest,
    ) -> AppResult<ApiResponse<Attachment>> {
        request.validate()?;

        let profile = self.authorization().profile_of(user).await?;
        let trip = self.authorization().accessible_trip(&profile, trip_id).await?;

        let blob = self
            .uploads
            .claim_blob(request.storage_id, user.user_id)
            .await
            .ok_or_else(|| AppError::BadRequest("Unknown or already attached file".to_string()))?;
        let kind = AttachmentKind::from_content_type(&blob.content_type).ok_or_else(unsupported_type)?;

        let attachment = Attachment {
            id: Uuid::new_v4(),
            trip_id: trip.id,
            storage_id: blob.storage_id,
            file_name: request.file_name.trim().to_string(),
            kind,
            content_type: blob.content_type.clone(),
            size_bytes: blob.size_bytes,
            created_at: Utc::now(),
        };

        match self.repositories.attachments.create(&attachment).await {
            Ok(attachment) => Ok(ApiResponse::success_with_message(attachment, "Attachment added")),
            Err(e) => {
                self.uploads.restore_blob(blob).await;
                Err(e)
            }
        }
    }

    pub async fn list(&self, user: &AuthenticatedUser, trip_id: Uuid) -> AppResult<Vec<Attachment>> {
        let profile = self.authorization().profile_of(user).await?;
        let trip = self.authorization().accessible_trip(&profile, trip_id).await?;
        self.repositories.attachments.list_by_trip(trip.id).await
    }

    async fn accessible_attachment(
        &self,
        user: &AuthenticatedUser,
        attachment_id: Uuid,
    ) -> AppResult<Attachment> {
        let attachment = self
            .repositories
            .attachments
            .find_by_id(attachment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Attachment not found".to_string()))?;

        let profile = self.authorization().profile_of(user).await?;
        self.authorization()
            .accessible_trip(&profile, attachment.trip_id)
            .await?;
        Ok(attachment)
    }

    /// Metadatos y contenido del archivo
    pub async fn content(
        &self,
        user: &AuthenticatedUser,
        attachment_id: Uuid,
    ) -> AppResult<(Attachment, Vec<u8>)> {
        let attachment = self.accessible_attachment(user, attachment_id).await?;
        let bytes = self.blobs.read(attachment.storage_id).await?;
        Ok((attachment, bytes))
    }

    pub async fn delete(&self, user: &AuthenticatedUser, attachment_id: Uuid) -> AppResult<ApiResponse<()>> {
        let attachment = self.accessible_attachment(user, attachment_id).await?;

        if !self.repositories.attachments.delete(attachment.id).await? {
            return Err(AppError::NotFound("Attachment not found".to_string()));
        }
        if let Err(e) = self.blobs.delete(attachment.storage_id).await {
            warn!("⚠️ No se pudo borrar el archivo {}: {}", attachment.storage_id, e);
        }
        Ok(ApiResponse::message("Attachment deleted"))
    }
}
