use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::validate_not_blank;

#[derive(Debug, Serialize)]
pub struct UploadUrlResponse {
    pub upload_url: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub storage_id: Uuid,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAttachmentRequest {
    pub storage_id: Uuid,
    #[validate(length(max = 255), custom = "validate_not_blank")]
    pub file_name: String,
}
