//! Modelo de Attachment (recibos y documentos de un viaje)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Tipo de archivo - mapea al ENUM attachment_kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "attachment_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Pdf,
}

impl AttachmentKind {
    /// Solo se aceptan imágenes y PDF
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if essence.starts_with("image/") && essence.len() > "image/".len() {
            Some(AttachmentKind::Image)
        } else if essence == "application/pdf" {
            Some(AttachmentKind::Pdf)
        } else {
            None
        }
    }
}

/// Metadatos de archivo - mapea a la tabla attachments
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Attachment {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub storage_id: Uuid,
    pub file_name: String,
    pub kind: AttachmentKind,
    pub content_type: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_content_type() {
        assert_eq!(AttachmentKind::from_content_type("image/png"), Some(AttachmentKind::Image));
        assert_eq!(AttachmentKind::from_content_type("IMAGE/JPEG"), Some(AttachmentKind::Image));
        assert_eq!(
            AttachmentKind::from_content_type("application/pdf; charset=binary"),
            Some(AttachmentKind::Pdf)
        );
        assert_eq!(AttachmentKind::from_content_type("text/plain"), None);
        assert_eq!(AttachmentKind::from_content_type("image/"), None);
        assert_eq!(AttachmentKind::from_content_type(""), None);
    }
}
