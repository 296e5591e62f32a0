//! Registro de subidas en dos pasos
//!
//! Un ticket de un solo uso autoriza una subida; el blob subido queda
//! pendiente hasta que su dueño lo adjunta a un viaje o expira.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::config::environment::MAX_UPLOAD_URL_TTL;

/// Ticket emitido por `POST /api/uploads/url`
#[derive(Clone, Debug)]
pub struct UploadTicket {
    pub id: Uuid,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl UploadTicket {
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// Blob subido que todavía no está adjunto a ningún viaje
#[derive(Clone, Debug)]
pub struct PendingBlob {
    pub storage_id: Uuid,
    pub user_id: Uuid,
    pub content_type: String,
    pub size_bytes: i64,
    pub expires_at: DateTime<Utc>,
}

impl PendingBlob {
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

#[derive(Clone)]
pub struct UploadRegistry {
    tickets: Arc<RwLock<HashMap<Uuid, UploadTicket>>>,
    blobs: Arc<RwLock<HashMap<Uuid, PendingBlob>>>,
    ttl: Duration,
}

impl UploadRegistry {
    /// `ttl_seconds` se limita a `MAX_UPLOAD_URL_TTL`
    pub fn new(ttl_seconds: u64) -> Self {
        let ttl_seconds = ttl_seconds.min(MAX_UPLOAD_URL_TTL) as i64;
        Self {
            tickets: Arc::new(RwLock::new(HashMap::new())),
            blobs: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::seconds(ttl_seconds),
        }
    }

    pub async fn issue_ticket(&self, user_id: Uuid) -> UploadTicket {
        let ticket = UploadTicket {
            id: Uuid::new_v4(),
            user_id,
            expires_at: Utc::now() + self.ttl,
        };
        self.tickets.write().await.insert(ticket.id, ticket.clone());
        ticket
    }

    /// Consumir un ticket; `None` si no existe o ha expirado
    pub async fn redeem_ticket(&self, ticket_id: Uuid) -> Option<UploadTicket> {
        self.tickets
            .write()
            .await
            .remove(&ticket_id)
            .filter(|ticket| !ticket.is_expired())
    }

    pub async fn register_blob(
        &self,
        storage_id: Uuid,
        user_id: Uuid,
        content_type: String,
        size_bytes: i64,
    ) -> PendingBlob {
        let blob = PendingBlob {
            storage_id,
            user_id,
            content_type,
            size_bytes,
            expires_at: Utc::now() + self.ttl,
        };
        self.blobs.write().await.insert(storage_id, blob.clone());
        blob
    }

    /// Retirar un blob pendiente si pertenece a `user_id` y no ha expirado
    pub async fn claim_blob(&self, storage_id: Uuid, user_id: Uuid) -> Option<PendingBlob> {
        let mut blobs = self.blobs.write().await;
        match blobs.get(&storage_id) {
            Some(blob) if blob.user_id == user_id && !blob.is_expired() => blobs.remove(&storage_id),
            _ => None,
        }
    }

    /// Devolver un blob reclamado si el alta del adjunto falló
    pub async fn restore_blob(&self, blob: PendingBlob) {
        self.blobs.write().await.insert(blob.storage_id, blob);
    }

    /// Limpiar tickets y blobs expirados; devuelve los blobs a borrar del disco
    pub async fn cleanup_expired(&self) -> Vec<Uuid> {
        self.tickets.write().await.retain(|_, ticket| !ticket.is_expired());

        let mut blobs = self.blobs.write().await;
        let expired: Vec<Uuid> = blobs
            .values()
            .filter(|blob| blob.is_expired())
            .map(|blob| blob.storage_id)
            .collect();
        for storage_id in &expired {
            blobs.remove(storage_id);
        }

        if !expired.is_empty() {
            info!("🧹 {} blobs sin adjuntar expirados", expired.len());
        }
        expired
    }
}
