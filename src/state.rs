//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use tracing::warn;

use crate::config::environment::EnvironmentConfig;
use crate::middleware::rate_limit::RateLimitState;
use crate::repositories::Repositories;
use crate::services::blob_storage::LocalBlobStore;
use crate::services::upload_registry::UploadRegistry;
use crate::utils::jwt::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub repositories: Repositories,
    pub config: EnvironmentConfig,
    pub jwt: JwtConfig,
    pub blobs: LocalBlobStore,
    pub uploads: UploadRegistry,
    pub rate_limit: RateLimitState,
}

impl AppState {
    pub fn new(repositories: Repositories, config: EnvironmentConfig, blobs: LocalBlobStore) -> Self {
        Self {
            repositories,
            jwt: JwtConfig::from(&config),
            uploads: UploadRegistry::new(config.upload_url_ttl),
            rate_limit: RateLimitState::new(&config),
            blobs,
            config,
        }
    }

    /// Limpiar tickets expirados y borrar del disco los blobs nunca adjuntados
    pub async fn cleanup_expired_uploads(&self) -> usize {
        let expired = self.uploads.cleanup_expired().await;
        for storage_id in &expired {
            if let Err(e) = self.blobs.delete(*storage_id).await {
                warn!("⚠️ No se pudo borrar el blob {}: {}", storage_id, e);
            }
        }
        expired.len()
    }
}
