//! Almacenamiento de archivos en disco
//!
//! Los recibos se guardan como archivos planos nombrados por su `storage_id`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

use crate::utils::errors::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// Crear el directorio raíz si no existe
    pub async fn open(root: impl AsRef<Path>) -> AppResult<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    fn path_for(&self, storage_id: Uuid) -> PathBuf {
        self.root.join(format!("{}.bin", storage_id))
    }

    pub async fn put(&self, bytes: &[u8]) -> AppResult<Uuid> {
        let storage_id = Uuid::new_v4();
        tokio::fs::write(self.path_for(storage_id), bytes).await?;
        debug!("💾 Blob {} guardado ({} bytes)", storage_id, bytes.len());
        Ok(storage_id)
    }

    pub async fn read(&self, storage_id: Uuid) -> AppResult<Vec<u8>> {
        match tokio::fs::read(self.path_for(storage_id)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(AppError::NotFound("File not found".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Borrar un blob; no falla si ya no existe
    pub async fn delete(&self, storage_id: Uuid) -> AppResult<()> {
        match tokio::fs::remove_file(self.path_for(storage_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn exists(&self, storage_id: Uuid) -> bool {
        tokio::fs::try_exists(self.path_for(storage_id))
            .await
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_read_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::open(dir.path().join("blobs")).await.unwrap();

        let id = store.put(b"%PDF-1.4").await.unwrap();
        assert!(store.exists(id).await);
        assert_eq!(store.read(id).await.unwrap(), b"%PDF-1.4");

        store.delete(id).await.unwrap();
        assert!(!store.exists(id).await);
        assert!(matches!(store.read(id).await, Err(AppError::NotFound(_))));
        store.delete(id).await.unwrap();
    }
}
