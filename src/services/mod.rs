//! Services module
//!
//! Lógica compartida por varios controladores: reglas de autorización,
//! almacenamiento de archivos y el registro de subidas.

pub mod authorization_service;
pub mod blob_storage;
pub mod upload_registry;

pub use authorization_service::AuthorizationService;
pub use blob_storage::LocalBlobStore;
pub use upload_registry::UploadRegistry;
