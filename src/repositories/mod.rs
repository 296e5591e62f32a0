//! Repositorios
//!
//! Cada tabla tiene un trait de acceso a datos con dos implementaciones:
//! PostgreSQL (`Pg*Repository`) y en memoria (`memory::MemoryStore`).
//! Los borrados en cascada se exponen como una sola operación para que la
//! implementación los ejecute dentro de una transacción.

pub mod assignment_repository;
pub mod attachment_repository;
pub mod company_repository;
pub mod memory;
pub mod profile_repository;
pub mod trip_repository;
pub mod user_repository;
pub mod vehicle_repository;

use std::sync::Arc;

use sqlx::PgPool;

pub use assignment_repository::{AssignmentRepository, PgAssignmentRepository};
pub use attachment_repository::{AttachmentRepository, PgAttachmentRepository};
pub use company_repository::{CompanyRepository, PgCompanyRepository};
pub use memory::MemoryStore;
pub use profile_repository::{PgProfileRepository, ProfileRepository};
pub use trip_repository::{PgTripRepository, TripRepository};
pub use user_repository::{PgUserRepository, UserRepository};
pub use vehicle_repository::{PgVehicleRepository, VehicleRepository};

/// Conjunto de repositorios compartido por los controladores
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub companies: Arc<dyn CompanyRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub vehicles: Arc<dyn VehicleRepository>,
    pub assignments: Arc<dyn AssignmentRepository>,
    pub trips: Arc<dyn TripRepository>,
    pub attachments: Arc<dyn AttachmentRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            companies: Arc::new(PgCompanyRepository::new(pool.clone())),
            profiles: Arc::new(PgProfileRepository::new(pool.clone())),
            vehicles: Arc::new(PgVehicleRepository::new(pool.clone())),
            assignments: Arc::new(PgAssignmentRepository::new(pool.clone())),
            trips: Arc::new(PgTripRepository::new(pool.clone())),
            attachments: Arc::new(PgAttachmentRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        let store = MemoryStore::default();
        Self {
            users: Arc::new(store.clone()),
            companies: Arc::new(store.clone()),
            profiles: Arc::new(store.clone()),
            vehicles: Arc::new(store.clone()),
            assignments: Arc::new(store.clone()),
            trips: Arc::new(store.clone()),
            attachments: Arc::new(store),
        }
    }
}
