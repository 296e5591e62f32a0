//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! al schema PostgreSQL.

pub mod attachment;
pub mod company;
pub mod trip;
pub mod user;
pub mod vehicle;

pub use attachment::{Attachment, AttachmentKind};
pub use company::Company;
pub use trip::{total_kilometers, TripEntry, TripFilters};
pub use user::{User, UserProfile, UserRole};
pub use vehicle::{FuelType, Vehicle, VehicleAssignment};
