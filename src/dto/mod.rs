//! DTOs de la API
//!
//! Requests validados con `validator` y responses serializados con `serde`.

pub mod attachment_dto;
pub mod auth_dto;
pub mod common_dto;
pub mod company_dto;
pub mod driver_dto;
pub mod trip_dto;
pub mod vehicle_dto;

pub use common_dto::ApiResponse;
