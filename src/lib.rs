//! DriveLog
//!
//! Backend multiempresa de libro de viajes (Fahrtenbuch): empresas, vehículos,
//! conductores, viajes y sus recibos.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_router;
pub use state::AppState;
