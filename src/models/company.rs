//! Modelo de Company
//!
//! Mapea exactamente a la tabla companies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Company principal - mapea exactamente a la tabla companies
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub industry: Option<String>,
    pub is_rental_company: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    pub fn new(
        name: String,
        address: Option<String>,
        industry: Option<String>,
        is_rental_company: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            address,
            industry,
            is_rental_company,
            created_at: now,
            updated_at: now,
        }
    }
}
