//! Modelo de User y UserProfile
//!
//! `User` es la identidad con credenciales; `UserProfile` es el registro de la
//! aplicación que la vincula a una empresa con un rol.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Rol dentro de una empresa - mapea al ENUM user_role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Driver,
}

/// Identidad - mapea a la tabla users
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, name: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.trim().to_lowercase(),
            name,
            password_hash,
            created_at: Utc::now(),
        }
    }
}

/// Perfil - mapea a la tabla user_profiles
///
/// `user_id == None` marca una invitación pendiente que se reclama al registrarse.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct UserProfile {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    pub role: UserRole,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(
        user_id: Option<Uuid>,
        company_id: Option<Uuid>,
        role: UserRole,
        name: String,
        email: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            company_id,
            role,
            name,
            email: email.trim().to_lowercase(),
            created_at: Utc::now(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.user_id.is_none()
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Empresa que administra este perfil, si es admin
    pub fn admin_company(&self) -> Option<Uuid> {
        if self.is_admin() {
            self.company_id
        } else {
            None
        }
    }
}
