//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.

use std::env;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

/// Vida máxima de un ticket de subida (7 días)
pub const MAX_UPLOAD_URL_TTL: u64 = 7 * 86_400;

/// Vida máxima de un token de sesión (1 año)
pub const MAX_JWT_EXPIRATION: u64 = 365 * 86_400;

/// Backend de persistencia seleccionado con `STORAGE_BACKEND`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(anyhow!("STORAGE_BACKEND desconocido: '{}'", other)),
        }
    }
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub storage_backend: StorageBackend,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub cors_origins: Vec<String>,
    pub rate_limit_requests: u32,
    pub rate_limit_window: u64,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub upload_url_ttl: u64,
    pub bcrypt_cost: u32,
    pub max_concurrent_requests: usize,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 3000,
            host: "0.0.0.0".to_string(),
            storage_backend: StorageBackend::Postgres,
            jwt_secret: "drivelog-development-secret".to_string(),
            jwt_expiration: 86_400,
            cors_origins: Vec::new(),
            rate_limit_requests: 20,
            rate_limit_window: 60,
            upload_dir: PathBuf::from("./uploads"),
            max_upload_bytes: 10 * 1024 * 1024,
            upload_url_ttl: 3600,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            max_concurrent_requests: 256,
        }
    }
}

impl EnvironmentConfig {
    /// Leer la configuración desde las variables de entorno
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let environment = env::var("ENVIRONMENT").unwrap_or(defaults.environment);

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ if environment == "production" => {
                return Err(anyhow!("JWT_SECRET must be set in production"));
            }
            _ => defaults.jwt_secret,
        };

        Ok(Self {
            port: parse_var("PORT", defaults.port)?,
            host: env::var("HOST").unwrap_or(defaults.host),
            storage_backend: parse_var("STORAGE_BACKEND", defaults.storage_backend)?,
            jwt_secret,
            jwt_expiration: ensure_range(
                "JWT_EXPIRATION",
                parse_var("JWT_EXPIRATION", defaults.jwt_expiration)?,
                60..=MAX_JWT_EXPIRATION,
            )?,
            cors_origins: env::var("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.cors_origins),
            rate_limit_requests: parse_var("RATE_LIMIT_REQUESTS", defaults.rate_limit_requests)?,
            rate_limit_window: parse_var("RATE_LIMIT_WINDOW", defaults.rate_limit_window)?,
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            upload_url_ttl: ensure_range(
                "UPLOAD_URL_TTL",
                parse_var("UPLOAD_URL_TTL", defaults.upload_url_ttl)?,
                1..=MAX_UPLOAD_URL_TTL,
            )?,
            bcrypt_cost: parse_var("BCRYPT_COST", defaults.bcrypt_cost)?,
            max_concurrent_requests: parse_var(
                "MAX_CONCURRENT_REQUESTS",
                defaults.max_concurrent_requests,
            )?,
            environment,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Leer una variable opcional y parsearla, usando `default` si no existe
fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("{}", e))
            .with_context(|| format!("{} tiene un valor inválido: '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}

/// Rechazar valores fuera de rango en lugar de fallar más tarde
fn ensure_range(name: &str, value: u64, range: RangeInclusive<u64>) -> Result<u64> {
    if !range.contains(&value) {
        return Err(anyhow!(
            "{} debe estar entre {} y {} (recibido {})",
            name,
            range.start(),
            range.end(),
            value
        ));
    }
    Ok(value)
}
