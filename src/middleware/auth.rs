//! Middleware de autenticación JWT
//!
//! Extrae el bearer token, lo verifica y comprueba que la identidad sigue
//! existiendo antes de inyectar `AuthenticatedUser` en las extensions.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::debug;
use uuid::Uuid;

use crate::{
    state::AppState,
    utils::{
        errors::{not_authenticated, AppError},
        jwt::{extract_token_from_header, verify_token},
    },
};

/// Usuario autenticado que se inyecta en las requests
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
}

/// Middleware de autenticación JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(not_authenticated)?;

    let token = extract_token_from_header(auth_header)?;
    let claims = verify_token(token, &state.jwt).map_err(|e| {
        debug!("🔒 Token rechazado: {}", e);
        not_authenticated()
    })?;
    let user_id = claims.user_id().map_err(|_| not_authenticated())?;

    let user = state
        .repositories
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(not_authenticated)?;

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: user.id,
        email: user.email,
    });

    Ok(next.run(request).await)
}
