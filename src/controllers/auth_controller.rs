use bcrypt::{hash, verify};
use tracing::info;
use validator::Validate;

use crate::dto::auth_dto::{AuthResponse, SignInRequest, SignUpRequest, UserResponse};
use crate::dto::ApiResponse;
use crate::models::{User, UserProfile};
use crate::repositories::Repositories;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::jwt::{generate_token, JwtConfig};

pub struct AuthController {
    repositories: Repositories,
    jwt: JwtConfig,
    bcrypt_cost: u32,
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid credentials".to_string())
}

impl AuthController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repositories: state.repositories.clone(),
            jwt: state.jwt.clone(),
            bcrypt_cost: state.config.bcrypt_cost,
        }
    }

    pub async fn sign_up(&self, request: SignUpRequest) -> AppResult<ApiResponse<AuthResponse>> {
        request.validate()?;

        let email = request.email.trim().to_lowercase();
        if self.repositories.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("User with this email already exists".to_string()));
        }

        let password_hash = hash(&request.password, self.bcrypt_cost)
            .map_err(|e| AppError::Hash(e.to_string()))?;
        let user = self
            .repositories
            .users
            .create(&User::new(email, request.name.trim().to_string(), password_hash))
            .await?;

        // Una invitación pendiente con el mismo email pasa a esta identidad
        let profile = match self.repositories.profiles.find_by_email(&user.email).await? {
            Some(pending) if pending.is_pending() => {
                info!("🔗 Invitación {} reclamada por {}", pending.id, user.id);
                Some(self.repositories.profiles.link_user(pending.id, user.id).await?)
            }
            _ => None,
        };

        info!("👤 Nueva identidad registrada: {}", user.id);
        let response = self.auth_response(user, profile)?;
        Ok(ApiResponse::success_with_message(response, "Account created"))
    }

    pub async fn sign_in(&self, request: SignInRequest) -> AppResult<ApiResponse<AuthResponse>> {
        request.validate().map_err(|_| invalid_credentials())?;

        let user = self
            .repositories
            .users
            .find_by_email(&request.email.trim().to_lowercase())
            .await?
            .ok_or_else(invalid_credentials)?;

        let valid = verify(&request.password, &user.password_hash)
            .map_err(|e| AppError::Hash(e.to_string()))?;
        if !valid {
            return Err(invalid_credentials());
        }

        let profile = self.repositories.profiles.find_by_user(user.id).await?;
        let response = self.auth_response(user, profile)?;
        Ok(ApiResponse::success_with_message(response, "Signed in"))
    }

    fn auth_response(&self, user: User, profile: Option<UserProfile>) -> AppResult<AuthResponse> {
        let token = generate_token(user.id, &user.email, &self.jwt)?;
        Ok(AuthResponse {
            token,
            token_type: "Bearer",
            expires_in: self.jwt.expiration,
            user: UserResponse::from(user),
            profile,
        })
    }
}
