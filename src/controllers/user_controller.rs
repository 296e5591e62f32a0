use tracing::info;
use validator::Validate;

use crate::dto::auth_dto::{CurrentUserResponse, UpdateProfileRequest, UserResponse};
use crate::dto::ApiResponse;
use crate::middleware::AuthenticatedUser;
use crate::repositories::Repositories;
use crate::state::AppState;
use crate::utils::errors::{not_authenticated, AppError, AppResult};

pub struct UserController {
    repositories: Repositories,
}

impl UserController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repositories: state.repositories.clone(),
        }
    }

    /// Identidad actual con su perfil (puede no tener perfil todavía)
    pub async fn me(&self, user: &AuthenticatedUser) -> AppResult<CurrentUserResponse> {
        let identity = self
            .repositories
            .users
            .find_by_id(user.user_id)
            .await?
            .ok_or_else(not_authenticated)?;
        let profile = self.repositories.profiles.find_by_user(user.user_id).await?;

        Ok(CurrentUserResponse {
            user: UserResponse::from(identity),
            profile,
        })
    }

    pub async fn update_me(
        &self,
        user: &AuthenticatedUser,
        request: UpdateProfileRequest,
    ) -> AppResult<ApiResponse<CurrentUserResponse>> {
        request.validate()?;

        let name = request.name.trim().to_string();
        let email = request.email.trim().to_lowercase();

        if let Some(other) = self.repositories.users.find_by_email(&email).await? {
            if other.id != user.user_id {
                return Err(AppError::Conflict("Email is already in use".to_string()));
            }
        }
        if let Some(other) = self.repositories.profiles.find_by_email(&email).await? {
            if other.user_id != Some(user.user_id) {
                return Err(AppError::Conflict("Email is already in use".to_string()));
            }
        }

        let profile = match self.repositories.profiles.find_by_user(user.user_id).await? {
            Some(profile) => Some(
                self.repositories
                    .profiles
                    .update_contact(profile.id, &name, &email)
                    .await?,
            ),
            None => None,
        };
        let identity = self
            .repositories
            .users
            .update_contact(user.user_id, &name, &email)
            .await?;

        info!("✏️ Perfil actualizado para {}", user.user_id);
        Ok(ApiResponse::success_with_message(
            CurrentUserResponse {
                user: UserResponse::from(identity),
                profile,
            },
            "Profile updated",
        ))
    }
}
