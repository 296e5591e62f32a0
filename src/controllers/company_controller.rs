use chrono::Utc;
use tracing::info;
use validator::Validate;

use crate::dto::company_dto::{CompanyOverview, CreateCompanyRequest, UpdateCompanyRequest};
use crate::dto::ApiResponse;
use crate::middleware::AuthenticatedUser;
use crate::models::{total_kilometers, Company, TripFilters, UserProfile, UserRole};
use crate::repositories::Repositories;
use crate::services::authorization_service::AuthorizationService;
use crate::state::AppState;
use crate::utils::errors::{not_authenticated, not_authorized, AppError, AppResult};
use crate::utils::validation::non_empty;

pub struct CompanyController {
    repositories: Repositories,
}

fn company_not_found() -> AppError {
    AppError::NotFound("Company not found".to_string())
}

impl CompanyController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repositories: state.repositories.clone(),
        }
    }

    fn authorization(&self) -> AuthorizationService<'_> {
        AuthorizationService::new(&self.repositories)
    }

    /// Crear la empresa y convertir al usuario en su admin
    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        request: CreateCompanyRequest,
    ) -> AppResult<ApiResponse<Company>> {
        request.validate()?;

        let existing = self.repositories.profiles.find_by_user(user.user_id).await?;
        if existing.as_ref().and_then(|p| p.company_id).is_some() {
            return Err(AppError::Conflict("User already belongs to a company".to_string()));
        }

        let company = Company::new(
            request.name.trim().to_string(),
            non_empty(request.address),
            non_empty(request.industry),
            request.is_rental_company,
        );

        let admin = match existing {
            Some(profile) => UserProfile {
                company_id: Some(company.id),
                role: UserRole::Admin,
                ..profile
            },
            None => {
                let identity = self
                    .repositories
                    .users
                    .find_by_id(user.user_id)
                    .await?
                    .ok_or_else(not_authenticated)?;
                UserProfile::new(
                    Some(identity.id),
                    Some(company.id),
                    UserRole::Admin,
                    identity.name,
                    identity.email,
                )
            }
        };

        let company = self.repositories.companies.create_with_admin(&company, &admin).await?;
        info!("🏢 Empresa {} creada por {}", company.id, user.user_id);
        Ok(ApiResponse::success_with_message(company, "Company created"))
    }

    pub async fn current(&self, user: &AuthenticatedUser) -> AppResult<Company> {
        let (_, company_id) = self.authorization().member_of(user).await?;
        self.repositories
            .companies
            .find_by_id(company_id)
            .await?
            .ok_or_else(company_not_found)
    }

    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        company_id: uuid::Uuid,
        request: UpdateCompanyRequest,
    ) -> AppResult<ApiResponse<Company>> {
        request.validate()?;

        let (_, admin_company) = self.authorization().admin_of(user).await?;
        if admin_company != company_id {
            return Err(not_authorized());
        }

        let mut company = self
            .repositories
            .companies
            .find_by_id(company_id)
            .await?
            .ok_or_else(company_not_found)?;

        if let Some(name) = request.name {
            company.name = name.trim().to_string();
        }
        if request.address.is_some() {
            company.address = non_empty(request.address);
        }
        if request.industry.is_some() {
            company.industry = non_empty(request.industry);
        }
        if let Some(is_rental_company) = request.is_rental_company {
            company.is_rental_company = is_rental_company;
        }
        company.updated_at = Utc::now();

        let company = self.repositories.companies.update(&company).await?;
        Ok(ApiResponse::success_with_message(company, "Company updated"))
    }

    /// Cifras del panel del admin
    pub async fn overview(&self, user: &AuthenticatedUser) -> AppResult<CompanyOverview> {
        let (_, company_id) = self.authorization().admin_of(user).await?;

        let company = self
            .repositories
            .companies
            .find_by_id(company_id)
            .await?
            .ok_or_else(company_not_found)?;
        let vehicles = self.repositories.vehicles.list_by_company(company_id).await?;
        let members = self.repositories.profiles.list_by_company(company_id).await?;
        let trips = self
            .repositories
            .trips
            .list_by_company(company_id, &TripFilters::default())
            .await?;

        Ok(CompanyOverview {
            company,
            vehicle_count: vehicles.len(),
            public_vehicle_count: vehicles.iter().filter(|v| v.is_public).count(),
            member_count: members.len(),
            pending_invitation_count: members.iter().filter(|p| p.is_pending()).count(),
            trip_count: trips.len(),
            total_km: total_kilometers(&trips),
        })
    }
}
