//! Almacenamiento en memoria
//!
//! Implementa todos los traits de repositorio sobre tablas protegidas por un
//! `RwLock`. Se usa en tests y con `STORAGE_BACKEND=memory` para desarrollo local.
//! Cada operación toma el lock una sola vez, así que las cascadas son atómicas.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    Attachment, Company, TripEntry, TripFilters, User, UserProfile, Vehicle, VehicleAssignment,
};
use crate::repositories::{
    AssignmentRepository, AttachmentRepository, CompanyRepository, ProfileRepository,
    TripRepository, UserRepository, VehicleRepository,
};
use crate::utils::errors::{AppError, AppResult};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    companies: HashMap<Uuid, Company>,
    profiles: HashMap<Uuid, UserProfile>,
    vehicles: HashMap<Uuid, Vehicle>,
    assignments: Vec<VehicleAssignment>,
    trips: HashMap<Uuid, TripEntry>,
    attachments: HashMap<Uuid, Attachment>,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(email.trim()) && Some(u.id) != except)
    }

    fn plate_taken(&self, company_id: Uuid, plate: &str, except: Option<Uuid>) -> bool {
        self.vehicles.values().any(|v| {
            v.company_id == company_id
                && v.license_plate.eq_ignore_ascii_case(plate)
                && Some(v.id) != except
        })
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

fn newest_first(trips: &mut [TripEntry]) {
    trips.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.time_start.cmp(&a.time_start))
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: &User) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(&user.email, None) {
            return Err(AppError::Conflict("User with this email already exists".to_string()));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email.trim()))
            .cloned())
    }

    async fn update_contact(&self, id: Uuid, name: &str, email: &str) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(email, Some(id)) {
            return Err(AppError::Conflict("User with this email already exists".to_string()));
        }
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        user.name = name.to_string();
        user.email = email.to_string();
        Ok(user.clone())
    }
}

#[async_trait]
impl CompanyRepository for MemoryStore {
    async fn create_with_admin(&self, company: &Company, admin: &UserProfile) -> AppResult<Company> {
        let mut tables = self.tables.write().await;
        tables.companies.insert(company.id, company.clone());
        tables.profiles.insert(admin.id, admin.clone());
        Ok(company.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Company>> {
        Ok(self.tables.read().await.companies.get(&id).cloned())
    }

    async fn update(&self, company: &Company) -> AppResult<Company> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .companies
            .get_mut(&company.id)
            .ok_or_else(|| AppError::NotFound("Company not found".to_string()))?;
        *stored = Company {
            updated_at: Utc::now(),
            ..company.clone()
        };
        Ok(stored.clone())
    }
}

#[async_trait]
impl ProfileRepository for MemoryStore {
    async fn create(&self, profile: &UserProfile) -> AppResult<UserProfile> {
        self.tables
            .write()
            .await
            .profiles
            .insert(profile.id, profile.clone());
        Ok(profile.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<UserProfile>> {
        Ok(self.tables.read().await.profiles.get(&id).cloned())
    }

    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<UserProfile>> {
        let tables = self.tables.read().await;
        Ok(tables
            .profiles
            .values()
            .filter(|p| p.user_id == Some(user_id))
            .min_by_key(|p| p.created_at)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserProfile>> {
        let tables = self.tables.read().await;
        Ok(tables
            .profiles
            .values()
            .filter(|p| p.email.eq_ignore_ascii_case(email.trim()))
            .min_by_key(|p| p.created_at)
            .cloned())
    }

    async fn list_by_company(&self, company_id: Uuid) -> AppResult<Vec<UserProfile>> {
        let tables = self.tables.read().await;
        let mut profiles: Vec<UserProfile> = tables
            .profiles
            .values()
            .filter(|p| p.company_id == Some(company_id))
            .cloned()
            .collect();
        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(profiles)
    }

    async fn update_contact(&self, id: Uuid, name: &str, email: &str) -> AppResult<UserProfile> {
        let mut tables = self.tables.write().await;
        let profile = tables
            .profiles
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("User profile not found".to_string()))?;
        profile.name = name.to_string();
        profile.email = email.to_string();
        Ok(profile.clone())
    }

    async fn link_user(&self, id: Uuid, user_id: Uuid) -> AppResult<UserProfile> {
        let mut tables = self.tables.write().await;
        match tables.profiles.get_mut(&id) {
            Some(profile) if profile.user_id.is_none() => {
                profile.user_id = Some(user_id);
                Ok(profile.clone())
            }
            _ => Err(AppError::Conflict("Invitation was already claimed".to_string())),
        }
    }

    async fn delete_with_assignments(&self, id: Uuid) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.profiles.contains_key(&id) {
            return Err(AppError::NotFound("User profile not found".to_string()));
        }
        tables.assignments.retain(|a| a.profile_id != id);
        tables.profiles.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl VehicleRepository for MemoryStore {
    async fn create(&self, vehicle: &Vehicle) -> AppResult<Vehicle> {
        let mut tables = self.tables.write().await;
        if tables.plate_taken(vehicle.company_id, &vehicle.license_plate, None) {
            return Err(AppError::Conflict(
                "License plate is already registered for this company".to_string(),
            ));
        }
        tables.vehicles.insert(vehicle.id, vehicle.clone());
        Ok(vehicle.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        Ok(self.tables.read().await.vehicles.get(&id).cloned())
    }

    async fn list_by_company(&self, company_id: Uuid) -> AppResult<Vec<Vehicle>> {
        let tables = self.tables.read().await;
        let mut vehicles: Vec<Vehicle> = tables
            .vehicles
            .values()
            .filter(|v| v.company_id == company_id)
            .cloned()
            .collect();
        vehicles.sort_by(|a, b| {
            (&a.brand, &a.model, &a.license_plate).cmp(&(&b.brand, &b.model, &b.license_plate))
        });
        Ok(vehicles)
    }

    async fn license_plate_exists(
        &self,
        company_id: Uuid,
        license_plate: &str,
        exclude: Option<Uuid>,
    ) -> AppResult<bool> {
        Ok(self
            .tables
            .read()
            .await
            .plate_taken(company_id, license_plate, exclude))
    }

    async fn update(&self, vehicle: &Vehicle) -> AppResult<Vehicle> {
        let mut tables = self.tables.write().await;
        if tables.plate_taken(vehicle.company_id, &vehicle.license_plate, Some(vehicle.id)) {
            return Err(AppError::Conflict(
                "License plate is already registered for this company".to_string(),
            ));
        }
        let stored = tables
            .vehicles
            .get_mut(&vehicle.id)
            .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;
        *stored = Vehicle {
            updated_at: Utc::now(),
            ..vehicle.clone()
        };
        Ok(stored.clone())
    }

    async fn delete_with_assignments(&self, id: Uuid) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if tables.vehicles.remove(&id).is_none() {
            return Err(AppError::NotFound("Vehicle not found".to_string()));
        }
        tables.assignments.retain(|a| a.vehicle_id != id);
        Ok(())
    }
}

#[async_trait]
impl AssignmentRepository for MemoryStore {
    async fn create(&self, assignment: &VehicleAssignment) -> AppResult<VehicleAssignment> {
        let mut tables = self.tables.write().await;
        let duplicate = tables.assignments.iter().any(|a| {
            a.profile_id == assignment.profile_id && a.vehicle_id == assignment.vehicle_id
        });
        if duplicate {
            return Err(AppError::Conflict(
                "Vehicle is already assigned to this driver".to_string(),
            ));
        }
        tables.assignments.push(assignment.clone());
        Ok(assignment.clone())
    }

    async fn exists(&self, profile_id: Uuid, vehicle_id: Uuid) -> AppResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables
            .assignments
            .iter()
            .any(|a| a.profile_id == profile_id && a.vehicle_id == vehicle_id))
    }

    async fn vehicles_for_profile(&self, profile_id: Uuid) -> AppResult<Vec<Vehicle>> {
        let tables = self.tables.read().await;
        Ok(tables
            .assignments
            .iter()
            .filter(|a| a.profile_id == profile_id)
            .filter_map(|a| tables.vehicles.get(&a.vehicle_id).cloned())
            .collect())
    }

    async fn delete(&self, profile_id: Uuid, vehicle_id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.assignments.len();
        tables
            .assignments
            .retain(|a| !(a.profile_id == profile_id && a.vehicle_id == vehicle_id));
        Ok(tables.assignments.len() < before)
    }
}

#[async_trait]
impl TripRepository for MemoryStore {
    async fn create(&self, trip: &TripEntry) -> AppResult<TripEntry> {
        self.tables.write().await.trips.insert(trip.id, trip.clone());
        Ok(trip.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<TripEntry>> {
        Ok(self.tables.read().await.trips.get(&id).cloned())
    }

    async fn list_by_profile(&self, profile_id: Uuid) -> AppResult<Vec<TripEntry>> {
        let tables = self.tables.read().await;
        let mut trips: Vec<TripEntry> = tables
            .trips
            .values()
            .filter(|t| t.profile_id == profile_id)
            .cloned()
            .collect();
        newest_first(&mut trips);
        Ok(trips)
    }

    async fn list_by_company(&self, company_id: Uuid, filters: &TripFilters) -> AppResult<Vec<TripEntry>> {
        let tables = self.tables.read().await;
        let mut trips: Vec<TripEntry> = tables
            .trips
            .values()
            .filter(|t| t.company_id == company_id && filters.matches(t))
            .cloned()
            .collect();
        newest_first(&mut trips);
        Ok(trips)
    }

    async fn count_by_vehicle(&self, vehicle_id: Uuid) -> AppResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables.trips.values().filter(|t| t.vehicle_id == vehicle_id).count() as i64)
    }

    async fn update(&self, trip: &TripEntry) -> AppResult<TripEntry> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .trips
            .get_mut(&trip.id)
            .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;
        *stored = TripEntry {
            updated_at: Utc::now(),
            ..trip.clone()
        };
        Ok(stored.clone())
    }

    async fn delete_with_attachments(&self, id: Uuid) -> AppResult<Vec<Attachment>> {
        let mut tables = self.tables.write().await;
        if tables.trips.remove(&id).is_none() {
            return Err(AppError::NotFound("Trip not found".to_string()));
        }
        let removed: Vec<Uuid> = tables
            .attachments
            .values()
            .filter(|a| a.trip_id == id)
            .map(|a| a.id)
            .collect();
        Ok(removed
            .into_iter()
            .filter_map(|attachment_id| tables.attachments.remove(&attachment_id))
            .collect())
    }
}

#[async_trait]
impl AttachmentRepository for MemoryStore {
    async fn create(&self, attachment: &Attachment) -> AppResult<Attachment> {
        let mut tables = self.tables.write().await;
        if tables
            .attachments
            .values()
            .any(|a| a.storage_id == attachment.storage_id)
        {
            return Err(AppError::Conflict("File is already attached".to_string()));
        }
        tables.attachments.insert(attachment.id, attachment.clone());
        Ok(attachment.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Attachment>> {
        Ok(self.tables.read().await.attachments.get(&id).cloned())
    }

    async fn list_by_trip(&self, trip_id: Uuid) -> AppResult<Vec<Attachment>> {
        let tables = self.tables.read().await;
        let mut attachments: Vec<Attachment> = tables
            .attachments
            .values()
            .filter(|a| a.trip_id == trip_id)
            .cloned()
            .collect();
        attachments.sort_by_key(|a| a.created_at);
        Ok(attachments)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.tables.write().await.attachments.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FuelType, UserRole};

    fn vehicle(company_id: Uuid, plate: &str) -> Vehicle {
        Vehicle {
            id: Uuid::new_v4(),
            company_id,
            brand: "VW".to_string(),
            model: "Passat".to_string(),
            license_plate: plate.to_string(),
            vin: None,
            fuel_type: FuelType::Diesel,
            year: 2020,
            mileage: 0,
            is_public: false,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_plate_unique_per_company() {
        let store = MemoryStore::default();
        let company = Uuid::new_v4();
        VehicleRepository::create(&store, &vehicle(company, "M-AB 123")).await.unwrap();

        let dup = VehicleRepository::create(&store, &vehicle(company, "m-ab 123")).await;
        assert!(matches!(dup, Err(AppError::Conflict(_))));

        // Otra empresa puede usar la misma matrícula
        VehicleRepository::create(&store, &vehicle(Uuid::new_v4(), "M-AB 123")).await.unwrap();
    }

    #[tokio::test]
    async fn test_profile_delete_cascades_assignments() {
        let store = MemoryStore::default();
        let company = Uuid::new_v4();
        let v = VehicleRepository::create(&store, &vehicle(company, "B-C 1")).await.unwrap();
        let profile = UserProfile::new(
            None,
            Some(company),
            UserRole::Driver,
            "Jana".to_string(),
            "jana@example.com".to_string(),
        );
        ProfileRepository::create(&store, &profile).await.unwrap();
        AssignmentRepository::create(&store, &VehicleAssignment::new(profile.id, v.id))
            .await
            .unwrap();

        ProfileRepository::delete_with_assignments(&store, profile.id).await.unwrap();

        assert!(!AssignmentRepository::exists(&store, profile.id, v.id).await.unwrap());
        assert!(ProfileRepository::find_by_id(&store, profile.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_link_user_only_once() {
        let store = MemoryStore::default();
        let profile = UserProfile::new(
            None,
            None,
            UserRole::Driver,
            "Tom".to_string(),
            "tom@example.com".to_string(),
        );
        ProfileRepository::create(&store, &profile).await.unwrap();

        let linked = store.link_user(profile.id, Uuid::new_v4()).await.unwrap();
        assert!(!linked.is_pending());
        assert!(store.link_user(profile.id, Uuid::new_v4()).await.is_err());
    }
}
