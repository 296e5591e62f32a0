//! Modelo de entradas del Fahrtenbuch (libro de viajes)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Entrada de viaje - mapea a la tabla fahrtenbuch_entries
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct TripEntry {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub company_id: Uuid,
    pub vehicle_id: Uuid,
    pub date: NaiveDate,
    pub time_start: Option<String>,
    pub time_end: Option<String>,
    pub location_start: String,
    pub location_end: String,
    pub km_start: i64,
    pub km_end: i64,
    pub purpose: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TripEntry {
    pub fn distance_km(&self) -> i64 {
        self.km_end - self.km_start
    }
}

/// Filtros para el listado de viajes de una empresa
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TripFilters {
    pub vehicle_id: Option<Uuid>,
    pub profile_id: Option<Uuid>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl TripFilters {
    pub fn matches(&self, trip: &TripEntry) -> bool {
        self.vehicle_id.map_or(true, |id| trip.vehicle_id == id)
            && self.profile_id.map_or(true, |id| trip.profile_id == id)
            && self.date_from.map_or(true, |from| trip.date >= from)
            && self.date_to.map_or(true, |to| trip.date <= to)
    }
}

/// Suma de kilómetros recorridos; satura en lugar de desbordar
pub fn total_kilometers<'a>(trips: impl IntoIterator<Item = &'a TripEntry>) -> i64 {
    trips
        .into_iter()
        .map(TripEntry::distance_km)
        .fold(0, i64::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip(date: &str, km_start: i64, km_end: i64) -> TripEntry {
        TripEntry {
            id: Uuid::new_v4(),
            profile_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            vehicle_id: Uuid::new_v4(),
            date: date.parse().unwrap(),
            time_start: None,
            time_end: None,
            location_start: "Büro".to_string(),
            location_end: "Kunde".to_string(),
            km_start,
            km_end,
            purpose: "Kundenbesuch".to_string(),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_total_kilometers() {
        let trips = vec![trip("2025-03-01", 100, 150), trip("2025-03-02", 150, 400)];
        assert_eq!(total_kilometers(&trips), 300);
        assert_eq!(total_kilometers(&Vec::new()), 0);
    }

    #[test]
    fn test_total_kilometers_saturates() {
        let trips = vec![trip("2025-03-01", 0, i64::MAX), trip("2025-03-02", 0, i64::MAX)];
        assert_eq!(total_kilometers(&trips), i64::MAX);
    }

    #[test]
    fn test_date_filter_is_inclusive() {
        let t = trip("2025-03-01", 0, 10);
        let filters = TripFilters {
            date_from: Some("2025-03-01".parse().unwrap()),
            date_to: Some("2025-03-01".parse().unwrap()),
            ..Default::default()
        };
        assert!(filters.matches(&t));

        let later = TripFilters {
            date_from: Some("2025-03-02".parse().unwrap()),
            ..Default::default()
        };
        assert!(!later.matches(&t));
    }

    #[test]
    fn test_vehicle_filter() {
        let t = trip("2025-03-01", 0, 10);
        let other = TripFilters {
            vehicle_id: Some(Uuid::new_v4()),
            ..Default::default()
        };
        assert!(!other.matches(&t));
        let same = TripFilters {
            vehicle_id: Some(t.vehicle_id),
            ..Default::default()
        };
        assert!(same.matches(&t));
    }
}
