//! Durable record store.
//!
//! The relational store is an external collaborator reached only through
//! the `TransitStore` trait: keyed lookups and inserts, no schema details.
//! Store failures propagate to the caller as service failures; retry
//! policy, if any, belongs to the calling workflow.
//!
//! `MemoryStore` is the in-process implementation used by the binary and
//! the tests, seeded with the Bhilai dataset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::domain::{GeoPoint, TransportMode};

/// Backing-store failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// No record under the requested key.
    #[error("record not found")]
    NotFound,

    /// The store could not serve the operation.
    #[error("store backend error: {0}")]
    Backend(String),
}

/// A bus stop on the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusStop {
    pub id: i64,
    pub name: String,
    pub location: GeoPoint,
    pub amenities: Vec<String>,
    pub accessibility_features: Vec<String>,
}

/// A persisted route between two points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    pub id: i64,
    pub name: String,
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub mode: TransportMode,
    pub eta_mins: i64,
    pub cost: f64,
}

/// A route awaiting insertion.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRoute {
    pub name: String,
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub mode: TransportMode,
    pub eta_mins: i64,
    pub cost: f64,
}

/// Booking lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

/// A persisted ride booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub user_id: i64,
    pub vehicle_id: i64,
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub estimated_fare: f64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

/// A booking awaiting insertion.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBooking {
    pub user_id: i64,
    pub vehicle_id: i64,
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub estimated_fare: f64,
}

/// Keyed access to durable transit records.
pub trait TransitStore: Send + Sync {
    fn list_bus_stops(&self) -> impl Future<Output = Result<Vec<BusStop>, StoreError>> + Send;
    fn list_routes(&self) -> impl Future<Output = Result<Vec<RouteRecord>, StoreError>> + Send;
    fn find_route(&self, id: i64) -> impl Future<Output = Result<RouteRecord, StoreError>> + Send;
    fn insert_route(
        &self,
        route: NewRoute,
    ) -> impl Future<Output = Result<RouteRecord, StoreError>> + Send;
    fn insert_booking(
        &self,
        booking: NewBooking,
    ) -> impl Future<Output = Result<Booking, StoreError>> + Send;
    fn bookings_for_user(
        &self,
        user_id: i64,
    ) -> impl Future<Output = Result<Vec<Booking>, StoreError>> + Send;
}

#[derive(Default)]
struct Tables {
    bus_stops: Vec<BusStop>,
    routes: Vec<RouteRecord>,
    bookings: Vec<Booking>,
    next_route_id: i64,
    next_booking_id: i64,
}

/// In-process store implementation.
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables {
                next_route_id: 1,
                next_booking_id: 1,
                ..Tables::default()
            }),
        }
    }

    /// A store seeded with the Bhilai-Durg dataset the binary serves.
    pub fn with_seed_data() -> Self {
        let mut tables = Tables {
            next_route_id: 1,
            next_booking_id: 1,
            ..Tables::default()
        };

        let stops = [
            ("Civic Center", 21.2094, 81.3947, vec!["shelter", "seating"]),
            ("Maitri Bagh Gate", 21.1938, 81.3509, vec!["shelter"]),
            ("BIT Durg", 21.1905, 81.2849, vec!["seating"]),
            ("Steel Plant Main Gate", 21.2144, 81.4381, vec!["shelter", "lighting"]),
            ("Supela Chowk", 21.2055, 81.3625, vec![]),
        ];

        for (i, (name, lat, lon, amenities)) in stops.into_iter().enumerate() {
            if let Ok(location) = GeoPoint::new(lat, lon) {
                tables.bus_stops.push(BusStop {
                    id: i as i64 + 1,
                    name: name.to_string(),
                    location,
                    amenities: amenities.into_iter().map(String::from).collect(),
                    accessibility_features: vec!["low_floor_boarding".to_string()],
                });
            }
        }

        let routes = [
            ("Civic Center - Maitri Bagh", 21.2094, 81.3947, 21.1938, 81.3509),
            ("Civic Center - Steel Plant", 21.2094, 81.3947, 21.2144, 81.4381),
            ("Supela - BIT Durg", 21.2055, 81.3625, 21.1905, 81.2849),
        ];

        for (name, olat, olon, dlat, dlon) in routes {
            if let (Ok(origin), Ok(destination)) =
                (GeoPoint::new(olat, olon), GeoPoint::new(dlat, dlon))
            {
                let distance = origin.distance_km(&destination);
                let mode = TransportMode::Bus;
                let id = tables.next_route_id;
                tables.next_route_id += 1;
                tables.routes.push(RouteRecord {
                    id,
                    name: name.to_string(),
                    origin,
                    destination,
                    mode,
                    eta_mins: crate::estimate::travel_time_mins(distance, mode),
                    cost: crate::estimate::fare(distance, mode),
                });
            }
        }

        Self {
            tables: RwLock::new(tables),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TransitStore for MemoryStore {
    async fn list_bus_stops(&self) -> Result<Vec<BusStop>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.bus_stops.clone())
    }

    async fn list_routes(&self) -> Result<Vec<RouteRecord>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.routes.clone())
    }

    async fn find_route(&self, id: i64) -> Result<RouteRecord, StoreError> {
        let tables = self.tables.read().await;
        tables
            .routes
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn insert_route(&self, route: NewRoute) -> Result<RouteRecord, StoreError> {
        let mut tables = self.tables.write().await;
        let id = tables.next_route_id;
        tables.next_route_id += 1;

        let record = RouteRecord {
            id,
            name: route.name,
            origin: route.origin,
            destination: route.destination,
            mode: route.mode,
            eta_mins: route.eta_mins,
            cost: route.cost,
        };
        tables.routes.push(record.clone());
        Ok(record)
    }

    async fn insert_booking(&self, booking: NewBooking) -> Result<Booking, StoreError> {
        let mut tables = self.tables.write().await;
        let id = tables.next_booking_id;
        tables.next_booking_id += 1;

        let record = Booking {
            id,
            user_id: booking.user_id,
            vehicle_id: booking.vehicle_id,
            origin: booking.origin,
            destination: booking.destination,
            estimated_fare: booking.estimated_fare,
            status: BookingStatus::Pending,
            created_at: Utc::now(),
        };
        tables.bookings.push(record.clone());
        Ok(record)
    }

    async fn bookings_for_user(&self, user_id: i64) -> Result<Vec<Booking>, StoreError> {
        let tables = self.tables.read().await;
        let mut bookings: Vec<Booking> = tables
            .bookings
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        // Most recent first, like the booking history screen expects.
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bookings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    #[tokio::test]
    async fn insert_route_assigns_sequential_ids() {
        let store = MemoryStore::new();

        let route = NewRoute {
            name: "Test".into(),
            origin: point(21.2094, 81.3947),
            destination: point(21.1938, 81.3509),
            mode: TransportMode::Bus,
            eta_mins: 12,
            cost: 20.0,
        };

        let first = store.insert_route(route.clone()).await.unwrap();
        let second = store.insert_route(route).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(store.list_routes().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn find_route_by_id() {
        let store = MemoryStore::new();
        let inserted = store
            .insert_route(NewRoute {
                name: "Test".into(),
                origin: point(21.2094, 81.3947),
                destination: point(21.1938, 81.3509),
                mode: TransportMode::Auto,
                eta_mins: 10,
                cost: 55.0,
            })
            .await
            .unwrap();

        let found = store.find_route(inserted.id).await.unwrap();
        assert_eq!(found, inserted);
        assert!(matches!(
            store.find_route(999).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn bookings_filter_by_user_newest_first() {
        let store = MemoryStore::new();

        for user_id in [7, 7, 8] {
            store
                .insert_booking(NewBooking {
                    user_id,
                    vehicle_id: 1,
                    origin: point(21.2094, 81.3947),
                    destination: point(21.1938, 81.3509),
                    estimated_fare: 50.0,
                })
                .await
                .unwrap();
        }

        let bookings = store.bookings_for_user(7).await.unwrap();
        assert_eq!(bookings.len(), 2);
        assert!(bookings[0].created_at >= bookings[1].created_at);
        assert!(bookings.iter().all(|b| b.user_id == 7));
        assert_eq!(bookings[0].status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn seed_data_is_well_formed() {
        let store = MemoryStore::with_seed_data();
        let stops = store.list_bus_stops().await.unwrap();
        let routes = store.list_routes().await.unwrap();
        assert_eq!(stops.len(), 5);
        assert_eq!(routes.len(), 3);
        for stop in &stops {
            assert!(stop.location.is_in_service_area());
        }
    }
}
