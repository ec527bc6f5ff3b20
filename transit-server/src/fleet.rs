//! Fleet registry.
//!
//! Thread-safe registry of registered vehicles, keyed by plate. Position
//! reports, availability toggles and rating events all go through here;
//! reads hand out snapshots rather than references so no lock is held
//! across request handling.
//!
//! Position reports are additionally published on a broadcast channel.
//! Subscribers receive independently: a slow or dropped subscriber never
//! prevents the others from being notified, and dropping the receiver is
//! the unsubscribe.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::{RwLock, broadcast};

use crate::domain::{
    GeoPoint, PlateNumber, ValidationError, Vehicle, VehicleFeature, VehicleSnapshot,
    VehicleStatus, VehicleType,
};

/// Fleet operation failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FleetError {
    /// No vehicle registered under the given plate.
    #[error("unknown vehicle: {0}")]
    UnknownVehicle(String),

    /// A vehicle is already registered under the given plate.
    #[error("vehicle already registered: {0}")]
    AlreadyRegistered(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// A vehicle matched by a nearby search.
#[derive(Debug, Clone, Serialize)]
pub struct NearbyVehicle {
    pub distance_km: f64,
    /// Name of the assigned driver, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_name: Option<String>,
    #[serde(flatten)]
    pub snapshot: VehicleSnapshot,
}

/// A published position report.
#[derive(Debug, Clone)]
pub struct LocationUpdate {
    pub plate: PlateNumber,
    pub location: GeoPoint,
}

/// Capacity of the location-update broadcast channel. A subscriber that
/// lags behind this many updates starts losing the oldest ones.
const UPDATE_CHANNEL_CAPACITY: usize = 256;

/// Thread-safe vehicle registry, keyed by plate.
#[derive(Clone)]
pub struct FleetRegistry {
    inner: Arc<RwLock<HashMap<PlateNumber, Vehicle>>>,
    updates: broadcast::Sender<LocationUpdate>,
}

impl Default for FleetRegistry {
    fn default() -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            updates,
        }
    }
}

impl FleetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to position reports. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<LocationUpdate> {
        self.updates.subscribe()
    }

    /// Register a vehicle. Fails if the plate is already registered.
    pub async fn register(&self, vehicle: Vehicle) -> Result<(), FleetError> {
        let mut fleet = self.inner.write().await;
        let plate = vehicle.plate().clone();
        if fleet.contains_key(&plate) {
            return Err(FleetError::AlreadyRegistered(plate.as_str().to_string()));
        }
        fleet.insert(plate, vehicle);
        Ok(())
    }

    /// Number of registered vehicles.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Record a position report for a vehicle and publish it to
    /// subscribers.
    pub async fn update_location(
        &self,
        plate: &PlateNumber,
        latitude: f64,
        longitude: f64,
        accuracy: Option<f64>,
    ) -> Result<(), FleetError> {
        let location = self
            .with_vehicle(plate, |v| {
                v.update_location(latitude, longitude, accuracy)?;
                // The vehicle validated and stored the point just above.
                v.current_location()
                    .copied()
                    .ok_or_else(|| FleetError::UnknownVehicle(plate.as_str().to_string()))
            })
            .await?;

        // Publish after the lock is released. An error only means there
        // are currently no subscribers.
        let _ = self.updates.send(LocationUpdate {
            plate: plate.clone(),
            location,
        });
        Ok(())
    }

    /// Toggle a vehicle's availability flag.
    pub async fn set_availability(
        &self,
        plate: &PlateNumber,
        available: bool,
    ) -> Result<(), FleetError> {
        self.with_vehicle(plate, |v| {
            v.set_availability(available);
            Ok(())
        })
        .await
    }

    /// Record a completed-ride rating for a vehicle's driver.
    pub async fn add_rating(&self, plate: &PlateNumber, rating: f64) -> Result<(), FleetError> {
        self.with_vehicle(plate, |v| v.add_rating(rating).map_err(FleetError::from))
            .await
    }

    /// Assign a driver to a vehicle.
    pub async fn set_driver(
        &self,
        plate: &PlateNumber,
        name: &str,
        phone: &str,
    ) -> Result<(), FleetError> {
        self.with_vehicle(plate, |v| {
            v.set_driver(name, phone).map_err(FleetError::from)
        })
        .await
    }

    /// Advertise a feature on a vehicle. Idempotent.
    pub async fn add_feature(
        &self,
        plate: &PlateNumber,
        feature: VehicleFeature,
    ) -> Result<(), FleetError> {
        self.with_vehicle(plate, |v| {
            v.add_feature(feature);
            Ok(())
        })
        .await
    }

    /// A read-only snapshot of one vehicle.
    pub async fn snapshot(&self, plate: &PlateNumber) -> Option<VehicleSnapshot> {
        let fleet = self.inner.read().await;
        fleet.get(plate).map(Vehicle::snapshot)
    }

    /// Available, online vehicles within `radius_km` of a point, nearest
    /// first, optionally filtered by type.
    pub async fn nearby(
        &self,
        point: &GeoPoint,
        radius_km: f64,
        vehicle_type: Option<VehicleType>,
    ) -> Vec<NearbyVehicle> {
        let now = Utc::now();
        let fleet = self.inner.read().await;

        let mut matches: Vec<NearbyVehicle> = fleet
            .values()
            .filter(|v| vehicle_type.is_none_or(|t| v.vehicle_type() == t))
            .filter(|v| v.status_at(now) == VehicleStatus::Online)
            .filter_map(|v| {
                let distance_km = v.distance_from(point)?;
                (distance_km <= radius_km).then(|| NearbyVehicle {
                    distance_km,
                    driver_name: v.driver().map(|d| d.name.clone()),
                    snapshot: v.snapshot_at(now),
                })
            })
            .collect();

        matches.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        matches
    }

    async fn with_vehicle<T>(
        &self,
        plate: &PlateNumber,
        f: impl FnOnce(&mut Vehicle) -> Result<T, FleetError>,
    ) -> Result<T, FleetError> {
        let mut fleet = self.inner.write().await;
        let vehicle = fleet
            .get_mut(plate)
            .ok_or_else(|| FleetError::UnknownVehicle(plate.as_str().to_string()))?;
        f(vehicle)
    }
}
