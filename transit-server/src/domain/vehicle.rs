//! Vehicles and drivers.
//!
//! A `Vehicle` is the movable asset of the fleet: a registered plate with a
//! type, capacity, driver, feature set, rolling driver rating and a last
//! reported position. Its status is derived at read time from two
//! independent signals: the availability flag (set explicitly) and the
//! staleness of the last location report.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::error::ValidationError;
use super::geo::GeoPoint;
use super::ids::{PhoneNumber, PlateNumber};
use super::mode::{VehicleFeature, VehicleType};

/// A location report older than this no longer counts as current.
const STALENESS_WINDOW_MINS: i64 = 5;

/// Derived three-state vehicle status. Never stored; computed on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    /// Availability flag is off.
    Unavailable,
    /// Available but no location, or the last report is stale.
    Offline,
    /// Available with a fresh location report.
    Online,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Unavailable => "unavailable",
            VehicleStatus::Offline => "offline",
            VehicleStatus::Online => "online",
        }
    }
}

/// The driver currently assigned to a vehicle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Driver {
    pub name: String,
    pub phone: PhoneNumber,
}

/// A read-only view of a vehicle for request handlers.
#[derive(Debug, Clone, Serialize)]
pub struct VehicleSnapshot {
    pub plate: PlateNumber,
    pub vehicle_type: VehicleType,
    pub status: VehicleStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    /// Rolling mean driver rating, rounded to one decimal place.
    pub driver_rating: f64,
    pub total_ratings: u64,
    pub features: Vec<VehicleFeature>,
}

/// A registered fleet vehicle.
#[derive(Debug, Clone)]
pub struct Vehicle {
    plate: PlateNumber,
    vehicle_type: VehicleType,
    capacity: u32,
    current_location: Option<GeoPoint>,
    available: bool,
    driver: Option<Driver>,
    rating: f64,
    total_ratings: u64,
    features: BTreeSet<VehicleFeature>,
    created_at: DateTime<Utc>,
    last_updated: DateTime<Utc>,
}

impl Vehicle {
    /// Register a vehicle. Fails on a malformed plate or zero capacity.
    pub fn new(plate: &str, vehicle_type: VehicleType, capacity: u32) -> Result<Self, ValidationError> {
        let plate = PlateNumber::parse(plate)?;
        if capacity < 1 {
            return Err(ValidationError::Capacity);
        }

        let now = Utc::now();
        Ok(Self {
            plate,
            vehicle_type,
            capacity,
            current_location: None,
            available: true,
            driver: None,
            rating: 0.0,
            total_ratings: 0,
            features: BTreeSet::new(),
            created_at: now,
            last_updated: now,
        })
    }

    pub fn plate(&self) -> &PlateNumber {
        &self.plate
    }

    pub fn vehicle_type(&self) -> VehicleType {
        self.vehicle_type
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn current_location(&self) -> Option<&GeoPoint> {
        self.current_location.as_ref()
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn driver(&self) -> Option<&Driver> {
        self.driver.as_ref()
    }

    /// Rolling mean driver rating in [0, 5].
    pub fn rating(&self) -> f64 {
        self.rating
    }

    pub fn total_ratings(&self) -> u64 {
        self.total_ratings
    }

    pub fn features(&self) -> impl Iterator<Item = VehicleFeature> + '_ {
        self.features.iter().copied()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Record a position report. Refreshes the staleness clock, so this may
    /// transition the vehicle from offline back to online.
    pub fn update_location(
        &mut self,
        latitude: f64,
        longitude: f64,
        accuracy: Option<f64>,
    ) -> Result<(), ValidationError> {
        let point = GeoPoint::with_details(latitude, longitude, accuracy, Some(Utc::now()))?;
        self.current_location = Some(point);
        self.last_updated = Utc::now();
        Ok(())
    }

    /// Assign a driver. Name must be at least 2 characters after trimming;
    /// phone must be a valid 10-digit mobile number.
    pub fn set_driver(&mut self, name: &str, phone: &str) -> Result<(), ValidationError> {
        let name = name.trim();
        if name.len() < 2 {
            return Err(ValidationError::DriverName);
        }
        let phone = PhoneNumber::parse(phone)?;

        self.driver = Some(Driver {
            name: name.to_string(),
            phone,
        });
        Ok(())
    }

    /// Fold a completed-ride rating into the running mean.
    ///
    /// Incremental update, not a full recompute: `(mean*n + r) / (n+1)`.
    pub fn add_rating(&mut self, rating: f64) -> Result<(), ValidationError> {
        if !rating.is_finite() || !(1.0..=5.0).contains(&rating) {
            return Err(ValidationError::RatingRange);
        }

        let total = self.rating * self.total_ratings as f64;
        self.total_ratings += 1;
        self.rating = (total + rating) / self.total_ratings as f64;
        Ok(())
    }

    /// Advertise a capability. Adding a feature twice is a no-op.
    pub fn add_feature(&mut self, feature: VehicleFeature) {
        self.features.insert(feature);
    }

    /// Toggle the availability flag.
    pub fn set_availability(&mut self, available: bool) {
        self.available = available;
        self.last_updated = Utc::now();
    }

    /// Derived status as of `now`.
    pub fn status_at(&self, now: DateTime<Utc>) -> VehicleStatus {
        if !self.available {
            return VehicleStatus::Unavailable;
        }
        if self.current_location.is_none() {
            return VehicleStatus::Offline;
        }
        if now - self.last_updated >= Duration::minutes(STALENESS_WINDOW_MINS) {
            return VehicleStatus::Offline;
        }
        VehicleStatus::Online
    }

    /// Derived status as of the current instant.
    pub fn status(&self) -> VehicleStatus {
        self.status_at(Utc::now())
    }

    /// Distance from the vehicle's last reported position, if it has one.
    pub fn distance_from(&self, point: &GeoPoint) -> Option<f64> {
        self.current_location
            .as_ref()
            .map(|loc| loc.distance_km(point))
    }

    /// Fare estimate for a trip of the given distance in this vehicle.
    pub fn fare_estimate(&self, distance_km: f64) -> f64 {
        crate::estimate::fare(distance_km, self.vehicle_type.transport_mode())
    }

    /// Read-only view for handlers, as of `now`.
    pub fn snapshot_at(&self, now: DateTime<Utc>) -> VehicleSnapshot {
        VehicleSnapshot {
            plate: self.plate.clone(),
            vehicle_type: self.vehicle_type,
            status: self.status_at(now),
            location: self.current_location,
            driver_rating: (self.rating * 10.0).round() / 10.0,
            total_ratings: self.total_ratings,
            features: self.features.iter().copied().collect(),
        }
    }

    /// Read-only view for handlers, as of the current instant.
    pub fn snapshot(&self) -> VehicleSnapshot {
        self.snapshot_at(Utc::now())
    }
}
