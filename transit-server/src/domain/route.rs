//! Itineraries: a planned trip between two points.
//!
//! An `Itinerary` owns its endpoints and waypoint sequence. Derived fields
//! (time, cost) are computed lazily and memoized against a fingerprint of
//! the geometry, so repeated reads are cheap but a geometry change never
//! returns a stale value.

use std::hash::{DefaultHasher, Hash, Hasher};

use chrono::{DateTime, Utc};

use crate::estimate;
use crate::landmarks::Landmark;

use super::error::ValidationError;
use super::geo::GeoPoint;
use super::mode::TransportMode;

/// Minimum origin-destination separation in kilometres.
const MIN_TRIP_KM: f64 = 0.1;

/// Collinearity tolerance for landmark matching, in kilometres.
///
/// A landmark counts as "on the way" when the detour through it adds less
/// than this to the direct distance. Not a true path-containment test;
/// borderline false positives are accepted.
const LANDMARK_TOLERANCE_KM: f64 = 0.5;

/// Derived trip figures, memoized per geometry fingerprint.
#[derive(Debug, Clone, Copy)]
struct Derived {
    fingerprint: u64,
    time_mins: i64,
    cost: f64,
}

/// A planned trip from origin to destination, optionally via waypoints.
#[derive(Debug, Clone)]
pub struct Itinerary {
    id: Option<i64>,
    origin: GeoPoint,
    destination: GeoPoint,
    waypoints: Vec<GeoPoint>,
    mode: TransportMode,
    created_at: DateTime<Utc>,
    derived: Option<Derived>,
}

impl Itinerary {
    /// Create an itinerary. Fails if the endpoints are closer than 100 m.
    pub fn new(
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TransportMode,
        waypoints: Vec<GeoPoint>,
    ) -> Result<Self, ValidationError> {
        if origin.distance_km(&destination) < MIN_TRIP_KM {
            return Err(ValidationError::EndpointsTooClose);
        }

        Ok(Self {
            id: None,
            origin,
            destination,
            waypoints,
            mode,
            created_at: Utc::now(),
            derived: None,
        })
    }

    /// A direct trip with no waypoints.
    pub fn direct(
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TransportMode,
    ) -> Result<Self, ValidationError> {
        Self::new(origin, destination, mode, Vec::new())
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    /// Attach the persisted identifier after an insert.
    pub fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    pub fn origin(&self) -> &GeoPoint {
        &self.origin
    }

    pub fn destination(&self) -> &GeoPoint {
        &self.destination
    }

    pub fn waypoints(&self) -> &[GeoPoint] {
        &self.waypoints
    }

    pub fn mode(&self) -> TransportMode {
        self.mode
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Replace the waypoint sequence. Invalidates memoized derivations.
    pub fn set_waypoints(&mut self, waypoints: Vec<GeoPoint>) {
        self.waypoints = waypoints;
    }

    /// Switch the transport mode. Invalidates memoized derivations.
    pub fn set_mode(&mut self, mode: TransportMode) {
        self.mode = mode;
    }

    /// Total trip distance through the waypoints, in kilometres.
    pub fn total_distance_km(&self) -> f64 {
        estimate::total_distance_km(&self.origin, &self.waypoints, &self.destination)
    }

    /// Estimated travel time in minutes. Idempotent; memoized per geometry.
    pub fn travel_time_mins(&mut self) -> i64 {
        self.derived().time_mins
    }

    /// Estimated trip cost in rupees. Idempotent; memoized per geometry.
    pub fn cost(&mut self) -> f64 {
        self.derived().cost
    }

    /// Landmarks that lie roughly on the direct path.
    ///
    /// A landmark passes iff the detour through it adds less than 500 m to
    /// the direct origin-destination distance.
    pub fn passing_landmarks(&self, registry: &[Landmark]) -> Vec<Landmark> {
        let direct = self.origin.distance_km(&self.destination);

        registry
            .iter()
            .filter(|landmark| {
                let via = self.origin.distance_km(&landmark.location)
                    + landmark.location.distance_km(&self.destination);
                (via - direct).abs() < LANDMARK_TOLERANCE_KM
            })
            .cloned()
            .collect()
    }

    /// Return the memoized derivation, recomputing if the geometry changed.
    fn derived(&mut self) -> Derived {
        let fingerprint = self.fingerprint();
        match self.derived {
            Some(d) if d.fingerprint == fingerprint => d,
            _ => {
                let distance_km = self.total_distance_km();
                let d = Derived {
                    fingerprint,
                    time_mins: estimate::travel_time_mins(distance_km, self.mode),
                    cost: estimate::fare(distance_km, self.mode),
                };
                self.derived = Some(d);
                d
            }
        }
    }

    /// Hash of (origin, destination, waypoints, mode), the memo key.
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        let mut hash_point = |p: &GeoPoint| {
            p.latitude().to_bits().hash(&mut hasher);
            p.longitude().to_bits().hash(&mut hasher);
        };

        hash_point(&self.origin);
        hash_point(&self.destination);
        for waypoint in &self.waypoints {
            hash_point(waypoint);
        }
        self.mode.hash(&mut hasher);
        hasher.finish()
    }
}
