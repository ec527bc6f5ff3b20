//! Geographic point type.
//!
//! `GeoPoint` is the leaf of the domain model: a validated latitude/longitude
//! pair with optional GPS accuracy and capture time. Every position reading
//! and route endpoint in the system is one of these. Values are immutable;
//! a fresh point replaces an old one rather than mutating in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// Earth's mean radius in kilometres, used by the haversine formula.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Service-area bounding box: the Bhilai-Durg-Raipur region.
/// Fixed rectangle, not derived from any reference data.
const SERVICE_AREA_LAT: (f64, f64) = (21.0, 21.3);
const SERVICE_AREA_LON: (f64, f64) = (81.0, 81.5);

/// A validated geographic position.
///
/// Latitude is within [-90, 90], longitude within [-180, 180] and accuracy,
/// when present, is non-negative. These invariants hold by construction, so
/// any `GeoPoint` received downstream can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    accuracy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<DateTime<Utc>>,
}

impl GeoPoint {
    /// Create a point from a latitude/longitude pair.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        Self::with_details(latitude, longitude, None, None)
    }

    /// Create a point with an accuracy reading (metres).
    pub fn with_accuracy(
        latitude: f64,
        longitude: f64,
        accuracy: f64,
    ) -> Result<Self, ValidationError> {
        Self::with_details(latitude, longitude, Some(accuracy), None)
    }

    /// Create a point with full reading metadata.
    pub fn with_details(
        latitude: f64,
        longitude: f64,
        accuracy: Option<f64>,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<Self, ValidationError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(ValidationError::Latitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(ValidationError::Longitude(longitude));
        }
        if let Some(acc) = accuracy
            && (!acc.is_finite() || acc < 0.0)
        {
            return Err(ValidationError::Accuracy(acc));
        }

        Ok(Self {
            latitude,
            longitude,
            accuracy,
            timestamp,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn accuracy(&self) -> Option<f64> {
        self.accuracy
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    /// Great-circle distance to another point in kilometres (haversine).
    ///
    /// Symmetric, non-negative, and zero for identical points.
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2)
            + self.latitude.to_radians().cos()
                * other.latitude.to_radians().cos()
                * (d_lon / 2.0).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }

    /// Whether the point lies within the Bhilai-Durg-Raipur service area.
    pub fn is_in_service_area(&self) -> bool {
        self.latitude >= SERVICE_AREA_LAT.0
            && self.latitude <= SERVICE_AREA_LAT.1
            && self.longitude >= SERVICE_AREA_LON.0
            && self.longitude <= SERVICE_AREA_LON.1
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// Deserialization goes through the validating constructor so cached or
/// wire-supplied payloads cannot smuggle in out-of-range coordinates.
impl<'de> Deserialize<'de> for GeoPoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            latitude: f64,
            longitude: f64,
            #[serde(default)]
            accuracy: Option<f64>,
            #[serde(default)]
            timestamp: Option<DateTime<Utc>>,
        }

        let raw = Raw::deserialize(deserializer)?;
        GeoPoint::with_details(raw.latitude, raw.longitude, raw.accuracy, raw.timestamp)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    #[test]
    fn construction_bounds() {
        assert!(GeoPoint::new(90.0, 180.0).is_ok());
        assert!(GeoPoint::new(-90.0, -180.0).is_ok());
        assert!(GeoPoint::new(91.0, 0.0).is_err());
        assert!(GeoPoint::new(-91.0, 0.0).is_err());
        assert!(GeoPoint::new(0.0, 181.0).is_err());
        assert!(GeoPoint::new(0.0, -181.0).is_err());
    }

    #[test]
    fn rejects_non_finite() {
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn accuracy_must_be_non_negative() {
        assert!(GeoPoint::with_accuracy(21.2, 81.3, 0.0).is_ok());
        assert!(GeoPoint::with_accuracy(21.2, 81.3, 12.5).is_ok());
        assert!(GeoPoint::with_accuracy(21.2, 81.3, -1.0).is_err());
    }

    #[test]
    fn distance_to_self_is_zero() {
        let p = point(21.2094, 81.3947);
        assert_eq!(p.distance_km(&p), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = point(21.2094, 81.3947);
        let b = point(21.1938, 81.3509);
        let ab = a.distance_km(&b);
        let ba = b.distance_km(&a);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn civic_center_to_maitri_bagh() {
        // Known pair in Bhilai; roughly 4.7-5.5 km apart.
        let a = point(21.2094, 81.3947);
        let b = point(21.1938, 81.3509);
        let d = a.distance_km(&b);
        assert!(d > 4.7 && d < 5.5, "distance was {d}");
    }

    #[test]
    fn service_area_membership() {
        assert!(point(21.2094, 81.3947).is_in_service_area());
        // Delhi is well outside the box.
        assert!(!point(28.6139, 77.2090).is_in_service_area());
        // Edges are inclusive.
        assert!(point(21.0, 81.0).is_in_service_area());
        assert!(point(21.3, 81.5).is_in_service_area());
        assert!(!point(21.31, 81.2).is_in_service_area());
    }

    #[test]
    fn serde_round_trip_preserves_invariants() {
        let p = GeoPoint::with_accuracy(21.2094, 81.3947, 8.0).unwrap();
        let json = serde_json::to_string(&p).unwrap();
        let back: GeoPoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn deserialization_rejects_out_of_range() {
        let json = r#"{"latitude": 95.0, "longitude": 81.0}"#;
        assert!(serde_json::from_str::<GeoPoint>(json).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn valid_lat() -> impl Strategy<Value = f64> {
        -90.0..=90.0f64
    }

    fn valid_lon() -> impl Strategy<Value = f64> {
        -180.0..=180.0f64
    }

    proptest! {
        /// Any in-range pair constructs successfully.
        #[test]
        fn in_range_always_constructs(lat in valid_lat(), lon in valid_lon()) {
            prop_assert!(GeoPoint::new(lat, lon).is_ok());
        }

        /// Distance is non-negative for all valid pairs.
        #[test]
        fn distance_non_negative(
            lat_a in valid_lat(), lon_a in valid_lon(),
            lat_b in valid_lat(), lon_b in valid_lon(),
        ) {
            let a = GeoPoint::new(lat_a, lon_a).unwrap();
            let b = GeoPoint::new(lat_b, lon_b).unwrap();
            prop_assert!(a.distance_km(&b) >= 0.0);
        }

        /// Distance is symmetric to floating-point tolerance.
        #[test]
        fn distance_symmetric(
            lat_a in valid_lat(), lon_a in valid_lon(),
            lat_b in valid_lat(), lon_b in valid_lon(),
        ) {
            let a = GeoPoint::new(lat_a, lon_a).unwrap();
            let b = GeoPoint::new(lat_b, lon_b).unwrap();
            prop_assert!((a.distance_km(&b) - b.distance_km(&a)).abs() < 1e-9);
        }

        /// A point is always at distance zero from itself.
        #[test]
        fn distance_identity(lat in valid_lat(), lon in valid_lon()) {
            let p = GeoPoint::new(lat, lon).unwrap();
            prop_assert_eq!(p.distance_km(&p), 0.0);
        }

        /// Out-of-range latitude is always rejected.
        #[test]
        fn out_of_range_lat_rejected(lat in 90.0001..1000.0f64, lon in valid_lon()) {
            prop_assert!(GeoPoint::new(lat, lon).is_err());
            prop_assert!(GeoPoint::new(-lat, lon).is_err());
        }
    }
}
