//! Data transfer objects for web requests and responses.
//!
//! Requests carry raw coordinates and mode strings; handlers validate them
//! into domain types so every error surfaces as a 400 with a message
//! rather than a bare deserialization rejection.

use serde::{Deserialize, Serialize};

use crate::domain::{GeoPoint, ValidationError};

/// A raw coordinate pair from a request body or query string.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Coord {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coord {
    /// Validate into a domain point.
    pub fn into_point(self) -> Result<GeoPoint, ValidationError> {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Request for a typed trip estimate.
#[derive(Debug, Deserialize)]
pub struct EstimateRequest {
    pub origin: Coord,
    pub destination: Coord,
    #[serde(default)]
    pub waypoints: Vec<Coord>,
    pub mode: String,
}

/// Request for a boundary fare quote.
#[derive(Debug, Deserialize)]
pub struct FareEstimateRequest {
    pub origin: Coord,
    pub destination: Coord,
    /// Free-form mode string; unrecognized modes get the fallback tariff.
    #[serde(default = "default_fare_mode")]
    pub transport_mode: String,
}

fn default_fare_mode() -> String {
    "auto".to_string()
}

/// Fare quote with its breakdown.
#[derive(Debug, Serialize)]
pub struct FareEstimateResponse {
    /// Trip distance, rounded to 2 decimal places
    pub distance: f64,
    pub estimated_fare: i64,
    pub transport_mode: String,
    pub breakdown: FareBreakdown,
}

#[derive(Debug, Serialize)]
pub struct FareBreakdown {
    pub base_fare: f64,
    pub distance_fare: i64,
    pub total: i64,
}

/// Request to search route options.
#[derive(Debug, Deserialize)]
pub struct RouteSearchRequest {
    pub origin: Coord,
    pub destination: Coord,
    pub transport_mode: Option<String>,
}

/// Request to create a route.
#[derive(Debug, Deserialize)]
pub struct CreateRouteRequest {
    pub name: String,
    pub origin: Coord,
    pub destination: Coord,
    pub transport_mode: String,
}

/// Query for vehicles near a point.
#[derive(Debug, Deserialize)]
pub struct NearbyVehiclesQuery {
    pub latitude: f64,
    pub longitude: f64,
    /// Optional vehicle type filter
    pub r#type: Option<String>,
    /// Search radius in kilometres
    pub radius: Option<f64>,
}

/// Request to book a ride.
#[derive(Debug, Deserialize)]
pub struct BookRideRequest {
    pub user_id: i64,
    pub vehicle_id: i64,
    pub origin: Coord,
    pub destination: Coord,
    pub estimated_fare: f64,
}

/// Request to report a train delay.
#[derive(Debug, Deserialize)]
pub struct DelayReportRequest {
    pub train_number: String,
    pub station_code: String,
    pub delay_minutes: u32,
    pub reason: Option<String>,
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
