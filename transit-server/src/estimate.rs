//! Travel estimation.
//!
//! Pure functions mapping a pair of points plus a transport mode to
//! distance, time, fare, carbon cost and eco-incentive points. No I/O, no
//! shared state; everything here is safe to call concurrently.
//!
//! The per-mode constant tables are calibrated for the Bhilai-Durg region:
//! speeds reflect mixed urban traffic, fares the local tariff cards.

use serde::Serialize;

use crate::domain::{GeoPoint, TransportMode};

/// Average speed in km/h per transport mode.
pub fn speed_kmh(mode: TransportMode) -> f64 {
    match mode {
        TransportMode::Bus => 25.0,
        TransportMode::Auto => 30.0,
        TransportMode::Taxi => 35.0,
        TransportMode::ERickshaw => 20.0,
        TransportMode::Cycling => 15.0,
        TransportMode::Walking => 5.0,
    }
}

/// Flag-fall fare in rupees per transport mode.
pub fn base_fare(mode: TransportMode) -> f64 {
    match mode {
        TransportMode::Bus => 10.0,
        TransportMode::Auto => 15.0,
        TransportMode::Taxi => 20.0,
        TransportMode::ERickshaw => 12.0,
        TransportMode::Cycling | TransportMode::Walking => 0.0,
    }
}

/// Per-kilometre fare in rupees per transport mode.
pub fn per_km_rate(mode: TransportMode) -> f64 {
    match mode {
        TransportMode::Bus => 2.0,
        TransportMode::Auto => 8.0,
        TransportMode::Taxi => 12.0,
        TransportMode::ERickshaw => 6.0,
        TransportMode::Cycling | TransportMode::Walking => 0.0,
    }
}

/// CO2 emission factor in kg per km.
pub fn emission_factor(mode: TransportMode) -> f64 {
    match mode {
        TransportMode::Bus => 0.05,
        TransportMode::Auto => 0.15,
        TransportMode::Taxi => 0.12,
        TransportMode::ERickshaw => 0.02,
        TransportMode::Cycling | TransportMode::Walking => 0.0,
    }
}

/// Eco-incentive points earned per whole kilometre.
pub fn eco_points_per_km(mode: TransportMode) -> i64 {
    match mode {
        TransportMode::Cycling => 10,
        TransportMode::ERickshaw => 5,
        TransportMode::Bus => 2,
        _ => 0,
    }
}

/// Estimated travel time in minutes, rounded to the nearest minute.
pub fn travel_time_mins(distance_km: f64, mode: TransportMode) -> i64 {
    (distance_km / speed_kmh(mode) * 60.0).round() as i64
}

/// Estimated fare in rupees: flag fall plus distance charge.
pub fn fare(distance_km: f64, mode: TransportMode) -> f64 {
    base_fare(mode) + distance_km * per_km_rate(mode)
}

/// Estimated CO2 cost of the trip in kilograms.
pub fn carbon_kg(distance_km: f64, mode: TransportMode) -> f64 {
    distance_km * emission_factor(mode)
}

/// Eco-incentive points for a trip: whole kilometres times the per-mode rate.
pub fn eco_points(mode: TransportMode, distance_km: f64) -> i64 {
    distance_km.floor() as i64 * eco_points_per_km(mode)
}

/// Sum of consecutive great-circle legs through the waypoints in order.
///
/// An empty waypoint list reduces to the direct origin-destination distance.
pub fn total_distance_km(origin: &GeoPoint, waypoints: &[GeoPoint], destination: &GeoPoint) -> f64 {
    let mut total = 0.0;
    let mut current = origin;

    for waypoint in waypoints {
        total += current.distance_km(waypoint);
        current = waypoint;
    }

    total + current.distance_km(destination)
}

/// A complete trip estimate as returned to request handlers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Estimate {
    /// Trip distance in kilometres
    pub distance_km: f64,
    /// Estimated travel time in minutes
    pub eta_mins: i64,
    /// Estimated fare in rupees
    pub fare: f64,
    /// Estimated CO2 cost in kilograms
    pub carbon_kg: f64,
}

/// Estimate a trip through the given waypoints.
///
/// Coordinate and mode validation happens when the inputs are constructed,
/// so this function itself cannot fail.
pub fn estimate(
    origin: &GeoPoint,
    destination: &GeoPoint,
    waypoints: &[GeoPoint],
    mode: TransportMode,
) -> Estimate {
    let distance_km = total_distance_km(origin, waypoints, destination);

    Estimate {
        distance_km,
        eta_mins: travel_time_mins(distance_km, mode),
        fare: fare(distance_km, mode),
        carbon_kg: carbon_kg(distance_km, mode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    #[test]
    fn travel_time_rounds_to_nearest_minute() {
        // 10 km by bus at 25 km/h is 24 minutes exactly.
        assert_eq!(travel_time_mins(10.0, TransportMode::Bus), 24);
        // 1 km walking at 5 km/h is 12 minutes.
        assert_eq!(travel_time_mins(1.0, TransportMode::Walking), 12);
        // 10 km by taxi at 35 km/h is 17.14 minutes, rounds to 17.
        assert_eq!(travel_time_mins(10.0, TransportMode::Taxi), 17);
    }

    #[test]
    fn fare_is_base_plus_distance() {
        assert_eq!(fare(5.0, TransportMode::Auto), 15.0 + 5.0 * 8.0);
        assert_eq!(fare(5.0, TransportMode::Bus), 10.0 + 5.0 * 2.0);
        // Active modes are free.
        assert_eq!(fare(5.0, TransportMode::Cycling), 0.0);
        assert_eq!(fare(5.0, TransportMode::Walking), 0.0);
    }

    #[test]
    fn carbon_scales_linearly() {
        assert!((carbon_kg(10.0, TransportMode::Auto) - 1.5).abs() < 1e-12);
        assert!((carbon_kg(10.0, TransportMode::ERickshaw) - 0.2).abs() < 1e-12);
        assert_eq!(carbon_kg(10.0, TransportMode::Cycling), 0.0);
    }

    #[test]
    fn eco_points_use_whole_kilometres() {
        assert_eq!(eco_points(TransportMode::Cycling, 5.9), 50);
        assert_eq!(eco_points(TransportMode::ERickshaw, 3.2), 15);
        assert_eq!(eco_points(TransportMode::Bus, 4.0), 8);
        // Taxis earn nothing.
        assert_eq!(eco_points(TransportMode::Taxi, 100.0), 0);
    }

    #[test]
    fn total_distance_without_waypoints_is_direct() {
        let a = point(21.2094, 81.3947);
        let b = point(21.1938, 81.3509);
        let direct = a.distance_km(&b);
        assert_eq!(total_distance_km(&a, &[], &b), direct);
    }

    #[test]
    fn waypoints_never_shorten_the_trip() {
        let a = point(21.2094, 81.3947);
        let b = point(21.1938, 81.3509);
        let via = point(21.1905, 81.2849);
        let direct = total_distance_km(&a, &[], &b);
        let detour = total_distance_km(&a, &[via], &b);
        assert!(detour >= direct);
    }

    #[test]
    fn estimate_is_consistent_with_parts() {
        let a = point(21.2094, 81.3947);
        let b = point(21.1938, 81.3509);
        let est = estimate(&a, &b, &[], TransportMode::Auto);

        assert_eq!(est.distance_km, total_distance_km(&a, &[], &b));
        assert_eq!(est.eta_mins, travel_time_mins(est.distance_km, TransportMode::Auto));
        assert_eq!(est.fare, fare(est.distance_km, TransportMode::Auto));
        assert_eq!(est.carbon_kg, carbon_kg(est.distance_km, TransportMode::Auto));
    }
}
