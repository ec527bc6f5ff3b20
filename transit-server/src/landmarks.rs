//! Named landmark registry for the Bhilai-Durg region.
//!
//! A fixed set of well-known points used to annotate itineraries
//! ("this route passes Maitri Bagh").

use serde::Serialize;

use crate::domain::GeoPoint;

/// A named point of interest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Landmark {
    pub name: &'static str,
    pub location: GeoPoint,
}

/// The default landmark registry for the service area.
pub fn bhilai_landmarks() -> Vec<Landmark> {
    [
        ("Civic Center", 21.2094, 81.3947),
        ("Maitri Bagh", 21.1938, 81.3509),
        ("BIT Durg", 21.1905, 81.2849),
        ("Bhilai Steel Plant", 21.2144, 81.4381),
    ]
    .into_iter()
    .filter_map(|(name, lat, lon)| {
        GeoPoint::new(lat, lon)
            .ok()
            .map(|location| Landmark { name, location })
    })
    .collect()
}
