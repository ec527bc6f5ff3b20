//! Domain validation errors.
//!
//! Every constructor in the domain layer validates its input and returns
//! one of these on violation. They are distinct from cache/store errors:
//! a `ValidationError` is always surfaced to the caller and never retried.

/// Validation failure for domain entity construction or mutation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Latitude outside [-90, 90]
    #[error("invalid latitude {0}: must be between -90 and 90")]
    Latitude(f64),

    /// Longitude outside [-180, 180]
    #[error("invalid longitude {0}: must be between -180 and 180")]
    Longitude(f64),

    /// Negative GPS accuracy
    #[error("invalid accuracy {0}: must be non-negative")]
    Accuracy(f64),

    /// Transport mode not in the enumerated set
    #[error("invalid transport mode: {0}")]
    TransportMode(String),

    /// Vehicle type not in the enumerated set
    #[error("invalid vehicle type: {0}")]
    VehicleType(String),

    /// Vehicle feature not in the enumerated set
    #[error("invalid vehicle feature: {0}")]
    VehicleFeature(String),

    /// Registration plate does not match the Indian plate format
    #[error("invalid vehicle number format: {0}")]
    PlateNumber(String),

    /// Phone number is not 10 digits starting with 6-9
    #[error("invalid driver phone number: {0}")]
    PhoneNumber(String),

    /// Train number is not exactly 5 digits
    #[error("invalid train number format: {0}")]
    TrainNumber(String),

    /// Seating capacity below 1
    #[error("capacity must be at least 1")]
    Capacity,

    /// Driver name shorter than 2 characters
    #[error("driver name must be at least 2 characters")]
    DriverName,

    /// Rating outside [1, 5]
    #[error("rating must be between 1 and 5")]
    RatingRange,

    /// Itinerary endpoints closer than 100 m
    #[error("origin and destination are too close (less than 100m)")]
    EndpointsTooClose,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::Latitude(91.0);
        assert_eq!(
            err.to_string(),
            "invalid latitude 91: must be between -90 and 90"
        );

        let err = ValidationError::TransportMode("jetpack".into());
        assert_eq!(err.to_string(), "invalid transport mode: jetpack");

        let err = ValidationError::EndpointsTooClose;
        assert_eq!(
            err.to_string(),
            "origin and destination are too close (less than 100m)"
        );
    }
}
