//! Domain types for the regional transit service.
//!
//! This module contains the core domain model: validated geographic
//! points, closed mode/feature enumerations, identifier newtypes and the
//! stateful vehicle and itinerary entities. All types enforce their
//! invariants at construction time, so code that receives these types can
//! trust their validity.

mod error;
mod geo;
mod ids;
mod mode;
mod route;
mod vehicle;

pub use error::ValidationError;
pub use geo::GeoPoint;
pub use ids::{PhoneNumber, PlateNumber, TrainNumber};
pub use mode::{TransportMode, VehicleFeature, VehicleType};
pub use route::Itinerary;
pub use vehicle::{Driver, Vehicle, VehicleSnapshot, VehicleStatus};
