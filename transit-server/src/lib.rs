//! Regional multimodal transit information server.
//!
//! Estimates travel cost and time between points in the Bhilai-Durg-Raipur
//! region, tracks the vehicle fleet, and serves transit data with a
//! read-through cache in front of the durable store.

pub mod cache;
pub mod domain;
pub mod estimate;
pub mod fleet;
pub mod landmarks;
pub mod railway;
pub mod store;
pub mod transit;
pub mod web;
