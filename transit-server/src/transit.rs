//! Read-through transit workflows.
//!
//! `TransitService` fronts the durable store with the cache gateway: every
//! list read derives a deterministic key, tries the cache, and on a miss
//! fetches from the store and populates the cache with the TTL graded for
//! that collection. Writes that change a cached collection delete the
//! covering aggregate key before the write is acknowledged, so a
//! subsequent read never observes pre-write data from the cache.
//!
//! Concurrent requests may race on the same key; a duplicate fetch on a
//! miss storm is an accepted, bounded inefficiency.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cache::{CacheBackend, CacheGateway, keys, ttl};
use crate::domain::{GeoPoint, Itinerary, TransportMode, ValidationError};
use crate::store::{Booking, BusStop, NewBooking, NewRoute, RouteRecord, StoreError, TransitStore};

/// Failure of a transit workflow.
///
/// Validation failures surface to the caller and are never retried; store
/// failures propagate as service failures. Cache failures never appear
/// here at all: the gateway degrades them to misses.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One option in a route search response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSearchResult {
    pub name: String,
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub mode: TransportMode,
    pub distance_km: f64,
    pub eta_mins: i64,
    pub cost: f64,
}

/// Read-through workflows over the store and cache.
pub struct TransitService<S, B> {
    store: Arc<S>,
    cache: CacheGateway<B>,
}

impl<S: TransitStore, B: CacheBackend> TransitService<S, B> {
    pub fn new(store: Arc<S>, cache: CacheGateway<B>) -> Self {
        Self { store, cache }
    }

    /// The bus-stop list. Near-static; cached for 30 minutes.
    pub async fn bus_stops(&self) -> Result<Vec<BusStop>, TransitError> {
        if let Some(cached) = self.cache.get_json(keys::ALL_BUS_STOPS).await {
            return Ok(cached);
        }

        let stops = self.store.list_bus_stops().await?;
        self.cache
            .set_json(keys::ALL_BUS_STOPS, &stops, ttl::BUS_STOPS)
            .await;
        Ok(stops)
    }

    /// The route list. Cached for 5 minutes.
    pub async fn routes(&self) -> Result<Vec<RouteRecord>, TransitError> {
        if let Some(cached) = self.cache.get_json(keys::ALL_ROUTES).await {
            return Ok(cached);
        }

        let routes = self.store.list_routes().await?;
        self.cache
            .set_json(keys::ALL_ROUTES, &routes, ttl::ROUTES)
            .await;
        Ok(routes)
    }

    /// A single route by its persisted id. Not cached; keyed lookups are
    /// cheap and the aggregate list already covers the hot path.
    pub async fn route(&self, id: i64) -> Result<RouteRecord, TransitError> {
        Ok(self.store.find_route(id).await?)
    }

    /// Search for route options between two points.
    ///
    /// Builds a direct itinerary and derives its figures from the
    /// estimator; results are cached for 10 minutes under a key derived
    /// from the coordinate pair and mode.
    pub async fn search_routes(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: Option<TransportMode>,
    ) -> Result<Vec<RouteSearchResult>, TransitError> {
        let key = keys::route_search(&origin, &destination, mode);
        if let Some(cached) = self.cache.get_json(&key).await {
            return Ok(cached);
        }

        let chosen = mode.unwrap_or(TransportMode::Bus);
        let mut itinerary = Itinerary::direct(origin, destination, chosen)?;

        let results = vec![RouteSearchResult {
            name: "Direct route".to_string(),
            origin,
            destination,
            mode: chosen,
            distance_km: itinerary.total_distance_km(),
            eta_mins: itinerary.travel_time_mins(),
            cost: itinerary.cost(),
        }];

        self.cache.set_json(&key, &results, ttl::SEARCH).await;
        Ok(results)
    }

    /// Insert a route, invalidating the cached route list before the
    /// write is acknowledged to the caller.
    pub async fn create_route(&self, route: NewRoute) -> Result<RouteRecord, TransitError> {
        let record = self.store.insert_route(route).await?;
        self.cache.delete(keys::ALL_ROUTES).await;
        Ok(record)
    }

    /// Book a ride. Bookings are per-user and never cached.
    pub async fn book_ride(&self, booking: NewBooking) -> Result<Booking, TransitError> {
        Ok(self.store.insert_booking(booking).await?)
    }

    /// A user's booking history, most recent first.
    pub async fn user_bookings(&self, user_id: i64) -> Result<Vec<Booking>, TransitError> {
        Ok(self.store.bookings_for_user(user_id).await?)
    }
}
