//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::MemoryCache;
use crate::fleet::FleetRegistry;
use crate::railway::{RailwayService, RandomDelays};
use crate::store::MemoryStore;
use crate::transit::TransitService;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Read-through transit workflows (store + cache)
    pub transit: Arc<TransitService<MemoryStore, MemoryCache>>,

    /// Registered vehicle fleet
    pub fleet: FleetRegistry,

    /// Railway schedules and booking links
    pub railway: Arc<RailwayService<MemoryCache, RandomDelays>>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        transit: TransitService<MemoryStore, MemoryCache>,
        fleet: FleetRegistry,
        railway: RailwayService<MemoryCache, RandomDelays>,
    ) -> Self {
        Self {
            transit: Arc::new(transit),
            fleet,
            railway: Arc::new(railway),
        }
    }
}
