use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use transit_server::cache::{CacheGateway, MemoryCache};
use transit_server::domain::{Vehicle, VehicleFeature, VehicleType};
use transit_server::fleet::FleetRegistry;
use transit_server::railway::{RailwayService, RandomDelays};
use transit_server::store::MemoryStore;
use transit_server::transit::TransitService;
use transit_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // One in-process cache shared by every read-through path.
    let cache = MemoryCache::default();

    let store = Arc::new(MemoryStore::with_seed_data());
    let transit = TransitService::new(store, CacheGateway::new(cache.clone()));
    let railway = RailwayService::new(CacheGateway::new(cache), RandomDelays);

    let fleet = FleetRegistry::new();
    seed_fleet(&fleet).await;

    let state = AppState::new(transit, fleet, railway);
    let app = create_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    tracing::info!("transit server listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listener");
    axum::serve(listener, app).await.expect("server error");
}

/// Register the demo fleet so nearby-vehicle queries have data to serve.
async fn seed_fleet(fleet: &FleetRegistry) {
    let seeds = [
        ("CG07AB1234", VehicleType::Bus, 40, "Ramesh Kumar", "9876543210", 21.2094, 81.3947),
        ("CG07CD5678", VehicleType::Auto, 3, "Suresh Patel", "9876543211", 21.2100, 81.3950),
    ];

    for (plate, vehicle_type, capacity, driver, phone, lat, lon) in seeds {
        let vehicle = match Vehicle::new(plate, vehicle_type, capacity) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(plate, error = %e, "skipping seed vehicle");
                continue;
            }
        };

        if let Err(e) = fleet.register(vehicle).await {
            tracing::warn!(plate, error = %e, "failed to register seed vehicle");
            continue;
        }

        let parsed = match transit_server::domain::PlateNumber::parse(plate) {
            Ok(p) => p,
            Err(_) => continue,
        };

        if let Err(e) = fleet.set_driver(&parsed, driver, phone).await {
            tracing::warn!(plate, error = %e, "failed to assign seed driver");
        }
        if let Err(e) = fleet.update_location(&parsed, lat, lon, None).await {
            tracing::warn!(plate, error = %e, "failed to place seed vehicle");
        }
        if let Err(e) = fleet.add_feature(&parsed, VehicleFeature::Gps).await {
            tracing::warn!(plate, error = %e, "failed to add seed feature");
        }
    }

    tracing::info!(vehicles = fleet.len().await, "fleet seeded");
}
