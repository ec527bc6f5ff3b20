//! Key/value caching layer.
//!
//! Read paths memoize expensive or volatile reads (bus-stop lists, route
//! lists, search results, train schedules) through a gateway with a strict
//! fire-and-forget contract: a backend failure never aborts the calling
//! request. It degrades to a cache miss and is reported through `tracing`
//! only. Writes that change an underlying collection invalidate the
//! covering aggregate key before acknowledging.
//!
//! Key derivation is the caller's responsibility; the `keys` module holds
//! the deterministic derivations for each cached collection, and `ttl`
//! holds the per-volatility TTL policy.

use std::time::{Duration, Instant};

use moka::Expiry;
use moka::future::Cache as MokaCache;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Cache backend failure. Swallowed by the gateway, never surfaced to
/// request handlers.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    /// The backing cache could not serve the operation.
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
}

/// A key/value store with per-entry expiry. Values are opaque serialized
/// payloads; expiry is enforced by the backend.
pub trait CacheBackend: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, CacheError>> + Send;
    fn set(
        &self,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> impl Future<Output = Result<(), CacheError>> + Send;
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), CacheError>> + Send;
    fn exists(&self, key: &str) -> impl Future<Output = Result<bool, CacheError>> + Send;
}

/// A cached payload together with its time-to-live.
#[derive(Debug, Clone)]
struct Entry {
    payload: String,
    ttl: Duration,
}

/// Expiry policy that honours each entry's own TTL.
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-process cache backend with per-entry TTL.
#[derive(Clone)]
pub struct MemoryCache {
    entries: MokaCache<String, Entry>,
}

impl MemoryCache {
    /// Create a cache bounded to `max_capacity` entries.
    pub fn new(max_capacity: u64) -> Self {
        let entries = MokaCache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        Self { entries }
    }

    /// Number of live entries (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.get(key).await.map(|entry| entry.payload))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let entry = Entry {
            payload: value,
            ttl,
        };
        self.entries.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.invalidate(key).await;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.entries.contains_key(key))
    }
}

/// The fire-and-forget cache gateway.
///
/// Every operation swallows backend failures: `get` degrades to a miss,
/// `exists` to false, and `set`/`delete` report an unacknowledged write via
/// their boolean ack. Failures are logged with `tracing::warn!` and never
/// propagate to the read-through workflow.
#[derive(Clone)]
pub struct CacheGateway<B> {
    backend: B,
}

impl<B: CacheBackend> CacheGateway<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Fetch a raw payload. A backend failure is a miss.
    pub async fn get(&self, key: &str) -> Option<String> {
        match self.backend.get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache get failed, treating as miss");
                None
            }
        }
    }

    /// Store a raw payload with a TTL. Returns whether the write was
    /// acknowledged.
    pub async fn set(&self, key: &str, value: String, ttl: Duration) -> bool {
        match self.backend.set(key, value, ttl).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache set failed");
                false
            }
        }
    }

    /// Remove a key. Returns whether the delete was acknowledged.
    pub async fn delete(&self, key: &str) -> bool {
        match self.backend.delete(key).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache delete failed");
                false
            }
        }
    }

    /// Whether a key is present. A backend failure reads as absent.
    pub async fn exists(&self, key: &str) -> bool {
        match self.backend.exists(key).await {
            Ok(present) => present,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache exists failed, treating as absent");
                false
            }
        }
    }

    /// Fetch and deserialize a cached value. An undecodable payload is
    /// treated as a miss.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let payload = self.get(key).await?;
        match serde_json::from_str(&payload) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "cached payload failed to decode, treating as miss");
                None
            }
        }
    }

    /// Serialize and store a value with a TTL.
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> bool {
        match serde_json::to_string(value) {
            Ok(payload) => self.set(key, payload, ttl).await,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to serialize value for cache");
                false
            }
        }
    }
}

/// Deterministic cache key derivations, one per cached collection.
pub mod keys {
    use crate::domain::{GeoPoint, TransportMode};

    /// Aggregate key covering the bus-stop list.
    pub const ALL_BUS_STOPS: &str = "all_bus_stops";

    /// Aggregate key covering the route list. Deleted on every route
    /// insert before the write is acknowledged.
    pub const ALL_ROUTES: &str = "all_routes";

    /// Key for a route search: semantic identity is the coordinate pair
    /// plus the requested mode.
    pub fn route_search(
        origin: &GeoPoint,
        destination: &GeoPoint,
        mode: Option<TransportMode>,
    ) -> String {
        format!(
            "route_search_{}_{}_{}_{}_{}",
            origin.latitude(),
            origin.longitude(),
            destination.latitude(),
            destination.longitude(),
            mode.map(|m| m.as_str()).unwrap_or("all"),
        )
    }

    /// Key for a station's train schedule, normalized to lowercase.
    pub fn train_schedule(station: &str) -> String {
        format!("train_schedule_{}", station.trim().to_lowercase())
    }
}

/// TTL policy, graded by data volatility.
pub mod ttl {
    use std::time::Duration;

    /// Near-static collections: the bus-stop list.
    pub const BUS_STOPS: Duration = Duration::from_secs(1800);

    /// Moderately volatile: the route list.
    pub const ROUTES: Duration = Duration::from_secs(300);

    /// Moderately volatile: train schedules.
    pub const SCHEDULES: Duration = Duration::from_secs(300);

    /// Route search results.
    pub const SEARCH: Duration = Duration::from_secs(600);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GeoPoint, TransportMode};

    /// Backend that fails every operation, for degradation tests.
    struct FailingBackend;

    impl CacheBackend for FailingBackend {
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Unavailable("connection refused".into()))
        }

        async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("connection refused".into()))
        }

        async fn delete(&self, _key: &str) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("connection refused".into()))
        }

        async fn exists(&self, _key: &str) -> Result<bool, CacheError> {
            Err(CacheError::Unavailable("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn round_trip() {
        let gateway = CacheGateway::new(MemoryCache::default());

        assert!(gateway.set("k", "v".into(), Duration::from_secs(5)).await);
        assert_eq!(gateway.get("k").await.as_deref(), Some("v"));
        assert!(gateway.exists("k").await);
    }

    #[tokio::test]
    async fn expiry_removes_entries() {
        let gateway = CacheGateway::new(MemoryCache::default());

        gateway.set("k", "v".into(), Duration::from_millis(50)).await;
        assert!(gateway.get("k").await.is_some());

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(gateway.get("k").await.is_none());
        assert!(!gateway.exists("k").await);
    }

    #[tokio::test]
    async fn delete_removes_entries() {
        let gateway = CacheGateway::new(MemoryCache::default());

        gateway.set("k", "v".into(), Duration::from_secs(60)).await;
        assert!(gateway.delete("k").await);
        assert!(gateway.get("k").await.is_none());
    }

    #[tokio::test]
    async fn entries_expire_independently() {
        let gateway = CacheGateway::new(MemoryCache::default());

        gateway.set("short", "a".into(), Duration::from_millis(50)).await;
        gateway.set("long", "b".into(), Duration::from_secs(60)).await;

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(gateway.get("short").await.is_none());
        assert_eq!(gateway.get("long").await.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn backend_failure_degrades_to_miss() {
        let gateway = CacheGateway::new(FailingBackend);

        assert!(gateway.get("k").await.is_none());
        assert!(!gateway.exists("k").await);
        // Writes report an unacknowledged ack but do not error.
        assert!(!gateway.set("k", "v".into(), Duration::from_secs(5)).await);
        assert!(!gateway.delete("k").await);
    }

    #[tokio::test]
    async fn json_round_trip() {
        let gateway = CacheGateway::new(MemoryCache::default());

        let value = vec![1i64, 2, 3];
        assert!(gateway.set_json("nums", &value, Duration::from_secs(5)).await);
        let back: Vec<i64> = gateway.get_json("nums").await.unwrap();
        assert_eq!(back, value);
    }

    #[tokio::test]
    async fn undecodable_payload_is_a_miss() {
        let gateway = CacheGateway::new(MemoryCache::default());

        gateway.set("k", "not json".into(), Duration::from_secs(5)).await;
        let decoded: Option<Vec<i64>> = gateway.get_json("k").await;
        assert!(decoded.is_none());
    }

    #[test]
    fn search_key_is_deterministic() {
        let a = GeoPoint::new(21.2094, 81.3947).unwrap();
        let b = GeoPoint::new(21.1938, 81.3509).unwrap();

        let k1 = keys::route_search(&a, &b, Some(TransportMode::Bus));
        let k2 = keys::route_search(&a, &b, Some(TransportMode::Bus));
        assert_eq!(k1, k2);
        assert_eq!(k1, "route_search_21.2094_81.3947_21.1938_81.3509_bus");

        // Mode is part of the identity.
        assert_ne!(k1, keys::route_search(&a, &b, None));
        // So is direction.
        assert_ne!(k1, keys::route_search(&b, &a, Some(TransportMode::Bus)));
    }

    #[test]
    fn schedule_key_normalizes_station_name() {
        assert_eq!(keys::train_schedule("Durg"), "train_schedule_durg");
        assert_eq!(
            keys::train_schedule("  Bhilai-Nagar "),
            "train_schedule_bhilai-nagar"
        );
    }
}
