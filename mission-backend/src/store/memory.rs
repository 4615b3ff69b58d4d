use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use mission_common::{Launch, Planet};

use super::{DocumentStore, LaunchFilter, LaunchPatch, StoreResult};
use crate::error::StoreError;

/// Raw collection contents shared by the in-memory and file-backed stores
#[derive(Debug, Default)]
pub(crate) struct Collections {
    pub launches: BTreeMap<u32, Launch>,
    pub planets: BTreeMap<String, Planet>,
    pub claims: BTreeMap<String, ImportClaim>,
}

/// Sentinel record held while an import is running or after it finished
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ImportClaim {
    pub key: String,
    pub claimed_at: DateTime<Utc>,
}

impl Collections {
    pub fn find_launch(&self, filter: &LaunchFilter) -> Option<Launch> {
        match filter.flight_number {
            Some(n) => self.launches.get(&n).filter(|l| filter.matches(l)).cloned(),
            None => self.launches.values().find(|l| filter.matches(l)).cloned(),
        }
    }

    pub fn find_latest_launch(&self) -> Option<Launch> {
        self.launches.values().next_back().cloned()
    }

    pub fn find_launches(&self, skip: usize, limit: Option<usize>) -> Vec<Launch> {
        self.launches
            .values()
            .skip(skip)
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    pub fn upsert_launch(&mut self, launch: &Launch) {
        self.launches.insert(launch.flight_number, launch.clone());
    }

    pub fn update_launches(&mut self, filter: &LaunchFilter, patch: &LaunchPatch) -> u64 {
        self.launches
            .values_mut()
            .filter(|l| filter.matches(l))
            .map(|l| patch.apply(l))
            .filter(|changed| *changed)
            .count() as u64
    }

    pub fn upsert_planet(&mut self, planet: &Planet) {
        self.planets.insert(planet.kepler_name.clone(), planet.clone());
    }

    /// Claim `key` at `now`, taking over a claim whose lease has run out
    pub fn try_claim(&mut self, key: &str, lease: Duration, now: DateTime<Utc>) -> bool {
        if let Some(existing) = self.claims.get(key) {
            if now - existing.claimed_at < lease {
                return false;
            }
            warn!(
                "Taking over stale claim '{}' held since {}",
                key, existing.claimed_at
            );
        }
        self.claims.insert(
            key.to_string(),
            ImportClaim {
                key: key.to_string(),
                claimed_at: now,
            },
        );
        true
    }

    pub fn release_claim(&mut self, key: &str) -> bool {
        self.claims.remove(key).is_some()
    }
}

/// Process-local store, mainly for tests and throwaway runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
    closed: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_launch(&self, filter: &LaunchFilter) -> StoreResult<Option<Launch>> {
        self.ensure_open()?;
        Ok(self.collections.read().await.find_launch(filter))
    }

    async fn find_latest_launch(&self) -> StoreResult<Option<Launch>> {
        self.ensure_open()?;
        Ok(self.collections.read().await.find_latest_launch())
    }

    async fn find_launches(&self, skip: usize, limit: Option<usize>) -> StoreResult<Vec<Launch>> {
        self.ensure_open()?;
        Ok(self.collections.read().await.find_launches(skip, limit))
    }

    async fn count_launches(&self) -> StoreResult<usize> {
        self.ensure_open()?;
        Ok(self.collections.read().await.launches.len())
    }

    async fn upsert_launch(&self, launch: &Launch) -> StoreResult<()> {
        self.ensure_open()?;
        self.collections.write().await.upsert_launch(launch);
        Ok(())
    }

    async fn update_launches(&self, filter: &LaunchFilter, patch: &LaunchPatch) -> StoreResult<u64> {
        self.ensure_open()?;
        Ok(self.collections.write().await.update_launches(filter, patch))
    }

    async fn find_planet(&self, kepler_name: &str) -> StoreResult<Option<Planet>> {
        self.ensure_open()?;
        Ok(self.collections.read().await.planets.get(kepler_name).cloned())
    }

    async fn find_planets(&self) -> StoreResult<Vec<Planet>> {
        self.ensure_open()?;
        Ok(self.collections.read().await.planets.values().cloned().collect())
    }

    async fn upsert_planet(&self, planet: &Planet) -> StoreResult<()> {
        self.ensure_open()?;
        self.collections.write().await.upsert_planet(planet);
        Ok(())
    }

    async fn try_claim(&self, key: &str, lease: Duration) -> StoreResult<bool> {
        self.ensure_open()?;
        Ok(self.collections.write().await.try_claim(key, lease, Utc::now()))
    }

    async fn release_claim(&self, key: &str) -> StoreResult<()> {
        self.ensure_open()?;
        self.collections.write().await.release_claim(key);
        Ok(())
    }

    async fn close(&self) -> StoreResult<()> {
        self.closed.store(true, Ordering::Release);
        debug!("Memory store closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn launch(flight_number: u32, mission: &str) -> Launch {
        Launch {
            flight_number,
            mission: mission.to_string(),
            rocket: "Falcon 9".to_string(),
            launch_date: Utc.with_ymd_and_hms(2020, 5, 30, 19, 22, 0).unwrap(),
            target: None,
            upcoming: false,
            success: Some(true),
            customers: vec!["NASA".to_string()],
        }
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_flight_number() {
        let store = MemoryStore::new();
        store.upsert_launch(&launch(94, "Demo-2")).await.unwrap();

        let mut updated = launch(94, "Crew Demo-2");
        updated.customers = vec!["NASA (CCP)".to_string()];
        store.upsert_launch(&updated).await.unwrap();

        assert_eq!(store.count_launches().await.unwrap(), 1);
        let found = store
            .find_launch(&LaunchFilter::by_flight_number(94))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, updated);
    }

    #[tokio::test]
    async fn test_find_launches_paginates_in_flight_order() {
        let store = MemoryStore::new();
        for n in [103, 100, 105] {
            store.upsert_launch(&launch(n, "m")).await.unwrap();
        }

        let page = store.find_launches(1, Some(1)).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].flight_number, 103);

        let all: Vec<u32> = store
            .find_launches(0, None)
            .await
            .unwrap()
            .iter()
            .map(|l| l.flight_number)
            .collect();
        assert_eq!(all, vec![100, 103, 105]);

        let latest = store.find_latest_launch().await.unwrap().unwrap();
        assert_eq!(latest.flight_number, 105);
    }

    #[tokio::test]
    async fn test_update_counts_only_modified() {
        let store = MemoryStore::new();
        store.upsert_launch(&launch(7, "m")).await.unwrap();

        let filter = LaunchFilter::by_flight_number(7);
        assert_eq!(store.update_launches(&filter, &LaunchPatch::abort()).await.unwrap(), 1);
        assert_eq!(store.update_launches(&filter, &LaunchPatch::abort()).await.unwrap(), 0);

        let missing = LaunchFilter::by_flight_number(8);
        assert_eq!(store.update_launches(&missing, &LaunchPatch::abort()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_claims_are_exclusive() {
        let store = MemoryStore::new();
        let lease = Duration::minutes(10);
        assert!(store.try_claim("launches", lease).await.unwrap());
        assert!(!store.try_claim("launches", lease).await.unwrap());
        store.release_claim("launches").await.unwrap();
        assert!(store.try_claim("launches", lease).await.unwrap());
    }

    #[test]
    fn test_expired_claim_is_taken_over() {
        let mut collections = Collections::default();
        let lease = Duration::minutes(10);
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();

        assert!(collections.try_claim("launches", lease, start));
        assert!(!collections.try_claim("launches", lease, start + Duration::minutes(9)));
        assert!(collections.try_claim("launches", lease, start + Duration::minutes(10)));
        assert_eq!(
            collections.claims["launches"].claimed_at,
            start + Duration::minutes(10)
        );
    }

    #[tokio::test]
    async fn test_closed_store_rejects_calls() {
        let store = MemoryStore::new();
        store.close().await.unwrap();
        assert!(matches!(
            store.find_latest_launch().await,
            Err(StoreError::Closed)
        ));
    }
}
