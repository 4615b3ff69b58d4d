use std::sync::Arc;

use tracing::{debug, info};

use mission_common::{DEFAULT_CUSTOMERS, Launch, NewLaunch};

use crate::error::{LaunchError, Result};
use crate::store::{DocumentStore, LaunchFilter, LaunchPatch};

pub const DEFAULT_FLIGHT_NUMBER: u32 = 100;

/// Launch operations served to the HTTP layer
///
/// Holds no launch data itself; every call goes to the store.
pub struct LaunchManager {
    store: Arc<dyn DocumentStore>,
    default_flight_number: u32,
}

impl LaunchManager {
    pub fn new(store: Arc<dyn DocumentStore>, default_flight_number: u32) -> Self {
        Self {
            store,
            default_flight_number,
        }
    }

    pub async fn find_launch(&self, filter: &LaunchFilter) -> Result<Option<Launch>> {
        Ok(self.store.find_launch(filter).await?)
    }

    pub async fn exists_launch_with_id(&self, flight_number: u32) -> Result<bool> {
        let launch = self
            .find_launch(&LaunchFilter::by_flight_number(flight_number))
            .await?;
        Ok(launch.is_some())
    }

    /// Highest stored flight number, or the configured floor on an empty store
    pub async fn get_latest_flight_number(&self) -> Result<u32> {
        match self.store.find_latest_launch().await? {
            Some(latest) => Ok(latest.flight_number),
            None => Ok(self.default_flight_number),
        }
    }

    /// Mark a launch as aborted. Returns `true` only if exactly one record changed.
    pub async fn abort_launch_with_id(&self, flight_number: u32) -> Result<bool> {
        let modified = self
            .store
            .update_launches(&LaunchFilter::by_flight_number(flight_number), &LaunchPatch::abort())
            .await?;

        debug!("Abort of flight {} modified {} record(s)", flight_number, modified);
        Ok(modified == 1)
    }

    pub async fn get_all_launches(&self, skip: usize, limit: Option<usize>) -> Result<Vec<Launch>> {
        Ok(self.store.find_launches(skip, limit).await?)
    }

    /// Insert or replace by flight number
    pub async fn save_launch(&self, launch: &Launch) -> Result<()> {
        Ok(self.store.upsert_launch(launch).await?)
    }

    pub async fn schedule_new_launch(&self, request: NewLaunch) -> Result<Launch> {
        if self.store.find_planet(&request.target).await?.is_none() {
            return Err(LaunchError::NotFound(format!(
                "No matching planet was found for target '{}'",
                request.target
            )));
        }

        let latest = self.get_latest_flight_number().await?;
        let flight_number = latest
            .checked_add(1)
            .ok_or(LaunchError::FlightNumbersExhausted(latest))?;
        let launch = Launch {
            flight_number,
            mission: request.mission,
            rocket: request.rocket,
            launch_date: request.launch_date,
            target: Some(request.target),
            upcoming: true,
            success: Some(true),
            customers: DEFAULT_CUSTOMERS.iter().map(|c| c.to_string()).collect(),
        };

        self.save_launch(&launch).await?;
        info!(
            "Scheduled flight {} '{}' to {}",
            launch.flight_number,
            launch.mission,
            launch.target.as_deref().unwrap_or_default()
        );
        Ok(launch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::{TimeZone, Utc};
    use mission_common::Planet;

    fn launch(flight_number: u32) -> Launch {
        Launch {
            flight_number,
            mission: format!("Mission {}", flight_number),
            rocket: "Explorer IS1".to_string(),
            launch_date: Utc.with_ymd_and_hms(2030, 12, 27, 0, 0, 0).unwrap(),
            target: None,
            upcoming: true,
            success: Some(true),
            customers: Vec::new(),
        }
    }

    fn new_launch(target: &str) -> NewLaunch {
        NewLaunch {
            mission: "Kepler Exploration X".to_string(),
            rocket: "Explorer IS1".to_string(),
            launch_date: Utc.with_ymd_and_hms(2030, 12, 27, 0, 0, 0).unwrap(),
            target: target.to_string(),
        }
    }

    fn manager() -> (Arc<MemoryStore>, LaunchManager) {
        let store = Arc::new(MemoryStore::new());
        let manager = LaunchManager::new(store.clone(), DEFAULT_FLIGHT_NUMBER);
        (store, manager)
    }

    #[tokio::test]
    async fn test_latest_flight_number_defaults_then_tracks_max() {
        let (_, manager) = manager();
        assert_eq!(manager.get_latest_flight_number().await.unwrap(), 100);

        for n in [100, 105, 103] {
            manager.save_launch(&launch(n)).await.unwrap();
        }
        assert_eq!(manager.get_latest_flight_number().await.unwrap(), 105);
    }

    #[tokio::test]
    async fn test_save_then_find_returns_latest_write() {
        let (_, manager) = manager();
        manager.save_launch(&launch(42)).await.unwrap();

        let mut rewritten = launch(42);
        rewritten.mission = "Renamed".to_string();
        rewritten.upcoming = false;
        manager.save_launch(&rewritten).await.unwrap();

        let found = manager
            .find_launch(&LaunchFilter::by_flight_number(42))
            .await
            .unwrap();
        assert_eq!(found, Some(rewritten));
    }

    #[tokio::test]
    async fn test_schedule_unknown_target_writes_nothing() {
        let (store, manager) = manager();

        let result = manager.schedule_new_launch(new_launch("unknownPlanet")).await;
        assert!(matches!(result, Err(LaunchError::NotFound(_))));
        assert_eq!(store.count_launches().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_schedule_assigns_next_flight_and_defaults() {
        let (store, manager) = manager();
        store.upsert_planet(&Planet::new("Kepler-442 b")).await.unwrap();
        manager.save_launch(&launch(100)).await.unwrap();

        let scheduled = manager
            .schedule_new_launch(new_launch("Kepler-442 b"))
            .await
            .unwrap();

        assert_eq!(scheduled.flight_number, 101);
        assert!(scheduled.upcoming);
        assert_eq!(scheduled.success, Some(true));
        assert_eq!(scheduled.customers, vec!["ZTM", "NASA"]);
        assert_eq!(scheduled.target.as_deref(), Some("Kepler-442 b"));

        let stored = manager
            .find_launch(&LaunchFilter::by_flight_number(101))
            .await
            .unwrap();
        assert_eq!(stored, Some(scheduled));
    }

    #[tokio::test]
    async fn test_schedule_after_last_flight_number_fails() {
        let (store, manager) = manager();
        store.upsert_planet(&Planet::new("Kepler-442 b")).await.unwrap();
        manager.save_launch(&launch(u32::MAX)).await.unwrap();

        let result = manager.schedule_new_launch(new_launch("Kepler-442 b")).await;
        assert!(matches!(
            result,
            Err(LaunchError::FlightNumbersExhausted(n)) if n == u32::MAX
        ));
        assert_eq!(store.count_launches().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_abort_existing_and_missing() {
        let (_, manager) = manager();
        manager.save_launch(&launch(101)).await.unwrap();

        assert!(!manager.abort_launch_with_id(999).await.unwrap());
        assert!(manager.abort_launch_with_id(101).await.unwrap());

        let aborted = manager
            .find_launch(&LaunchFilter::by_flight_number(101))
            .await
            .unwrap()
            .unwrap();
        assert!(!aborted.upcoming);
        assert_eq!(aborted.success, Some(false));
        assert!(manager.exists_launch_with_id(101).await.unwrap());
        assert!(!manager.exists_launch_with_id(999).await.unwrap());
    }

    #[tokio::test]
    async fn test_get_all_launches_skip_limit() {
        let (_, manager) = manager();
        for n in [3, 1, 2] {
            manager.save_launch(&launch(n)).await.unwrap();
        }

        let page = manager.get_all_launches(1, Some(1)).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].flight_number, 2);
        assert_eq!(manager.get_all_launches(0, None).await.unwrap().len(), 3);
    }
}
