///! Document store abstraction
///!
///! Two collections live behind [`DocumentStore`]: `launches`, keyed by
///! flight number, and `planets`, keyed by Kepler name. A third, tiny
///! collection of import claims lets concurrent startups agree on who
///! runs the bulk import.

pub mod json_file;
pub mod memory;

use async_trait::async_trait;
use chrono::Duration;
use mission_common::{Launch, Planet};

use crate::error::StoreError;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Typed filter over launch fields; unset fields match anything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchFilter {
    pub flight_number: Option<u32>,
    pub mission: Option<String>,
    pub rocket: Option<String>,
}

impl LaunchFilter {
    pub fn by_flight_number(flight_number: u32) -> Self {
        Self {
            flight_number: Some(flight_number),
            ..Self::default()
        }
    }

    pub fn mission(mut self, mission: impl Into<String>) -> Self {
        self.mission = Some(mission.into());
        self
    }

    pub fn rocket(mut self, rocket: impl Into<String>) -> Self {
        self.rocket = Some(rocket.into());
        self
    }

    pub fn matches(&self, launch: &Launch) -> bool {
        self.flight_number.is_none_or(|n| n == launch.flight_number)
            && self.mission.as_deref().is_none_or(|m| m == launch.mission)
            && self.rocket.as_deref().is_none_or(|r| r == launch.rocket)
    }
}

/// Partial update applied by [`DocumentStore::update_launches`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchPatch {
    pub upcoming: Option<bool>,
    pub success: Option<Option<bool>>,
}

impl LaunchPatch {
    /// Patch marking a launch as aborted
    pub fn abort() -> Self {
        Self {
            upcoming: Some(false),
            success: Some(Some(false)),
        }
    }

    /// Apply the patch in place. Returns `true` if any field changed.
    pub fn apply(&self, launch: &mut Launch) -> bool {
        let mut changed = false;

        if let Some(upcoming) = self.upcoming {
            changed |= launch.upcoming != upcoming;
            launch.upcoming = upcoming;
        }
        if let Some(success) = self.success {
            changed |= launch.success != success;
            launch.success = success;
        }

        changed
    }
}

/// Storage for launches and reference planets.
///
/// Implementations own their connection lifecycle: they are opened by a
/// constructor and released by [`DocumentStore::close`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// First launch matching `filter`, lowest flight number first
    async fn find_launch(&self, filter: &LaunchFilter) -> StoreResult<Option<Launch>>;

    /// Launch with the highest flight number
    async fn find_latest_launch(&self) -> StoreResult<Option<Launch>>;

    /// Launches ordered by ascending flight number. `limit` of `None`
    /// returns everything after `skip`.
    async fn find_launches(&self, skip: usize, limit: Option<usize>) -> StoreResult<Vec<Launch>>;

    async fn count_launches(&self) -> StoreResult<usize>;

    /// Insert or replace the launch with the same flight number
    async fn upsert_launch(&self, launch: &Launch) -> StoreResult<()>;

    /// Apply `patch` to every match, returning how many records actually changed
    async fn update_launches(&self, filter: &LaunchFilter, patch: &LaunchPatch) -> StoreResult<u64>;

    async fn find_planet(&self, kepler_name: &str) -> StoreResult<Option<Planet>>;

    /// All planets ordered by Kepler name
    async fn find_planets(&self) -> StoreResult<Vec<Planet>>;

    /// Insert or replace the planet with the same Kepler name
    async fn upsert_planet(&self, planet: &Planet) -> StoreResult<()>;

    /// Atomically claim `key`. Returns `false` if someone else holds it and
    /// their claim is younger than `lease`; older claims are taken over.
    async fn try_claim(&self, key: &str, lease: Duration) -> StoreResult<bool>;

    async fn release_claim(&self, key: &str) -> StoreResult<()>;

    /// Flush and release the store; later calls fail with [`StoreError::Closed`]
    async fn close(&self) -> StoreResult<()>;
}
