///! File-backed document store
///!
///! Each collection is kept in memory and written out as a pretty JSON
///! array after every mutation.
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};

use mission_common::{Launch, Planet};

use super::memory::{Collections, ImportClaim};
use super::{DocumentStore, LaunchFilter, LaunchPatch, StoreResult};
use crate::error::StoreError;

const LAUNCHES_FILE: &str = "launches.json";
const PLANETS_FILE: &str = "planets.json";
const CLAIMS_FILE: &str = "import_claims.json";

pub struct JsonFileStore {
    data_dir: PathBuf,
    collections: RwLock<Collections>,
    closed: AtomicBool,
}

impl JsonFileStore {
    /// Open the store rooted at `data_dir`, creating the directory if needed
    pub async fn open<P: AsRef<Path>>(data_dir: P) -> StoreResult<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();

        if !data_dir.exists() {
            fs::create_dir_all(&data_dir)
                .await
                .map_err(|source| StoreError::Io { path: data_dir.clone(), source })?;
            info!("Created data directory: {:?}", data_dir);
        }

        let launches: Vec<Launch> = load_collection(&data_dir.join(LAUNCHES_FILE), "launches").await?;
        let planets: Vec<Planet> = load_collection(&data_dir.join(PLANETS_FILE), "planets").await?;
        let claims: Vec<ImportClaim> = load_collection(&data_dir.join(CLAIMS_FILE), "import_claims").await?;

        let collections = Collections {
            launches: launches.into_iter().map(|l| (l.flight_number, l)).collect(),
            planets: planets.into_iter().map(|p| (p.kepler_name.clone(), p)).collect(),
            claims: claims.into_iter().map(|c| (c.key.clone(), c)).collect(),
        };

        info!(
            "Opened JSON store at {:?}: {} launches, {} planets",
            data_dir,
            collections.launches.len(),
            collections.planets.len()
        );

        Ok(Self {
            data_dir,
            collections: RwLock::new(collections),
            closed: AtomicBool::new(false),
        })
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    async fn save_launches(&self, collections: &Collections) -> StoreResult<()> {
        let launches: Vec<&Launch> = collections.launches.values().collect();
        save_collection(&self.data_dir.join(LAUNCHES_FILE), "launches", &launches).await
    }

    async fn save_planets(&self, collections: &Collections) -> StoreResult<()> {
        let planets: Vec<&Planet> = collections.planets.values().collect();
        save_collection(&self.data_dir.join(PLANETS_FILE), "planets", &planets).await
    }

    async fn save_claims(&self, collections: &Collections) -> StoreResult<()> {
        let claims: Vec<&ImportClaim> = collections.claims.values().collect();
        save_collection(&self.data_dir.join(CLAIMS_FILE), "import_claims", &claims).await
    }
}

async fn load_collection<T: DeserializeOwned>(path: &Path, collection: &'static str) -> StoreResult<Vec<T>> {
    if !path.exists() {
        debug!("Collection file does not exist: {:?}", path);
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)
        .await
        .map_err(|source| StoreError::Io { path: path.to_path_buf(), source })?;

    serde_json::from_str(&content).map_err(|source| StoreError::Serde { collection, source })
}

/// Replace the collection file via a temporary file and rename
async fn save_collection<T: Serialize>(path: &Path, collection: &'static str, items: &[T]) -> StoreResult<()> {
    let content = serde_json::to_string_pretty(items)
        .map_err(|source| StoreError::Serde { collection, source })?;

    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, content)
        .await
        .map_err(|source| StoreError::Io { path: tmp_path.clone(), source })?;
    fs::rename(&tmp_path, path)
        .await
        .map_err(|source| StoreError::Io { path: path.to_path_buf(), source })?;

    debug!("Saved {} {} to {:?}", items.len(), collection, path);
    Ok(())
}

#[async_trait]
impl DocumentStore for JsonFileStore {
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
        let mut collections = self.collections.write().await;
        let previous = collections.launches.get(&launch.flight_number).cloned();
        collections.upsert_launch(launch);

        if let Err(e) = self.save_launches(&collections).await {
            match previous {
                Some(previous) => collections.upsert_launch(&previous),
                None => {
                    collections.launches.remove(&launch.flight_number);
                }
            }
            return Err(e);
        }
        Ok(())
    }

    async fn update_launches(&self, filter: &LaunchFilter, patch: &LaunchPatch) -> StoreResult<u64> {
        self.ensure_open()?;
        let mut collections = self.collections.write().await;
        let snapshot = collections.launches.clone();
        let modified = collections.update_launches(filter, patch);

        if modified > 0 {
            if let Err(e) = self.save_launches(&collections).await {
                collections.launches = snapshot;
                return Err(e);
            }
        }
        Ok(modified)
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
        let mut collections = self.collections.write().await;
        let previous = collections.planets.get(&planet.kepler_name).cloned();
        collections.upsert_planet(planet);

        if let Err(e) = self.save_planets(&collections).await {
            match previous {
                Some(previous) => collections.upsert_planet(&previous),
                None => {
                    collections.planets.remove(&planet.kepler_name);
                }
            }
            return Err(e);
        }
        Ok(())
    }

    async fn try_claim(&self, key: &str, lease: Duration) -> StoreResult<bool> {
        self.ensure_open()?;
        let mut collections = self.collections.write().await;
        let previous = collections.claims.get(key).cloned();
        if !collections.try_claim(key, lease, Utc::now()) {
            return Ok(false);
        }

        if let Err(e) = self.save_claims(&collections).await {
            match previous {
                Some(previous) => {
                    collections.claims.insert(key.to_string(), previous);
                }
                None => {
                    collections.release_claim(key);
                }
            }
            return Err(e);
        }
        Ok(true)
    }

    async fn release_claim(&self, key: &str) -> StoreResult<()> {
        self.ensure_open()?;
        let mut collections = self.collections.write().await;
        let Some(previous) = collections.claims.remove(key) else {
            return Ok(());
        };

        if let Err(e) = self.save_claims(&collections).await {
            collections.claims.insert(key.to_string(), previous);
            return Err(e);
        }
        Ok(())
    }

    async fn close(&self) -> StoreResult<()> {
        // Hold the write lock so no mutation races the final flush
        let collections = self.collections.write().await;
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        self.save_launches(&collections).await?;
        self.save_planets(&collections).await?;
        self.save_claims(&collections).await?;

        info!("Closed JSON store at {:?}", self.data_dir);
        Ok(())
    }
}
