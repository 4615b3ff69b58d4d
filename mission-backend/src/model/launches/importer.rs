///! One-shot import of historical launches from the SpaceX API
use std::sync::Arc;

use tracing::{error, info, warn};

use mission_common::Launch;

use super::api_client::SpacexApiClient;
use super::manager::LaunchManager;
use super::types::SEED_LAUNCH;
use crate::error::Result;
use crate::store::{DocumentStore, LaunchFilter};

/// Claim key guarding the bulk import
pub const LAUNCH_IMPORT_CLAIM: &str = "spacex-launches";

/// How long an unfinished import claim blocks other instances
pub const DEFAULT_IMPORT_CLAIM_LEASE_SECONDS: u64 = 600;

/// What [`LaunchImporter::load_launches_data`] ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Seed launch was already stored
    AlreadyLoaded,
    /// Another process holds the import claim
    ClaimedElsewhere,
    /// Import ran and upserted this many launches
    Imported(usize),
}

pub struct LaunchImporter {
    api_client: SpacexApiClient,
    manager: Arc<LaunchManager>,
    store: Arc<dyn DocumentStore>,
    claim_lease: chrono::Duration,
}

impl LaunchImporter {
    pub fn new(
        api_client: SpacexApiClient,
        manager: Arc<LaunchManager>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            api_client,
            manager,
            store,
            claim_lease: lease_from_secs(DEFAULT_IMPORT_CLAIM_LEASE_SECONDS),
        }
    }

    /// Age after which an import claim counts as abandoned and is taken over
    pub fn with_claim_lease(mut self, lease: std::time::Duration) -> Self {
        self.claim_lease = lease_from_secs(lease.as_secs());
        self
    }

    /// Download every launch, flatten it and upsert it by flight number.
    ///
    /// Stops at the first failure. Launches saved before that stay saved.
    pub async fn populate_launches(&self) -> Result<usize> {
        info!("Downloading launch data from {}", self.api_client.api_url());

        let docs = self.api_client.fetch_all_launches().await?;
        let total = docs.len();

        for doc in docs {
            let launch = Launch::from(doc);
            info!("{} {}", launch.flight_number, launch.mission);
            self.manager.save_launch(&launch).await?;
        }

        info!("Imported {} launches", total);
        Ok(total)
    }

    /// Import launches unless the seed launch shows they are already there.
    ///
    /// The import is claimed in the store first, so two services starting
    /// against the same empty store do not both download. A claim left by
    /// a process that died mid-import expires after the claim lease.
    pub async fn load_launches_data(&self) -> Result<ImportOutcome> {
        let seed = LaunchFilter::by_flight_number(SEED_LAUNCH.flight_number)
            .rocket(SEED_LAUNCH.rocket)
            .mission(SEED_LAUNCH.mission);

        if self.manager.find_launch(&seed).await?.is_some() {
            info!("Launch data already loaded");
            return Ok(ImportOutcome::AlreadyLoaded);
        }

        if !self.store.try_claim(LAUNCH_IMPORT_CLAIM, self.claim_lease).await? {
            warn!("Launch import already claimed by another instance, skipping");
            return Ok(ImportOutcome::ClaimedElsewhere);
        }

        match self.populate_launches().await {
            Ok(count) => Ok(ImportOutcome::Imported(count)),
            Err(e) => {
                error!("Launch import failed: {}", e);
                if let Err(release_err) = self.store.release_claim(LAUNCH_IMPORT_CLAIM).await {
                    warn!("Failed to release launch import claim: {}", release_err);
                }
                Err(e)
            }
        }
    }
}

fn lease_from_secs(secs: u64) -> chrono::Duration {
    chrono::Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX / 1000))
}
