use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use mission_common::Planet;

use super::parser::parse_kepler_csv;
use crate::error::Result;
use crate::store::DocumentStore;

/// Planet catalog backed by the `planets` collection
pub struct PlanetManager {
    store: Arc<dyn DocumentStore>,
}

impl PlanetManager {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Load habitable planets from the Kepler CSV into the store.
    ///
    /// Upserts by Kepler name, so running it on every start is harmless.
    /// A missing file only logs a warning and leaves the store untouched.
    pub async fn load_planets_data<P: AsRef<Path>>(&self, csv_path: P) -> anyhow::Result<usize> {
        let csv_path = csv_path.as_ref();

        if !csv_path.exists() {
            warn!("Kepler data file {:?} not found, skipping planet load", csv_path);
            return Ok(0);
        }

        let content = tokio::fs::read(csv_path)
            .await
            .with_context(|| format!("Failed to read Kepler data file {:?}", csv_path))?;
        let planets = parse_kepler_csv(content.as_slice())
            .with_context(|| format!("Failed to parse Kepler data file {:?}", csv_path))?;

        for planet in &planets {
            self.store
                .upsert_planet(planet)
                .await
                .with_context(|| format!("Failed to save planet {}", planet))?;
        }

        info!("{} habitable planets found", planets.len());
        Ok(planets.len())
    }

    pub async fn get_all_planets(&self) -> Result<Vec<Planet>> {
        Ok(self.store.find_planets().await?)
    }
}
