///! Kepler exoplanet CSV parser
///!
///! The NASA export starts with a block of `#` comment lines, followed by
///! a header row and one row per Kepler object of interest.
use std::io::Read;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use mission_common::Planet;

/// Columns we care about; the rest of the export is ignored
#[derive(Debug, Deserialize)]
struct KeplerRow {
    kepler_name: String,
    koi_disposition: String,
    koi_insol: Option<f64>,
    koi_prad: Option<f64>,
}

impl KeplerRow {
    /// Confirmed, Earth-like stellar flux, and at most 1.6 Earth radii
    fn is_habitable(&self) -> bool {
        self.koi_disposition == "CONFIRMED"
            && !self.kepler_name.is_empty()
            && self.koi_insol.is_some_and(|insol| insol > 0.36 && insol < 1.11)
            && self.koi_prad.is_some_and(|prad| prad < 1.6)
    }
}

/// Parse the CSV and keep only habitable planets
pub fn parse_kepler_csv<R: Read>(reader: R) -> Result<Vec<Planet>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut planets = Vec::new();
    let mut rows = 0usize;

    for (index, record) in csv_reader.deserialize::<KeplerRow>().enumerate() {
        let row = record.with_context(|| format!("Malformed Kepler row {}", index + 1))?;
        rows += 1;
        if row.is_habitable() {
            planets.push(Planet::new(row.kepler_name));
        }
    }

    debug!("Parsed {} Kepler rows, {} habitable", rows, planets.len());
    Ok(planets)
}
