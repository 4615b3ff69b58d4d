use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use mission_common::Launch;

/// Historical launch used to detect whether data was already imported
pub struct SeedLaunch {
    pub flight_number: u32,
    pub rocket: &'static str,
    pub mission: &'static str,
}

pub const SEED_LAUNCH: SeedLaunch = SeedLaunch {
    flight_number: 1,
    rocket: "Falcon 1",
    mission: "FalconSat",
};

/// Response envelope of the SpaceX `launches/query` endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpacexQueryResponse {
    pub docs: Vec<SpacexLaunchDoc>,
}

/// One launch document, with `rocket` and `payloads` populated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpacexLaunchDoc {
    pub flight_number: u32,
    pub name: String,
    pub rocket: SpacexRocket,
    /// Local time at the launch site, with its UTC offset
    pub date_local: DateTime<FixedOffset>,
    pub upcoming: bool,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub payloads: Vec<SpacexPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpacexRocket {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpacexPayload {
    #[serde(default)]
    pub customers: Vec<String>,
}

impl From<SpacexLaunchDoc> for Launch {
    fn from(doc: SpacexLaunchDoc) -> Self {
        let customers = doc
            .payloads
            .into_iter()
            .flat_map(|payload| payload.customers)
            .collect();

        Launch {
            flight_number: doc.flight_number,
            mission: doc.name,
            rocket: doc.rocket.name,
            launch_date: doc.date_local.with_timezone(&Utc),
            target: None,
            upcoming: doc.upcoming,
            success: doc.success,
            customers,
        }
    }
}
