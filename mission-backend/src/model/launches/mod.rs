///! Launch records: SpaceX import and the operations served over HTTP

pub mod types;
pub mod api_client;
pub mod manager;
pub mod importer;

pub use api_client::{SpacexApiClient, SPACEX_API_URL};
pub use importer::{ImportOutcome, LaunchImporter, DEFAULT_IMPORT_CLAIM_LEASE_SECONDS};
pub use manager::{LaunchManager, DEFAULT_FLIGHT_NUMBER};
