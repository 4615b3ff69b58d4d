use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Customers attached to every launch scheduled through the service
pub const DEFAULT_CUSTOMERS: [&str; 2] = ["ZTM", "NASA"];

/// One tracked mission attempt
///
/// `flight_number` is the business key. Stores never expose their own
/// identifiers, so this is also the only handle callers get.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Launch {
    pub flight_number: u32,
    pub mission: String,
    pub rocket: String,
    pub launch_date: DateTime<Utc>,
    /// Kepler name of the destination, only set on scheduled launches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub upcoming: bool,
    /// `None` while the outcome is unknown
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub customers: Vec<String>,
}

/// Request body for scheduling a launch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLaunch {
    pub mission: String,
    pub rocket: String,
    pub launch_date: DateTime<Utc>,
    pub target: String,
}

/// Habitable planet from the Kepler catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Planet {
    pub kepler_name: String,
}

impl Planet {
    pub fn new(kepler_name: impl Into<String>) -> Self {
        Self {
            kepler_name: kepler_name.into(),
        }
    }
}

impl std::fmt::Display for Planet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kepler_name)
    }
}
