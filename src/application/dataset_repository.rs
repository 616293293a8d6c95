// Repository trait for dataset access
use crate::domain::error::Result;
use crate::domain::metric::DateRange;
use crate::domain::table::Table;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Datasets the dashboard draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetId {
    /// Ocean sensor readings (temperature, pH, oxygen, salinity, density, chlorophyll)
    Sensors,
    /// Whale sightings by species
    Sightings,
    /// Monthly species presence calendar
    Presence,
}

impl DatasetId {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetId::Sensors => "sensors",
            DatasetId::Sightings => "sightings",
            DatasetId::Presence => "presence",
        }
    }
}

#[async_trait]
pub trait DatasetRepository: Send + Sync {
    /// Load one dataset. `range` lets remote sources fetch only the requested
    /// window; file-backed datasets load everything and ignore it.
    async fn load(&self, dataset: DatasetId, range: Option<DateRange>) -> Result<Table>;
}
