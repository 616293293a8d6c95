// Bundled-file repository implementation
use crate::application::dataset_repository::{DatasetId, DatasetRepository};
use crate::domain::error::Result;
use crate::domain::metric::DateRange;
use crate::domain::table::Table;
use crate::infrastructure::dataset_loader::{load_csv_path, load_csv_str};
use async_trait::async_trait;
use std::path::PathBuf;

/// Monthly presence levels (0 absent .. 3 high) compiled into the binary
pub const SPECIES_PRESENCE_CSV: &str = include_str!("../../data/species_presence.csv");

#[derive(Debug, Clone)]
pub struct FileRepository {
    sensors: PathBuf,
    sightings: PathBuf,
    presence: Option<PathBuf>,
}

impl FileRepository {
    pub fn new(sensors: PathBuf, sightings: PathBuf, presence: Option<PathBuf>) -> Self {
        Self {
            sensors,
            sightings,
            presence,
        }
    }
}

#[async_trait]
impl DatasetRepository for FileRepository {
    async fn load(&self, dataset: DatasetId, _range: Option<DateRange>) -> Result<Table> {
        match dataset {
            DatasetId::Sensors => load_csv_path(&self.sensors),
            DatasetId::Sightings => load_csv_path(&self.sightings),
            DatasetId::Presence => match &self.presence {
                Some(path) => load_csv_path(path),
                None => load_csv_str("species presence", SPECIES_PRESENCE_CSV),
            },
        }
    }
}
