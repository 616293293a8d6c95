// Configuration loading - settings layers and widget definitions
use crate::application::dataset_repository::DatasetId;
use crate::domain::chart::ChartKind;
use crate::domain::dashboard::TabId;
use crate::domain::metric::{Aggregate, TimeWindow};
use anyhow::Context;
use chrono_tz::Tz;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_SETTINGS: &str = include_str!("../../config/dashboard.toml");
pub const DEFAULT_WIDGETS: &str = include_str!("../../config/widgets.toml");

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub display: DisplaySettings,
    pub datasets: DatasetSettings,
    pub onc: OncSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplaySettings {
    pub title: String,
    pub timezone: String,
}

impl DisplaySettings {
    pub fn time_zone(&self) -> anyhow::Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("invalid display timezone '{}': {}", self.timezone, e))
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SensorSource {
    File,
    Onc,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatasetSettings {
    pub sensor_source: SensorSource,
    pub sensors: PathBuf,
    pub sightings: PathBuf,
    /// Overrides the embedded species presence calendar
    pub presence: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OncSettings {
    pub url: String,
    pub device_code: String,
    pub token: String,
    pub row_limit: u32,
    pub default_window: TimeWindow,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct WidgetsConfig {
    #[serde(default)]
    pub charts: Vec<ChartConfig>,
}

impl WidgetsConfig {
    pub fn charts_for(&self, tab: TabId) -> impl Iterator<Item = &ChartConfig> {
        self.charts.iter().filter(move |c| c.tab == tab)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartConfig {
    pub id: String,
    pub tab: TabId,
    pub title: String,
    #[serde(default)]
    pub kind: ChartKind,
    pub dataset: DatasetId,
    pub x_title: Option<String>,
    pub y_title: Option<String>,
    pub unit: Option<String>,
    #[serde(default)]
    pub normalize_y: bool,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    pub fraction_digits: Option<i32>,
    pub max_points: Option<usize>,
    /// Plot series against this metric instead of time
    pub x_metric: Option<String>,
    /// Shade scatter points by this metric
    pub color_metric: Option<String>,
    pub color_title: Option<String>,
    #[serde(default)]
    pub series: Vec<SeriesConfig>,
    #[serde(default)]
    pub axes: Vec<AxisConfig>,
    #[serde(default)]
    pub thresholds: Vec<ThresholdConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SeriesConfig {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub metric: String,
    pub species: Option<String>,
    #[serde(default)]
    pub axis: usize,
    pub aggregate: Option<Aggregate>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AxisConfig {
    pub title: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ThresholdConfig {
    pub value: f64,
    pub label: String,
    pub color: Option<String>,
}

/// Embedded defaults, then `<dir>/dashboard.toml`, then `WHALE__*` variables
pub fn load_settings(dir: &Path) -> anyhow::Result<Settings> {
    let settings = config::Config::builder()
        .add_source(config::File::from_str(DEFAULT_SETTINGS, config::FileFormat::Toml))
        .add_source(config::File::from(dir.join("dashboard.toml")).required(false))
        .add_source(
            config::Environment::with_prefix("WHALE")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings
        .try_deserialize()
        .context("Failed to read dashboard settings")
}

/// `<dir>/widgets.toml` when present, the embedded chart set otherwise
pub fn load_widgets_config(dir: &Path) -> anyhow::Result<WidgetsConfig> {
    let path = dir.join("widgets.toml");
    if !path.exists() {
        return parse_widgets(DEFAULT_WIDGETS);
    }

    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .build()?;
    settings
        .try_deserialize()
        .context("Failed to read widget definitions")
}

pub fn parse_widgets(toml_text: &str) -> anyhow::Result<WidgetsConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::from_str(toml_text, config::FileFormat::Toml))
        .build()?;
    Ok(settings.try_deserialize()?)
}
