// Ocean Networks Canada repository implementation
use crate::application::dataset_repository::{DatasetId, DatasetRepository};
use crate::domain::error::{DashboardError, Result};
use crate::domain::metric::{DateRange, TimeWindow};
use crate::domain::table::{Column, TIMESTAMP_COLUMN, Table};
use crate::infrastructure::config::OncSettings;
use crate::infrastructure::dataset_loader::parse_timestamp;
use crate::infrastructure::file_repository::FileRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

const DATASET: &str = "ONC scalar data";
const OUTPUT_FORMAT: &str = "array";
const QUALITY_CONTROL: &str = "clean";

/// ONC sensor names and the column each one lands in
const SENSOR_COLUMNS: [(&str, &str); 6] = [
    ("External pH (Dynamic Salinity)", "ph"),
    ("Oxygen Concentration Corrected", "oxygen"),
    ("Practical Salinity", "salinity"),
    ("Temperature", "temperature"),
    ("Density", "density"),
    ("Chlorophyll", "chlorophyll"),
];

/// Sensors every parsed table carries, all-missing when the device omits them
const EXPECTED_COLUMNS: [&str; 5] = ["ph", "oxygen", "salinity", "temperature", "density"];

#[derive(Debug, Deserialize)]
pub struct ScalarDataResponse {
    #[serde(rename = "sensorData", default)]
    pub sensor_data: Option<Vec<SensorData>>,
}

#[derive(Debug, Deserialize)]
pub struct SensorData {
    #[serde(rename = "sensorName")]
    pub sensor_name: String,
    #[serde(default)]
    pub data: Option<SensorSamples>,
}

#[derive(Debug, Deserialize)]
pub struct SensorSamples {
    #[serde(rename = "sampleTimes", default)]
    pub sample_times: Option<Vec<String>>,
    #[serde(default)]
    pub values: Option<Vec<Option<f64>>>,
}

/// Fetches sensor readings from ONC on each load; sightings and the presence
/// calendar still come from bundled files.
#[derive(Debug, Clone)]
pub struct OncClient {
    url: String,
    device_code: String,
    token: String,
    row_limit: u32,
    default_window: TimeWindow,
    client: reqwest::Client,
    files: FileRepository,
}

impl OncClient {
    pub fn new(settings: OncSettings, files: FileRepository) -> Self {
        Self {
            url: settings.url.trim_end_matches('/').to_string(),
            device_code: settings.device_code,
            token: settings.token,
            row_limit: settings.row_limit,
            default_window: settings.default_window,
            client: reqwest::Client::new(),
            files,
        }
    }

    /// Range to request from ONC. No range means the default window ending
    /// now; an open start is cut back to the default window before the end.
    fn request_range(&self, range: Option<DateRange>, now: DateTime<Utc>) -> DateRange {
        match range {
            None => self.default_window.range_ending(now),
            Some(range) if range.start == DateTime::<Utc>::MIN_UTC => {
                self.default_window.range_ending(range.end)
            }
            Some(range) => range,
        }
    }

    /// Request URL without the token, safe to log
    fn build_request_url(&self, range: &DateRange) -> String {
        format!(
            "{}?deviceCode={}&rowLimit={}&outputFormat={}&qualityControl={}&dateFrom={}&dateTo={}",
            self.url,
            urlencoding::encode(&self.device_code),
            self.row_limit,
            OUTPUT_FORMAT,
            QUALITY_CONTROL,
            urlencoding::encode(&format_onc_time(&range.start)),
            urlencoding::encode(&format_onc_time(&range.end)),
        )
    }

    async fn fetch(&self, range: &DateRange) -> Result<ScalarDataResponse> {
        if self.token.is_empty() {
            return Err(DashboardError::unavailable(DATASET, "no ONC API token configured"));
        }

        let url = self.build_request_url(range);
        tracing::debug!("Requesting ONC scalar data: {}", url);

        let response = self
            .client
            .get(format!("{}&token={}", url, urlencoding::encode(&self.token)))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| DashboardError::unavailable(DATASET, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DashboardError::unavailable(
                DATASET,
                format!("request failed with status {}: {}", status, body),
            ));
        }

        response
            .json::<ScalarDataResponse>()
            .await
            .map_err(|e| DashboardError::unavailable(DATASET, format!("unreadable response: {}", e)))
    }
}

#[async_trait]
impl DatasetRepository for OncClient {
    async fn load(&self, dataset: DatasetId, range: Option<DateRange>) -> Result<Table> {
        if dataset != DatasetId::Sensors {
            return self.files.load(dataset, range).await;
        }

        let range = self.request_range(range, Utc::now());
        let response = self.fetch(&range).await?;
        let table = parse_scalar_data(&response)?;

        tracing::debug!("Fetched {} ONC rows for {}", table.len(), self.device_code);
        Ok(table)
    }
}

fn format_onc_time(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%dT%H:%M:%S.000Z").to_string()
}

/// Column name for an ONC sensor; unknown sensors are snake_cased
pub fn canonical_column(sensor_name: &str) -> String {
    if let Some((_, column)) = SENSOR_COLUMNS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(sensor_name.trim()))
    {
        return column.to_string();
    }

    sensor_name
        .trim()
        .to_ascii_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Convert an ONC `array` response into a table.
///
/// Timestamps come from the first sensor that has sample times. Value lists
/// longer than the timestamps are trimmed, shorter ones padded with missing.
pub fn parse_scalar_data(response: &ScalarDataResponse) -> Result<Table> {
    let sensors = response
        .sensor_data
        .as_ref()
        .ok_or_else(|| DashboardError::unavailable(DATASET, "response has no sensorData"))?;

    let sample_times = sensors
        .iter()
        .find_map(|s| s.data.as_ref().and_then(|d| d.sample_times.as_ref()))
        .ok_or_else(|| DashboardError::unavailable(DATASET, "no sensor reported sample times"))?;

    let times = sample_times
        .iter()
        .map(|raw| {
            parse_timestamp(raw).map(Some).ok_or_else(|| {
                DashboardError::unavailable(DATASET, format!("unparseable sample time '{}'", raw))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut table = Table::new().with_column(TIMESTAMP_COLUMN, Column::Time(times));

    for sensor in sensors {
        let Some(values) = sensor.data.as_ref().and_then(|d| d.values.as_ref()) else {
            continue;
        };
        table = table.with_column(canonical_column(&sensor.sensor_name), Column::Number(values.clone()));
    }

    for column in EXPECTED_COLUMNS {
        if !table.has_column(column) {
            table = table.with_column(column, Column::Number(Vec::new()));
        }
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dashboard_service::resolve_range;
    use chrono::TimeZone;
    use std::path::PathBuf;

    fn client(token: &str) -> OncClient {
        let settings = OncSettings {
            url: "https://data.oceannetworks.ca/api/scalardata/device/".to_string(),
            device_code: "SBEDSPHOXV2SN7212038".to_string(),
            token: token.to_string(),
            row_limit: 5000,
            default_window: TimeWindow::Past10Minutes,
        };
        let files = FileRepository::new(PathBuf::from("missing.csv"), PathBuf::from("missing.csv"), None);
        OncClient::new(settings, files)
    }

    #[test]
    fn test_build_request_url() {
        let start = Utc.with_ymd_and_hms(2024, 7, 15, 11, 50, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap();
        let url = client("secret").build_request_url(&DateRange::new(start, end));

        assert_eq!(
            url,
            "https://data.oceannetworks.ca/api/scalardata/device?deviceCode=SBEDSPHOXV2SN7212038\
             &rowLimit=5000&outputFormat=array&qualityControl=clean\
             &dateFrom=2024-07-15T11%3A50%3A00.000Z&dateTo=2024-07-15T12%3A00%3A00.000Z"
        );
        assert!(!url.contains("secret"));
    }

    #[test]
    fn test_open_start_uses_default_window() {
        let onc = client("secret");
        let now = Utc.with_ymd_and_hms(2024, 7, 20, 9, 30, 0).unwrap();

        let open = resolve_range(None, None, Some("2024-07-15"), now).unwrap();
        let url = onc.build_request_url(&onc.request_range(open, now));
        assert!(
            url.ends_with("&dateFrom=2024-07-14T23%3A50%3A00.000Z&dateTo=2024-07-15T00%3A00%3A00.000Z"),
            "{}",
            url
        );

        let latest = onc.request_range(None, now);
        assert_eq!(latest.end, now);
        assert_eq!(latest.start, Utc.with_ymd_and_hms(2024, 7, 20, 9, 20, 0).unwrap());

        let bounded = resolve_range(None, Some("2024-07-01"), Some("2024-07-15"), now).unwrap();
        assert_eq!(onc.request_range(bounded, now), bounded.unwrap());
    }

    #[tokio::test]
    async fn test_missing_token_is_unavailable() {
        let err = client("").load(DatasetId::Sensors, None).await.unwrap_err();
        assert!(matches!(err, DashboardError::DataUnavailable { .. }));
    }

    #[test]
    fn test_canonical_column() {
        assert_eq!(canonical_column("External pH (Dynamic Salinity)"), "ph");
        assert_eq!(canonical_column("temperature"), "temperature");
        assert_eq!(canonical_column("Sound Speed (m/s)"), "sound_speed_m_s");
    }

    #[test]
    fn test_parse_scalar_data() {
        let response: ScalarDataResponse = serde_json::from_value(serde_json::json!({
            "sensorData": [
                { "sensorName": "Temperature", "data": {
                    "sampleTimes": ["2024-07-15T12:00:00.000Z", "2024-07-15T12:00:10.000Z"],
                    "values": [8.1, 8.2, 8.3] } },
                { "sensorName": "External pH (Dynamic Salinity)", "data": {
                    "sampleTimes": ["2024-07-15T12:00:00.000Z", "2024-07-15T12:00:10.000Z"],
                    "values": [7.95] } },
                { "sensorName": "Oxygen Concentration Corrected", "data": {
                    "values": [6.5, null] } },
                { "sensorName": "Practical Salinity" }
            ]
        }))
        .unwrap();

        let table = parse_scalar_data(&response).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.numbers("temperature").unwrap(), &[Some(8.1), Some(8.2)]);
        assert_eq!(table.numbers("ph").unwrap(), &[Some(7.95), None]);
        assert_eq!(table.numbers("oxygen").unwrap(), &[Some(6.5), None]);
        assert_eq!(table.numbers("salinity").unwrap(), &[None, None]);
        assert_eq!(table.numbers("density").unwrap(), &[None, None]);
        assert!(!table.has_column("chlorophyll"));
        assert_eq!(
            table.timestamps().unwrap()[1],
            Some(Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 10).unwrap())
        );
    }

    #[test]
    fn test_parse_without_sensor_data() {
        let response: ScalarDataResponse = serde_json::from_str("{}").unwrap();
        assert!(parse_scalar_data(&response).is_err());

        let response: ScalarDataResponse =
            serde_json::from_str(r#"{"sensorData": [{"sensorName": "Temperature", "data": {"values": [1.0]}}]}"#)
                .unwrap();
        assert!(parse_scalar_data(&response).is_err());
    }
}
