// CSV dataset loader - bundled files and embedded tables into typed columns
use crate::domain::error::{DashboardError, Result};
use crate::domain::table::{Column, Table, TIMESTAMP_COLUMN};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::io::Read;
use std::path::Path;

const MISSING_MARKERS: [&str; 5] = ["", "na", "nan", "null", "none"];
const UNIT_SUFFIXES: [&str; 2] = ["°C", "°c"];

/// Load a CSV file from disk
pub fn load_csv_path(path: &Path) -> Result<Table> {
    let dataset = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|e| DashboardError::unavailable(&dataset, e))?;
    let table = read_table(&dataset, file)?;

    tracing::debug!(dataset = %dataset, rows = table.len(), "Loaded dataset");
    Ok(table)
}

/// Load a CSV table compiled into the binary
pub fn load_csv_str(dataset: &str, text: &str) -> Result<Table> {
    read_table(dataset, text.as_bytes())
}

/// Parse CSV into a `Table`.
///
/// A `timestamp` (or `time`) column must parse as times, other columns become
/// numeric when every non-missing cell is a number and text otherwise.
pub fn read_table<R: Read>(dataset: &str, reader: R) -> Result<Table> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(|e| DashboardError::unavailable(dataset, e))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(DashboardError::unavailable(dataset, "missing header row"));
    }

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for (index, record) in csv_reader.records().enumerate() {
        // Header is line 1
        let record = record
            .map_err(|e| DashboardError::unavailable(dataset, format!("line {}: {}", index + 2, e)))?;
        for (column, cell) in record.iter().enumerate() {
            cells[column].push(normalize_cell(cell));
        }
    }

    let mut table = Table::new();
    for (name, column_cells) in headers.into_iter().zip(cells) {
        if is_time_column(&name) {
            let column = parse_time_column(dataset, column_cells)?;
            table = table.with_column(TIMESTAMP_COLUMN, column);
        } else {
            table = table.with_column(name, infer_column(column_cells));
        }
    }

    Ok(table)
}

fn is_time_column(name: &str) -> bool {
    name.eq_ignore_ascii_case(TIMESTAMP_COLUMN) || name.eq_ignore_ascii_case("time")
}

fn normalize_cell(cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    if MISSING_MARKERS.iter().any(|m| trimmed.eq_ignore_ascii_case(m)) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_time_column(dataset: &str, cells: Vec<Option<String>>) -> Result<Column> {
    let mut times = Vec::with_capacity(cells.len());
    for (index, cell) in cells.into_iter().enumerate() {
        match cell {
            None => times.push(None),
            Some(text) => {
                let time = parse_timestamp(&text).ok_or_else(|| {
                    DashboardError::unavailable(
                        dataset,
                        format!("line {}: unparseable timestamp '{}'", index + 2, text),
                    )
                })?;
                times.push(Some(time));
            }
        }
    }
    Ok(Column::Time(times))
}

fn infer_column(cells: Vec<Option<String>>) -> Column {
    let numbers: Option<Vec<Option<f64>>> = cells
        .iter()
        .map(|cell| match cell {
            None => Some(None),
            // inf and NaN keep the column numeric but count as missing
            Some(text) => parse_float(text).map(|v| v.is_finite().then_some(v)),
        })
        .collect();

    match numbers {
        Some(values) => Column::Number(values),
        None => Column::Text(cells),
    }
}

/// Parse a finite measurement, tolerating a trailing temperature unit
pub fn parse_number(text: &str) -> Option<f64> {
    parse_float(text).filter(|v| v.is_finite())
}

fn parse_float(text: &str) -> Option<f64> {
    let mut value = text.trim();
    for suffix in UNIT_SUFFIXES {
        value = value.strip_suffix(suffix).unwrap_or(value).trim_end();
    }
    value.parse::<f64>().ok()
}

/// RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC) or a bare date at midnight UTC
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(time) = DateTime::parse_from_rfc3339(text) {
        return Some(time.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_read_table_types_columns() {
        let csv = "timestamp,location,species,ph,temperature\n\
                   2024-07-15T00:00:00Z,HOLYROOD-01,Humpback,7.2,8.5°C\n\
                   2024-07-15 01:00:00,HOLYROOD-01,,NaN,9.1\n\
                   2024-07-16,HOLYROOD-02,Minke,7.5,\n";
        let table = load_csv_str("inline", csv).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(
            table.timestamps().unwrap(),
            &[
                Some(Utc.with_ymd_and_hms(2024, 7, 15, 0, 0, 0).unwrap()),
                Some(Utc.with_ymd_and_hms(2024, 7, 15, 1, 0, 0).unwrap()),
                Some(Utc.with_ymd_and_hms(2024, 7, 16, 0, 0, 0).unwrap()),
            ]
        );
        assert_eq!(table.numbers("ph").unwrap(), &[Some(7.2), None, Some(7.5)]);
        assert_eq!(table.numbers("temperature").unwrap(), &[Some(8.5), Some(9.1), None]);
        assert_eq!(
            table.texts("species").unwrap(),
            &[Some("Humpback".to_string()), None, Some("Minke".to_string())]
        );
    }

    #[test]
    fn test_infinite_cells_are_missing() {
        let csv = "timestamp,ph\n\
                   2024-07-15T00:00:00Z,7.2\n\
                   2024-07-15T01:00:00Z,inf\n\
                   2024-07-15T02:00:00Z,-Infinity\n\
                   2024-07-15T03:00:00Z,7.5\n";
        let table = load_csv_str("inline", csv).unwrap();
        assert_eq!(table.numbers("ph").unwrap(), &[Some(7.2), None, None, Some(7.5)]);

        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("-inf"), None);
        assert_eq!(parse_number(" 8.5°C"), Some(8.5));
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let err = load_csv_path(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, DashboardError::DataUnavailable { .. }));
    }

    #[test]
    fn test_ragged_rows_are_unavailable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ragged.csv");
        fs::write(&path, "timestamp,ph\n2024-07-15T00:00:00Z,7.2\n2024-07-15T01:00:00Z,7.3,extra\n").unwrap();

        let err = load_csv_path(&path).unwrap_err();
        match err {
            DashboardError::DataUnavailable { reason, .. } => assert!(reason.starts_with("line 3")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_bad_timestamp_is_unavailable() {
        let err = load_csv_str("inline", "timestamp,ph\nyesterday,7.2\n").unwrap_err();
        assert!(matches!(err, DashboardError::DataUnavailable { .. }));
    }

    #[test]
    fn test_empty_input_is_unavailable() {
        let err = load_csv_str("inline", "").unwrap_err();
        assert!(matches!(err, DashboardError::DataUnavailable { .. }));
    }

    #[test]
    fn test_time_alias_and_text_fallback() {
        let table = load_csv_str("inline", "Time,count\n2024-05-03,3\n2024-05-13,lots\n").unwrap();
        assert!(table.timestamps().is_some());
        assert!(table.texts("count").is_some());
    }

    #[test]
    fn test_bundled_sensor_file_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/sensor_readings.csv");
        let table = load_csv_path(&path).unwrap();
        assert_eq!(table.len(), 72);
        for metric in ["temperature", "ph", "oxygen", "salinity", "density", "chlorophyll"] {
            assert!(table.numbers(metric).is_some(), "{} should be numeric", metric);
        }
    }
}
