// Metric series domain models
use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricPoint {
    pub time: DateTime<FixedOffset>,
    pub value: f64,
}

impl MetricPoint {
    pub fn new(time: DateTime<FixedOffset>, value: f64) -> Self {
        Self { time, value }
    }
}

/// Time-ordered values for one measurement; non-decreasing by `time`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSeries {
    pub metric: String,
    pub points: Vec<MetricPoint>,
}

impl MetricSeries {
    pub fn new(metric: impl Into<String>, points: Vec<MetricPoint>) -> Self {
        Self {
            metric: metric.into(),
            points,
        }
    }

    pub fn empty(metric: impl Into<String>) -> Self {
        Self::new(metric, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn latest(&self) -> Option<&MetricPoint> {
        self.points.last()
    }

    pub fn is_time_ordered(&self) -> bool {
        self.points.windows(2).all(|pair| pair[0].time <= pair[1].time)
    }
}

/// One row of a value-vs-value scatter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricPair {
    pub x: f64,
    pub y: f64,
    pub color: Option<f64>,
}

/// Inclusive time range filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }

    pub fn contains(&self, time: &DateTime<Utc>) -> bool {
        *time >= self.start && *time <= self.end
    }
}

/// Relative time range presets offered by the dashboard's filter options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    #[serde(rename = "past_10_minutes")]
    Past10Minutes,
    #[serde(rename = "past_2_hours")]
    Past2Hours,
    #[serde(rename = "past_24_hours")]
    Past24Hours,
    #[serde(rename = "past_7_days")]
    Past7Days,
    #[serde(rename = "past_1_month")]
    Past1Month,
    #[serde(rename = "past_6_months")]
    Past6Months,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 6] = [
        TimeWindow::Past10Minutes,
        TimeWindow::Past2Hours,
        TimeWindow::Past24Hours,
        TimeWindow::Past7Days,
        TimeWindow::Past1Month,
        TimeWindow::Past6Months,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Past10Minutes => "past_10_minutes",
            TimeWindow::Past2Hours => "past_2_hours",
            TimeWindow::Past24Hours => "past_24_hours",
            TimeWindow::Past7Days => "past_7_days",
            TimeWindow::Past1Month => "past_1_month",
            TimeWindow::Past6Months => "past_6_months",
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            TimeWindow::Past10Minutes => Duration::minutes(10),
            TimeWindow::Past2Hours => Duration::hours(2),
            TimeWindow::Past24Hours => Duration::days(1),
            TimeWindow::Past7Days => Duration::weeks(1),
            TimeWindow::Past1Month => Duration::days(30),
            TimeWindow::Past6Months => Duration::days(180),
        }
    }

    /// Range ending at `now`
    pub fn range_ending(&self, now: DateTime<Utc>) -> DateRange {
        DateRange::new(now - self.duration(), now)
    }
}

impl FromStr for TimeWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        TimeWindow::ALL
            .into_iter()
            .find(|w| w.as_str() == normalized)
            .ok_or_else(|| format!("unknown time window '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Day,
    Month,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reducer {
    Sum,
    Mean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Aggregate {
    pub bucket: Bucket,
    pub reducer: Reducer,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub latest: f64,
}

/// Pairwise correlations between metrics; `None` where undefined
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub metrics: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.metrics.iter().position(|m| m == a)?;
        let j = self.metrics.iter().position(|m| m == b)?;
        self.values[i][j]
    }
}
