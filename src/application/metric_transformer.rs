// Metric transformer - Table rows into time-ordered metric series
use crate::domain::error::{DashboardError, Result};
use crate::domain::metric::{
    Aggregate, Bucket, CorrelationMatrix, DateRange, MetricPair, MetricPoint, MetricSeries,
    Reducer, SeriesSummary,
};
use crate::domain::table::{Column, SPECIES_COLUMN, Table};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

pub const HEALTH_SCORE_COLUMN: &str = "health_score";

/// Selects one numeric column, optionally filtered and aggregated
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricQuery {
    pub metric: String,
    pub range: Option<DateRange>,
    pub species: Option<String>,
    pub aggregate: Option<Aggregate>,
}

impl MetricQuery {
    pub fn new(metric: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            ..Self::default()
        }
    }

    pub fn in_range(mut self, range: Option<DateRange>) -> Self {
        self.range = range;
        self
    }

    pub fn for_species(mut self, species: Option<String>) -> Self {
        self.species = species;
        self
    }

    pub fn aggregated(mut self, aggregate: Option<Aggregate>) -> Self {
        self.aggregate = aggregate;
        self
    }
}

/// Extract a `MetricSeries` from a table.
///
/// Rows missing the timestamp or a finite value are dropped. No matching rows is an
/// empty series, not an error. Times are converted to `tz` and the result is
/// stably sorted by time.
pub fn extract_series(table: &Table, query: &MetricQuery, tz: Tz) -> Result<MetricSeries> {
    let values = numeric_column(table, &query.metric)?;
    let times = table.timestamps().ok_or_else(|| {
        DashboardError::invalid_filter("dataset has no timestamp column")
    })?;

    if let Some(range) = &query.range {
        validate_range(range)?;
    }

    let species = match &query.species {
        Some(wanted) => {
            let column = match table.column(SPECIES_COLUMN) {
                Some(Column::Text(cells)) => cells.as_slice(),
                Some(other) => {
                    return Err(DashboardError::invalid_filter(format!(
                        "column '{}' is {}, not text",
                        SPECIES_COLUMN,
                        other.type_name()
                    )));
                }
                None => return Err(DashboardError::invalid_filter("dataset has no species column")),
            };
            Some((wanted.trim(), column))
        }
        None => None,
    };

    let mut rows: Vec<(DateTime<Utc>, f64)> = times
        .iter()
        .zip(values)
        .enumerate()
        .filter_map(|(row, (time, value))| {
            let time = (*time)?;
            let value = finite(*value)?;
            if let Some(range) = &query.range {
                if !range.contains(&time) {
                    return None;
                }
            }
            if let Some((wanted, column)) = &species {
                let matches = column[row]
                    .as_deref()
                    .is_some_and(|s| s.trim().eq_ignore_ascii_case(wanted));
                if !matches {
                    return None;
                }
            }
            Some((time, value))
        })
        .collect();

    rows.sort_by_key(|(time, _)| *time);

    let points = match query.aggregate {
        Some(aggregate) => aggregate_rows(&rows, aggregate, tz),
        None => rows
            .into_iter()
            .map(|(time, value)| MetricPoint::new(to_display(time, tz), value))
            .collect(),
    };

    Ok(MetricSeries::new(query.metric.clone(), points))
}

fn validate_range(range: &DateRange) -> Result<()> {
    if range.is_valid() {
        Ok(())
    } else {
        Err(DashboardError::invalid_filter(format!(
            "range start {} is after end {}",
            range.start.to_rfc3339(),
            range.end.to_rfc3339()
        )))
    }
}

/// Rows whose timestamp falls inside `range`; the whole table without a range
pub fn slice_range(table: &Table, range: Option<&DateRange>) -> Result<Table> {
    let Some(range) = range else {
        return Ok(table.clone());
    };
    validate_range(range)?;

    let times = table.timestamps().ok_or_else(|| {
        DashboardError::invalid_filter("dataset has no timestamp column")
    })?;
    let rows: Vec<usize> = times
        .iter()
        .enumerate()
        .filter(|(_, time)| time.is_some_and(|t| range.contains(&t)))
        .map(|(row, _)| row)
        .collect();

    Ok(table.select_rows(&rows))
}

/// Row-wise pairs of two metrics for a value-vs-value scatter, in row order.
/// Rows missing either coordinate are dropped; a missing color value leaves
/// the point unshaded.
pub fn extract_pairs(
    table: &Table,
    x_metric: &str,
    y_metric: &str,
    color_metric: Option<&str>,
    range: Option<&DateRange>,
) -> Result<Vec<MetricPair>> {
    let table = slice_range(table, range)?;
    let xs = numeric_column(&table, x_metric)?;
    let ys = numeric_column(&table, y_metric)?;
    let colors = color_metric
        .map(|metric| numeric_column(&table, metric))
        .transpose()?;

    Ok(xs
        .iter()
        .zip(ys)
        .enumerate()
        .filter_map(|(row, (x, y))| {
            Some(MetricPair {
                x: finite(*x)?,
                y: finite(*y)?,
                color: colors.and_then(|c| finite(c[row])),
            })
        })
        .collect())
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn numeric_column<'a>(table: &'a Table, metric: &str) -> Result<&'a [Option<f64>]> {
    match table.column(metric) {
        Some(Column::Number(values)) => Ok(values),
        Some(other) => Err(DashboardError::invalid_filter(format!(
            "column '{}' is {}, not numeric",
            metric,
            other.type_name()
        ))),
        None => Err(DashboardError::invalid_filter(format!(
            "unknown metric '{}'",
            metric
        ))),
    }
}

fn to_display(time: DateTime<Utc>, tz: Tz) -> DateTime<FixedOffset> {
    time.with_timezone(&tz).fixed_offset()
}

/// Group sorted rows into day/month buckets in the display zone
fn aggregate_rows(rows: &[(DateTime<Utc>, f64)], aggregate: Aggregate, tz: Tz) -> Vec<MetricPoint> {
    let mut points: Vec<MetricPoint> = Vec::new();
    let mut current: Option<(NaiveDate, DateTime<FixedOffset>, f64, usize)> = None;

    for (time, value) in rows {
        let local = time.with_timezone(&tz);
        let key = match aggregate.bucket {
            Bucket::Day => local.date_naive(),
            Bucket::Month => local.date_naive().with_day(1).unwrap_or(local.date_naive()),
        };

        if let Some((bucket, _, total, count)) = current.as_mut() {
            if *bucket == key {
                *total += *value;
                *count += 1;
                continue;
            }
        }

        if let Some(done) = current.take() {
            points.push(finish_bucket(done, aggregate.reducer));
        }
        let start = bucket_start(key, tz).unwrap_or_else(|| local.fixed_offset());
        current = Some((key, start, *value, 1));
    }

    if let Some(done) = current {
        points.push(finish_bucket(done, aggregate.reducer));
    }
    points
}

fn bucket_start(date: NaiveDate, tz: Tz) -> Option<DateTime<FixedOffset>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    tz.from_local_datetime(&midnight)
        .earliest()
        .map(|start| start.fixed_offset())
}

fn finish_bucket(
    (_, start, total, count): (NaiveDate, DateTime<FixedOffset>, f64, usize),
    reducer: Reducer,
) -> MetricPoint {
    let value = match reducer {
        Reducer::Sum => total,
        Reducer::Mean => total / count as f64,
    };
    MetricPoint::new(start, value)
}

/// Mean, range and latest value; `None` for an empty series
pub fn summarize(series: &MetricSeries) -> Option<SeriesSummary> {
    let latest = series.latest()?.value;
    let values = series.points.iter().map(|p| p.value);
    let (min, max, sum) = values.fold(
        (f64::INFINITY, f64::NEG_INFINITY, 0.0),
        |(min, max, sum), v| (min.min(v), max.max(v), sum + v),
    );

    Some(SeriesSummary {
        mean: sum / series.len() as f64,
        min,
        max,
        latest,
    })
}

/// Add `health_score = oxygen*10 - ph*2 - temperature`.
/// Tables missing any input column are returned unchanged.
pub fn with_health_score(table: Table) -> Table {
    let (Some(oxygen), Some(ph), Some(temperature)) = (
        table.numbers("oxygen"),
        table.numbers("ph"),
        table.numbers("temperature"),
    ) else {
        return table;
    };

    let scores: Vec<Option<f64>> = oxygen
        .iter()
        .zip(ph)
        .zip(temperature)
        .map(|((o, p), t)| Some(o.as_ref()? * 10.0 - p.as_ref()? * 2.0 - t.as_ref()?))
        .collect();

    table.with_column(HEALTH_SCORE_COLUMN, Column::Number(scores))
}

/// Pairwise-complete Pearson correlation between numeric columns.
/// Unknown or non-numeric metrics are left out of the matrix.
pub fn correlation_matrix(table: &Table, metrics: &[&str]) -> CorrelationMatrix {
    let columns: Vec<(&str, &[Option<f64>])> = metrics
        .iter()
        .filter_map(|m| table.numbers(m).map(|values| (*m, values)))
        .collect();

    let values = columns
        .iter()
        .map(|(_, a)| columns.iter().map(|(_, b)| pearson(a, b)).collect())
        .collect();

    CorrelationMatrix {
        metrics: columns.iter().map(|(name, _)| name.to_string()).collect(),
        values,
    }
}

fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((*x, *y)),
            _ => None,
        })
        .collect();

    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

/// Labels and values of one categorical column pair, missing values dropped
pub fn category_series(
    table: &Table,
    category_column: &str,
    value_column: &str,
) -> Result<Vec<(String, f64)>> {
    let categories = table.texts(category_column).ok_or_else(|| {
        DashboardError::invalid_filter(format!("unknown category column '{}'", category_column))
    })?;
    let values = numeric_column(table, value_column)?;

    Ok(categories
        .iter()
        .zip(values)
        .filter_map(|(label, value)| Some((label.clone()?, (*value)?)))
        .collect())
}
