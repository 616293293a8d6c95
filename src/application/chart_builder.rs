// Chart builder - Metric series plus display configuration into ChartSpec
use crate::domain::chart::{
    AxisKind, AxisSpec, ChartKind, ChartPoint, ChartSpec, ColorScale, Marker, SeriesSpec, Tick,
    XValue,
};
use crate::domain::metric::{MetricPair, MetricPoint, MetricSeries};

pub const NO_DATA: &str = "No data available";

/// Plotly/D3 category10
pub const DEFAULT_PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStyle {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub axis: usize,
}

impl SeriesStyle {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: None,
            axis: 0,
        }
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn axis(mut self, axis: usize) -> Self {
        self.axis = axis;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AxisStyle {
    pub title: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Threshold {
    pub value: f64,
    pub label: String,
    pub color: Option<String>,
}

/// Display configuration for one chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
    pub x_title: Option<String>,
    pub y_title: Option<String>,
    pub unit: Option<String>,
    pub normalize_y: bool,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    pub fraction_digits: Option<i32>,
    pub max_points: Option<usize>,
    pub axes: Vec<AxisStyle>,
    pub y_ticks: Vec<Tick>,
    pub thresholds: Vec<Threshold>,
    pub markers: Vec<Marker>,
    pub palette: Vec<String>,
    /// Title of the color scale on value-vs-value scatters
    pub color_title: Option<String>,
}

impl ChartOptions {
    pub fn new(id: impl Into<String>, title: impl Into<String>, kind: ChartKind) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind,
            x_title: None,
            y_title: None,
            unit: None,
            normalize_y: false,
            y_min: None,
            y_max: None,
            fraction_digits: None,
            max_points: None,
            axes: Vec::new(),
            y_ticks: Vec::new(),
            thresholds: Vec::new(),
            markers: Vec::new(),
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            color_title: None,
        }
    }

    pub fn titles(mut self, x_title: impl Into<String>, y_title: impl Into<String>) -> Self {
        self.x_title = Some(x_title.into());
        self.y_title = Some(y_title.into());
        self
    }

    pub fn normalized(mut self, normalize_y: bool) -> Self {
        self.normalize_y = normalize_y;
        self
    }

    fn palette_color(&self, index: usize) -> String {
        if self.palette.is_empty() {
            DEFAULT_PALETTE[index % DEFAULT_PALETTE.len()].to_string()
        } else {
            self.palette[index % self.palette.len()].clone()
        }
    }
}

/// Build a time-axis chart from metric series. Pure: equal input gives an
/// equal `ChartSpec`.
pub fn build_chart(series: Vec<(SeriesStyle, MetricSeries)>, options: &ChartOptions) -> ChartSpec {
    let specs = series
        .into_iter()
        .enumerate()
        .map(|(index, (style, metric))| {
            let mut points = metric.points;
            points.sort_by_key(|p| p.time);
            if let Some(max_points) = options.max_points {
                points = downsample_points(points, max_points);
            }

            let points = points
                .into_iter()
                .map(|p| ChartPoint {
                    x: XValue::Time(p.time),
                    y: p.value,
                    color_value: None,
                })
                .collect();
            series_spec(style, index, points, options)
        })
        .collect();

    finish_chart(specs, AxisSpec::new(AxisKind::Time, options.x_title.clone()), options)
}

/// Build a chart over a fixed category axis (months, species, ...).
/// Points follow the order of `categories`; unknown labels are ignored.
pub fn build_category_chart(
    categories: &[String],
    series: Vec<(SeriesStyle, Vec<(String, f64)>)>,
    options: &ChartOptions,
) -> ChartSpec {
    let specs = series
        .into_iter()
        .enumerate()
        .map(|(index, (style, values))| {
            let points = categories
                .iter()
                .filter_map(|category| {
                    values
                        .iter()
                        .find(|(label, _)| label == category)
                        .map(|(label, y)| ChartPoint {
                            x: XValue::Category(label.clone()),
                            y: *y,
                            color_value: None,
                        })
                })
                .collect();
            series_spec(style, index, points, options)
        })
        .collect();

    let mut x_axis = AxisSpec::new(AxisKind::Category, options.x_title.clone());
    x_axis.categories = categories.to_vec();
    finish_chart(specs, x_axis, options)
}

/// Build a value-vs-value scatter. Points keep their input order; when any
/// point carries a color value the chart gets a matching color scale.
pub fn build_xy_chart(series: Vec<(SeriesStyle, Vec<MetricPair>)>, options: &ChartOptions) -> ChartSpec {
    let specs = series
        .into_iter()
        .enumerate()
        .map(|(index, (style, pairs))| {
            let points = pairs
                .into_iter()
                .map(|p| ChartPoint {
                    x: XValue::Number(p.x),
                    y: p.y,
                    color_value: p.color,
                })
                .collect();
            series_spec(style, index, points, options)
        })
        .collect();

    let mut chart = finish_chart(specs, AxisSpec::new(AxisKind::Value, options.x_title.clone()), options);
    chart.color_scale = color_scale(&chart.series, options.color_title.clone());
    chart
}

fn color_scale(series: &[SeriesSpec], title: Option<String>) -> Option<ColorScale> {
    let (min, max) = series
        .iter()
        .flat_map(|s| s.points.iter().filter_map(|p| p.color_value))
        .fold(None, |range: Option<(f64, f64)>, v| match range {
            Some((min, max)) => Some((min.min(v), max.max(v))),
            None => Some((v, v)),
        })?;
    Some(ColorScale { title, min, max })
}

fn series_spec(style: SeriesStyle, index: usize, points: Vec<ChartPoint>, options: &ChartOptions) -> SeriesSpec {
    SeriesSpec {
        color: style.color.unwrap_or_else(|| options.palette_color(index)),
        id: style.id,
        name: style.name,
        axis: style.axis,
        points,
    }
}

fn finish_chart(mut series: Vec<SeriesSpec>, x_axis: AxisSpec, options: &ChartOptions) -> ChartSpec {
    if options.normalize_y {
        for s in &mut series {
            normalize_points(&mut s.points);
            s.axis = 0;
        }
    }

    let y_axes = build_y_axes(&series, options);

    let mut markers: Vec<Marker> = options
        .thresholds
        .iter()
        .map(|t| Marker::Horizontal {
            y: t.value,
            label: t.label.clone(),
            color: t.color.clone().unwrap_or_else(|| "gray".to_string()),
            dashed: true,
        })
        .collect();
    markers.extend(options.markers.iter().cloned());

    let placeholder = if series.iter().all(|s| s.points.is_empty()) {
        Some(NO_DATA.to_string())
    } else {
        None
    };

    ChartSpec {
        id: options.id.clone(),
        title: options.title.clone(),
        kind: options.kind,
        unit: options.unit.clone(),
        fraction_digits: options.fraction_digits,
        x_axis,
        y_axes,
        series,
        markers,
        color_scale: None,
        placeholder,
    }
}

fn build_y_axes(series: &[SeriesSpec], options: &ChartOptions) -> Vec<AxisSpec> {
    if options.normalize_y {
        let mut axis = AxisSpec::new(
            AxisKind::Value,
            options
                .y_title
                .clone()
                .or_else(|| Some("Normalized value".to_string())),
        );
        axis.min = Some(0.0);
        axis.max = Some(1.0);
        return vec![axis];
    }

    let highest_axis = series.iter().map(|s| s.axis).max().unwrap_or(0);
    let count = options.axes.len().max(highest_axis + 1);

    (0..count)
        .map(|index| {
            let style = options.axes.get(index).cloned().unwrap_or_default();
            let first_series = series.iter().find(|s| s.axis == index);

            let title = if index == 0 {
                style.title.or_else(|| options.y_title.clone())
            } else {
                style.title.or_else(|| first_series.map(|s| s.name.clone()))
            };
            let color = if index == 0 {
                style.color
            } else {
                style.color.or_else(|| first_series.map(|s| s.color.clone()))
            };

            let mut axis = AxisSpec::new(AxisKind::Value, title);
            axis.color = color;
            if index == 0 {
                axis.min = options.y_min;
                axis.max = options.y_max;
                axis.ticks = options.y_ticks.clone();
            }
            axis
        })
        .collect()
}

/// Min-max scale into [0, 1]; a constant series maps to 0.0
fn normalize_points(points: &mut [ChartPoint]) {
    let (min, max) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), p| {
        (min.min(p.y), max.max(p.y))
    });
    let span = max - min;

    for point in points.iter_mut() {
        point.y = if span > 0.0 { (point.y - min) / span } else { 0.0 };
    }
}

/// Downsample time series points using bucket averaging
fn downsample_points(points: Vec<MetricPoint>, max_points: usize) -> Vec<MetricPoint> {
    if max_points == 0 || points.len() <= max_points {
        return points;
    }

    let bucket_size = points.len().div_ceil(max_points);
    let mut downsampled = Vec::with_capacity(max_points);

    for chunk in points.chunks(bucket_size) {
        // Use middle point's timestamp and average value
        let mid_idx = chunk.len() / 2;
        let avg_value = chunk.iter().map(|p| p.value).sum::<f64>() / chunk.len() as f64;

        downsampled.push(MetricPoint::new(chunk[mid_idx].time, avg_value));
    }

    downsampled
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset};

    fn at(secs: i64) -> DateTime<FixedOffset> {
        DateTime::from_timestamp(secs, 0).unwrap().fixed_offset()
    }

    fn ph_series() -> MetricSeries {
        MetricSeries::new(
            "pH",
            vec![MetricPoint::new(at(1), 7.2), MetricPoint::new(at(2), 7.5)],
        )
    }

    #[test]
    fn test_line_chart_from_one_series() {
        let options = ChartOptions::new("ph", "pH Level Over Time", ChartKind::Line).titles("Time", "pH");
        let chart = build_chart(vec![(SeriesStyle::new("ph", "pH"), ph_series())], &options);

        assert_eq!(chart.kind, ChartKind::Line);
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series[0].points.len(), 2);
        assert_eq!(chart.series[0].points[1].y, 7.5);
        assert_eq!(chart.series[0].color, DEFAULT_PALETTE[0]);
        assert_eq!(chart.y_axes.len(), 1);
        assert_eq!(chart.y_axes[0].title.as_deref(), Some("pH"));
        assert!(chart.placeholder.is_none());
    }

    #[test]
    fn test_build_is_byte_identical() {
        let options = ChartOptions::new("ph", "pH", ChartKind::Bar);
        let first = build_chart(vec![(SeriesStyle::new("ph", "pH"), ph_series())], &options);
        let second = build_chart(vec![(SeriesStyle::new("ph", "pH"), ph_series())], &options);

        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn test_empty_series_gets_placeholder() {
        let options = ChartOptions::new("ph", "pH", ChartKind::Line);
        let chart = build_chart(vec![(SeriesStyle::new("ph", "pH"), MetricSeries::empty("pH"))], &options);
        assert_eq!(chart.placeholder.as_deref(), Some(NO_DATA));
        assert_eq!(chart.series.len(), 1);

        let chart = build_chart(Vec::new(), &options);
        assert!(chart.is_placeholder());
    }

    #[test]
    fn test_points_are_time_ordered() {
        let series = MetricSeries::new(
            "t",
            vec![MetricPoint::new(at(5), 1.0), MetricPoint::new(at(2), 2.0)],
        );
        let chart = build_chart(
            vec![(SeriesStyle::new("t", "T"), series)],
            &ChartOptions::new("t", "T", ChartKind::Scatter),
        );
        assert_eq!(chart.series[0].points[0].x, XValue::Time(at(2)));
    }

    #[test]
    fn test_normalize_y() {
        let series = MetricSeries::new(
            "temperature",
            vec![
                MetricPoint::new(at(1), 4.0),
                MetricPoint::new(at(2), 8.0),
                MetricPoint::new(at(3), 6.0),
            ],
        );
        let flat = MetricSeries::new(
            "ph",
            vec![MetricPoint::new(at(1), 8.0), MetricPoint::new(at(2), 8.0)],
        );
        let options = ChartOptions::new("mix", "Mix", ChartKind::Line).normalized(true);
        let chart = build_chart(
            vec![
                (SeriesStyle::new("temperature", "Temperature"), series),
                (SeriesStyle::new("ph", "pH").axis(1), flat),
            ],
            &options,
        );

        let ys: Vec<f64> = chart.series[0].points.iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![0.0, 1.0, 0.5]);
        assert!(chart.series[1].points.iter().all(|p| p.y == 0.0));
        assert_eq!(chart.series[1].axis, 0);
        assert_eq!(chart.y_axes.len(), 1);
        assert_eq!(chart.y_axes[0].max, Some(1.0));
    }

    #[test]
    fn test_secondary_axis_defaults_to_series() {
        let options = ChartOptions::new("env", "Env", ChartKind::Line);
        let chart = build_chart(
            vec![
                (SeriesStyle::new("temperature", "Temperature (°C)").color("#82ca9d"), ph_series()),
                (SeriesStyle::new("ph", "pH").color("#8884d8").axis(1), ph_series()),
            ],
            &options,
        );

        assert_eq!(chart.y_axes.len(), 2);
        assert_eq!(chart.y_axes[1].title.as_deref(), Some("pH"));
        assert_eq!(chart.y_axes[1].color.as_deref(), Some("#8884d8"));
    }

    #[test]
    fn test_downsampling_averages_buckets() {
        let points: Vec<MetricPoint> = (0..10).map(|i| MetricPoint::new(at(i), i as f64)).collect();
        let mut options = ChartOptions::new("d", "D", ChartKind::Line);
        options.max_points = Some(5);
        let chart = build_chart(vec![(SeriesStyle::new("d", "D"), MetricSeries::new("d", points))], &options);

        let ys: Vec<f64> = chart.series[0].points.iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![0.5, 2.5, 4.5, 6.5, 8.5]);
        assert_eq!(chart.series[0].points[0].x, XValue::Time(at(1)));
    }

    #[test]
    fn test_category_chart_and_markers() {
        let months: Vec<String> = ["Jan", "Feb", "Mar"].iter().map(|m| m.to_string()).collect();
        let mut options = ChartOptions::new("presence", "Presence", ChartKind::Bar);
        options.markers.push(Marker::Vertical {
            x: XValue::Category("Feb".to_string()),
            label: "Current Month".to_string(),
            color: "red".to_string(),
            dashed: true,
        });
        options.thresholds.push(Threshold {
            value: 2.0,
            label: "High".to_string(),
            color: None,
        });

        let chart = build_category_chart(
            &months,
            vec![(
                SeriesStyle::new("krill", "Krill"),
                vec![("Mar".to_string(), 1.0), ("Jan".to_string(), 3.0)],
            )],
            &options,
        );

        let xs: Vec<XValue> = chart.series[0].points.iter().map(|p| p.x.clone()).collect();
        assert_eq!(
            xs,
            vec![XValue::Category("Jan".to_string()), XValue::Category("Mar".to_string())]
        );
        assert_eq!(chart.x_axis.categories, months);
        assert_eq!(chart.markers.len(), 2);
        assert!(matches!(chart.markers[0], Marker::Horizontal { .. }));
    }

    #[test]
    fn test_xy_chart_with_color_scale() {
        let mut options = ChartOptions::new("salinity-temperature", "Salinity vs. Temperature", ChartKind::Scatter)
            .titles("Practical Salinity", "Temperature (°C)");
        options.color_title = Some("Density".to_string());

        let pairs = vec![
            MetricPair { x: 31.5, y: 9.0, color: Some(1024.3) },
            MetricPair { x: 31.2, y: 8.0, color: None },
            MetricPair { x: 31.9, y: 7.5, color: Some(1023.8) },
        ];
        let chart = build_xy_chart(vec![(SeriesStyle::new("temperature", "Temperature"), pairs)], &options);

        assert_eq!(chart.x_axis.kind, AxisKind::Value);
        assert_eq!(chart.series[0].points.len(), 3);
        assert_eq!(chart.series[0].points[0].x, XValue::Number(31.5));
        assert_eq!(
            chart.color_scale,
            Some(ColorScale {
                title: Some("Density".to_string()),
                min: 1023.8,
                max: 1024.3,
            })
        );
        assert!(chart.placeholder.is_none());

        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["series"][0]["points"][0]["x"], 31.5);
        assert_eq!(json["series"][0]["points"][0]["color_value"], 1024.3);
        assert!(json["series"][0]["points"][1].get("color_value").is_none());
    }

    #[test]
    fn test_xy_chart_without_colors() {
        let options = ChartOptions::new("xy", "XY", ChartKind::Scatter);
        let chart = build_xy_chart(
            vec![(SeriesStyle::new("y", "Y"), vec![MetricPair { x: 1.0, y: 2.0, color: None }])],
            &options,
        );
        assert!(chart.color_scale.is_none());

        let empty = build_xy_chart(vec![(SeriesStyle::new("y", "Y"), Vec::new())], &options);
        assert_eq!(empty.placeholder.as_deref(), Some(NO_DATA));
    }
}
