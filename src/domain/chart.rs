// Chart view-model handed to the rendering collaborator
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    #[default]
    Line,
    Bar,
    Scatter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisKind {
    Time,
    Category,
    Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum XValue {
    Time(DateTime<FixedOffset>),
    Category(String),
    Number(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: XValue,
    pub y: f64,
    /// Position on the chart's color scale, for scatters shaded by a third metric
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_value: Option<f64>,
}

/// Continuous color scale for `ChartPoint::color_value`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorScale {
    pub title: Option<String>,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub value: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisSpec {
    pub kind: AxisKind,
    pub title: Option<String>,
    pub color: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ticks: Vec<Tick>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
}

impl AxisSpec {
    pub fn new(kind: AxisKind, title: Option<String>) -> Self {
        Self {
            kind,
            title,
            color: None,
            min: None,
            max: None,
            ticks: Vec::new(),
            categories: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSpec {
    pub id: String,
    pub name: String,
    pub color: String,
    /// Index into `ChartSpec::y_axes`
    pub axis: usize,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "orientation", rename_all = "snake_case")]
pub enum Marker {
    Vertical {
        x: XValue,
        label: String,
        color: String,
        dashed: bool,
    },
    Horizontal {
        y: f64,
        label: String,
        color: String,
        dashed: bool,
    },
}

/// Declarative, renderer-agnostic description of one chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
    pub unit: Option<String>,
    pub fraction_digits: Option<i32>,
    pub x_axis: AxisSpec,
    pub y_axes: Vec<AxisSpec>,
    pub series: Vec<SeriesSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub markers: Vec<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_scale: Option<ColorScale>,
    /// Set when there is nothing to draw; the renderer shows this instead
    pub placeholder: Option<String>,
}

impl ChartSpec {
    /// Chart shell carrying only a message, used when its data failed to load
    pub fn placeholder(id: impl Into<String>, title: impl Into<String>, kind: ChartKind, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind,
            unit: None,
            fraction_digits: None,
            x_axis: AxisSpec::new(AxisKind::Time, None),
            y_axes: vec![AxisSpec::new(AxisKind::Value, None)],
            series: Vec::new(),
            markers: Vec::new(),
            color_scale: None,
            placeholder: Some(message.into()),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder.is_some()
    }
}
