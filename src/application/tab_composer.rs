// Tab composer - Narrative, charts and condition blocks for each tab
use crate::application::chart_builder::{
    AxisStyle, ChartOptions, SeriesStyle, Threshold, build_category_chart, build_chart,
    build_xy_chart,
};
use crate::application::dataset_repository::DatasetId;
use crate::application::metric_transformer::{
    MetricQuery, category_series, correlation_matrix, extract_pairs, extract_series, slice_range,
    summarize,
};
use crate::domain::chart::{ChartKind, ChartSpec, Marker, Tick, XValue};
use crate::domain::dashboard::{Alert, AlertLevel, MetricTile, SectionBlock, TabId, TabSection};
use crate::domain::error::{DashboardError, Result};
use crate::domain::metric::{DateRange, MetricSeries};
use crate::domain::species::{
    ChlorophyllImpact, PRESENCE_LEVELS, PREY_SPECIES, condition_alerts,
};
use crate::domain::table::Table;
use crate::infrastructure::config::{ChartConfig, WidgetsConfig};
use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Presence calendar column, legend name, color
const PRESENCE_SERIES: [(&str, &str, &str); 5] = [
    ("humpback", "Humpback Whales", "#1f77b4"),
    ("capelin", "Capelin", "#2ca02c"),
    ("krill", "Krill", "#ff7f0e"),
    ("herring", "Herring", "#9467bd"),
    ("chlorophyll", "Chlorophyll Levels", "#2ecc71"),
];

/// Sensor column, label, unit
const METRIC_TILES: [(&str, &str, &str); 4] = [
    ("ph", "pH Levels", ""),
    ("temperature", "Temperature", "°C"),
    ("oxygen", "Oxygen", "ml/l"),
    ("chlorophyll", "Chlorophyll", "mg/m³"),
];

const CORRELATION_METRICS: [&str; 4] = ["temperature", "ph", "oxygen", "chlorophyll"];

const ABOUT_INTRO: &str = "\
This dashboard provides insights into humpback whale migration patterns and environmental \
conditions in Holyrood waters. It combines ocean sensor measurements with historical migration \
and species presence patterns, including chlorophyll analysis based on published research.";

const PRESENCE_GUIDE: &str = "\
### Presence Level Guide
- **0**: Absent
- **1**: Low Presence
- **2**: Medium Presence
- **3**: High Presence";

const PEAK_PERIODS: &str = "\
### Peak Activity Periods
- **Whales**: June - August
- **Capelin**: June - July
- **Krill**: April - September
- **Herring**: May & August - September
- **Chlorophyll Peaks**: April - June
- **Prey Abundance**: Follows chlorophyll by 2-3 weeks";

const MIGRATION_INFLUENCES: &str = "\
### Environmental Influences on Migration
- Water temperature triggers movement patterns
- Prey availability affects whale presence
- Seasonal changes impact all species";

const CHLOROPHYLL_FINDINGS: &str = "\
### Research Findings
- High chlorophyll areas strongly correlate with increased whale presence
- 2-3 week lag observed between chlorophyll peaks and whale arrival
- Chlorophyll concentration above 2.0 mg/m³ indicates potential feeding grounds
- Temporal and spatial variations affect whale distribution patterns";

const PREY_HEADER: &str = "### Key Prey Species in Holyrood Waters";

const PREY_FACTORS: &str = "\
### Environmental Factors Affecting Prey
- Water temperature influences capelin spawning timing
- Krill distribution varies with water column stratification
- Humpback arrival typically correlates with capelin presence";

const MIGRATION_INDICATORS: &str = "\
### Key Migration Indicators
- **Chlorophyll Levels**: Primary indicator of potential feeding grounds
- **Temperature**: Influences prey distribution and whale comfort
- **Ocean Chemistry**: pH and oxygen affect prey availability";

const MIGRATION_INSIGHTS: &str = "\
### Research-Based Insights
1. **Feeding Areas**
   - Strong preference for upwelling regions
   - High chlorophyll-a concentration correlates with prey abundance
   - Optimal feeding conditions in areas with chlorophyll > 2.0 mg/m³
2. **Migration Timing**
   - Temporal lag between chlorophyll peaks and whale arrival
   - Seasonal patterns influenced by primary productivity
   - Regional variations in feeding ground selection
3. **Environmental Factors**
   - Combined effect of temperature and chlorophyll
   - Influence of ocean currents on productivity zones
   - Impact of seasonal environmental changes";

const BREEDING_GROUNDS: &str = "\
### Breeding Grounds
North Atlantic humpbacks leave the Newfoundland feeding grounds in autumn and winter in the warm, \
shallow waters of the West Indies, where mating and calving take place between January and March. \
Calves are born after an eleven to twelve month gestation and follow their mothers north in spring.";

const BREEDING_CONDITIONS: &str = "\
### Conditions Monitored Here
- Falling pH (ocean acidification) affects the shell-forming prey mothers rely on after the return migration
- Low oxygen (hypoxia) reduces prey density in coastal feeding areas
- The normalized chart shows how temperature, pH and oxygen move together over the selected period";

const SOURCES: &str = "\
### Data Sources
- Real-time sensor data from Ocean Networks Canada
- Migration patterns from DFO Canada
- Species data from Memorial University Research
- Chlorophyll analysis based on peer-reviewed research

*Note: Migration patterns are general guidelines and may vary based on local conditions.*";

/// Everything one render pass needs; datasets that failed to load keep their error
#[derive(Debug, Clone)]
pub struct RenderInputs {
    pub title: String,
    pub tz: Tz,
    pub now: DateTime<Utc>,
    pub range: Result<Option<DateRange>>,
    pub sensors: Result<Table>,
    pub sightings: Result<Table>,
    pub presence: Result<Table>,
}

impl RenderInputs {
    pub fn dataset(&self, dataset: DatasetId) -> Result<&Table> {
        let table = match dataset {
            DatasetId::Sensors => &self.sensors,
            DatasetId::Sightings => &self.sightings,
            DatasetId::Presence => &self.presence,
        };
        table.as_ref().map_err(Clone::clone)
    }

    fn range(&self) -> Result<Option<DateRange>> {
        self.range.clone()
    }

    fn current_month(&self) -> u32 {
        self.now.with_timezone(&self.tz).month()
    }

    fn sensor_series(&self, metric: &str) -> Result<MetricSeries> {
        let table = self.dataset(DatasetId::Sensors)?;
        let query = MetricQuery::new(metric).in_range(self.range()?);
        extract_series(table, &query, self.tz)
    }
}

/// Build one tab: its configured charts plus the tab's fixed content
pub fn compose_tab(tab: TabId, inputs: &RenderInputs, widgets: &WidgetsConfig) -> TabSection {
    let charts: Vec<ChartSpec> = widgets
        .charts_for(tab)
        .map(|config| build_configured_chart(config, inputs))
        .collect();

    match tab {
        TabId::About => compose_about(inputs, charts),
        TabId::Lifecycle => compose_lifecycle(inputs, charts),
        TabId::Feeding => compose_feeding(inputs, charts),
        TabId::Migration => compose_migration(inputs, charts),
        TabId::Breeding => compose_breeding(charts),
        TabId::Sources => compose_sources(charts),
    }
}

fn with_charts(mut section: TabSection, charts: Vec<ChartSpec>) -> TabSection {
    for chart in charts {
        section = section.chart(chart);
    }
    section
}

pub fn compose_about(inputs: &RenderInputs, charts: Vec<ChartSpec>) -> TabSection {
    let mut section = TabSection::new(TabId::About).markdown(ABOUT_INTRO);

    match inputs.dataset(DatasetId::Sensors) {
        Err(_) => section.push(SectionBlock::Alert {
            alert: Alert::new(
                AlertLevel::Warning,
                "No data available. Sensor readings could not be loaded.",
            ),
        }),
        Ok(_) => {
            let tiles = metric_tiles(inputs);
            if tiles.is_empty() {
                section.push(SectionBlock::Alert {
                    alert: Alert::new(AlertLevel::Info, "No sensor readings in the selected time range."),
                });
            } else {
                section.push(SectionBlock::Tiles { tiles });
            }
        }
    }

    with_charts(section, charts)
}

pub fn compose_lifecycle(inputs: &RenderInputs, charts: Vec<ChartSpec>) -> TabSection {
    let section = TabSection::new(TabId::Lifecycle)
        .chart(presence_chart(inputs))
        .markdown(PRESENCE_GUIDE)
        .markdown(PEAK_PERIODS)
        .markdown(MIGRATION_INFLUENCES);
    with_charts(section, charts)
}

pub fn compose_feeding(inputs: &RenderInputs, charts: Vec<ChartSpec>) -> TabSection {
    let mut section = with_charts(TabSection::new(TabId::Feeding), charts);

    section.push(SectionBlock::Alert {
        alert: chlorophyll_alert(inputs),
    });
    section = section.markdown(CHLOROPHYLL_FINDINGS).markdown(PREY_HEADER);
    section.push(SectionBlock::Cards {
        cards: PREY_SPECIES.iter().map(|prey| prey.info_card()).collect(),
    });
    section = section.markdown(PREY_FACTORS);

    let latest_temperature = inputs
        .sensor_series("temperature")
        .ok()
        .and_then(|series| series.latest().map(|p| p.value));
    for alert in condition_alerts(latest_temperature, inputs.current_month()) {
        section.push(SectionBlock::Alert { alert });
    }

    section
}

pub fn compose_migration(inputs: &RenderInputs, charts: Vec<ChartSpec>) -> TabSection {
    let mut section = with_charts(TabSection::new(TabId::Migration), charts);
    section.push(correlation_block(inputs));
    section.markdown(MIGRATION_INDICATORS).markdown(MIGRATION_INSIGHTS)
}

pub fn compose_breeding(charts: Vec<ChartSpec>) -> TabSection {
    let section = TabSection::new(TabId::Breeding).markdown(BREEDING_GROUNDS);
    with_charts(section, charts).markdown(BREEDING_CONDITIONS)
}

pub fn compose_sources(charts: Vec<ChartSpec>) -> TabSection {
    with_charts(TabSection::new(TabId::Sources).markdown(SOURCES), charts)
}

/// Chart from a widget definition. Series whose metric cannot be selected are
/// left out; if none remain the chart becomes a placeholder with the reason.
pub fn build_configured_chart(config: &ChartConfig, inputs: &RenderInputs) -> ChartSpec {
    let placeholder = |err: &DashboardError| {
        ChartSpec::placeholder(&config.id, &config.title, config.kind, err.placeholder_message())
    };

    let table = match inputs.dataset(config.dataset) {
        Ok(table) => table,
        Err(err) => return placeholder(&err),
    };
    let range = match inputs.range() {
        Ok(range) => range,
        Err(err) => return placeholder(&err),
    };

    if let Some(x_metric) = &config.x_metric {
        return build_configured_xy_chart(config, x_metric, table, range);
    }

    let mut series = Vec::new();
    let mut first_error = None;
    for series_config in &config.series {
        let query = MetricQuery::new(&series_config.metric)
            .in_range(range)
            .for_species(series_config.species.clone())
            .aggregated(series_config.aggregate);

        match extract_series(table, &query, inputs.tz) {
            Ok(metric) => {
                let mut style = SeriesStyle::new(&series_config.id, &series_config.name)
                    .axis(series_config.axis);
                style.color = series_config.color.clone();
                series.push((style, metric));
            }
            Err(err) => {
                tracing::debug!("Skipping series {} for chart {}: {}", series_config.id, config.id, err);
                first_error.get_or_insert(err);
            }
        }
    }

    if series.is_empty() {
        if let Some(err) = first_error {
            return placeholder(&err);
        }
    }

    build_chart(series, &chart_options(config))
}

fn build_configured_xy_chart(
    config: &ChartConfig,
    x_metric: &str,
    table: &Table,
    range: Option<DateRange>,
) -> ChartSpec {
    let mut series = Vec::new();
    let mut first_error = None;
    for series_config in &config.series {
        let pairs = extract_pairs(
            table,
            x_metric,
            &series_config.metric,
            config.color_metric.as_deref(),
            range.as_ref(),
        );
        match pairs {
            Ok(pairs) => {
                let mut style = SeriesStyle::new(&series_config.id, &series_config.name);
                style.color = series_config.color.clone();
                series.push((style, pairs));
            }
            Err(err) => {
                tracing::debug!("Skipping series {} for chart {}: {}", series_config.id, config.id, err);
                first_error.get_or_insert(err);
            }
        }
    }

    if series.is_empty() {
        if let Some(err) = first_error {
            return ChartSpec::placeholder(&config.id, &config.title, config.kind, err.placeholder_message());
        }
    }

    build_xy_chart(series, &chart_options(config))
}

fn chart_options(config: &ChartConfig) -> ChartOptions {
    let mut options =
        ChartOptions::new(&config.id, &config.title, config.kind).normalized(config.normalize_y);
    options.x_title = config.x_title.clone();
    options.y_title = config.y_title.clone();
    options.unit = config.unit.clone();
    options.y_min = config.y_min;
    options.y_max = config.y_max;
    options.fraction_digits = config.fraction_digits;
    options.max_points = config.max_points;
    options.color_title = config
        .color_title
        .clone()
        .or_else(|| config.color_metric.clone());
    options.axes = config
        .axes
        .iter()
        .map(|axis| AxisStyle {
            title: axis.title.clone(),
            color: axis.color.clone(),
        })
        .collect();
    options.thresholds = config
        .thresholds
        .iter()
        .map(|t| Threshold {
            value: t.value,
            label: t.label.clone(),
            color: t.color.clone(),
        })
        .collect();
    options
}

fn presence_chart(inputs: &RenderInputs) -> ChartSpec {
    let mut options = ChartOptions::new(
        "species-presence",
        "Species Presence and Chlorophyll Levels Throughout the Year",
        ChartKind::Bar,
    )
    .titles("Month", "Presence Level");
    options.y_min = Some(0.0);
    options.y_max = Some(3.0);
    options.y_ticks = PRESENCE_LEVELS
        .iter()
        .enumerate()
        .map(|(level, label)| Tick {
            value: level as f64,
            label: label.to_string(),
        })
        .collect();
    options.markers.push(Marker::Vertical {
        x: XValue::Category(MONTHS[inputs.current_month() as usize - 1].to_string()),
        label: "Current Month".to_string(),
        color: "red".to_string(),
        dashed: true,
    });

    let table = match inputs.dataset(DatasetId::Presence) {
        Ok(table) => table,
        Err(err) => {
            return ChartSpec::placeholder(&options.id, &options.title, options.kind, err.placeholder_message());
        }
    };

    let months: Vec<String> = MONTHS.iter().map(|m| m.to_string()).collect();
    let series = PRESENCE_SERIES
        .iter()
        .filter_map(|(column, name, color)| {
            category_series(table, "month", column)
                .ok()
                .map(|values| (SeriesStyle::new(*column, *name).color(*color), values))
        })
        .collect();

    build_category_chart(&months, series, &options)
}

fn metric_tiles(inputs: &RenderInputs) -> Vec<MetricTile> {
    METRIC_TILES
        .iter()
        .filter_map(|(metric, label, unit)| {
            let series = inputs.sensor_series(metric).ok()?;
            let summary = summarize(&series)?;
            Some(MetricTile {
                id: metric.to_string(),
                label: label.to_string(),
                unit: unit.to_string(),
                value: summary.mean,
                min: summary.min,
                max: summary.max,
                precision: 2,
            })
        })
        .collect()
}

fn chlorophyll_alert(inputs: &RenderInputs) -> Alert {
    let column_missing = inputs
        .dataset(DatasetId::Sensors)
        .is_ok_and(|table| !table.has_column("chlorophyll"));
    if column_missing {
        return Alert::new(
            AlertLevel::Warning,
            "Chlorophyll data is not available in the current dataset.",
        );
    }

    match inputs.sensor_series("chlorophyll") {
        Ok(series) => match series.latest() {
            Some(point) => {
                let impact = ChlorophyllImpact::classify(point.value);
                Alert::new(
                    impact.alert_level(),
                    format!(
                        "Current chlorophyll level: {:.2} mg/m³. Impact status: {}. {}",
                        point.value,
                        impact.status(),
                        impact.description()
                    ),
                )
            }
            None => Alert::new(AlertLevel::Warning, "Current chlorophyll data is not available."),
        },
        Err(err @ DashboardError::InvalidFilter(_)) => Alert::new(
            AlertLevel::Warning,
            format!("Unable to perform chlorophyll analysis: {}", err),
        ),
        Err(DashboardError::DataUnavailable { .. }) => {
            Alert::new(AlertLevel::Warning, "Current chlorophyll data is not available.")
        }
    }
}

fn correlation_block(inputs: &RenderInputs) -> SectionBlock {
    let table = inputs
        .dataset(DatasetId::Sensors)
        .and_then(|table| slice_range(table, inputs.range()?.as_ref()));

    if let Ok(table) = table {
        let matrix = correlation_matrix(&table, &CORRELATION_METRICS);
        let defined = matrix
            .values
            .iter()
            .enumerate()
            .any(|(i, row)| row.iter().enumerate().any(|(j, v)| i != j && v.is_some()));
        if defined {
            return SectionBlock::Correlation {
                title: "Environmental Parameter Correlations".to_string(),
                matrix,
            };
        }
    }

    SectionBlock::Alert {
        alert: Alert::new(
            AlertLevel::Warning,
            "Unable to perform correlation analysis due to insufficient data.",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart::AxisKind;
    use crate::domain::table::Column;
    use crate::infrastructure::config::parse_widgets;
    use chrono::TimeZone;

    fn sensors() -> Table {
        let times = (0..4)
            .map(|h| Some(Utc.with_ymd_and_hms(2024, 7, 15, h, 0, 0).unwrap()))
            .collect();
        Table::new()
            .with_column("timestamp", Column::Time(times))
            .with_column("temperature", Column::Number(vec![Some(8.0), Some(8.4), Some(8.9), Some(9.2)]))
            .with_column("ph", Column::Number(vec![Some(8.02), Some(8.0), Some(7.99), Some(7.97)]))
            .with_column("oxygen", Column::Number(vec![Some(7.1), Some(7.0), None, Some(6.8)]))
            .with_column("chlorophyll", Column::Number(vec![Some(1.2), Some(1.8), Some(2.2), Some(2.6)]))
    }

    fn presence() -> Table {
        crate::infrastructure::dataset_loader::load_csv_str(
            "presence",
            crate::infrastructure::file_repository::SPECIES_PRESENCE_CSV,
        )
        .unwrap()
    }

    fn inputs() -> RenderInputs {
        RenderInputs {
            title: "Test".to_string(),
            tz: Tz::UTC,
            now: Utc.with_ymd_and_hms(2024, 7, 16, 12, 0, 0).unwrap(),
            range: Ok(None),
            sensors: Ok(sensors()),
            sightings: Err(DashboardError::unavailable("sightings", "not loaded")),
            presence: Ok(presence()),
        }
    }

    fn widgets() -> WidgetsConfig {
        parse_widgets(
            "[[charts]]\nid = \"ph\"\ntab = \"breeding\"\ntitle = \"pH\"\ndataset = \"sensors\"\n\n\
             [[charts.series]]\nid = \"ph\"\nname = \"pH\"\nmetric = \"ph\"\n\n\
             [[charts]]\nid = \"sightings\"\ntab = \"migration\"\ntitle = \"Sightings\"\nkind = \"bar\"\n\
             dataset = \"sightings\"\n\n\
             [[charts.series]]\nid = \"humpback\"\nname = \"Humpback\"\nmetric = \"count\"\nspecies = \"Humpback\"\n",
        )
        .unwrap()
    }

    #[test]
    fn test_about_has_metric_tiles() {
        let section = compose_tab(TabId::About, &inputs(), &widgets());
        let tiles = section
            .blocks
            .iter()
            .find_map(|b| match b {
                SectionBlock::Tiles { tiles } => Some(tiles),
                _ => None,
            })
            .unwrap();

        assert_eq!(tiles.len(), 4);
        let temperature = tiles.iter().find(|t| t.id == "temperature").unwrap();
        assert_eq!(temperature.min, 8.0);
        assert_eq!(temperature.max, 9.2);
    }

    #[test]
    fn test_unavailable_sensors_still_render_placeholders() {
        let mut inputs = inputs();
        inputs.sensors = Err(DashboardError::unavailable("data/missing.csv", "No such file"));

        let section = compose_tab(TabId::Breeding, &inputs, &widgets());
        let charts: Vec<&ChartSpec> = section.charts().collect();
        assert_eq!(charts.len(), 1);
        assert_eq!(charts[0].placeholder.as_deref(), Some("No data available"));
        assert!(charts[0].series.is_empty());

        let about = compose_tab(TabId::About, &inputs, &widgets());
        assert!(about.alerts().any(|a| a.level == AlertLevel::Warning));

        let feeding = compose_tab(TabId::Feeding, &inputs, &widgets());
        assert!(
            feeding
                .alerts()
                .any(|a| a.message == "No current temperature data available")
        );
    }

    #[test]
    fn test_lifecycle_presence_chart() {
        let section = compose_tab(TabId::Lifecycle, &inputs(), &widgets());
        let chart = section.charts().next().unwrap();

        assert_eq!(chart.kind, ChartKind::Bar);
        assert_eq!(chart.series.len(), 5);
        assert_eq!(chart.series[0].points.len(), 12);
        assert_eq!(chart.y_axes[0].ticks.len(), 4);
        assert_eq!(
            chart.markers,
            vec![Marker::Vertical {
                x: XValue::Category("Jul".to_string()),
                label: "Current Month".to_string(),
                color: "red".to_string(),
                dashed: true,
            }]
        );
    }

    #[test]
    fn test_feeding_alerts() {
        let section = compose_tab(TabId::Feeding, &inputs(), &widgets());
        let alerts: Vec<&Alert> = section.alerts().collect();

        // Latest chlorophyll 2.6 is prime feeding; 9.2°C in July suits every prey
        assert_eq!(alerts[0].level, AlertLevel::Success);
        assert!(alerts[0].message.contains("Impact status: High"));
        assert_eq!(alerts.iter().filter(|a| a.level == AlertLevel::Success).count(), 4);
    }

    #[test]
    fn test_migration_correlation_and_sightings_placeholder() {
        let section = compose_tab(TabId::Migration, &inputs(), &widgets());

        let chart = section.charts().next().unwrap();
        assert_eq!(chart.id, "sightings");
        assert!(chart.is_placeholder());

        let matrix = section
            .blocks
            .iter()
            .find_map(|b| match b {
                SectionBlock::Correlation { matrix, .. } => Some(matrix),
                _ => None,
            })
            .unwrap();
        assert_eq!(matrix.metrics, vec!["temperature", "ph", "oxygen", "chlorophyll"]);
        assert!(matrix.get("temperature", "chlorophyll").unwrap() > 0.9);
    }

    #[test]
    fn test_invalid_range_reaches_placeholder() {
        let mut inputs = inputs();
        inputs.range = Err(DashboardError::invalid_filter("unparseable 'from' value 'soon'"));

        let section = compose_tab(TabId::Breeding, &inputs, &widgets());
        let chart = section.charts().next().unwrap();
        assert_eq!(
            chart.placeholder.as_deref(),
            Some("No data: unparseable 'from' value 'soon'")
        );
    }

    #[test]
    fn test_range_outside_data_gives_empty_chart() {
        let mut inputs = inputs();
        let start = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        inputs.range = Ok(Some(DateRange::new(start, start + chrono::Duration::days(1))));

        let section = compose_tab(TabId::Breeding, &inputs, &widgets());
        let chart = section.charts().next().unwrap();
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.placeholder.as_deref(), Some("No data available"));
    }

    #[test]
    fn test_unknown_metric_series_is_skipped() {
        let widgets = parse_widgets(
            "[[charts]]\nid = \"env\"\ntab = \"migration\"\ntitle = \"Env\"\ndataset = \"sensors\"\n\n\
             [[charts.series]]\nid = \"t\"\nname = \"T\"\nmetric = \"temperature\"\n\n\
             [[charts.series]]\nid = \"s\"\nname = \"S\"\nmetric = \"turbidity\"\n",
        )
        .unwrap();
        let chart = build_configured_chart(&widgets.charts[0], &inputs());
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series[0].id, "t");
        assert!(!chart.is_placeholder());
    }

    fn salinity_chart() -> WidgetsConfig {
        parse_widgets(
            "[[charts]]\nid = \"ts\"\ntab = \"migration\"\ntitle = \"Salinity vs. Temperature\"\n\
             kind = \"scatter\"\ndataset = \"sensors\"\nx_title = \"Practical Salinity\"\n\
             x_metric = \"salinity\"\ncolor_metric = \"density\"\ncolor_title = \"Density\"\n\n\
             [[charts.series]]\nid = \"samples\"\nname = \"Samples\"\nmetric = \"temperature\"\n",
        )
        .unwrap()
    }

    #[test]
    fn test_salinity_temperature_scatter() {
        let mut inputs = inputs();
        inputs.sensors = Ok(sensors()
            .with_column("salinity", Column::Number(vec![Some(31.4), Some(31.5), None, Some(31.7)]))
            .with_column("density", Column::Number(vec![Some(1024.6), None, Some(1024.5), Some(1024.4)])));

        let widgets = salinity_chart();
        let chart = build_configured_chart(&widgets.charts[0], &inputs);
        assert_eq!(chart.kind, ChartKind::Scatter);
        assert_eq!(chart.x_axis.kind, AxisKind::Value);
        assert_eq!(chart.x_axis.title.as_deref(), Some("Practical Salinity"));

        let points = &chart.series[0].points;
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].x, XValue::Number(31.4));
        assert_eq!(points[0].y, 8.0);
        assert_eq!(points[1].color_value, None);
        assert_eq!(points[2].color_value, Some(1024.4));

        let scale = chart.color_scale.unwrap();
        assert_eq!(scale.title.as_deref(), Some("Density"));
        assert_eq!((scale.min, scale.max), (1024.4, 1024.6));
    }

    #[test]
    fn test_scatter_without_x_metric_column_is_placeholder() {
        let widgets = salinity_chart();
        let chart = build_configured_chart(&widgets.charts[0], &inputs());
        assert!(chart.series.is_empty());
        assert_eq!(
            chart.placeholder.as_deref(),
            Some("No data: unknown metric 'salinity'")
        );
    }

    #[test]
    fn test_chlorophyll_column_missing() {
        let mut inputs = inputs();
        let times = (0..2)
            .map(|h| Some(Utc.with_ymd_and_hms(2024, 7, 15, h, 0, 0).unwrap()))
            .collect();
        inputs.sensors = Ok(Table::new()
            .with_column("timestamp", Column::Time(times))
            .with_column("temperature", Column::Number(vec![Some(8.0), Some(8.4)])));

        let section = compose_tab(TabId::Feeding, &inputs, &widgets());
        let first = section.alerts().next().unwrap();
        assert_eq!(first.level, AlertLevel::Warning);
        assert_eq!(first.message, "Chlorophyll data is not available in the current dataset.");
        assert!(!section.alerts().any(|a| a.message.contains("invalid filter")));
    }
}
