// Dashboard service - Use case for loading datasets and building dashboards
use crate::application::dashboard_assembler::{render_dashboard, tab_summaries};
use crate::application::dataset_repository::{DatasetId, DatasetRepository};
use crate::application::metric_transformer::with_health_score;
use crate::application::tab_composer::{RenderInputs, compose_tab};
use crate::domain::dashboard::{Dashboard, TabId, TabSection, TabSummary};
use crate::domain::error::{DashboardError, Result};
use crate::domain::metric::{DateRange, TimeWindow};
use crate::domain::table::Table;
use crate::infrastructure::config::WidgetsConfig;
use crate::infrastructure::dataset_loader::parse_timestamp;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use futures::Stream;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Messages of the progressive dashboard stream, in send order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamMessage {
    Skeleton { title: String, tabs: Vec<TabSummary> },
    Tab { tab: TabSection },
    Complete { tab_count: usize, duration_ms: u64 },
}

/// Time filter and clock for one render. A bad filter is carried as an
/// error so every chart can show it instead of failing the request.
#[derive(Debug, Clone)]
pub struct DashboardRequest {
    pub range: Result<Option<DateRange>>,
    pub now: DateTime<Utc>,
}

impl DashboardRequest {
    pub fn new(range: Result<Option<DateRange>>, now: DateTime<Utc>) -> Self {
        Self { range, now }
    }

    pub fn from_params(
        window: Option<&str>,
        from: Option<&str>,
        to: Option<&str>,
        now: DateTime<Utc>,
    ) -> Self {
        Self::new(resolve_range(window, from, to, now), now)
    }
}

/// Resolve query parameters into a range. Explicit `from`/`to` win over a
/// window preset; nothing at all means the full dataset.
pub fn resolve_range(
    window: Option<&str>,
    from: Option<&str>,
    to: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Option<DateRange>> {
    let parse = |name: &str, raw: &str| {
        parse_timestamp(raw).ok_or_else(|| {
            DashboardError::invalid_filter(format!("unparseable '{}' value '{}'", name, raw))
        })
    };

    if from.is_some() || to.is_some() {
        let start = match from {
            Some(raw) => parse("from", raw)?,
            None => DateTime::<Utc>::MIN_UTC,
        };
        let end = match to {
            Some(raw) => parse("to", raw)?,
            None => now,
        };
        let range = DateRange::new(start, end);
        if !range.is_valid() {
            return Err(DashboardError::invalid_filter(format!(
                "range start {} is after end {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            )));
        }
        return Ok(Some(range));
    }

    match window {
        Some(raw) if !raw.trim().is_empty() => {
            let window: TimeWindow = raw.parse().map_err(DashboardError::InvalidFilter)?;
            Ok(Some(window.range_ending(now)))
        }
        _ => Ok(None),
    }
}

#[derive(Clone)]
pub struct DashboardService {
    repository: Arc<dyn DatasetRepository>,
    widgets: Arc<WidgetsConfig>,
    title: String,
    tz: Tz,
}

impl DashboardService {
    pub fn new(
        repository: Arc<dyn DatasetRepository>,
        widgets: WidgetsConfig,
        title: String,
        tz: Tz,
    ) -> Self {
        Self {
            repository,
            widgets: Arc::new(widgets),
            title,
            tz,
        }
    }

    pub fn tabs(&self) -> Vec<TabSummary> {
        tab_summaries()
    }

    pub async fn build_dashboard(&self, request: &DashboardRequest) -> Dashboard {
        let inputs = self.load_inputs(request).await;
        render_dashboard(&inputs, &self.widgets)
    }

    pub async fn build_tab(&self, tab: TabId, request: &DashboardRequest) -> TabSection {
        let inputs = self.load_inputs(request).await;
        compose_tab(tab, &inputs, &self.widgets)
    }

    /// Skeleton first, then each tab in order, then a completion event
    pub fn stream_dashboard(&self, request: DashboardRequest) -> impl Stream<Item = StreamMessage> + Send + 'static {
        let service = self.clone();

        async_stream::stream! {
            let started = Instant::now();
            yield StreamMessage::Skeleton {
                title: service.title.clone(),
                tabs: service.tabs(),
            };

            let inputs = service.load_inputs(&request).await;
            for tab in TabId::ALL {
                yield StreamMessage::Tab {
                    tab: compose_tab(tab, &inputs, &service.widgets),
                };
            }

            let duration_ms = started.elapsed().as_millis() as u64;
            tracing::debug!("Streamed {} tabs in {}ms", TabId::ALL.len(), duration_ms);
            yield StreamMessage::Complete {
                tab_count: TabId::ALL.len(),
                duration_ms,
            };
        }
    }

    async fn load_inputs(&self, request: &DashboardRequest) -> RenderInputs {
        let range = request.range.clone().ok().flatten();
        let (sensors, sightings, presence) = tokio::join!(
            self.load(DatasetId::Sensors, range),
            self.load(DatasetId::Sightings, range),
            self.load(DatasetId::Presence, range),
        );

        RenderInputs {
            title: self.title.clone(),
            tz: self.tz,
            now: request.now,
            range: request.range.clone(),
            sensors: sensors.map(with_health_score),
            sightings,
            presence,
        }
    }

    async fn load(&self, dataset: DatasetId, range: Option<DateRange>) -> Result<Table> {
        let result = self.repository.load(dataset, range).await;
        match &result {
            Ok(table) => tracing::debug!("Loaded {} rows of {}", table.len(), dataset.as_str()),
            Err(e) => tracing::warn!("Dataset {} unavailable, rendering placeholders: {}", dataset.as_str(), e),
        }
        result
    }
}
