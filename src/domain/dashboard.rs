// Dashboard domain model
use super::chart::ChartSpec;
use super::metric::CorrelationMatrix;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tabs in display order; the derived `Ord` is the dashboard's tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabId {
    About,
    Lifecycle,
    Feeding,
    Migration,
    Breeding,
    Sources,
}

impl TabId {
    pub const ALL: [TabId; 6] = [
        TabId::About,
        TabId::Lifecycle,
        TabId::Feeding,
        TabId::Migration,
        TabId::Breeding,
        TabId::Sources,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TabId::About => "about",
            TabId::Lifecycle => "lifecycle",
            TabId::Feeding => "feeding",
            TabId::Migration => "migration",
            TabId::Breeding => "breeding",
            TabId::Sources => "sources",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            TabId::About => "About",
            TabId::Lifecycle => "Lifecycle",
            TabId::Feeding => "Feeding",
            TabId::Migration => "Migration",
            TabId::Breeding => "Breeding",
            TabId::Sources => "Sources",
        }
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TabId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        TabId::ALL
            .into_iter()
            .find(|tab| tab.as_str() == wanted)
            .ok_or_else(|| format!("unknown tab '{}'", s))
    }
}

/// Tab id and title, for navigation and the stream skeleton
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabSummary {
    pub id: TabId,
    pub title: String,
}

impl From<TabId> for TabSummary {
    fn from(id: TabId) -> Self {
        Self {
            id,
            title: id.title().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricTile {
    pub id: String,
    pub label: String,
    pub unit: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub precision: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
}

impl Alert {
    pub fn new(level: AlertLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoCard {
    pub title: String,
    pub lines: Vec<String>,
    pub source: Option<String>,
}

/// One piece of tab content, rendered in order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SectionBlock {
    Markdown { text: String },
    Chart { chart: ChartSpec },
    Tiles { tiles: Vec<MetricTile> },
    Alert { alert: Alert },
    Cards { cards: Vec<InfoCard> },
    Correlation { title: String, matrix: CorrelationMatrix },
}

/// Named grouping of narrative text, charts and supporting blocks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabSection {
    pub id: TabId,
    pub title: String,
    pub blocks: Vec<SectionBlock>,
}

impl TabSection {
    pub fn new(id: TabId) -> Self {
        Self {
            id,
            title: id.title().to_string(),
            blocks: Vec::new(),
        }
    }

    pub fn markdown(mut self, text: impl Into<String>) -> Self {
        self.blocks.push(SectionBlock::Markdown { text: text.into() });
        self
    }

    pub fn chart(mut self, chart: ChartSpec) -> Self {
        self.blocks.push(SectionBlock::Chart { chart });
        self
    }

    pub fn push(&mut self, block: SectionBlock) {
        self.blocks.push(block);
    }

    pub fn charts(&self) -> impl Iterator<Item = &ChartSpec> {
        self.blocks.iter().filter_map(|block| match block {
            SectionBlock::Chart { chart } => Some(chart),
            _ => None,
        })
    }

    pub fn alerts(&self) -> impl Iterator<Item = &Alert> {
        self.blocks.iter().filter_map(|block| match block {
            SectionBlock::Alert { alert } => Some(alert),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub title: String,
    pub as_of: DateTime<FixedOffset>,
    pub tabs: Vec<TabSection>,
}

impl Dashboard {
    pub fn new(title: String, as_of: DateTime<FixedOffset>, tabs: Vec<TabSection>) -> Self {
        Self { title, as_of, tabs }
    }

    pub fn tab(&self, id: TabId) -> Option<&TabSection> {
        self.tabs.iter().find(|t| t.id == id)
    }
}
