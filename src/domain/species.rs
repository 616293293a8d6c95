// Prey species and feeding-condition domain model
use super::dashboard::{Alert, AlertLevel, InfoCard};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreySpecies {
    pub name: &'static str,
    pub temperature: ValueRange,
    pub chlorophyll: ValueRange,
    pub peak_season: &'static str,
    pub note: &'static str,
    pub source: &'static str,
}

/// Key prey of humpbacks in Holyrood waters
pub const PREY_SPECIES: [PreySpecies; 3] = [
    PreySpecies {
        name: "Capelin",
        temperature: ValueRange::new(2.0, 12.0),
        chlorophyll: ValueRange::new(0.5, 3.0),
        peak_season: "June-July",
        note: "Peak spawning: June-July",
        source: "DFO Stock Assessment",
    },
    PreySpecies {
        name: "Krill",
        temperature: ValueRange::new(-1.5, 10.0),
        chlorophyll: ValueRange::new(1.0, 5.0),
        peak_season: "April-September",
        note: "pH sensitivity: High",
        source: "Memorial University",
    },
    PreySpecies {
        name: "Herring",
        temperature: ValueRange::new(4.0, 15.0),
        chlorophyll: ValueRange::new(0.3, 2.5),
        peak_season: "May-June & Aug-Sep",
        note: "Spawning: Spring/Fall",
        source: "DFO Atlantic Herring",
    },
];

/// Months where conditions inside every prey range count as optimal
const SUMMER_MONTHS: [u32; 3] = [6, 7, 8];

pub const PRESENCE_LEVELS: [&str; 4] = ["Absent", "Low", "Medium", "High"];

impl PreySpecies {
    pub fn info_card(&self) -> InfoCard {
        InfoCard {
            title: self.name.to_string(),
            lines: vec![
                format!(
                    "Temperature: {}-{}°C",
                    format_bound(self.temperature.min),
                    format_bound(self.temperature.max)
                ),
                format!(
                    "Chlorophyll: {}-{} mg/m³",
                    format_bound(self.chlorophyll.min),
                    format_bound(self.chlorophyll.max)
                ),
                format!("Peak season: {}", self.peak_season),
                self.note.to_string(),
            ],
            source: Some(self.source.to_string()),
        }
    }
}

fn format_bound(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChlorophyllImpact {
    High,
    Moderate,
    Low,
}

impl ChlorophyllImpact {
    pub fn classify(level: f64) -> Self {
        if level > 2.0 {
            ChlorophyllImpact::High
        } else if level > 0.5 {
            ChlorophyllImpact::Moderate
        } else {
            ChlorophyllImpact::Low
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            ChlorophyllImpact::High => "High",
            ChlorophyllImpact::Moderate => "Moderate",
            ChlorophyllImpact::Low => "Low",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ChlorophyllImpact::High => {
                "Strong correlation with whale presence - Prime feeding conditions"
            }
            ChlorophyllImpact::Moderate => {
                "Moderate feeding probability - Some whale activity expected"
            }
            ChlorophyllImpact::Low => {
                "Limited feeding opportunities - Reduced whale presence likely"
            }
        }
    }

    pub fn alert_level(&self) -> AlertLevel {
        match self {
            ChlorophyllImpact::High => AlertLevel::Success,
            ChlorophyllImpact::Moderate => AlertLevel::Warning,
            ChlorophyllImpact::Low => AlertLevel::Error,
        }
    }
}

/// Alerts for the latest water temperature against each prey's tolerance
pub fn condition_alerts(latest_temperature: Option<f64>, month: u32) -> Vec<Alert> {
    let Some(temp) = latest_temperature else {
        return vec![Alert::new(
            AlertLevel::Warning,
            "No current temperature data available",
        )];
    };

    let mut alerts = Vec::new();
    for prey in &PREY_SPECIES {
        let range = prey.temperature;
        if !range.contains(temp) {
            alerts.push(Alert::new(
                AlertLevel::Warning,
                format!(
                    "Temperature ({:.1}°C) is outside optimal range for {} ({}°C - {}°C)",
                    temp,
                    prey.name,
                    format_bound(range.min),
                    format_bound(range.max)
                ),
            ));
        } else if SUMMER_MONTHS.contains(&month) {
            alerts.push(Alert::new(
                AlertLevel::Success,
                format!("Current conditions are optimal for {}", prey.name),
            ));
        }
    }

    if alerts.is_empty() {
        alerts.push(Alert::new(
            AlertLevel::Info,
            "Current conditions are within acceptable ranges.",
        ));
    }
    alerts
}
