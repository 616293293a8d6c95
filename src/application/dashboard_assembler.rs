// Dashboard assembler - Orders composed tabs into the final view-model
use crate::application::tab_composer::{RenderInputs, compose_tab};
use crate::domain::dashboard::{Dashboard, TabId, TabSection, TabSummary};
use crate::infrastructure::config::WidgetsConfig;
use chrono::{DateTime, FixedOffset};

/// Put sections into tab order. Sections for the same tab keep their
/// relative order.
pub fn assemble(title: &str, as_of: DateTime<FixedOffset>, mut sections: Vec<TabSection>) -> Dashboard {
    sections.sort_by_key(|section| section.id);
    Dashboard::new(title.to_string(), as_of, sections)
}

/// Compose every tab and assemble the dashboard
pub fn render_dashboard(inputs: &RenderInputs, widgets: &WidgetsConfig) -> Dashboard {
    let sections = TabId::ALL
        .into_iter()
        .map(|tab| compose_tab(tab, inputs, widgets))
        .collect();
    let as_of = inputs.now.with_timezone(&inputs.tz).fixed_offset();
    assemble(&inputs.title, as_of, sections)
}

pub fn tab_summaries() -> Vec<TabSummary> {
    TabId::ALL.into_iter().map(TabSummary::from).collect()
}
