// Dashboard error taxonomy
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DashboardError>;

/// Recoverable pipeline errors. Neither variant is fatal: the composer turns
/// both into placeholder content for the affected chart or tab.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    /// Source file missing, unreadable or malformed
    #[error("{dataset} data unavailable: {reason}")]
    DataUnavailable { dataset: String, reason: String },

    /// Selector references an unknown column/metric or an impossible range
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
}

impl DashboardError {
    pub fn unavailable(dataset: impl Into<String>, reason: impl ToString) -> Self {
        Self::DataUnavailable {
            dataset: dataset.into(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::InvalidFilter(message.into())
    }

    /// Text shown in place of a chart that could not be built
    pub fn placeholder_message(&self) -> String {
        match self {
            Self::DataUnavailable { .. } => "No data available".to_string(),
            Self::InvalidFilter(message) => format!("No data: {}", message),
        }
    }
}
