// Domain layer - Pure data models and rules, no I/O
pub mod chart;
pub mod dashboard;
pub mod error;
pub mod metric;
pub mod species;
pub mod table;
