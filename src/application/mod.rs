// Application layer - Use cases and pipeline stages
pub mod chart_builder;
pub mod dashboard_assembler;
pub mod dashboard_service;
pub mod dataset_repository;
pub mod metric_transformer;
pub mod tab_composer;
