// Infrastructure layer - External dependencies and adapters
pub mod chunked_json;
pub mod config;
pub mod dataset_loader;
pub mod file_repository;
pub mod http_response;
pub mod onc_client;
