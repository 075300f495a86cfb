// Library exports for the binaries and integration tests
pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod metrics;
pub mod models;
