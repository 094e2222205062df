//! Batch ETL pipeline for sales data: extracts customer, product, order and
//! order line-item CSV exports, cleans and deduplicates them, and loads them
//! into a relational target in foreign-key dependency order, with a
//! referential-integrity check after the load.

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod logging;
pub mod pipeline;

pub use config::Config;
pub use error::{EtlError, Result};
pub use pipeline::orchestrator::{EtlOrchestrator, RunStatus, RunSummary};
