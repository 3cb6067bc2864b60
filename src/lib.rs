//! QEdu Education Reports
//!
//! Generates five Portuguese-language education reports (learning,
//! infrastructure, school census, IDEB, pass rates) plus a structured numeric
//! summary for a Brazilian municipality or state identified by its IBGE code.
//!
//! Module layout:
//! - `territory`: IBGE code validation and the state table
//! - `fetch/`: statistics API transport with retries and a per-run cache
//! - `sources`: year-fallback resolvers and typed payload views
//! - `data`: IDEB/SAEB reference tables loaded with Polars
//! - `entity`: display name and state abbreviation resolution
//! - `reports/`: section renderers (S1-S5), structured summary, orchestration
//! - `api_server`: Axum HTTP API (feature `api`)

pub mod config;
pub mod data;
pub mod entity;
pub mod fetch;
pub mod reports;
pub mod sources;
pub mod territory;
pub mod utils;

#[cfg(feature = "api")]
pub mod api_server;

// Re-export commonly used types
pub use config::{RetryPolicy, Settings};
pub use entity::Entity;
pub use fetch::{FetchError, Fetcher, HttpTransport, Transport};
pub use reports::{ReportBundle, ReportGenerator, ReportKind, StructuredSummary, REPORT_KINDS};
pub use territory::{Scope, TerritoryCode, TerritoryError};

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
