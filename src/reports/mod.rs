//! Report Generation Module
//!
//! Renders the five plain-text education reports for a territory and the
//! structured summary of the numbers behind them.
//!
//! ## Reports
//! 1. Learning - SAEB proficiency levels per cycle, compared with peers and Brazil
//! 2. Infrastructure - school facilities against state and national shares
//! 3. Census - enrollment by stage and grade, commercial insights
//! 4. IDEB - index history per segment from the reference tables
//! 5. Pass rates - approval, failure and dropout per cycle

pub mod generator;
pub mod sections;
pub mod structured;
pub mod types;
pub mod utils;

pub use generator::ReportGenerator;
pub use types::{ReportBundle, ReportKind, StructuredSummary, REPORT_KINDS};
