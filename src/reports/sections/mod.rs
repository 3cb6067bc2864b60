//! Report Section Generators
//!
//! One module per text report. Each `generate` renders a complete report
//! and falls back to a "no data" placeholder instead of failing.

pub mod s1_learning;
pub mod s2_infrastructure;
pub mod s3_census;
pub mod s4_ideb;
pub mod s5_pass_rates;

