//! Formatting and classification helpers for the report sections.

pub mod classify;
pub mod format;

pub use classify::*;
pub use format::*;
