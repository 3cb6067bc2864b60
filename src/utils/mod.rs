//! Utility modules shared by the fetch layer and the report sections.

pub mod json;
pub mod text;

pub use json::*;
pub use text::*;
