//! Document model.
//!
//! Defines the parsed document and the per-line output rows that flow from
//! the parser through the emitter into the output sinks.

mod document;
mod row;

pub use document::*;
pub use row::*;
