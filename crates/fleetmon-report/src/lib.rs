//! Plain-text reporting over a generated fleet snapshot.
//!
//! [`render_fleet_report`] turns one snapshot into a markdown status
//! report; [`summarization_context`] produces the structured context
//! block an analysis assistant would consume. Both are pure string
//! builders over already-generated data.

pub mod insight;
pub mod render;

pub use insight::{fleet_insights, MAX_INSIGHTS};
pub use render::{render_fleet_report, summarization_context, ReportContext};
