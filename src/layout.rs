//! Middle-out arrangement of data model diagrams.
//!
//! Facts sit in the center column, dimensions fan out left and right by
//! their distance to the nearest fact, and special tables (calendars,
//! metrics, parameters) get their own zones.

pub mod categorize;
pub mod chains;
pub mod columns;
pub mod config;
pub mod engine;
pub mod families;
pub mod graph;
pub mod placement;
pub mod sides;
pub mod types;

pub use config::LayoutConfig;
pub use engine::{LayoutEngine, LayoutResult};
pub use graph::RelationshipGraph;
pub use types::{Category, Chain, Family, Position, Side, Stack, StackKey, Table};
