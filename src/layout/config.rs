//! Spacing and heuristic settings for the arrangement pipeline.

use serde::Deserialize;

use crate::measure::TextMetrics;

/// Configuration options for arrangement.
///
/// Every field has a default, so a partial TOML or JSON document
/// deserializes into a complete configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Table card sizing
    pub metrics: TextMetrics,

    /// Distance from the canvas left edge to the first column
    pub margin_left: f64,

    /// Distance from the canvas top edge to the first row
    pub margin_top: f64,

    /// Horizontal gap between adjacent stacks
    pub stack_gap: f64,

    /// Minimum vertical gap between tables in one stack
    pub table_gap: f64,

    /// Vertical gap between the calendar band, the stacks and the bottom zones
    pub zone_gap: f64,

    /// Fixed height of calendar tables
    pub calendar_height: f64,

    /// Columns in the parameter grid before wrapping
    pub grid_columns: usize,

    /// Whether an exact fact/dimension score tie classifies a table as a fact
    pub tie_breaks_to_fact: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            metrics: TextMetrics::default(),
            margin_left: 40.0,
            margin_top: 40.0,
            stack_gap: 80.0,
            table_gap: 30.0,
            zone_gap: 80.0,
            calendar_height: 200.0,
            grid_columns: 4,
            tie_breaks_to_fact: true,
        }
    }
}

impl LayoutConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum vertical gap between tables
    pub fn with_table_gap(mut self, gap: f64) -> Self {
        self.table_gap = gap;
        self
    }

    /// Set the parameter grid width in columns
    pub fn with_grid_columns(mut self, columns: usize) -> Self {
        self.grid_columns = columns.max(1);
        self
    }

    pub fn with_tie_breaks_to_fact(mut self, to_fact: bool) -> Self {
        self.tie_breaks_to_fact = to_fact;
        self
    }
}
