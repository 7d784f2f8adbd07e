//! Fatal errors and recovered diagnostics.

use thiserror::Error;

/// Conditions that abort an arrangement run. No positions are produced.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("no tables left to arrange after removing auto-generated tables")]
    NoTablesFound,

    #[error("invalid canvas size {width}x{height}: both dimensions must be positive")]
    InvalidCanvas { width: i64, height: i64 },

    #[error("invalid model input: {0}")]
    InvalidInput(#[from] serde_json::Error),
}

/// Conditions recovered locally. The run continues and reports them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error("relationship #{index} skipped: {reason}")]
    MalformedRelationship { index: usize, reason: String },

    #[error("table '{table}' scores equally as fact and dimension; treated as {resolved}")]
    AmbiguousCategory { table: String, resolved: &'static str },

    #[error("table '{table}' has no path to a fact table; placed on the outermost ring")]
    UnreachableDimension { table: String },

    #[error("chain from '{start}' stopped before revisiting claimed table '{table}'")]
    ChainCycleDetected { start: String, table: String },
}

impl Diagnostic {
    /// Whether the caller should surface this diagnostic to a user.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::MalformedRelationship { .. } | Self::AmbiguousCategory { .. }
        )
    }
}
