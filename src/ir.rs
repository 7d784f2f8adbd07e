use serde::{Deserialize, Serialize};

use crate::layout::Position;

/// The data model handed over by the relationship-parsing collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelIR {
    pub tables: Vec<TableIR>,
    #[serde(default)]
    pub relationships: Vec<RelationshipIR>,
    #[serde(default)]
    pub canvas: CanvasIR,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableIR {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldIR>,
    #[serde(default)]
    pub is_calculation_group: bool,
    #[serde(default)]
    pub is_auto_generated: bool,
    #[serde(default)]
    pub is_date_table: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldIR {
    pub name: String,
    #[serde(default)]
    pub is_hidden: bool,
    /// Computed by an expression rather than stored
    #[serde(default)]
    pub is_calculated: bool,
}

/// A relationship; `from_table` is the many side, `to_table` the one side.
/// Missing table references deserialize as empty and are skipped later.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipIR {
    #[serde(default)]
    pub from_table: String,
    #[serde(default)]
    pub from_column: String,
    #[serde(default)]
    pub to_table: String,
    #[serde(default)]
    pub to_column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_filter_direction: Option<String>,
    #[serde(default)]
    pub is_one_to_one: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasIR {
    pub canvas_width: i64,
    pub canvas_height: i64,
}

impl Default for CanvasIR {
    fn default() -> Self {
        Self {
            canvas_width: 1600,
            canvas_height: 1200,
        }
    }
}

/// One table placement, in the shape the diagram persistence layer merges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionIR {
    pub table_id: String,
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
    pub z_index: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrangeOutput {
    pub positions: Vec<PositionIR>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl TableIR {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(FieldIR {
            name: name.into(),
            ..FieldIR::default()
        });
        self
    }

    pub fn with_calculated_field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(FieldIR {
            name: name.into(),
            is_calculated: true,
            ..FieldIR::default()
        });
        self
    }

    pub fn visible_fields(&self) -> impl Iterator<Item = &FieldIR> {
        self.fields.iter().filter(|f| !f.is_hidden)
    }
}

impl RelationshipIR {
    pub fn new(from_table: impl Into<String>, to_table: impl Into<String>) -> Self {
        Self {
            from_table: from_table.into(),
            to_table: to_table.into(),
            ..Self::default()
        }
    }

    pub fn one_to_one(mut self) -> Self {
        self.is_one_to_one = true;
        self
    }
}

impl From<&Position> for PositionIR {
    fn from(p: &Position) -> Self {
        Self {
            table_id: p.table.clone(),
            x: p.x.round() as i64,
            y: p.y.round() as i64,
            width: p.width.round() as i64,
            height: p.height.round() as i64,
            z_index: p.z_index as i64,
        }
    }
}
