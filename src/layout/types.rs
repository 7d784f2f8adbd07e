//! Data structures shared by the arrangement stages.

use std::collections::BTreeSet;

/// Role of a table in the diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Fact,
    DimL1,
    DimL2,
    DimL3,
    DimL4Plus,
    Calendar,
    Metric,
    Parameter,
    CalculationGroup,
    Extension,
    Excluded,
}

impl Category {
    /// Category for a table `distance` hops away from the nearest fact.
    pub fn for_distance(distance: usize) -> Self {
        match distance {
            0 => Self::Fact,
            1 => Self::DimL1,
            2 => Self::DimL2,
            3 => Self::DimL3,
            _ => Self::DimL4Plus,
        }
    }

    pub fn is_dimension(self) -> bool {
        matches!(
            self,
            Self::DimL1 | Self::DimL2 | Self::DimL3 | Self::DimL4Plus
        )
    }

    /// Ring index counted outward from the fact column.
    pub fn ring(self) -> Option<u8> {
        match self {
            Self::Fact => Some(0),
            Self::DimL1 => Some(1),
            Self::DimL2 => Some(2),
            Self::DimL3 => Some(3),
            Self::DimL4Plus => Some(4),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fact => "fact",
            Self::DimL1 => "dim-l1",
            Self::DimL2 => "dim-l2",
            Self::DimL3 => "dim-l3",
            Self::DimL4Plus => "dim-l4+",
            Self::Calendar => "calendar",
            Self::Metric => "metric",
            Self::Parameter => "parameter",
            Self::CalculationGroup => "calculation-group",
            Self::Extension => "extension",
            Self::Excluded => "excluded",
        }
    }
}

/// Horizontal half of the diagram a table is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Left,
    Right,
    Center,
    None,
}

/// Identifies one vertical column of tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StackKey {
    pub category: Category,
    pub side: Side,
}

impl StackKey {
    pub fn new(category: Category, side: Side) -> Self {
        Self { category, side }
    }

    /// Column rank: negative on the left, zero for facts, positive on the right.
    /// Outer rings sit further from zero.
    pub fn column_rank(&self) -> i32 {
        let ring = i32::from(self.category.ring().unwrap_or(0));
        match self.side {
            Side::Left => -ring,
            Side::Right => ring,
            Side::Center | Side::None => 0,
        }
    }
}

/// A classified table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub category: Category,
    /// 0 for facts, relational distance for dimensions, -1 otherwise
    pub level: i64,
    pub side: Side,
    pub connections: BTreeSet<String>,
    /// Base table for extensions
    pub base: Option<String>,
}

impl Table {
    pub fn new(name: impl Into<String>, category: Category, connections: BTreeSet<String>) -> Self {
        Self {
            name: name.into(),
            category,
            level: -1,
            side: Side::None,
            connections,
            base: None,
        }
    }

    pub fn degree(&self) -> usize {
        self.connections.len()
    }
}

/// Ordered tables sharing a (category, side).
#[derive(Debug, Clone, PartialEq)]
pub struct Stack {
    pub key: StackKey,
    pub tables: Vec<String>,
}

/// Tables from different stacks held at the same vertical offset.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub members: Vec<String>,
    pub anchor: String,
    /// Offset below the top of the stack area
    pub offset: f64,
}

/// A base table and the 1:1 extensions drawn right below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Family {
    pub base: String,
    pub extensions: Vec<String>,
}

/// Final placement of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub table: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub z_index: usize,
}

impl Position {
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_categories() {
        assert_eq!(Category::for_distance(0), Category::Fact);
        assert_eq!(Category::for_distance(1), Category::DimL1);
        assert_eq!(Category::for_distance(3), Category::DimL3);
        assert_eq!(Category::for_distance(9), Category::DimL4Plus);
    }

    #[test]
    fn test_column_rank_orders_outward() {
        let outer_left = StackKey::new(Category::DimL4Plus, Side::Left);
        let inner_left = StackKey::new(Category::DimL1, Side::Left);
        let facts = StackKey::new(Category::Fact, Side::Center);
        let inner_right = StackKey::new(Category::DimL1, Side::Right);
        assert!(outer_left.column_rank() < inner_left.column_rank());
        assert!(inner_left.column_rank() < facts.column_rank());
        assert!(facts.column_rank() < inner_right.column_rank());
    }
}
