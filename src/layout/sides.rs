//! Left/right split of the dimension rings.

use std::collections::BTreeMap;

use log::debug;

use super::types::{Category, Side, Table};

/// Assign a side to every table.
///
/// Level-1 dimensions are balanced across both sides; deeper levels follow
/// the side of the previous level they are most connected to; extensions
/// follow their base.
pub fn assign_sides(tables: &mut BTreeMap<String, Table>) {
    for table in tables.values_mut() {
        table.side = match table.category {
            Category::Fact => Side::Center,
            c if c.is_dimension() => Side::Left,
            _ => Side::None,
        };
    }

    split_first_ring(tables);

    let max_level = tables
        .values()
        .filter(|t| t.category.is_dimension())
        .map(|t| t.level)
        .max()
        .unwrap_or(0);

    for level in 2..=max_level {
        let names: Vec<String> = tables
            .values()
            .filter(|t| t.category.is_dimension() && t.level == level)
            .map(|t| t.name.clone())
            .collect();

        for name in names {
            let side = side_from_parents(tables, &name, level);
            if let Some(table) = tables.get_mut(&name) {
                table.side = side;
            }
            debug!(table = name.as_str(), level, side:?; "Dimension side");
        }
    }

    let extension_sides: Vec<(String, Side)> = tables
        .values()
        .filter(|t| t.category == Category::Extension)
        .map(|t| {
            let side = t
                .base
                .as_ref()
                .and_then(|b| tables.get(b))
                .map_or(Side::Left, |b| b.side);
            (t.name.clone(), side)
        })
        .collect();
    for (name, side) in extension_sides {
        if let Some(table) = tables.get_mut(&name) {
            table.side = side;
        }
    }
}

/// Balance level-1 dimensions: calendar-linked tables lean left, hubs
/// lean right, and the sorted list is cut in half.
fn split_first_ring(tables: &mut BTreeMap<String, Table>) {
    let mut scored: Vec<(i32, String)> = tables
        .values()
        .filter(|t| t.category == Category::DimL1)
        .map(|t| {
            let left = t
                .connections
                .iter()
                .filter(|c| tables.get(*c).is_some_and(|n| n.category == Category::Calendar))
                .count() as i32;
            let right = i32::from(t.degree() >= 5);
            (right - left, t.name.clone())
        })
        .collect();
    scored.sort();

    let left_count = scored.len().div_ceil(2);
    for (idx, (_, name)) in scored.iter().enumerate() {
        if let Some(table) = tables.get_mut(name) {
            table.side = if idx < left_count {
                Side::Left
            } else {
                Side::Right
            };
        }
    }
}

/// Side of the closest lower ring this table connects to; ties and
/// orphans go left.
fn side_from_parents(tables: &BTreeMap<String, Table>, name: &str, level: i64) -> Side {
    let Some(table) = tables.get(name) else {
        return Side::Left;
    };

    for parent_level in (1..level).rev() {
        let (mut left, mut right) = (0, 0);
        for parent in table.connections.iter().filter_map(|c| tables.get(c)) {
            if !parent.category.is_dimension() || parent.level != parent_level {
                continue;
            }
            match parent.side {
                Side::Left => left += 1,
                Side::Right => right += 1,
                _ => {}
            }
        }
        if left + right > 0 {
            return if right > left { Side::Right } else { Side::Left };
        }
    }

    Side::Left
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn table(name: &str, category: Category, level: i64, connections: &[&str]) -> Table {
        let mut t = Table::new(
            name,
            category,
            connections.iter().map(|c| c.to_string()).collect::<BTreeSet<_>>(),
        );
        t.level = level;
        t
    }

    fn tables(list: Vec<Table>) -> BTreeMap<String, Table> {
        list.into_iter().map(|t| (t.name.clone(), t)).collect()
    }

    #[test]
    fn test_first_ring_is_balanced() {
        let mut t = tables(vec![
            table("Sales", Category::Fact, 0, &["A", "B", "C", "D"]),
            table("A", Category::DimL1, 1, &["Sales"]),
            table("B", Category::DimL1, 1, &["Sales"]),
            table("C", Category::DimL1, 1, &["Sales"]),
            table("D", Category::DimL1, 1, &["Sales"]),
        ]);
        assign_sides(&mut t);

        let left = t.values().filter(|t| t.side == Side::Left).count();
        let right = t.values().filter(|t| t.side == Side::Right).count();
        assert_eq!((left, right), (2, 2));
        assert_eq!(t["Sales"].side, Side::Center);
        assert_eq!(t["A"].side, Side::Left);
        assert_eq!(t["D"].side, Side::Right);
    }

    #[test]
    fn test_calendar_link_pulls_left_and_hub_pushes_right() {
        let mut t = tables(vec![
            table("Sales", Category::Fact, 0, &["Aaa", "Zzz"]),
            table("Date", Category::Calendar, -1, &["Zzz"]),
            table("Aaa", Category::DimL1, 1, &["Sales", "H1", "H2", "H3", "H4"]),
            table("Zzz", Category::DimL1, 1, &["Sales", "Date"]),
        ]);
        assign_sides(&mut t);

        assert_eq!(t["Zzz"].side, Side::Left);
        assert_eq!(t["Aaa"].side, Side::Right);
        assert_eq!(t["Date"].side, Side::None);
    }

    #[test]
    fn test_deeper_rings_follow_parents() {
        let mut t = tables(vec![
            table("Sales", Category::Fact, 0, &["A", "B"]),
            table("A", Category::DimL1, 1, &["Sales", "A2"]),
            table("B", Category::DimL1, 1, &["Sales", "B2"]),
            table("A2", Category::DimL2, 2, &["A"]),
            table("B2", Category::DimL2, 2, &["B", "B3"]),
            table("B3", Category::DimL3, 3, &["B2"]),
            table("Orphan", Category::DimL4Plus, 4, &["Lonely"]),
            table("Lonely", Category::DimL4Plus, 4, &["Orphan"]),
        ]);
        assign_sides(&mut t);

        assert_eq!(t["A"].side, Side::Left);
        assert_eq!(t["B"].side, Side::Right);
        assert_eq!(t["A2"].side, Side::Left);
        assert_eq!(t["B2"].side, Side::Right);
        assert_eq!(t["B3"].side, Side::Right);
        assert_eq!(t["Orphan"].side, Side::Left);
    }

    #[test]
    fn test_extension_inherits_base_side() {
        let mut base = table("B", Category::DimL1, 1, &["Sales", "BExt"]);
        base.side = Side::Right;
        let mut ext = table("BExt", Category::Extension, 2, &["B"]);
        ext.base = Some("B".to_string());
        let mut t = tables(vec![
            table("Sales", Category::Fact, 0, &["A", "B"]),
            table("A", Category::DimL1, 1, &["Sales"]),
            base,
            ext,
        ]);
        assign_sides(&mut t);

        assert_eq!(t["B"].side, Side::Right);
        assert_eq!(t["BExt"].side, Side::Right);
    }
}
