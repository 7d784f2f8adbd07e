//! Vertical placement within stacks and the special zones.

use std::collections::HashMap;

use super::types::{Position, Stack};

/// Result of stack placement.
pub struct StackPlacement {
    pub positions: Vec<Position>,
    /// Lowest table bottom across all stacks
    pub bottom_y: f64,
    /// Rightmost table edge across all stacks
    pub right_x: f64,
}

fn size_of(table_sizes: &HashMap<String, (f64, f64)>, name: &str) -> (f64, f64) {
    table_sizes.get(name).copied().unwrap_or((0.0, 0.0))
}

fn position(name: &str, x: f64, y: f64, (width, height): (f64, f64)) -> Position {
    Position {
        table: name.to_string(),
        x,
        y,
        width,
        height,
        z_index: 0,
    }
}

/// Walk each stack top-down. Reserved tables sit at their reservation
/// unless the cursor is already past it; no table ever moves above the cursor.
pub fn place_stacks(
    stacks: &[Stack],
    offsets: &[f64],
    reservations: &HashMap<String, f64>,
    table_sizes: &HashMap<String, (f64, f64)>,
    top: f64,
    table_gap: f64,
) -> StackPlacement {
    let mut positions = Vec::new();
    let mut bottom_y = top;
    let mut right_x: f64 = 0.0;

    for (stack, &x) in stacks.iter().zip(offsets) {
        let mut cursor = top;

        for name in &stack.tables {
            let size = size_of(table_sizes, name);
            let y = match reservations.get(name) {
                Some(&offset) => cursor.max(top + offset),
                None => cursor,
            };

            positions.push(position(name, x, y, size));
            cursor = y + size.1 + table_gap;
            bottom_y = bottom_y.max(y + size.1);
            right_x = right_x.max(x + size.0);
        }
    }

    StackPlacement {
        positions,
        bottom_y,
        right_x,
    }
}

/// One row of calendar tables centered on `center_x`, never left of `min_x`.
pub fn place_calendar_band(
    calendars: &[String],
    table_sizes: &HashMap<String, (f64, f64)>,
    center_x: f64,
    min_x: f64,
    top: f64,
    gap: f64,
) -> Vec<Position> {
    if calendars.is_empty() {
        return Vec::new();
    }

    let band_width = calendars
        .iter()
        .map(|name| size_of(table_sizes, name).0)
        .sum::<f64>()
        + gap * (calendars.len() - 1) as f64;

    let mut x = (center_x - band_width / 2.0).max(min_x);
    calendars
        .iter()
        .map(|name| {
            let size = size_of(table_sizes, name);
            let p = position(name, x, top, size);
            x += size.0 + gap;
            p
        })
        .collect()
}

/// Single column of metric tables whose right edge is `right_x`.
pub fn place_metric_column(
    metrics: &[String],
    table_sizes: &HashMap<String, (f64, f64)>,
    right_x: f64,
    top: f64,
    gap: f64,
) -> Vec<Position> {
    let column_width = metrics
        .iter()
        .map(|name| size_of(table_sizes, name).0)
        .fold(0.0, f64::max);

    let mut y = top;
    metrics
        .iter()
        .map(|name| {
            let size = size_of(table_sizes, name);
            let p = position(name, right_x - column_width, y, size);
            y += size.1 + gap;
            p
        })
        .collect()
}

/// Grid of parameter tables, `columns` per row, starting at (`left_x`, `top`).
pub fn place_parameter_grid(
    params: &[String],
    table_sizes: &HashMap<String, (f64, f64)>,
    left_x: f64,
    top: f64,
    gap_x: f64,
    gap_y: f64,
    columns: usize,
) -> Vec<Position> {
    let columns = columns.max(1);
    let cell_width = params
        .iter()
        .map(|name| size_of(table_sizes, name).0)
        .fold(0.0, f64::max);

    let mut positions = Vec::with_capacity(params.len());
    let mut y = top;

    for row in params.chunks(columns) {
        let mut row_height: f64 = 0.0;
        for (col, name) in row.iter().enumerate() {
            let size = size_of(table_sizes, name);
            let x = left_x + col as f64 * (cell_width + gap_x);
            positions.push(position(name, x, y, size));
            row_height = row_height.max(size.1);
        }
        y += row_height + gap_y;
    }

    positions
}

/// Right edge of a set of positions, or `fallback` when empty.
pub fn right_edge(positions: &[Position], fallback: f64) -> f64 {
    positions.iter().map(Position::right).fold(fallback, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::types::{Category, Side, StackKey};

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn sizes(list: &[(&str, f64, f64)]) -> HashMap<String, (f64, f64)> {
        list.iter()
            .map(|(n, w, h)| (n.to_string(), (*w, *h)))
            .collect()
    }

    #[test]
    fn test_stack_spacing() {
        let stacks = vec![Stack {
            key: StackKey::new(Category::DimL1, Side::Left),
            tables: names(&["A", "B", "C"]),
        }];
        let table_sizes = sizes(&[("A", 180.0, 100.0), ("B", 180.0, 60.0), ("C", 200.0, 80.0)]);
        let placed = place_stacks(&stacks, &[40.0], &HashMap::new(), &table_sizes, 40.0, 30.0);

        let ys: Vec<f64> = placed.positions.iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![40.0, 170.0, 260.0]);
        assert_eq!(placed.bottom_y, 340.0);
        assert_eq!(placed.right_x, 240.0);
    }

    #[test]
    fn test_reservation_inserts_gap_but_never_moves_up() {
        let stacks = vec![Stack {
            key: StackKey::new(Category::DimL1, Side::Left),
            tables: names(&["A", "B", "C"]),
        }];
        let table_sizes = sizes(&[("A", 180.0, 100.0), ("B", 180.0, 100.0), ("C", 180.0, 100.0)]);
        let reservations: HashMap<String, f64> =
            [("B".to_string(), 300.0), ("C".to_string(), 0.0)].into_iter().collect();
        let placed = place_stacks(&stacks, &[0.0], &reservations, &table_sizes, 0.0, 30.0);

        assert_eq!(placed.positions[1].y, 300.0);
        assert_eq!(placed.positions[2].y, 430.0);
    }

    #[test]
    fn test_calendar_band_is_centered() {
        let table_sizes = sizes(&[("Date", 200.0, 200.0), ("Fiscal", 200.0, 200.0)]);
        let band = place_calendar_band(&names(&["Date", "Fiscal"]), &table_sizes, 500.0, 40.0, 40.0, 40.0);

        assert_eq!(band[0].x, 280.0);
        assert_eq!(band[1].x, 520.0);
        assert!(band.iter().all(|p| p.y == 40.0));
    }

    #[test]
    fn test_calendar_band_respects_margin() {
        let table_sizes = sizes(&[("Date", 200.0, 200.0)]);
        let band = place_calendar_band(&names(&["Date"]), &table_sizes, 10.0, 40.0, 40.0, 40.0);
        assert_eq!(band[0].x, 40.0);
    }

    #[test]
    fn test_metric_column_is_right_aligned() {
        let table_sizes = sizes(&[("M1", 180.0, 80.0), ("M2", 220.0, 80.0)]);
        let column = place_metric_column(&names(&["M1", "M2"]), &table_sizes, 1000.0, 500.0, 30.0);

        assert_eq!(column[0].x, 780.0);
        assert_eq!(column[1].x, 780.0);
        assert_eq!(column[1].y, 610.0);
    }

    #[test]
    fn test_parameter_grid_wraps() {
        let table_sizes = sizes(&[
            ("P1", 180.0, 80.0),
            ("P2", 180.0, 100.0),
            ("P3", 180.0, 80.0),
        ]);
        let grid = place_parameter_grid(
            &names(&["P1", "P2", "P3"]),
            &table_sizes,
            40.0,
            500.0,
            80.0,
            30.0,
            2,
        );

        assert_eq!((grid[0].x, grid[0].y), (40.0, 500.0));
        assert_eq!((grid[1].x, grid[1].y), (300.0, 500.0));
        assert_eq!((grid[2].x, grid[2].y), (40.0, 630.0));
    }
}
