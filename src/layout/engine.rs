//! Layout engine core implementation.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::{debug, info};

use crate::error::{Diagnostic, LayoutError};
use crate::ir::{ArrangeOutput, ModelIR, PositionIR, TableIR};

use super::categorize::{categorize, is_auto_generated};
use super::chains::align_chains;
use super::columns::{group_into_stacks, stack_offsets, stack_width};
use super::config::LayoutConfig;
use super::families::{collect_families, group_families};
use super::graph::{build_graph, normalize_name};
use super::placement::{
    place_calendar_band, place_metric_column, place_parameter_grid, place_stacks, right_edge,
};
use super::sides::assign_sides;
use super::types::{Category, Chain, Family, Position, Stack, Table};

/// Everything one arrangement run produced.
#[derive(Debug, Clone)]
pub struct LayoutResult {
    /// Stacks top-down, left to right, then calendar band, metrics and parameters
    pub positions: Vec<Position>,
    pub tables: BTreeMap<String, Table>,
    pub stacks: Vec<Stack>,
    pub chains: Vec<Chain>,
    pub families: Vec<Family>,
    pub diagnostics: Vec<Diagnostic>,
    pub width: f64,
    pub height: f64,
}

impl LayoutResult {
    pub fn position(&self, table: &str) -> Option<&Position> {
        self.positions.iter().find(|p| p.table == table)
    }

    /// Positions and user-facing warnings in the wire format.
    pub fn output(&self) -> ArrangeOutput {
        ArrangeOutput {
            positions: self.positions.iter().map(PositionIR::from).collect(),
            warnings: self
                .diagnostics
                .iter()
                .filter(|d| d.is_warning())
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Middle-out arrangement of a data model diagram.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    pub(crate) config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Compute positions for every table of the model.
    ///
    /// # Errors
    ///
    /// Fails when no table remains after removing auto-generated ones, or
    /// when the canvas has a non-positive dimension.
    pub fn layout(&self, model: &ModelIR) -> Result<LayoutResult, LayoutError> {
        let canvas = model.canvas;
        if canvas.canvas_width <= 0 || canvas.canvas_height <= 0 {
            return Err(LayoutError::InvalidCanvas {
                width: canvas.canvas_width,
                height: canvas.canvas_height,
            });
        }

        info!(
            tables_len = model.tables.len(),
            relationships_len = model.relationships.len();
            "Arranging model",
        );

        let mut diagnostics = Vec::new();

        // Phase 1: name normalization and exclusion
        let (tables, excluded) = prepare_tables(&model.tables);
        if tables.is_empty() {
            return Err(LayoutError::NoTablesFound);
        }
        let known: BTreeSet<String> = tables.iter().map(|t| t.name.clone()).collect();

        // Phase 2: relationship graph
        let graph = build_graph(&model.relationships, &known, &excluded, &mut diagnostics);

        // Phase 3: categories and sides
        let mut classified = categorize(&tables, &graph, &self.config, &mut diagnostics);
        assign_sides(&mut classified);

        // Phase 4: stacks, chains, families
        let table_sizes = self.table_sizes(&tables, &classified);
        let mut stacks = group_into_stacks(&classified);
        let alignment = align_chains(
            &mut stacks,
            &graph,
            &classified,
            &table_sizes,
            self.config.table_gap,
            &mut diagnostics,
        );
        let families = collect_families(&classified);
        group_families(&mut stacks, &families);
        debug!(
            stacks_len = stacks.len(),
            chains_len = alignment.chains.len(),
            families_len = families.len();
            "Stacks ordered",
        );

        // Phase 5: coordinates
        let offsets = stack_offsets(
            &stacks,
            &table_sizes,
            self.config.margin_left,
            self.config.stack_gap,
        );
        let mut positions =
            self.place_all(&stacks, &offsets, &alignment.reservations, &classified, &table_sizes);

        let content_width = right_edge(&positions, 0.0) + self.config.margin_left;
        let shift = ((canvas.canvas_width as f64 - content_width) / 2.0)
            .floor()
            .max(0.0);
        for (idx, p) in positions.iter_mut().enumerate() {
            p.x += shift;
            p.z_index = idx;
        }

        let width = right_edge(&positions, 0.0) + self.config.margin_left;
        let height = positions
            .iter()
            .map(Position::bottom)
            .fold(0.0, f64::max)
            + self.config.margin_top;

        info!(
            positions_len = positions.len(),
            diagnostics_len = diagnostics.len(),
            width,
            height;
            "Arrangement complete",
        );

        Ok(LayoutResult {
            positions,
            tables: classified,
            stacks,
            chains: alignment.chains,
            families,
            diagnostics,
            width,
            height,
        })
    }

    fn table_sizes(
        &self,
        tables: &[TableIR],
        classified: &BTreeMap<String, Table>,
    ) -> HashMap<String, (f64, f64)> {
        tables
            .iter()
            .map(|t| {
                let (w, h) = self
                    .config
                    .metrics
                    .table_size(&t.name, t.visible_fields().count());
                let is_calendar = classified
                    .get(&t.name)
                    .is_some_and(|c| c.category == Category::Calendar);
                let h = if is_calendar {
                    self.config.calendar_height
                } else {
                    h
                };
                (t.name.clone(), (w, h))
            })
            .collect()
    }

    fn place_all(
        &self,
        stacks: &[Stack],
        offsets: &[f64],
        reservations: &HashMap<String, f64>,
        classified: &BTreeMap<String, Table>,
        table_sizes: &HashMap<String, (f64, f64)>,
    ) -> Vec<Position> {
        let cfg = &self.config;
        let named = |categories: &[Category]| -> Vec<String> {
            categories
                .iter()
                .flat_map(|c| {
                    classified
                        .values()
                        .filter(move |t| t.category == *c)
                        .map(|t| t.name.clone())
                })
                .collect()
        };
        let calendars = named(&[Category::Calendar]);
        let metrics = named(&[Category::Metric]);
        let params = named(&[Category::Parameter, Category::CalculationGroup]);

        let band_height = if calendars.is_empty() {
            0.0
        } else {
            cfg.calendar_height + cfg.zone_gap
        };
        let main_top = cfg.margin_top + band_height;

        let placed = place_stacks(
            stacks,
            offsets,
            reservations,
            table_sizes,
            main_top,
            cfg.table_gap,
        );
        let content_right = if stacks.is_empty() {
            cfg.margin_left
        } else {
            placed.right_x
        };

        let center_x = stacks
            .iter()
            .zip(offsets)
            .find(|(s, _)| s.key.category == Category::Fact)
            .map(|(s, &x)| x + stack_width(s, table_sizes) / 2.0)
            .unwrap_or((cfg.margin_left + content_right) / 2.0);
        let calendar = place_calendar_band(
            &calendars,
            table_sizes,
            center_x,
            cfg.margin_left,
            cfg.margin_top,
            cfg.stack_gap,
        );

        let zone_top = if stacks.is_empty() {
            main_top
        } else {
            placed.bottom_y + cfg.zone_gap
        };
        let grid = place_parameter_grid(
            &params,
            table_sizes,
            cfg.margin_left,
            zone_top,
            cfg.stack_gap,
            cfg.table_gap,
            cfg.grid_columns,
        );

        let metric_width = metrics
            .iter()
            .filter_map(|m| table_sizes.get(m))
            .map(|&(w, _)| w)
            .fold(0.0, f64::max);
        let mut metrics_right = content_right.max(cfg.margin_left + metric_width);
        if !grid.is_empty() {
            metrics_right = metrics_right.max(right_edge(&grid, 0.0) + cfg.stack_gap + metric_width);
        }
        let metric_column =
            place_metric_column(&metrics, table_sizes, metrics_right, zone_top, cfg.table_gap);

        debug!(
            calendars_len = calendars.len(),
            metrics_len = metrics.len(),
            params_len = params.len(),
            main_top,
            zone_top;
            "Special zones placed",
        );

        let mut positions = placed.positions;
        positions.extend(calendar);
        positions.extend(metric_column);
        positions.extend(grid);
        positions
    }
}

/// Normalize names, drop duplicates, and split off auto-generated tables.
fn prepare_tables(raw: &[TableIR]) -> (Vec<TableIR>, BTreeSet<String>) {
    let mut seen = BTreeSet::new();
    let mut excluded = BTreeSet::new();
    let mut tables = Vec::with_capacity(raw.len());

    for table in raw {
        let mut table = table.clone();
        table.name = normalize_name(&table.name);
        if table.name.is_empty() {
            debug!("Skipping table with empty name");
            continue;
        }
        if !seen.insert(table.name.clone()) {
            debug!(table = table.name.as_str(); "Skipping duplicate table");
            continue;
        }
        if is_auto_generated(&table) {
            debug!(table = table.name.as_str(); "Excluding auto-generated table");
            excluded.insert(table.name);
            continue;
        }
        tables.push(table);
    }

    (tables, excluded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{CanvasIR, RelationshipIR};

    fn model(names: &[&str], rels: Vec<RelationshipIR>) -> ModelIR {
        ModelIR {
            tables: names.iter().map(|n| TableIR::new(*n)).collect(),
            relationships: rels,
            canvas: CanvasIR::default(),
        }
    }

    #[test]
    fn test_basic_layout() {
        let m = model(
            &["Sales", "Product", "Customer"],
            vec![
                RelationshipIR::new("Sales", "Product"),
                RelationshipIR::new("Sales", "Customer"),
            ],
        );
        let result = LayoutEngine::default().layout(&m).unwrap();

        assert_eq!(result.positions.len(), 3);
        assert!(result.width > 0.0);
        assert!(result.height > 0.0);
        let x = |name: &str| result.position(name).unwrap().x;
        assert!(x("Customer") < x("Sales"));
        assert!(x("Sales") < x("Product"));
    }

    #[test]
    fn test_empty_model_fails() {
        let err = LayoutEngine::default()
            .layout(&model(&[], vec![]))
            .unwrap_err();
        assert!(matches!(err, LayoutError::NoTablesFound));

        let err = LayoutEngine::default()
            .layout(&model(&["LocalDateTable_42"], vec![]))
            .unwrap_err();
        assert!(matches!(err, LayoutError::NoTablesFound));
    }

    #[test]
    fn test_invalid_canvas_fails() {
        let mut m = model(&["Sales"], vec![]);
        m.canvas.canvas_width = 0;
        let err = LayoutEngine::default().layout(&m).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidCanvas { width: 0, .. }));
    }

    #[test]
    fn test_names_are_normalized_and_deduplicated() {
        let m = model(
            &["'Sales'", "Sales", " Product "],
            vec![RelationshipIR::new("Sales", "'Product'")],
        );
        let result = LayoutEngine::default().layout(&m).unwrap();

        assert_eq!(result.positions.len(), 2);
        assert!(result.tables["Product"].connections.contains("Sales"));
        assert!(result.output().warnings.is_empty());
    }

    #[test]
    fn test_narrow_content_is_centered_on_canvas() {
        let m = model(&["Lonely"], vec![]);
        let result = LayoutEngine::default().layout(&m).unwrap();
        let p = &result.positions[0];
        let cfg = LayoutConfig::default();

        let content_width = cfg.margin_left + cfg.metrics.min_table_width + cfg.margin_left;
        let expected_shift = ((1600.0 - content_width) / 2.0_f64).floor();
        assert_eq!(p.x, cfg.margin_left + expected_shift);
    }

    #[test]
    fn test_z_index_follows_output_order() {
        let m = model(
            &["Sales", "Product", "Customer", "Param"],
            vec![
                RelationshipIR::new("Sales", "Product"),
                RelationshipIR::new("Sales", "Customer"),
            ],
        );
        let result = LayoutEngine::default().layout(&m).unwrap();
        for (idx, p) in result.positions.iter().enumerate() {
            assert_eq!(p.z_index, idx);
        }
    }
}
