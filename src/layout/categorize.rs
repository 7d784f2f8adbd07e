//! Table role inference.
//!
//! Classification runs in fixed phases and no phase revisits an earlier
//! decision:
//!
//! 1. auto-generated date tables are excluded (see [`is_auto_generated`]),
//! 2. calculation groups, disconnected tables and calendars are set aside,
//! 3. facts are picked by a hybrid name/connectivity/role score,
//! 4. the rest are leveled by their BFS distance to the nearest fact,
//! 5. single-neighbor 1:1 tables become extensions of that neighbor.
//!
//! Nothing here knows concrete table names; only name *tokens* and graph
//! structure feed the decisions.

use std::collections::{BTreeMap, VecDeque};

use log::{debug, info, warn};

use crate::error::Diagnostic;
use crate::ir::TableIR;

use super::config::LayoutConfig;
use super::graph::RelationshipGraph;
use super::types::{Category, Table};

const FACT_MARKERS: &[&str] = &[
    "fact",
    "facts",
    "fct",
    "trans",
    "transaction",
    "transactions",
    "event",
    "events",
    "log",
    "history",
];

const DIMENSION_MARKERS: &[&str] = &[
    "dim",
    "dimension",
    "master",
    "lookup",
    "lkp",
    "ref",
    "reference",
];

const CALENDAR_MARKERS: &[&str] = &[
    "date", "dates", "calendar", "calender", "kalender", "fecha", "datum",
];

const GENERATED_DATE_PREFIXES: &[&str] = &["localdatetable_", "datetabletemplate_"];

const NAME_MARKER_SCORE: i32 = 25;
const MANY_SIDE_SCORE: i32 = 5;
const ONE_SIDE_SCORE: i32 = 15;

/// Whether a table was generated by the host tool for date hierarchies.
pub fn is_auto_generated(table: &TableIR) -> bool {
    if table.is_auto_generated {
        return true;
    }
    let lower = table.name.to_lowercase();
    GENERATED_DATE_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}

/// Split a name into lowercase tokens at separators and camelCase boundaries.
pub fn name_tokens(name: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in name.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_numeric();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn has_marker(tokens: &[String], markers: &[&str]) -> bool {
    tokens.iter().any(|t| markers.contains(&t.as_str()))
}

/// Fact and dimension evidence for one table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FactScore {
    pub fact: i32,
    pub dimension: i32,
}

impl FactScore {
    pub fn net(&self) -> i32 {
        self.fact - self.dimension
    }
}

/// Hybrid fact/dimension score for a connected table.
pub fn score_table(name: &str, graph: &RelationshipGraph) -> FactScore {
    let mut score = FactScore::default();
    let tokens = name_tokens(name);

    if has_marker(&tokens, FACT_MARKERS) {
        score.fact += NAME_MARKER_SCORE;
    }
    if has_marker(&tokens, DIMENSION_MARKERS) {
        score.dimension += NAME_MARKER_SCORE;
    }

    let degree = graph.degree(name);
    score.fact += match degree {
        0 => 0,
        1 => -3,
        2 => 5,
        3 | 4 => 10,
        _ => 15,
    };

    // Two neighbors is where a snowflake link and a small fact look alike;
    // only there does the declared relationship role weigh in.
    if degree == 2 {
        let many = graph.many_side_count(name).min(degree) as i32;
        let one = graph.one_side_count(name).min(degree) as i32;
        score.fact += many * MANY_SIDE_SCORE;
        score.dimension += one * ONE_SIDE_SCORE;
    }

    score
}

/// Category for tables that never enter the fact/dimension scoring.
fn special_category(table: &TableIR, graph: &RelationshipGraph) -> Option<Category> {
    if table.is_calculation_group {
        return Some(Category::CalculationGroup);
    }

    if graph.degree(&table.name) == 0 {
        let visible: Vec<_> = table.visible_fields().collect();
        let single_calculation = visible.len() == 1 && visible[0].is_calculated;
        return Some(if single_calculation {
            Category::Metric
        } else {
            Category::Parameter
        });
    }

    let tokens = name_tokens(&table.name);
    if table.is_date_table
        || (has_marker(&tokens, CALENDAR_MARKERS) && !has_marker(&tokens, FACT_MARKERS))
    {
        return Some(Category::Calendar);
    }

    None
}

/// Shortest hop count from `start` to any fact over the relationship graph.
///
/// `memo` caches exact answers from earlier calls of the same run. A cached
/// `None` means the whole connected component has no fact.
pub fn distance_to_fact(
    start: &str,
    graph: &RelationshipGraph,
    categories: &BTreeMap<String, Category>,
    memo: &mut BTreeMap<String, Option<usize>>,
) -> Option<usize> {
    if let Some(&known) = memo.get(start) {
        return known;
    }

    let mut best: Option<usize> = None;
    let mut visited = std::collections::BTreeSet::from([start.to_string()]);
    let mut queue = VecDeque::from([(start.to_string(), 0usize)]);

    while let Some((current, depth)) = queue.pop_front() {
        if best.is_some_and(|b| depth >= b) {
            break;
        }
        if categories.get(current.as_str()) == Some(&Category::Fact) {
            best = Some(depth);
            break;
        }
        if current != start {
            match memo.get(current.as_str()) {
                Some(Some(rest)) => {
                    best = Some(best.map_or(depth + rest, |b| b.min(depth + rest)));
                    continue;
                }
                Some(None) => {
                    best = None;
                    break;
                }
                None => {}
            }
        }
        for next in graph.neighbors(&current) {
            if visited.insert(next.clone()) {
                queue.push_back((next.clone(), depth + 1));
            }
        }
    }

    memo.insert(start.to_string(), best);
    best
}

/// Classify every table. `tables` must already have auto-generated tables
/// removed and names normalized.
pub fn categorize(
    tables: &[TableIR],
    graph: &RelationshipGraph,
    config: &LayoutConfig,
    diagnostics: &mut Vec<Diagnostic>,
) -> BTreeMap<String, Table> {
    let mut categories: BTreeMap<String, Category> = BTreeMap::new();
    let mut levels: BTreeMap<String, i64> = BTreeMap::new();

    // Phase 2: special tables
    for table in tables {
        if let Some(category) = special_category(table, graph) {
            debug!(table = table.name.as_str(), category = category.as_str(); "Special table");
            categories.insert(table.name.clone(), category);
        }
    }

    // Phase 3: facts
    let mut candidates: Vec<&str> = tables
        .iter()
        .map(|t| t.name.as_str())
        .filter(|name| !categories.contains_key(*name))
        .collect();
    candidates.sort_unstable();

    for name in &candidates {
        let score = score_table(name, graph);
        let net = score.net();
        let is_fact = net > 0 || (net == 0 && config.tie_breaks_to_fact);
        if net == 0 {
            let resolved = if is_fact { "fact" } else { "dimension" };
            warn!(table = *name, resolved; "Fact and dimension scores tie");
            diagnostics.push(Diagnostic::AmbiguousCategory {
                table: name.to_string(),
                resolved,
            });
        }
        debug!(table = *name, fact = score.fact, dimension = score.dimension, is_fact; "Scored table");
        if is_fact {
            categories.insert(name.to_string(), Category::Fact);
            levels.insert(name.to_string(), 0);
        }
    }

    // Phase 4: dimension levels
    let dimensions: Vec<&str> = candidates
        .iter()
        .copied()
        .filter(|name| !categories.contains_key(*name))
        .collect();

    let mut memo = BTreeMap::new();
    let mut leveled = Vec::with_capacity(dimensions.len());
    for name in &dimensions {
        let distance = distance_to_fact(name, graph, &categories, &mut memo);
        leveled.push((*name, distance));
    }

    for (name, distance) in leveled {
        let (category, level) = match distance {
            Some(d) => (Category::for_distance(d), d as i64),
            None => {
                info!(table = name; "Dimension cannot reach a fact");
                diagnostics.push(Diagnostic::UnreachableDimension {
                    table: name.to_string(),
                });
                (Category::DimL4Plus, 4)
            }
        };
        categories.insert(name.to_string(), category);
        levels.insert(name.to_string(), level);
    }

    let mut result: BTreeMap<String, Table> = tables
        .iter()
        .map(|t| {
            let category = categories
                .get(&t.name)
                .copied()
                .unwrap_or(Category::Parameter);
            let mut table = Table::new(&t.name, category, graph.neighbors(&t.name).clone());
            table.level = levels.get(&t.name).copied().unwrap_or(-1);
            (t.name.clone(), table)
        })
        .collect();

    // Phase 5: extensions
    detect_extensions(&mut result, graph);

    let facts = result
        .values()
        .filter(|t| t.category == Category::Fact)
        .count();
    info!(tables_len = result.len(), facts; "Tables categorized");

    result
}

fn is_stacked(category: Category) -> bool {
    category == Category::Fact || category.is_dimension()
}

/// Re-tag tables whose single relationship is a 1:1 link as extensions.
/// When both ends qualify, the `to` end stays the base.
fn detect_extensions(tables: &mut BTreeMap<String, Table>, graph: &RelationshipGraph) {
    let qualifies = |tables: &BTreeMap<String, Table>, ext: &str, base: &str| {
        let (Some(e), Some(b)) = (tables.get(ext), tables.get(base)) else {
            return false;
        };
        e.degree() == 1 && is_stacked(e.category) && is_stacked(b.category)
    };

    let pairs: Vec<(String, String)> = graph
        .one_to_one_pairs()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect();

    for (from, to) in pairs {
        let (ext, base) = if qualifies(tables, &from, &to) {
            (from, to)
        } else if qualifies(tables, &to, &from) {
            (to, from)
        } else {
            continue;
        };

        let base_level = tables.get(&base).map_or(0, |b| b.level.max(0));
        if let Some(table) = tables.get_mut(&ext) {
            table.category = Category::Extension;
            table.level = base_level + 1;
            table.base = Some(base.clone());
            debug!(table = ext.as_str(), base = base.as_str(); "Extension detected");
        }
    }
}
