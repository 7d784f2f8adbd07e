//! Undirected relationship graph between tables.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};

use crate::error::Diagnostic;
use crate::ir::RelationshipIR;

static NO_NEIGHBORS: BTreeSet<String> = BTreeSet::new();

/// Adjacency between tables plus the relationship roles each table plays.
///
/// Neighbor sets are sorted, so every traversal over the graph visits tables
/// in the same order regardless of input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationshipGraph {
    adjacency: BTreeMap<String, BTreeSet<String>>,
    /// Table -> relationships where it is the many side
    many_side: BTreeMap<String, usize>,
    /// Table -> relationships where it is the one side
    one_side: BTreeMap<String, usize>,
    /// (from, to) pairs of 1:1 relationships
    one_to_one: BTreeSet<(String, String)>,
}

impl RelationshipGraph {
    pub fn neighbors(&self, table: &str) -> &BTreeSet<String> {
        self.adjacency.get(table).unwrap_or(&NO_NEIGHBORS)
    }

    pub fn degree(&self, table: &str) -> usize {
        self.neighbors(table).len()
    }

    pub fn many_side_count(&self, table: &str) -> usize {
        self.many_side.get(table).copied().unwrap_or(0)
    }

    pub fn one_side_count(&self, table: &str) -> usize {
        self.one_side.get(table).copied().unwrap_or(0)
    }

    pub fn one_to_one_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.one_to_one
            .iter()
            .map(|(from, to)| (from.as_str(), to.as_str()))
    }

    /// Tables that have at least one relationship.
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.adjacency.keys().map(String::as_str)
    }

    fn connect(&mut self, a: &str, b: &str) {
        self.adjacency
            .entry(a.to_string())
            .or_default()
            .insert(b.to_string());
        self.adjacency
            .entry(b.to_string())
            .or_default()
            .insert(a.to_string());
    }
}

/// Normalize a table reference: trim, strip one layer of quoting, decode escapes.
pub fn normalize_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let (inner, quote) = match (trimmed.chars().next(), trimmed.chars().last()) {
        (Some(open @ ('\'' | '"')), Some(close)) if trimmed.len() >= 2 && open == close => {
            (&trimmed[1..trimmed.len() - 1], Some(open))
        }
        (Some('['), Some(']')) if trimmed.len() >= 2 => (&trimmed[1..trimmed.len() - 1], None),
        _ => (trimmed, None),
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.peek() {
                Some(&next @ ('\'' | '"' | '\\')) => {
                    out.push(next);
                    chars.next();
                }
                _ => out.push(c),
            },
            q if Some(q) == quote && chars.peek() == Some(&q) => {
                out.push(q);
                chars.next();
            }
            _ => out.push(c),
        }
    }
    out.trim().to_string()
}

/// Build the relationship graph.
///
/// `known` holds every arrangeable table; `excluded` the auto-generated ones.
/// Relationships touching an excluded table are dropped quietly, everything
/// else that cannot be resolved is skipped with a diagnostic.
pub fn build_graph(
    relationships: &[RelationshipIR],
    known: &BTreeSet<String>,
    excluded: &BTreeSet<String>,
    diagnostics: &mut Vec<Diagnostic>,
) -> RelationshipGraph {
    let mut graph = RelationshipGraph::default();

    for (index, rel) in relationships.iter().enumerate() {
        let from = normalize_name(&rel.from_table);
        let to = normalize_name(&rel.to_table);

        let problem = if from.is_empty() {
            Some("missing source table".to_string())
        } else if to.is_empty() {
            Some("missing target table".to_string())
        } else if excluded.contains(&from) || excluded.contains(&to) {
            debug!(index, from = from.as_str(), to = to.as_str(); "Dropping relationship to auto-generated table");
            continue;
        } else if !known.contains(&from) {
            Some(format!("unknown source table '{from}'"))
        } else if !known.contains(&to) {
            Some(format!("unknown target table '{to}'"))
        } else if from == to {
            Some(format!("table '{from}' relates to itself"))
        } else {
            None
        };

        if let Some(reason) = problem {
            warn!(index, reason = reason.as_str(); "Skipping malformed relationship");
            diagnostics.push(Diagnostic::MalformedRelationship { index, reason });
            continue;
        }

        graph.connect(&from, &to);
        if rel.is_one_to_one {
            graph.one_to_one.insert((from, to));
        } else {
            *graph.many_side.entry(from).or_insert(0) += 1;
            *graph.one_side.entry(to).or_insert(0) += 1;
        }
    }

    debug!(
        tables_len = graph.adjacency.len(),
        one_to_one_len = graph.one_to_one.len();
        "Relationship graph built",
    );

    graph
}
