//! Cross-stack chain alignment.
//!
//! A chain is a path of related tables that crosses several stacks, one
//! table per stack. Members of a chain are reserved the same vertical offset
//! so the relationship lines between them run straight across.
//!
//! Chains are traced greedily; this is a heuristic and not a longest-path
//! search.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use log::debug;

use crate::error::Diagnostic;

use super::graph::RelationshipGraph;
use super::types::{Chain, Stack, Table};

/// Result of chain alignment.
#[derive(Debug, Clone, Default)]
pub struct ChainAlignment {
    pub chains: Vec<Chain>,
    /// Table -> reserved offset below the top of the stack area
    pub reservations: HashMap<String, f64>,
}

enum Step {
    Next(String),
    Blocked(String),
    End,
}

struct Tracer<'a> {
    graph: &'a RelationshipGraph,
    stack_of: &'a HashMap<String, usize>,
    claimed: &'a HashSet<String>,
}

impl Tracer<'_> {
    fn candidates<'g>(
        &'g self,
        tip: &str,
        chain: &VecDeque<String>,
        used_stacks: &HashSet<usize>,
    ) -> impl Iterator<Item = &'g String> {
        self.graph.neighbors(tip).iter().filter(move |n| {
            self.stack_of
                .get(n.as_str())
                .is_some_and(|s| !used_stacks.contains(s))
                && !chain.contains(*n)
        })
    }

    fn next_step(
        &self,
        tip: &str,
        chain: &VecDeque<String>,
        used_stacks: &HashSet<usize>,
    ) -> Step {
        let (free, claimed): (Vec<&String>, Vec<&String>) = self
            .candidates(tip, chain, used_stacks)
            .partition(|n| !self.claimed.contains(n.as_str()));

        let best = free.into_iter().max_by(|a, b| {
            let onward_a = self.onward(a, chain, used_stacks);
            let onward_b = self.onward(b, chain, used_stacks);
            onward_a
                .cmp(&onward_b)
                .then_with(|| self.stack_of[b.as_str()].cmp(&self.stack_of[a.as_str()]))
                .then_with(|| b.cmp(a))
        });

        match (best, claimed.first()) {
            (Some(next), _) => Step::Next(next.clone()),
            (None, Some(blocked)) => Step::Blocked((*blocked).clone()),
            (None, None) => Step::End,
        }
    }

    /// Candidates that would remain after stepping onto `table`.
    fn onward(&self, table: &str, chain: &VecDeque<String>, used_stacks: &HashSet<usize>) -> usize {
        let mut used = used_stacks.clone();
        if let Some(&s) = self.stack_of.get(table) {
            used.insert(s);
        }
        self.candidates(table, chain, &used)
            .filter(|n| n.as_str() != table && !self.claimed.contains(n.as_str()))
            .count()
    }

    fn trace(&self, start: &str, diagnostics: &mut Vec<Diagnostic>) -> Vec<String> {
        let mut chain = VecDeque::from([start.to_string()]);
        let mut used_stacks: HashSet<usize> = self.stack_of.get(start).copied().into_iter().collect();

        for at_back in [true, false] {
            loop {
                let tip = if at_back { chain.back() } else { chain.front() };
                let Some(tip) = tip.cloned() else { break };

                match self.next_step(&tip, &chain, &used_stacks) {
                    Step::Next(next) => {
                        if let Some(&s) = self.stack_of.get(&next) {
                            used_stacks.insert(s);
                        }
                        if at_back {
                            chain.push_back(next);
                        } else {
                            chain.push_front(next);
                        }
                    }
                    Step::Blocked(table) => {
                        debug!(start, table = table.as_str(); "Chain stopped at claimed table");
                        let diagnostic = Diagnostic::ChainCycleDetected {
                            start: start.to_string(),
                            table,
                        };
                        if !diagnostics.contains(&diagnostic) {
                            diagnostics.push(diagnostic);
                        }
                        break;
                    }
                    Step::End => break,
                }
            }
        }

        chain.into()
    }
}

/// Offset of `name` if its stack were laid out in its current order.
fn natural_offset(
    stack: &Stack,
    name: &str,
    table_sizes: &HashMap<String, (f64, f64)>,
    table_gap: f64,
) -> f64 {
    let mut y = 0.0;
    for member in &stack.tables {
        if member == name {
            break;
        }
        let (_, h) = table_sizes.get(member).copied().unwrap_or((0.0, 0.0));
        y += h + table_gap;
    }
    y
}

/// Detect chains, reserve offsets, and reorder the stacks to honor them.
pub fn align_chains(
    stacks: &mut [Stack],
    graph: &RelationshipGraph,
    tables: &BTreeMap<String, Table>,
    table_sizes: &HashMap<String, (f64, f64)>,
    table_gap: f64,
    diagnostics: &mut Vec<Diagnostic>,
) -> ChainAlignment {
    let stack_of: HashMap<String, usize> = stacks
        .iter()
        .enumerate()
        .flat_map(|(idx, s)| s.tables.iter().map(move |t| (t.clone(), idx)))
        .collect();

    let mut claimed: HashSet<String> = HashSet::new();
    let mut alignment = ChainAlignment::default();

    let seeds: Vec<String> = stacks.iter().flat_map(|s| s.tables.iter().cloned()).collect();
    for seed in seeds {
        if claimed.contains(&seed) {
            continue;
        }

        let members = Tracer {
            graph,
            stack_of: &stack_of,
            claimed: &claimed,
        }
        .trace(&seed, diagnostics);

        if members.len() < 2 {
            continue;
        }

        let anchor = members
            .iter()
            .min_by_key(|m| tables.get(*m).map_or(i64::MAX, |t| t.level))
            .cloned()
            .unwrap_or_else(|| seed.clone());
        let offset = natural_offset(&stacks[stack_of[&anchor]], &anchor, table_sizes, table_gap);

        debug!(members:?, anchor = anchor.as_str(), offset; "Chain aligned");

        for member in &members {
            claimed.insert(member.clone());
            alignment.reservations.insert(member.clone(), offset);
        }
        alignment.chains.push(Chain {
            members,
            anchor,
            offset,
        });
    }

    for stack in stacks.iter_mut() {
        if stack
            .tables
            .iter()
            .any(|t| alignment.reservations.contains_key(t))
        {
            stack.tables = reorder_stack(&stack.tables, &alignment.reservations, table_sizes, table_gap);
        }
    }

    alignment
}

/// Interleave reserved and free tables: free tables keep their relative
/// order and are emitted while they fit above the next reservation.
pub fn reorder_stack(
    order: &[String],
    reservations: &HashMap<String, f64>,
    table_sizes: &HashMap<String, (f64, f64)>,
    table_gap: f64,
) -> Vec<String> {
    let height = |name: &str| table_sizes.get(name).map_or(0.0, |&(_, h)| h);

    let mut reserved: Vec<(f64, usize, &String)> = order
        .iter()
        .enumerate()
        .filter_map(|(idx, name)| reservations.get(name).map(|&off| (off, idx, name)))
        .collect();
    reserved.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    let mut reserved: VecDeque<_> = reserved.into();

    let mut free: VecDeque<&String> = order
        .iter()
        .filter(|name| !reservations.contains_key(*name))
        .collect();

    let mut cursor = 0.0;
    let mut out = Vec::with_capacity(order.len());

    loop {
        let take_free = match (reserved.front(), free.front()) {
            (Some(&(offset, _, _)), Some(name)) => cursor + height(name.as_str()) + table_gap <= offset,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };

        if take_free {
            if let Some(name) = free.pop_front() {
                cursor += height(name.as_str()) + table_gap;
                out.push(name.clone());
            }
        } else if let Some((offset, _, name)) = reserved.pop_front() {
            cursor = f64::max(cursor, offset) + height(name.as_str()) + table_gap;
            out.push(name.clone());
        }
    }

    out
}
