//! Stack grouping and horizontal column placement.

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;

use super::types::{Category, Side, Stack, StackKey, Table};

/// Stack a table is drawn in. Extensions share their base's stack; special
/// tables have none.
pub fn stack_key_of(tables: &BTreeMap<String, Table>, table: &Table) -> Option<StackKey> {
    match table.category {
        Category::Fact => Some(StackKey::new(Category::Fact, Side::Center)),
        c if c.is_dimension() => Some(StackKey::new(c, table.side)),
        Category::Extension => {
            let base = tables.get(table.base.as_deref()?)?;
            if base.category == Category::Extension {
                return None;
            }
            stack_key_of(tables, base)
        }
        _ => None,
    }
}

/// Group stacked tables by (category, side), sorted left-outer to
/// right-outer. Within a stack, better connected tables come first.
pub fn group_into_stacks(tables: &BTreeMap<String, Table>) -> Vec<Stack> {
    let mut grouped: IndexMap<StackKey, Vec<&Table>> = IndexMap::new();

    for table in tables.values() {
        if let Some(key) = stack_key_of(tables, table) {
            grouped.entry(key).or_default().push(table);
        }
    }

    let mut stacks: Vec<Stack> = grouped
        .into_iter()
        .map(|(key, mut members)| {
            members.sort_by(|a, b| b.degree().cmp(&a.degree()).then_with(|| a.name.cmp(&b.name)));
            Stack {
                key,
                tables: members.into_iter().map(|t| t.name.clone()).collect(),
            }
        })
        .collect();

    stacks.sort_by_key(|s| s.key.column_rank());
    stacks
}

/// Width of a stack: its widest table.
pub fn stack_width(stack: &Stack, table_sizes: &HashMap<String, (f64, f64)>) -> f64 {
    stack
        .tables
        .iter()
        .filter_map(|name| table_sizes.get(name))
        .map(|&(w, _)| w)
        .fold(0.0, f64::max)
}

/// Left x of every stack, accumulated from the left margin.
pub fn stack_offsets(
    stacks: &[Stack],
    table_sizes: &HashMap<String, (f64, f64)>,
    margin_left: f64,
    stack_gap: f64,
) -> Vec<f64> {
    let mut x = margin_left;
    let mut offsets = Vec::with_capacity(stacks.len());

    for stack in stacks {
        offsets.push(x);
        x += stack_width(stack, table_sizes) + stack_gap;
    }

    offsets
}
