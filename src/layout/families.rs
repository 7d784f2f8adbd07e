//! Keeps 1:1 extension tables directly below their base table.

use std::collections::{BTreeMap, HashMap, HashSet};

use super::types::{Category, Family, Stack, Table};

/// Collect base -> extensions, both sorted by name.
pub fn collect_families(tables: &BTreeMap<String, Table>) -> Vec<Family> {
    let mut by_base: BTreeMap<&str, Vec<String>> = BTreeMap::new();

    for table in tables.values() {
        if table.category != Category::Extension {
            continue;
        }
        if let Some(base) = table.base.as_deref() {
            by_base.entry(base).or_default().push(table.name.clone());
        }
    }

    by_base
        .into_iter()
        .map(|(base, mut extensions)| {
            extensions.sort();
            Family {
                base: base.to_string(),
                extensions,
            }
        })
        .collect()
}

/// Reorder every stack so each base is immediately followed by its
/// extensions.
pub fn group_families(stacks: &mut [Stack], families: &[Family]) {
    let by_base: HashMap<&str, &Family> = families.iter().map(|f| (f.base.as_str(), f)).collect();
    let base_of: HashMap<&str, &str> = families
        .iter()
        .flat_map(|f| f.extensions.iter().map(|e| (e.as_str(), f.base.as_str())))
        .collect();

    for stack in stacks.iter_mut() {
        let order = {
            let present: HashSet<&str> = stack.tables.iter().map(String::as_str).collect();
            let mut emitted: HashSet<&str> = HashSet::with_capacity(stack.tables.len());
            let mut order: Vec<String> = Vec::with_capacity(stack.tables.len());

            for name in &stack.tables {
                let name = name.as_str();
                if emitted.contains(name) {
                    continue;
                }
                // Extensions wait for their base when it is in this stack
                if base_of.get(name).is_some_and(|base| present.contains(base)) {
                    continue;
                }

                emitted.insert(name);
                order.push(name.to_string());

                if let Some(family) = by_base.get(name) {
                    for ext in &family.extensions {
                        let ext = ext.as_str();
                        if present.contains(ext) && emitted.insert(ext) {
                            order.push(ext.to_string());
                        }
                    }
                }
            }
            order
        };

        stack.tables = order;
    }
}
