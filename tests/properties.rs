use std::collections::{BTreeMap, BTreeSet, HashMap};

use proptest::prelude::*;

use erdarrange::ir::{ModelIR, RelationshipIR, TableIR};
use erdarrange::layout::chains::reorder_stack;
use erdarrange::layout::graph::build_graph;
use erdarrange::layout::{Category, LayoutConfig, LayoutEngine, LayoutResult};

const NAMES: &[&str] = &[
    "Sales", "Orders", "Product", "Customer", "Store", "Date", "Region", "Category", "Supplier",
    "Budget", "Promotion", "Employee",
];

fn model_strategy() -> impl Strategy<Value = ModelIR> {
    (1..=NAMES.len()).prop_flat_map(|n| {
        let tables = proptest::collection::vec(
            (any::<bool>(), any::<bool>()),
            n,
        );
        let relationships = proptest::collection::vec((0..n, 0..n, prop::bool::weighted(0.2)), 0..n * 2);
        (tables, relationships).prop_map(move |(fields, rels)| ModelIR {
            tables: NAMES[..n]
                .iter()
                .zip(fields)
                .map(|(name, (stored, calculated))| {
                    let mut t = TableIR::new(*name);
                    if stored {
                        t = t.with_field("Id");
                    }
                    if calculated {
                        t = t.with_calculated_field("Total");
                    }
                    t
                })
                .collect(),
            relationships: rels
                .into_iter()
                .map(|(from, to, one_to_one)| {
                    let rel = RelationshipIR::new(NAMES[from], NAMES[to]);
                    if one_to_one { rel.one_to_one() } else { rel }
                })
                .collect(),
            ..ModelIR::default()
        })
    })
}

fn arrange(model: &ModelIR) -> LayoutResult {
    LayoutEngine::default().layout(model).unwrap()
}

proptest! {
    #[test]
    fn every_table_is_placed_once(model in model_strategy()) {
        let result = arrange(&model);
        let placed: BTreeSet<&str> = result.positions.iter().map(|p| p.table.as_str()).collect();

        prop_assert_eq!(placed.len(), result.positions.len());
        prop_assert_eq!(placed.len(), model.tables.len());
        prop_assert!(result.tables.values().all(|t| t.category != Category::Excluded));
    }

    #[test]
    fn graph_is_symmetric(model in model_strategy()) {
        let known: BTreeSet<String> = model.tables.iter().map(|t| t.name.clone()).collect();
        let graph = build_graph(&model.relationships, &known, &BTreeSet::new(), &mut Vec::new());

        for a in graph.tables() {
            for b in graph.neighbors(a) {
                prop_assert!(graph.neighbors(b).contains(a));
            }
        }
    }

    #[test]
    fn layout_is_deterministic(model in model_strategy()) {
        let first = serde_json::to_string(&arrange(&model).output()).unwrap();
        let second = serde_json::to_string(&arrange(&model).output()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn table_order_does_not_change_roles(
        (model, shuffled) in model_strategy().prop_flat_map(|m| {
            let tables = m.tables.clone();
            (Just(m), Just(tables).prop_shuffle())
        })
    ) {
        let reordered = ModelIR { tables: shuffled, ..model.clone() };
        let roles = |r: &LayoutResult| -> BTreeMap<String, _> {
            r.tables
                .values()
                .map(|t| (t.name.clone(), (t.category, t.level, t.side, t.base.clone())))
                .collect()
        };
        prop_assert_eq!(roles(&arrange(&model)), roles(&arrange(&reordered)));
    }

    #[test]
    fn stacked_tables_keep_minimum_gap(model in model_strategy()) {
        let result = arrange(&model);
        let gap = LayoutConfig::default().table_gap;

        for stack in &result.stacks {
            for pair in stack.tables.windows(2) {
                let upper = result.position(&pair[0]).unwrap();
                let lower = result.position(&pair[1]).unwrap();
                prop_assert_eq!(upper.x, lower.x);
                prop_assert!(lower.y - upper.bottom() >= gap - 1e-9);
            }
        }
    }

    #[test]
    fn extensions_directly_follow_base(model in model_strategy()) {
        let result = arrange(&model);

        for table in result.tables.values().filter(|t| t.category == Category::Extension) {
            let base = table.base.as_deref().unwrap();
            let stack = result
                .stacks
                .iter()
                .find(|s| s.tables.contains(&table.name))
                .unwrap();
            let base_idx = stack.tables.iter().position(|t| t == base).unwrap();
            let ext_idx = stack.tables.iter().position(|t| *t == table.name).unwrap();

            prop_assert!(ext_idx > base_idx);
            for between in &stack.tables[base_idx + 1..ext_idx] {
                prop_assert_eq!(result.tables[between].base.as_deref(), Some(base));
            }
        }
    }

    #[test]
    fn reorder_is_idempotent(
        heights in proptest::collection::vec(40.0..200.0f64, 1..8),
        reserved in proptest::collection::vec(prop::option::weighted(0.3, 0.0..600.0f64), 8),
    ) {
        let order: Vec<String> = (0..heights.len()).map(|i| format!("T{i}")).collect();
        let sizes: HashMap<String, (f64, f64)> = order
            .iter()
            .zip(&heights)
            .map(|(n, h)| (n.clone(), (180.0, *h)))
            .collect();
        let reservations: HashMap<String, f64> = order
            .iter()
            .zip(&reserved)
            .filter_map(|(n, off)| off.map(|o| (n.clone(), o)))
            .collect();

        let once = reorder_stack(&order, &reservations, &sizes, 30.0);
        let twice = reorder_stack(&once, &reservations, &sizes, 30.0);

        let mut sorted = once.clone();
        sorted.sort();
        let mut expected = order.clone();
        expected.sort();
        prop_assert_eq!(sorted, expected);
        prop_assert_eq!(once, twice);
    }
}
