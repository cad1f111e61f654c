//! Property tests for graph construction over random ledgers.

use proptest::prelude::*;
use std::collections::HashSet;
use trellis::domain::{Feature, FeatureId, InvocationMap, Scope};
use trellis::graph::{ConflictPolicy, FeatureForest, ScopeGraph};

const MAX_FEATURES: usize = 10;

/// Feature `i` declares `F{i}()`; features with an odd index also declare
/// `F{i}.Alt()`. Targets past the catalog become unmapped signatures.
fn build_inputs(count: usize, edges: &[(usize, bool, usize)]) -> (Vec<Feature>, InvocationMap) {
    let catalog = (0..count)
        .map(|i| {
            let mut signatures = vec![format!("F{i}()")];
            if i % 2 == 1 {
                signatures.push(format!("F{i}.Alt()"));
            }
            Feature::new(FeatureId::new("P", "", format!("F{i}"), "1"), signatures)
        })
        .collect();

    let mut invocations = InvocationMap::new();
    for &(from, alt, to) in edges {
        let from = from % count;
        let caller = if alt && from % 2 == 1 {
            format!("F{from}.Alt()")
        } else {
            format!("F{from}()")
        };
        let callee = if to < count {
            format!("F{to}()")
        } else {
            format!("Ghost{to}()")
        };
        invocations.entry(caller).or_default().push(callee);
    }
    (catalog, invocations)
}

fn scope_graph<'a>(catalog: &'a [Feature], invocations: &InvocationMap) -> ScopeGraph<'a> {
    ScopeGraph::new(
        catalog,
        &Scope::new("P", "1"),
        invocations,
        ConflictPolicy::FirstWins,
    )
    .expect("distinct signatures never conflict")
}

fn describe(forest: &FeatureForest) -> Vec<(String, Vec<String>, Vec<String>)> {
    forest
        .arena()
        .nodes()
        .map(|n| {
            (
                n.feature().title.clone(),
                n.depends_on().map(|c| c.feature().title.clone()).collect(),
                n.dependants().map(|c| c.feature().title.clone()).collect(),
            )
        })
        .collect()
}

fn arb_inputs() -> impl Strategy<Value = (usize, Vec<(usize, bool, usize)>)> {
    (1..=MAX_FEATURES).prop_flat_map(|count| {
        (
            Just(count),
            prop::collection::vec(
                (0..MAX_FEATURES, any::<bool>(), 0..MAX_FEATURES + 3),
                0..40,
            ),
        )
    })
}

proptest! {
    #[test]
    fn roots_are_exactly_the_features_without_dependents((count, edges) in arb_inputs()) {
        let (catalog, invocations) = build_inputs(count, &edges);
        let graph = scope_graph(&catalog, &invocations);

        let expected: Vec<&FeatureId> = catalog
            .iter()
            .filter(|f| graph.direct_dependents(&f.id).unwrap().is_empty())
            .map(|f| &f.id)
            .collect();
        let forest = graph.top_level_graphs();
        let roots: Vec<&FeatureId> = forest.roots().map(|r| r.feature()).collect();

        prop_assert_eq!(roots, expected);
    }

    #[test]
    fn dependencies_and_dependents_mirror_each_other((count, edges) in arb_inputs()) {
        let (catalog, invocations) = build_inputs(count, &edges);
        let graph = scope_graph(&catalog, &invocations);

        for a in &catalog {
            let deps = graph.direct_dependencies(&a.id).unwrap();
            let unique: HashSet<&FeatureId> = deps.iter().map(|f| &f.id).collect();
            prop_assert_eq!(unique.len(), deps.len());
            prop_assert!(!unique.contains(&a.id));

            for b in &catalog {
                let forward = unique.contains(&b.id);
                let backward = graph
                    .direct_dependents(&b.id)
                    .unwrap()
                    .iter()
                    .any(|f| f.id == a.id);
                prop_assert_eq!(forward, backward);
            }
        }
    }

    #[test]
    fn feature_graphs_materialize_each_feature_once((count, edges) in arb_inputs()) {
        let (catalog, invocations) = build_inputs(count, &edges);
        let graph = scope_graph(&catalog, &invocations);

        for feature in &catalog {
            let result = graph.feature_graph(&feature.id).unwrap();
            let arena = result.arena();

            let ids: HashSet<&FeatureId> = arena.nodes().map(|n| n.feature()).collect();
            prop_assert_eq!(ids.len(), arena.len());
            prop_assert!(arena.len() <= catalog.len());

            for node in arena.nodes() {
                let deps = graph.direct_dependencies(node.feature()).unwrap();
                let dependents = graph.direct_dependents(node.feature()).unwrap();
                let node_deps: Vec<&FeatureId> = node.depends_on().map(|c| c.feature()).collect();
                let node_dependents: Vec<&FeatureId> =
                    node.dependants().map(|c| c.feature()).collect();
                prop_assert_eq!(node_deps, deps.iter().map(|f| &f.id).collect::<Vec<_>>());
                prop_assert_eq!(
                    node_dependents,
                    dependents.iter().map(|f| &f.id).collect::<Vec<_>>()
                );
            }
        }
    }

    #[test]
    fn construction_is_deterministic((count, edges) in arb_inputs()) {
        let (catalog, invocations) = build_inputs(count, &edges);

        let first = describe(&scope_graph(&catalog, &invocations).top_level_graphs());
        let second = describe(&scope_graph(&catalog, &invocations).top_level_graphs());

        prop_assert_eq!(first, second);
    }
}
