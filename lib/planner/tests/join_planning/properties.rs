use crate::test_utils::{chain_universe, fragment, shared};
use proptest::prelude::*;
use rdf_federation_model::{Fragment, TripleId, TripleSet, Variable};
use rdf_federation_planner::{
    group_fragments, FederatedJoinPlanner, GraphNode, JoinComponent, JoinGraph, NodeSet,
    PathSearch, PlannerConfig, SharedVariableValidity,
};
use std::sync::Arc;

const CHAIN_LENGTH: u32 = 5;
const QUERY_SIZE: u32 = 4;
static VARIABLES: [&str; 5] = ["a", "b", "c", "d", "e"];

/// A node given by bit masks over the query triples, the result variables and the input
/// variables. Inputs are only drawn from the first two variables.
fn random_node() -> impl Strategy<Value = (u32, u32, u32)> {
    (1..(1u32 << QUERY_SIZE), 0..(1u32 << VARIABLES.len()), 0..4u32)
}

fn build_node(index: usize, (triples, results, inputs): (u32, u32, u32)) -> GraphNode {
    let select = |mask: u32| {
        VARIABLES
            .iter()
            .enumerate()
            .filter(move |(i, _)| (mask >> i) & 1 == 1)
            .map(|(_, name)| Variable::new_unchecked(*name))
    };
    GraphNode::new(Arc::new(
        Fragment::new(
            format!("N{index}"),
            (0..QUERY_SIZE)
                .filter(|i| (triples >> i) & 1 == 1)
                .map(TripleId::new)
                .collect(),
        )
        .with_result_variables(select(results))
        .with_input_variables(select(inputs)),
    ))
}

fn inputs_are_bound(graph: &JoinGraph, nodes: &NodeSet) -> bool {
    nodes.iter().all(|node| {
        graph.node(node).is_some_and(|graph_node| {
            graph_node.input_variables().iter().all(|input| {
                nodes
                    .iter()
                    .filter(|other| *other != node)
                    .filter_map(|other| graph.node(other))
                    .any(|other| other.result_variables().contains(input))
            })
        })
    })
}

/// Enumerates every node set that is a valid join component of `query`.
fn all_components(graph: &JoinGraph, query: &TripleSet) -> Vec<Vec<usize>> {
    let mut result = Vec::new();
    for mask in 1usize..(1 << graph.len()) {
        let nodes = (0..graph.len())
            .filter(|i| (mask >> i) & 1 == 1)
            .collect::<NodeSet>();
        let component = JoinComponent::new(nodes.clone(), graph.triples_of(&nodes));
        if component.triples() == query
            && component.is_connected(graph)
            && component.is_minimal(graph)
            && inputs_are_bound(graph, &nodes)
        {
            result.push(nodes.iter().collect());
        }
    }
    result.sort();
    result
}

/// A fragment matching the triples `start..start + length` of the chain.
fn range() -> impl Strategy<Value = (u32, u32)> {
    (0..CHAIN_LENGTH).prop_flat_map(|start| (Just(start), 1..=(CHAIN_LENGTH - start).min(3)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn components_are_minimal_connected_and_covering(
        ranges in proptest::collection::vec(range(), 1..8)
    ) {
        let universe = chain_universe(CHAIN_LENGTH as usize);
        let query = universe.full_set();
        let fragments = shared(ranges.iter().enumerate().map(|(i, (start, length))| {
            let ids = (*start..start + length).collect::<Vec<_>>();
            fragment(&universe, &format!("F{i}"), &ids)
        }));

        let graph = JoinGraph::build(group_fragments(&fragments), &SharedVariableValidity);
        let config = PlannerConfig::default();
        let outcome = PathSearch::new(&graph, &query, &config).run();

        for component in &outcome.components {
            prop_assert_eq!(component.triples(), &query);
            prop_assert!(component.is_covering(&graph));
            prop_assert!(component.is_minimal(&graph));
            prop_assert!(component.is_connected(&graph));
        }

        let plan = FederatedJoinPlanner::default()
            .plan(&universe, &query, &fragments)
            .map_err(|error| TestCaseError::fail(error.to_string()))?;
        prop_assert_eq!(plan.is_empty(), outcome.components.is_empty());
        prop_assert_eq!(plan.plan().triples(), &query);
    }

    #[test]
    fn search_finds_every_component(nodes in proptest::collection::vec(random_node(), 2..=6)) {
        let graph = JoinGraph::build(
            nodes.into_iter().enumerate().map(|(i, node)| build_node(i, node)).collect(),
            &SharedVariableValidity,
        );
        let query = (0..QUERY_SIZE).map(TripleId::new).collect::<TripleSet>();
        let config = PlannerConfig::default();

        let outcome = PathSearch::new(&graph, &query, &config).run();
        let mut found = outcome
            .components
            .iter()
            .map(|component| component.nodes().iter().collect::<Vec<_>>())
            .collect::<Vec<_>>();
        found.sort();

        prop_assert_eq!(found, all_components(&graph, &query));
    }
}
