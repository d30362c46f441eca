use crate::test_utils::{
    chain_universe, fragment, fragment_with_results, init_tracing, shared, source, triples,
    variables,
};
use rdf_federation_common::PlanningResult;
use rdf_federation_model::{Fragment, TripleUniverse};
use rdf_federation_planner::{FederatedJoinPlanner, NoAlternatives, PlannerConfig};
use std::sync::Arc;

#[test]
fn test_bridge_fragment_is_kept() -> PlanningResult<()> {
    init_tracing();
    let universe = chain_universe(4);
    let fragments = shared([
        fragment_with_results("F1", &[0, 1], &["v0", "v1"]),
        fragment_with_results("F2", &[1, 2], &["v1", "v2", "v3"]),
        fragment_with_results("F3", &[2, 3], &["v3", "v4"]),
    ]);

    let outcome =
        FederatedJoinPlanner::default().plan(&universe, &universe.full_set(), &fragments)?;

    assert_eq!(outcome.component_count(), 1);
    insta::assert_snapshot!(outcome.plan(), @r"
    Join
      Join
        Fragment: F1 {t0, t1}
        Fragment: F2 {t1, t2}
      Fragment: F3 {t2, t3}
    ");
    Ok(())
}

#[test]
fn test_overlapping_fragment_is_dropped_if_ends_are_joinable() -> PlanningResult<()> {
    let universe = chain_universe(4);
    let fragments = shared([
        fragment(&universe, "F1", &[0, 1]),
        fragment(&universe, "F2", &[1, 2]),
        fragment(&universe, "F3", &[2, 3]),
    ]);

    let outcome =
        FederatedJoinPlanner::default().plan(&universe, &universe.full_set(), &fragments)?;

    insta::assert_snapshot!(outcome.plan(), @r"
    Join
      Fragment: F1 {t0, t1}
      Fragment: F3 {t2, t3}
    ");
    Ok(())
}

#[test]
fn test_identical_interfaces_are_grouped() -> PlanningResult<()> {
    let universe = chain_universe(1);
    let fragments = shared([
        fragment(&universe, "F1", &[0]).with_source(source("dbpedia")),
        fragment(&universe, "F2", &[0]).with_source(source("wikidata")),
    ]);

    let outcome =
        FederatedJoinPlanner::default().plan(&universe, &universe.full_set(), &fragments)?;

    assert_eq!(outcome.component_count(), 1);
    insta::assert_snapshot!(outcome.plan(), @r"
    Union
      Fragment: F1 {t0} @dbpedia
      Fragment: F2 {t0} @wikidata
    ");
    Ok(())
}

#[test]
fn test_unresolved_inputs() -> PlanningResult<()> {
    let universe = chain_universe(1);
    let fragments =
        shared([fragment(&universe, "F1", &[0]).with_input_variables(variables(&["v1"]))]);

    let outcome =
        FederatedJoinPlanner::default().plan(&universe, &universe.full_set(), &fragments)?;

    assert!(outcome.is_empty());
    insta::assert_snapshot!(outcome.plan(), @"Empty: {t0}");
    let report = outcome
        .diagnostics()
        .map(|diagnostics| diagnostics.describe(&universe))
        .unwrap_or_default();
    insta::assert_snapshot!(report, @"Unbound inputs ?v1 of [F1]");
    Ok(())
}

#[test]
fn test_inputs_bound_by_other_fragment() -> PlanningResult<()> {
    let universe = chain_universe(2);
    let fragments = shared([
        fragment(&universe, "F1", &[0]).with_input_variables(variables(&["v1"])),
        fragment(&universe, "F2", &[1]),
    ]);

    let outcome =
        FederatedJoinPlanner::default().plan(&universe, &universe.full_set(), &fragments)?;

    insta::assert_snapshot!(outcome.plan(), @r"
    Join
      Fragment: F1 {t0}
      Fragment: F2 {t1}
    ");
    Ok(())
}

#[test]
fn test_insufficient_coverage_embeds_full_query() -> PlanningResult<()> {
    let universe = chain_universe(3);
    let fragments = shared([
        fragment(&universe, "F1", &[0]),
        fragment(&universe, "F2", &[1]),
    ]);

    let outcome =
        FederatedJoinPlanner::default().plan(&universe, &universe.full_set(), &fragments)?;

    insta::assert_snapshot!(outcome.plan(), @"Empty: {t0, t1, t2}");
    assert_eq!(
        outcome
            .diagnostics()
            .map(|diagnostics| diagnostics.unreachable_triples().clone()),
        Some(triples(&[2]))
    );
    Ok(())
}

#[test]
fn test_alternative_sources_are_deduplicated() -> PlanningResult<()> {
    let universe = chain_universe(2);
    let fragments = shared([
        fragment_with_results("A", &[0], &["v0", "v1"]).with_source(source("dbpedia")),
        fragment_with_results("A'", &[0], &["v1"]).with_source(source("dbpedia")),
        fragment(&universe, "B", &[1]).with_source(source("wikidata")),
    ]);

    let deduplicated =
        FederatedJoinPlanner::default().plan(&universe, &universe.full_set(), &fragments)?;
    insta::assert_snapshot!(deduplicated.plan(), @r"
    Join
      Fragment: A {t0} @dbpedia
      Fragment: B {t1} @wikidata
    ");

    let all = FederatedJoinPlanner::default()
        .with_alternative_sources(Arc::new(NoAlternatives))
        .plan(&universe, &universe.full_set(), &fragments)?;
    insta::assert_snapshot!(all.plan(), @r"
    Union
      Join
        Fragment: A {t0} @dbpedia
        Fragment: B {t1} @wikidata
      Join
        Fragment: A' {t0} @dbpedia
        Fragment: B {t1} @wikidata
    ");
    Ok(())
}

#[test]
fn test_implicit_optional_join() -> PlanningResult<()> {
    let universe = chain_universe(2);
    let fragments = shared([
        fragment(&universe, "F1", &[0]).with_optional(true),
        fragment(&universe, "F2", &[1]).with_optional(true),
    ]);

    let outcome =
        FederatedJoinPlanner::default().plan(&universe, &universe.full_set(), &fragments)?;

    insta::assert_snapshot!(outcome.plan(), @r"
    Join (implicit optional)
      Fragment: F1 {t0} optional
      Fragment: F2 {t1} optional
    ");
    Ok(())
}

#[test]
fn test_empty_query() -> PlanningResult<()> {
    let universe = chain_universe(1);

    let outcome = FederatedJoinPlanner::default().plan(&universe, &triples(&[]), &[])?;

    assert!(outcome.is_empty());
    insta::assert_snapshot!(outcome.plan(), @"Empty: {}");
    Ok(())
}

#[test]
fn test_no_fragments() -> PlanningResult<()> {
    let universe = chain_universe(2);

    let outcome = FederatedJoinPlanner::default().plan(&universe, &universe.full_set(), &[])?;

    insta::assert_snapshot!(outcome.plan(), @"Empty: {t0, t1}");
    assert_eq!(
        outcome
            .diagnostics()
            .map(|diagnostics| diagnostics.unreachable_triples().clone()),
        Some(universe.full_set())
    );
    Ok(())
}

#[test]
fn test_fragment_outside_query_is_an_error() {
    let universe = chain_universe(2);
    let fragments = shared([fragment(&universe, "F1", &[0, 1])]);

    let error = FederatedJoinPlanner::default()
        .plan(&universe, &triples(&[0]), &fragments)
        .err()
        .map(|error| error.to_string());

    assert_eq!(
        error.as_deref(),
        Some("The fragment F1 claims the triples {t1} that are not part of the query")
    );
}

#[test]
fn test_query_outside_universe_is_an_error() {
    let universe = chain_universe(1);

    let error = FederatedJoinPlanner::default()
        .plan(&universe, &triples(&[0, 4]), &[])
        .err()
        .map(|error| error.to_string());

    assert_eq!(
        error.as_deref(),
        Some("The query refers to the triples {t4} that are not part of the triple universe")
    );
}

#[test]
fn test_planning_is_idempotent() -> PlanningResult<()> {
    let universe = chain_universe(4);
    let fragments = shared([
        fragment(&universe, "F1", &[0, 1]),
        fragment(&universe, "F2", &[1, 2]),
        fragment(&universe, "F3", &[2, 3]),
        fragment(&universe, "F4", &[3]),
        fragment(&universe, "F5", &[0]),
    ]);
    let planner = FederatedJoinPlanner::default();

    let first = planner.plan(&universe, &universe.full_set(), &fragments)?;
    let second = planner.plan(&universe, &universe.full_set(), &fragments)?;

    assert_eq!(first.plan().to_string(), second.plan().to_string());
    assert_eq!(first.component_count(), second.component_count());
    Ok(())
}

/// Single-triple and two-triple fragments along a chain of `length` triples.
fn tiled_chain(length: u32) -> (TripleUniverse, Vec<Arc<Fragment>>) {
    let universe = chain_universe(length as usize);
    let mut fragments = Vec::new();
    for i in 0..length {
        fragments.push(fragment(&universe, &format!("S{i}"), &[i]));
    }
    for i in 0..length - 1 {
        fragments.push(fragment(&universe, &format!("P{i}"), &[i, i + 1]));
    }
    (universe, shared(fragments))
}

#[test]
fn test_parallel_and_sequential_planning_agree() -> PlanningResult<()> {
    let (universe, fragments) = tiled_chain(6);
    let sequential_config = PlannerConfig::default().with_parallel_threshold(usize::MAX);
    let parallel_config = PlannerConfig::default().with_parallel_threshold(0);

    let sequential = FederatedJoinPlanner::new(sequential_config)
        .plan(&universe, &universe.full_set(), &fragments)?;
    let parallel = FederatedJoinPlanner::new(parallel_config)
        .plan(&universe, &universe.full_set(), &fragments)?;

    assert!(sequential.component_count() > 10);
    assert_eq!(sequential.component_count(), parallel.component_count());
    assert_eq!(sequential.plan().to_string(), parallel.plan().to_string());
    Ok(())
}

#[test]
fn test_tiny_memo_yields_same_plan() -> PlanningResult<()> {
    let (universe, fragments) = tiled_chain(4);
    let default =
        FederatedJoinPlanner::default().plan(&universe, &universe.full_set(), &fragments)?;
    let tiny = FederatedJoinPlanner::new(PlannerConfig::default().with_memo_capacity(1))
        .plan(&universe, &universe.full_set(), &fragments)?;

    assert_eq!(default.plan().to_string(), tiny.plan().to_string());
    Ok(())
}
