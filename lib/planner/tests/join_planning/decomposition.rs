use crate::test_utils::{fragment, pattern, shared, source, triples};
use rdf_federation_common::PlanningResult;
use rdf_federation_model::TripleUniverse;
use rdf_federation_planner::FederatedJoinPlanner;

/// `?a :p ?b . ?b :q ?c . ?x :r ?y`
fn two_part_universe() -> TripleUniverse {
    TripleUniverse::from_patterns([
        pattern("a", "p", "b"),
        pattern("b", "q", "c"),
        pattern("x", "r", "y"),
    ])
}

#[test]
fn test_independent_parts_are_joined() -> PlanningResult<()> {
    let universe = two_part_universe();
    let fragments = shared([
        fragment(&universe, "F1", &[0]),
        fragment(&universe, "F2", &[1]),
        fragment(&universe, "F3", &[2]),
    ]);

    let outcome =
        FederatedJoinPlanner::default().plan(&universe, &universe.full_set(), &fragments)?;

    assert_eq!(outcome.component_count(), 2);
    assert_eq!(outcome.plan().triples(), &universe.full_set());
    insta::assert_snapshot!(outcome.plan(), @r"
    Join
      Join
        Fragment: F1 {t0}
        Fragment: F2 {t1}
      Fragment: F3 {t2}
    ");
    Ok(())
}

#[test]
fn test_failing_part_degrades_alone() -> PlanningResult<()> {
    let universe = two_part_universe();
    let fragments = shared([
        fragment(&universe, "F1", &[0]),
        fragment(&universe, "F2", &[1]),
    ]);

    let outcome =
        FederatedJoinPlanner::default().plan(&universe, &universe.full_set(), &fragments)?;

    assert!(!outcome.is_empty());
    insta::assert_snapshot!(outcome.plan(), @r"
    Join
      Join
        Fragment: F1 {t0}
        Fragment: F2 {t1}
      Empty: {t2}
    ");
    Ok(())
}

#[test]
fn test_all_parts_failing_yields_single_empty_result() -> PlanningResult<()> {
    let universe = two_part_universe();

    let outcome = FederatedJoinPlanner::default().plan(&universe, &universe.full_set(), &[])?;

    insta::assert_snapshot!(outcome.plan(), @"Empty: {t0, t1, t2}");
    assert_eq!(
        outcome
            .diagnostics()
            .map(|diagnostics| diagnostics.unreachable_triples().clone()),
        Some(triples(&[0, 1, 2]))
    );
    Ok(())
}

#[test]
fn test_fragment_spanning_parts_joins_them() -> PlanningResult<()> {
    let universe = two_part_universe();
    let fragments = shared([
        fragment(&universe, "F1", &[0]),
        fragment(&universe, "F2", &[1]),
        fragment(&universe, "F3", &[2]),
        fragment(&universe, "F4", &[0, 2]),
    ]);

    let outcome =
        FederatedJoinPlanner::default().plan(&universe, &universe.full_set(), &fragments)?;

    assert_eq!(outcome.component_count(), 1);
    insta::assert_snapshot!(outcome.plan(), @r"
    Join
      Fragment: F2 {t1}
      Fragment: F4 {t0, t2}
    ");
    Ok(())
}

#[test]
fn test_exclusive_group_answers_independent_patterns() -> PlanningResult<()> {
    let universe =
        TripleUniverse::from_patterns([pattern("a", "p", "b"), pattern("x", "r", "y")]);
    let fragments = shared([fragment(&universe, "EG", &[0, 1]).with_source(source("dbpedia"))]);

    let outcome =
        FederatedJoinPlanner::default().plan(&universe, &universe.full_set(), &fragments)?;

    assert!(!outcome.is_empty());
    insta::assert_snapshot!(outcome.plan(), @"Fragment: EG {t0, t1} @dbpedia");
    Ok(())
}

#[test]
fn test_exclusive_group_next_to_independent_part() -> PlanningResult<()> {
    let universe = TripleUniverse::from_patterns([
        pattern("a", "p", "b"),
        pattern("x", "r", "y"),
        pattern("m", "s", "n"),
    ]);
    let fragments = shared([
        fragment(&universe, "EG", &[0, 1]),
        fragment(&universe, "F3", &[2]),
    ]);

    let outcome =
        FederatedJoinPlanner::default().plan(&universe, &universe.full_set(), &fragments)?;

    insta::assert_snapshot!(outcome.plan(), @r"
    Join
      Fragment: EG {t0, t1}
      Fragment: F3 {t2}
    ");
    Ok(())
}
