use proptest::prelude::*;
use txcode_traces::{
    build_traces, NearestNeighborBuilder, Spot, SpotAttributes, SpotFindingResults, TraceBuilder,
    TraceBuildingStrategy,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Three rounds, two channels. Anchor round 1 holds two spots; round 0 has a
/// close match for the first and a far detection; round 2 matches the second.
fn jittered_results() -> SpotFindingResults {
    let mut results = SpotFindingResults::new(vec![0, 1, 2], vec![0, 1]).unwrap();
    results
        .insert(0, 0, vec![Spot::new(11.0, 10.0, 3.0)])
        .unwrap();
    results
        .insert(0, 1, vec![Spot::new(80.0, 80.0, 9.0)])
        .unwrap();
    results
        .insert(1, 0, vec![Spot::new(10.0, 10.0, 5.0)])
        .unwrap();
    results
        .insert(1, 1, vec![Spot::new(50.0, 50.0, 6.0)])
        .unwrap();
    results.insert(2, 0, Vec::<Spot>::new()).unwrap();
    results
        .insert(2, 1, vec![Spot::new(52.0, 51.0, 7.0)])
        .unwrap();
    results
}

#[test]
fn defaults_anchor_on_round_one_with_three_pixels() {
    let builder = NearestNeighborBuilder::default();
    assert_eq!(builder.anchor_round, 1);
    assert_eq!(builder.search_radius, 3.0);
}

#[test]
fn anchor_spots_seed_features_and_pull_close_matches() {
    init_logging();
    let table = NearestNeighborBuilder::default()
        .build(&jittered_results())
        .unwrap();
    assert_eq!(table.n_features(), 2);
    assert_eq!(table.attributes()[0].x, 10.0);
    assert_eq!(table.attributes()[1].x, 50.0);

    assert_eq!(table.intensity(0, 1, 0).unwrap(), 5.0);
    assert_eq!(table.intensity(0, 0, 0).unwrap(), 3.0);
    assert_eq!(table.intensity(0, 2, 1).unwrap(), 0.0);

    assert_eq!(table.intensity(1, 1, 1).unwrap(), 6.0);
    // sqrt(5) pixels away, inside the default radius
    assert_eq!(table.intensity(1, 2, 1).unwrap(), 7.0);
    // the far detection in round 0 is never claimed
    assert_eq!(table.intensity(1, 0, 1).unwrap(), 0.0);
}

#[test]
fn radius_bounds_matches() {
    let strict = NearestNeighborBuilder::new(1, 1.5);
    let table = strict.build(&jittered_results()).unwrap();
    assert_eq!(table.intensity(0, 0, 0).unwrap(), 3.0);
    assert_eq!(table.intensity(1, 2, 1).unwrap(), 0.0);
}

#[test]
fn missing_anchor_round_fails() {
    let builder = NearestNeighborBuilder::new(5, 3.0);
    let err = builder.build(&jittered_results()).unwrap_err();
    assert_eq!(err.code(), "anchor-round-missing");
    assert_eq!(err.info().context["anchor_round"], "5");
}

#[test]
fn negative_radius_is_rejected() {
    let err = NearestNeighborBuilder::new(1, -1.0)
        .build(&jittered_results())
        .unwrap_err();
    assert_eq!(err.code(), "invalid-search-radius");
}

#[test]
fn strategy_deserializes_with_defaults() {
    let strategy: TraceBuildingStrategy =
        serde_json::from_str(r#"{"strategy": "nearest_neighbor", "search_radius": 1.5}"#).unwrap();
    assert_eq!(
        strategy,
        TraceBuildingStrategy::NearestNeighbor(NearestNeighborBuilder::new(1, 1.5))
    );
    let table = build_traces(&jittered_results(), &strategy).unwrap();
    assert_eq!(table.intensity(1, 2, 1).unwrap(), 0.0);
}

fn grid_results(offsets: &[(f64, f64)]) -> SpotFindingResults {
    let anchors: Vec<Spot> = (0..offsets.len())
        .map(|i| Spot::new(20.0 * i as f64, 0.0, 1.0))
        .collect();
    let shifted: Vec<Spot> = anchors
        .iter()
        .zip(offsets)
        .map(|(s, (dx, dy))| Spot::new(s.x + dx, s.y + dy, 2.0))
        .collect();
    SpotFindingResults::from_tables([
        ((0, 0), SpotAttributes::new(anchors)),
        ((1, 0), SpotAttributes::new(shifted)),
    ])
}

proptest! {
    #[test]
    fn jitter_within_radius_always_matches(
        offsets in prop::collection::vec((-2.0f64..2.0, -2.0f64..2.0), 1..20)
    ) {
        let results = grid_results(&offsets);
        let table = NearestNeighborBuilder::new(0, 3.0).build(&results).unwrap();
        prop_assert_eq!(table.n_features(), offsets.len());
        for feature in 0..offsets.len() {
            prop_assert_eq!(table.intensity(feature, 0, 0).unwrap(), 1.0);
            prop_assert_eq!(table.intensity(feature, 1, 0).unwrap(), 2.0);
        }
    }
}

#[test]
fn non_finite_coordinates_are_rejected_even_with_unbounded_radius() {
    let mut results = SpotFindingResults::new(vec![0, 1], vec![0]).unwrap();
    results
        .insert(0, 0, vec![Spot::new(f64::NAN, 0.0, 1.0)])
        .unwrap();
    results
        .insert(1, 0, vec![Spot::new(0.0, 0.0, 2.0), Spot::new(5.0, 0.0, 2.0)])
        .unwrap();
    assert_eq!(results.total_spots(), 3);

    let err = NearestNeighborBuilder::new(0, f64::INFINITY)
        .build(&results)
        .unwrap_err();
    assert_eq!(err.code(), "non-finite-coordinate");
    assert_eq!(err.info().context["round"], "0");
    assert_eq!(err.info().context["spot"], "0");
}

#[test]
fn unbounded_radius_matches_every_anchor() {
    let table = NearestNeighborBuilder::new(1, f64::INFINITY)
        .build(&jittered_results())
        .unwrap();
    // the far round-0 detection is now the closest one for the second anchor
    assert_eq!(table.intensity(1, 0, 1).unwrap(), 9.0);
    assert_eq!(table.intensity(0, 2, 1).unwrap(), 7.0);
}
