//! Integration test: pool lifecycle through the engine facade.
//!
//! Offers and requests enter with their locations, the matrix grows on
//! demand, edges stay consistent in both views, and oracle failures never
//! leave partial state behind.

use std::time::Duration;

use rand::{Rng, SeedableRng, rngs::StdRng};
use ridematch_core::MatchEngine;
use ridematch_matrix::TableOracle;
use ridematch_types::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn city_oracle() -> TableOracle {
    TableOracle::new()
        .with_symmetric_leg("A", "B", 1000, 600)
        .with_symmetric_leg("A", "C", 2000, 1200)
        .with_symmetric_leg("A", "D", 3000, 1800)
        .with_symmetric_leg("B", "C", 1500, 900)
        .with_symmetric_leg("B", "D", 2500, 1500)
        .with_symmetric_leg("C", "D", 1000, 600)
}

fn engine_with(oracle: TableOracle) -> MatchEngine<TableOracle> {
    MatchEngine::new(oracle, EngineConfig::default()).unwrap()
}

#[test]
fn worked_example_through_the_engine() {
    init_tracing();
    let mut engine = engine_with(city_oracle());
    engine
        .initialize(&["A", "B", "C", "D"].map(Location::dummy))
        .unwrap();

    let driver = engine.add_driver(RideOffer::dummy("A", "D")).unwrap();
    let rider = engine.add_rider(RideRequest::dummy("B", "C")).unwrap();

    let cost = engine.graph().pair_cost(driver, rider).unwrap();
    assert_eq!(cost.detour_from_src, 10.0);
    assert_eq!(cost.detour_from_dest, 10.0);
    assert_eq!(cost.excess_travel_time, 5.0);
    assert_eq!(cost.total_cost, 25.0);
    assert_eq!(engine.matrix().lookup(LocationIndex(0), LocationIndex(0)).unwrap(), TravelLeg::ZERO);
}

#[test]
fn re_adding_the_same_offer_creates_no_duplicate_edges() {
    init_tracing();
    let mut engine = engine_with(city_oracle());
    let rider = engine
        .add_with_location(RideRequest::dummy("B", "C").into())
        .unwrap();
    let offer = RideOffer::dummy("A", "D");
    let first = engine.add_with_location(offer.clone().into()).unwrap();
    let calls = engine.oracle().calls();
    let second = engine.add_with_location(offer.into()).unwrap();

    assert_eq!(first, second);
    assert_eq!(engine.oracle().calls(), calls);
    assert_eq!(engine.graph().edge_count(), 1);
    assert_eq!(engine.top_k(rider, 10).unwrap().len(), 1);
}

#[test]
fn rider_without_counterparts_has_empty_top_k() {
    init_tracing();
    let mut engine = engine_with(city_oracle());
    let rider = engine
        .add_with_location(RideRequest::dummy("B", "C").into())
        .unwrap();
    assert!(engine.top_k(rider, 3).unwrap().is_empty());
}

#[test]
fn removal_clears_both_views() {
    init_tracing();
    let mut engine = engine_with(city_oracle());
    let d1 = engine
        .add_with_location(RideOffer::dummy("A", "D").into())
        .unwrap();
    let d2 = engine
        .add_with_location(RideOffer::dummy("B", "D").into())
        .unwrap();
    let r = engine
        .add_with_location(RideRequest::dummy("B", "C").into())
        .unwrap();

    let removed = engine.remove_node(d1).unwrap();
    assert_eq!(removed.role(), NodeRole::Driver);
    assert!(engine.graph().check_consistency());
    let counterparts: Vec<NodeRef> = engine
        .top_k(r, 10)
        .unwrap()
        .into_iter()
        .map(|edge| edge.counterpart)
        .collect();
    assert_eq!(counterparts, vec![d2]);

    let err = engine.remove_node(d1).unwrap_err();
    assert!(matches!(err, RidematchError::NodeNotFound(_)));
    assert!(matches!(
        engine.top_k(d1, 1).unwrap_err(),
        RidematchError::NodeNotFound(_)
    ));
}

#[test]
fn oracle_failure_leaves_pool_and_matrix_unchanged() {
    init_tracing();
    let mut engine = engine_with(city_oracle());
    engine
        .add_with_location(RideOffer::dummy("A", "D").into())
        .unwrap();
    let before_len = engine.matrix().len();
    let before_digest = engine.digest();

    engine.oracle().fail_next(1);
    let request = RideRequest::dummy("B", "C");
    let err = engine.add_with_location(request.clone().into()).unwrap_err();
    assert!(matches!(err, RidematchError::OracleFailure { .. }));
    assert!(err.is_retryable());
    assert_eq!(engine.matrix().len(), before_len);
    assert!(!engine.matrix().contains(&Location::dummy("B")));
    assert_eq!(engine.digest(), before_digest);

    // Retrying the same call succeeds.
    engine.add_with_location(request.into()).unwrap();
    assert_eq!(engine.graph().edge_count(), 1);
}

#[test]
fn slow_oracle_times_out() {
    init_tracing();
    let config = EngineConfig::from_json_str(r#"{ "oracle_timeout_ms": 5 }"#).unwrap();
    let mut engine = MatchEngine::new(city_oracle(), config).unwrap();
    engine
        .add_with_location(RideOffer::dummy("A", "A").into())
        .unwrap();

    engine.oracle().set_delay(Some(Duration::from_millis(50)));
    let err = engine
        .add_with_location(RideRequest::dummy("B", "C").into())
        .unwrap_err();
    assert!(matches!(err, RidematchError::OracleTimeout { timeout_ms: 5, .. }));
    assert_eq!(engine.matrix().len(), 1);
    assert_eq!(engine.graph().rider_count(), 0);
}

#[test]
fn mirrored_config_from_json() {
    init_tracing();
    let config = EngineConfig::from_json_str(r#"{ "extension_mode": "mirrored" }"#).unwrap();
    assert_eq!(config.oracle_timeout_ms, constants::DEFAULT_ORACLE_TIMEOUT_MS);
    let mut engine = MatchEngine::new(city_oracle(), config).unwrap();
    engine
        .add_with_location(RideOffer::dummy("A", "D").into())
        .unwrap();
    engine
        .add_with_location(RideRequest::dummy("B", "C").into())
        .unwrap();
    assert!(engine.matrix().is_symmetric());
    assert_eq!(engine.graph().edge_count(), 1);
}

#[test]
fn asymmetric_travel_times_are_exact_in_directed_mode() {
    init_tracing();
    let oracle = TableOracle::new()
        .with_leg("A", "B", 1000, 600)
        .with_leg("B", "A", 1000, 900)
        .with_symmetric_leg("A", "D", 3000, 1800)
        .with_symmetric_leg("B", "C", 1500, 900)
        .with_symmetric_leg("C", "D", 1000, 600);
    let mut engine = engine_with(oracle);
    let d = engine
        .add_with_location(RideOffer::dummy("A", "D").into())
        .unwrap();
    let r = engine
        .add_with_location(RideRequest::dummy("B", "C").into())
        .unwrap();

    let a = engine.matrix().index_of(&Location::dummy("A")).unwrap();
    let b = engine.matrix().index_of(&Location::dummy("B")).unwrap();
    assert_eq!(engine.matrix().lookup(a, b).unwrap().duration_seconds, 600);
    assert_eq!(engine.matrix().lookup(b, a).unwrap().duration_seconds, 900);
    let cost = engine
        .graph()
        .pair_cost(d.as_driver().unwrap(), r.as_rider().unwrap())
        .unwrap();
    assert_eq!(cost.total_cost, 25.0);
}

#[test]
fn random_churn_keeps_views_consistent() {
    init_tracing();
    let names = ["A", "B", "C", "D"];
    let mut rng = StdRng::seed_from_u64(7);
    let mut engine = engine_with(city_oracle());
    let mut live: Vec<NodeRef> = Vec::new();

    for _ in 0..200 {
        if !live.is_empty() && rng.gen_bool(0.35) {
            let node = live.swap_remove(rng.gen_range(0..live.len()));
            engine.remove_node(node).unwrap();
        } else {
            let origin = names[rng.gen_range(0..names.len())];
            let destination = names[rng.gen_range(0..names.len())];
            let node: MatchNode = if rng.gen_bool(0.5) {
                RideOffer::dummy(origin, destination).into()
            } else {
                RideRequest::dummy(origin, destination).into()
            };
            live.push(engine.add_with_location(node).unwrap());
        }
        assert!(engine.graph().check_consistency());
    }

    let drivers = engine.graph().driver_count();
    let riders = engine.graph().rider_count();
    assert_eq!(drivers + riders, live.len());
    assert_eq!(engine.graph().edge_count(), drivers * riders);
}

#[test]
fn role_strings_from_the_host() {
    assert_eq!("offer".parse::<NodeRole>().unwrap(), NodeRole::Driver);
    assert_eq!("request".parse::<NodeRole>().unwrap(), NodeRole::Rider);
    assert!(matches!(
        "conductor".parse::<NodeRole>().unwrap_err(),
        RidematchError::UnknownRole(_)
    ));
}
