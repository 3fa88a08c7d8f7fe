//! Every boarding order boards every preset cabin completely.

use boarding_core::entrance::EntranceKind;
use boarding_core::geometry::GeometryError;
use boarding_core::plane::Aircraft;
use boarding_core::policy::BoardingPolicy;
use boarding_core::sim::SimContext;
use boarding_data::{CabinData, DataLoadError, DelayData, PolicyData, RunReport, ScenarioData};
use boarding_policies::{Adapter, NamedPolicy, Strategy};

fn scenario(aircraft: Aircraft, strategy: Strategy, adapter: Adapter, seed: u64) -> ScenarioData {
    ScenarioData {
        name: None,
        cabin: CabinData::Aircraft(aircraft),
        entrance: EntranceKind::Auto,
        delays: DelayData::default(),
        policy: PolicyData { strategy, adapter },
        seed,
        time_step: 1.0,
        context: SimContext::default(),
    }
}

fn run(aircraft: Aircraft, strategy: Strategy, adapter: Adapter, seed: u64) -> RunReport {
    scenario(aircraft, strategy, adapter, seed)
        .resolve()
        .unwrap()
        .run()
        .unwrap_or_else(|e| panic!("{aircraft} {adapter}_{strategy}: {e}"))
}

#[test]
fn every_strategy_boards_every_preset() {
    for aircraft in Aircraft::ALL {
        let seats = aircraft.layout().seat_count() as usize;
        for strategy in Strategy::ALL {
            let report = run(aircraft, strategy, Adapter::Original, 3);
            assert_eq!(report.stats.passengers, seats, "{aircraft} {strategy}");
            assert_eq!(report.stats.anomalies, 0, "{aircraft} {strategy}");
            assert!(report.stats.elapsed > 0.0);
        }
    }
}

#[test]
fn every_adapter_boards_the_narrow_body() {
    let seats = Aircraft::Airbus320.layout().seat_count() as usize;
    for policy in NamedPolicy::all(0) {
        let report = run(Aircraft::Airbus320, policy.strategy(), policy.adapter(), 11);
        assert_eq!(report.policy, policy.name());
        assert_eq!(report.stats.passengers, seats);
    }
}

#[test]
fn same_seed_same_run() {
    for strategy in [Strategy::PreAssignedRandom, Strategy::ReversePyramid] {
        let a = run(Aircraft::Boeing767_200, strategy, Adapter::Staggered, 99);
        let b = run(Aircraft::Boeing767_200, strategy, Adapter::Staggered, 99);
        assert_eq!(a, b);
    }
}

#[test]
fn multi_door_boards_every_twin_aisle_preset() {
    let presets = [
        Aircraft::AirbusA300_600,
        Aircraft::Boeing747,
        Aircraft::Boeing767_200,
    ];
    for aircraft in presets {
        let seats = aircraft.layout().seat_count() as usize;
        for strategy in Strategy::ALL {
            for seed in 0..3 {
                let mut data = scenario(aircraft, strategy, Adapter::Original, seed);
                data.entrance = EntranceKind::Multi;
                data.context.max_ticks = 100_000;
                let report = data
                    .resolve()
                    .unwrap()
                    .run()
                    .unwrap_or_else(|e| panic!("{aircraft} {strategy} seed={seed}: {e}"));
                assert_eq!(report.stats.passengers, seats, "{aircraft} {strategy}");
                assert_eq!(report.stats.anomalies, 0, "{aircraft} {strategy}");
            }
        }
    }
}

#[test]
fn double_decker_rejects_lower_deck_doors() {
    for kind in [EntranceKind::Single, EntranceKind::Multi] {
        let mut data = scenario(Aircraft::Airbus380, Strategy::Sequential, Adapter::Original, 0);
        data.entrance = kind;
        let err = data.resolve().unwrap_err();
        assert!(
            matches!(
                err,
                DataLoadError::Geometry(GeometryError::LowerDeckEntrance { kind: k }) if k == kind
            ),
            "{kind:?}: {err}"
        );
    }
}

#[test]
fn multi_door_boards_a_single_aisle_cabin() {
    let mut data = scenario(Aircraft::Airbus320, Strategy::ReverseBlock, Adapter::Original, 4);
    data.entrance = EntranceKind::Multi;
    let report = data.resolve().unwrap().run().unwrap();
    assert_eq!(report.stats.passengers, 138);
}
