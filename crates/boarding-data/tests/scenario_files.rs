//! The scenario files shipped in `scenarios/` load and run.

use std::path::PathBuf;

use boarding_data::{CabinData, load_scenario, run_scenario_file};
use boarding_core::entrance::EntranceKind;
use boarding_core::plane::Aircraft;

fn scenario(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(name)
}

#[test]
fn ron_scenario_runs() {
    let path = scenario("a320_staggered.ron");
    let data = load_scenario(&path).unwrap();
    assert_eq!(data.cabin, CabinData::Aircraft(Aircraft::Airbus320));

    let report = run_scenario_file(&path).unwrap();
    assert_eq!(report.plane, "a320");
    assert_eq!(report.policy, "staggered_reverse_block");
    assert_eq!(report.stats.passengers, 138);
    assert_eq!(report.stats.anomalies, 0);
}

#[test]
fn toml_scenario_uses_both_decks() {
    let path = scenario("a380_per_floor.toml");
    let data = load_scenario(&path).unwrap();
    assert_eq!(data.entrance, EntranceKind::PerFloor);
    assert_eq!(data.context.max_ticks, 500_000);

    let report = run_scenario_file(&path).unwrap();
    assert_eq!(report.policy, "even_odd_outside_in");
    assert_eq!(report.stats.passengers, 640);
}

#[test]
fn json_scenario_joins_sections() {
    let path = scenario("custom_twin_aisle.json");
    let report = run_scenario_file(&path).unwrap();
    assert_eq!(report.plane, "twin-aisle");
    assert_eq!(report.policy, "original_rotating_block");
    assert_eq!(report.stats.passengers, 4 * 6 + 12 * 7);
}
