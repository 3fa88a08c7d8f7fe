//! Scenario files for the boarding simulator.
//!
//! A scenario is a RON, TOML or JSON file (format chosen by extension)
//! describing a cabin, delay distributions, a boarding order and a seed.
//! [`run_scenario_file`] loads one and boards it to completion.

pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, RunReport, Scenario, load_scenario, run_scenario_file};
pub use schema::{CabinData, DelayData, PolicyData, ScenarioData};
