//! Scenario loading: format detection, deserialization and resolution into
//! a ready-to-run [`Simulation`].

use std::path::{Path, PathBuf};

use boarding_core::delay::{Delay, DelayModel};
use boarding_core::fixed::{Time, f64_to_fixed64};
use boarding_core::geometry::GeometryError;
use boarding_core::plane::Plane;
use boarding_core::rng::SimRng;
use boarding_core::sim::{SimError, SimStats, Simulation};
use boarding_policies::NamedPolicy;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::schema::ScenarioData;

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur while loading or running a scenario.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// The scenario parsed but describes something that cannot run.
    #[error("invalid scenario in {file}: {detail}")]
    Invalid { file: PathBuf, detail: String },

    /// The cabin layout was rejected.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// The run itself failed.
    #[error(transparent)]
    Sim(#[from] SimError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Deserialize `content` in the given format. `path` is only used in errors.
pub fn deserialize_str<T: DeserializeOwned>(
    content: &str,
    format: Format,
    path: &Path,
) -> Result<T, DataLoadError> {
    let parse_error = |detail: String| DataLoadError::Parse {
        file: path.to_path_buf(),
        detail,
    };
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_error(e.to_string())),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_error(e.to_string())),
        Format::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
    }
}

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    deserialize_str(&content, format, path)
}

/// Load and check a scenario file.
pub fn load_scenario(path: &Path) -> Result<ScenarioData, DataLoadError> {
    let scenario: ScenarioData = deserialize_file(path)?;
    if !(scenario.time_step.is_finite() && scenario.time_step > 0.0) {
        return Err(DataLoadError::Invalid {
            file: path.to_path_buf(),
            detail: format!("time_step must be positive, got {}", scenario.time_step),
        });
    }
    tracing::debug!(
        file = %path.display(),
        cabin = scenario.cabin.name(),
        seed = scenario.seed,
        "scenario loaded"
    );
    Ok(scenario)
}

// ===========================================================================
// Resolution
// ===========================================================================

/// A scenario resolved into engine types, ready to run once.
#[derive(Debug)]
pub struct Scenario {
    pub simulation: Simulation,
    pub boarding: Delay,
    pub time_step: Time,
}

impl Scenario {
    /// Board everybody and summarize the run.
    pub fn run(mut self) -> Result<RunReport, DataLoadError> {
        self.simulation
            .run(|_| true, self.boarding, self.time_step)?;
        Ok(RunReport {
            plane: self.simulation.plane().name.clone(),
            policy: self.simulation.policy_name().to_string(),
            stats: self.simulation.stats(),
        })
    }
}

impl ScenarioData {
    /// Build the plane, delays and policy. The seed feeds, in order, the
    /// policy's generator, the bag draw, and the run.
    pub fn resolve(&self) -> Result<Scenario, DataLoadError> {
        let name = self.name.as_deref().unwrap_or(self.cabin.name());
        let mut plane = Plane::from_layout(name, &self.cabin.layout(), self.entrance)?;

        let mut rng = SimRng::new(self.seed);
        let policy = NamedPolicy::new(self.policy.strategy, self.policy.adapter, rng.fork());
        plane.cabin.assign_bags(&mut self.delays.bags.clone(), &mut rng);

        let d = &self.delays;
        let floor_change = d.floor_change.clone().unwrap_or_else(|| d.seat_seat.clone());
        let delays = DelayModel::new(
            d.aisle_aisle.clone(),
            d.aisle_seat.clone(),
            d.seat_aisle.clone(),
            d.seat_seat.clone(),
        )
        .with_bin_load(d.bin_load.clone())
        .with_floor_change(floor_change);

        let simulation = Simulation::new(plane, policy, delays, rng).with_context(self.context.clone());
        Ok(Scenario {
            simulation,
            boarding: d.boarding.clone(),
            time_step: f64_to_fixed64(self.time_step),
        })
    }
}

/// What a finished run reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub plane: String,
    pub policy: String,
    pub stats: SimStats,
}

/// Load a scenario file and run it to completion.
pub fn run_scenario_file(path: &Path) -> Result<RunReport, DataLoadError> {
    load_scenario(path)?.resolve()?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Create a temporary directory with a unique name for test isolation.
    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "boarding_data_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Clean up a test directory.
    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    const SMALL_JSON: &str = r#"{
        "cabin": { "layout": { "grid": { "rows": 3, "seat_files": [1, 1] } } },
        "delays": {
            "aisle_aisle": { "fixed": 1.0 },
            "aisle_seat": { "fixed": 1.0 },
            "seat_aisle": { "fixed": 1.0 },
            "seat_seat": { "fixed": 1.0 },
            "boarding": { "fixed": 1.0 },
            "bags": { "fixed": 0 },
            "bin_load": { "per_bag": 0.0 }
        },
        "policy": { "strategy": "sequential", "adapter": "original" },
        "time_step": 1.0
    }"#;

    // -----------------------------------------------------------------------
    // detect_format
    // -----------------------------------------------------------------------

    #[test]
    fn detect_format_by_extension() {
        assert_eq!(detect_format(Path::new("a.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("a.toml")).unwrap(), Format::Toml);
        assert_eq!(detect_format(Path::new("a.json")).unwrap(), Format::Json);
    }

    #[test]
    fn detect_format_unsupported() {
        for name in ["a.yaml", "scenario"] {
            let err = detect_format(Path::new(name)).unwrap_err();
            assert!(matches!(err, DataLoadError::UnsupportedFormat { .. }));
        }
    }

    // -----------------------------------------------------------------------
    // load_scenario
    // -----------------------------------------------------------------------

    #[test]
    fn load_scenario_json() {
        let dir = make_test_dir("load_json");
        let path = dir.join("small.json");
        fs::write(&path, SMALL_JSON).unwrap();
        let scenario = load_scenario(&path).unwrap();
        assert_eq!(scenario.cabin.name(), "custom");
        cleanup(&dir);
    }

    #[test]
    fn parse_error_names_the_file() {
        let dir = make_test_dir("parse_err");
        let path = dir.join("broken.ron");
        fs::write(&path, "(cabin: ").unwrap();
        let err = load_scenario(&path).unwrap_err();
        match err {
            DataLoadError::Parse { file, .. } => assert_eq!(file, path),
            other => panic!("expected Parse, got {other:?}"),
        }
        cleanup(&dir);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_scenario(Path::new("/nonexistent/boarding/scenario.toml")).unwrap_err();
        assert!(matches!(err, DataLoadError::Io(_)));
    }

    #[test]
    fn zero_time_step_is_invalid() {
        let dir = make_test_dir("zero_step");
        let path = dir.join("zero.toml");
        fs::write(&path, "time_step = 0.0\n[cabin]\naircraft = \"airbus-320\"\n").unwrap();
        let err = load_scenario(&path).unwrap_err();
        assert!(matches!(err, DataLoadError::Invalid { .. }));
        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // resolve / run
    // -----------------------------------------------------------------------

    #[test]
    fn bad_layout_is_a_geometry_error() {
        let scenario: ScenarioData = serde_json::from_str(
            r#"{ "cabin": { "layout": { "grid": { "rows": 0, "seat_files": [1, 1] } } } }"#,
        )
        .unwrap();
        let err = scenario.resolve().unwrap_err();
        assert!(matches!(err, DataLoadError::Geometry(GeometryError::NoRows)));
    }

    #[test]
    fn run_scenario_file_boards_everyone() {
        let dir = make_test_dir("run");
        let path = dir.join("small.json");
        fs::write(&path, SMALL_JSON).unwrap();
        let report = run_scenario_file(&path).unwrap();
        assert_eq!(report.plane, "custom");
        assert_eq!(report.policy, "original_sequential");
        assert_eq!(report.stats.passengers, 6);
        assert_eq!(report.stats.anomalies, 0);
        assert!(report.stats.elapsed > 0.0);
        cleanup(&dir);
    }

    #[test]
    fn same_file_same_result() {
        let dir = make_test_dir("repeat");
        let path = dir.join("a320.ron");
        fs::write(&path, r#"(cabin: aircraft(airbus_320), seed: 2024)"#).unwrap();
        let a = run_scenario_file(&path).unwrap();
        let b = run_scenario_file(&path).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.policy, "staggered_reverse_block");
        assert_eq!(a.stats.passengers, 138);
        cleanup(&dir);
    }
}
