//! Serde structs for scenario files.
//!
//! A scenario names a cabin (a built-in aircraft or a custom layout), the
//! delay distributions, a boarding order and a seed. Everything except the
//! cabin has a default, taken from the reference configuration: Gaussian
//! base costs, up to two bags per passenger, square-root bin slowdown, and
//! the staggered reverse-block order.

use boarding_core::delay::{BagCount, BinDelay, Delay};
use boarding_core::entrance::EntranceKind;
use boarding_core::plane::{Aircraft, CabinLayout};
use boarding_core::sim::SimContext;
use boarding_policies::{Adapter, Strategy};
use serde::{Deserialize, Serialize};

// ===========================================================================
// Scenario
// ===========================================================================

/// A complete boarding scenario as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioData {
    /// Label for logs and reports. Defaults to the cabin's name.
    #[serde(default)]
    pub name: Option<String>,
    pub cabin: CabinData,
    #[serde(default)]
    pub entrance: EntranceKind,
    #[serde(default)]
    pub delays: DelayData,
    #[serde(default)]
    pub policy: PolicyData,
    #[serde(default)]
    pub seed: u64,
    /// Simulated time per tick. Must be positive.
    #[serde(default = "default_time_step")]
    pub time_step: f64,
    #[serde(default)]
    pub context: SimContext,
}

fn default_time_step() -> f64 {
    0.5
}

// ===========================================================================
// Cabin
// ===========================================================================

/// Which cabin to board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CabinData {
    /// A built-in preset, e.g. `"airbus-320"`.
    Aircraft(Aircraft),
    Layout(CabinLayout),
}

impl CabinData {
    pub fn layout(&self) -> CabinLayout {
        match self {
            CabinData::Aircraft(aircraft) => aircraft.layout(),
            CabinData::Layout(layout) => layout.clone(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CabinData::Aircraft(aircraft) => aircraft.name(),
            CabinData::Layout(_) => "custom",
        }
    }
}

// ===========================================================================
// Delays
// ===========================================================================

/// Delay and bag distributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayData {
    pub aisle_aisle: Delay,
    pub aisle_seat: Delay,
    pub seat_aisle: Delay,
    pub seat_seat: Delay,
    /// Time between two admissions through the same door.
    pub boarding: Delay,
    /// Extra time to reach the upper deck. Falls back to `seat_seat`.
    pub floor_change: Option<Delay>,
    pub bags: BagCount,
    pub bin_load: BinDelay,
}

impl Default for DelayData {
    fn default() -> Self {
        Self {
            aisle_aisle: gaussian(2.0, 0.3),
            aisle_seat: gaussian(3.0, 0.8),
            seat_aisle: gaussian(3.5, 0.4),
            seat_seat: gaussian(7.0, 2.0),
            boarding: gaussian(7.0, 1.0),
            floor_change: None,
            bags: BagCount::Uniform { min: 0, max: 2 },
            bin_load: BinDelay::SqrtLoad { mean: 3.0 },
        }
    }
}

fn gaussian(mean: f64, std_dev: f64) -> Delay {
    Delay::Gaussian { mean, std_dev }
}

// ===========================================================================
// Policy
// ===========================================================================

/// Boarding order: a strategy and the adapter layered over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyData {
    pub strategy: Strategy,
    #[serde(default)]
    pub adapter: Adapter,
}

impl Default for PolicyData {
    fn default() -> Self {
        Self {
            strategy: Strategy::ReverseBlock,
            adapter: Adapter::Staggered,
        }
    }
}
