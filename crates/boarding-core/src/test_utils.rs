//! Shared test helpers for unit and integration tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so they are
//! available to unit tests and, via the `test-utils` feature, to the
//! property tests and other crates.

use crate::delay::{BagCount, DelayModel};
use crate::event::EventLog;
use crate::fixed::{Fixed64, Time, countdown};
use crate::geometry::{Cabin, GridLayout};
use crate::id::*;
use crate::passenger::{StepEnv, StepError, StepOutcome};
use crate::rng::SimRng;

// ===========================================================================
// Cabins
// ===========================================================================

/// A single grid section with default bins.
pub fn single_aisle(rows: u32, seat_files: Vec<u32>) -> Cabin {
    Cabin::grid(&GridLayout::new(rows, seat_files)).expect("valid test layout")
}

/// A cabin where every passenger carries `bags` bags.
pub fn cabin_with_bags(layout: GridLayout, bags: u32) -> Cabin {
    let mut cabin = Cabin::grid(&layout).expect("valid test layout");
    cabin.assign_bags(&mut BagCount::Fixed(bags), &mut SimRng::new(0));
    cabin
}

/// The passenger whose seat is at (`row`, `file`).
pub fn passenger_for(cabin: &Cabin, row: u32, file: u32) -> PassengerId {
    cabin
        .roster()
        .iter()
        .copied()
        .find(|&id| {
            cabin
                .seat_info(id)
                .is_some_and(|s| s.row == row && s.file == file)
        })
        .unwrap_or_else(|| panic!("no seat at row {row}, file {file}"))
}

/// Every cell and its holder, sorted for comparison.
pub fn occupancy(cabin: &Cabin) -> Vec<(CellId, Option<PassengerId>)> {
    let mut cells: Vec<_> = cabin
        .graph()
        .iter()
        .map(|(id, cell)| (id, cell.occupant()))
        .collect();
    cells.sort_by_key(|&(id, _)| id);
    cells
}

/// Number of cells held by each passenger, as location or borrowed.
pub fn holdings(cabin: &Cabin, passenger: PassengerId) -> usize {
    cabin
        .graph()
        .iter()
        .filter(|(_, cell)| cell.occupant() == Some(passenger))
        .count()
}

// ===========================================================================
// Step harness
// ===========================================================================

/// Drives passenger steps outside a full simulation.
pub struct Harness {
    pub delays: DelayModel,
    pub rng: SimRng,
    pub events: EventLog,
    pub time: Time,
}

impl Harness {
    /// Every base cost is one time unit.
    pub fn unit() -> Self {
        Self::with_delays(DelayModel::uniform(1.0))
    }

    pub fn with_delays(delays: DelayModel) -> Self {
        Self {
            delays,
            rng: SimRng::new(42),
            events: EventLog::new(256),
            time: Fixed64::ZERO,
        }
    }

    /// One step of one passenger, without touching its delay first.
    pub fn step(&mut self, cabin: &mut Cabin, id: PassengerId) -> Result<StepOutcome, StepError> {
        let mut env = StepEnv {
            delays: &mut self.delays,
            rng: &mut self.rng,
            events: &mut self.events,
            time: self.time,
        };
        cabin.step_passenger(id, &mut env)
    }

    /// A unit-length tick: count every delay down, then step everyone.
    pub fn tick(&mut self, cabin: &mut Cabin, ids: &[PassengerId]) -> Result<(), StepError> {
        let step = Fixed64::from_num(1);
        self.time += step;
        for &id in ids {
            let p = cabin.passenger_mut(id);
            p.set_delay(countdown(p.delay(), step));
        }
        for &id in ids {
            self.step(cabin, id)?;
        }
        Ok(())
    }
}
