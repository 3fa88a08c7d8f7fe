//! Passenger agents and their movement state machine.
//!
//! A passenger walks through four phases, never going back:
//!
//! 1. **FindAisle** -- cross the entry row until standing on the aisle that
//!    serves the target seat.
//! 2. **FindRow** -- walk that aisle to the target row.
//! 3. **FindSeat** -- stow bags, then shuffle sideways into the row, crossing
//!    seated passengers when they are in the way (see [`crate::crossing`]).
//! 4. **Finished** -- standing on the target seat.
//!
//! A passenger with a non-zero delay counter is busy and does nothing. The
//! first thing an idle passenger does is hand back every cell it borrowed on
//! its previous action.

use crate::cell::Direction;
use crate::delay::DelayModel;
use crate::event::{AnomalyKind, BoardingEvent, EventLog};
use crate::fixed::{Fixed64, Time};
use crate::geometry::Cabin;
use crate::id::*;
use crate::rng::SimRng;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Violations of the occupancy bookkeeping. These are internal invariant
/// failures, never expected in a correct run.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("passenger {passenger:?} borrowed cell {cell:?} but it is held by {holder:?}")]
    BorrowedCellNotOwned {
        passenger: PassengerId,
        cell: CellId,
        holder: Option<PassengerId>,
    },
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Movement phase. Ordered; a passenger only ever moves forward.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Phase {
    #[default]
    FindAisle,
    FindRow,
    FindSeat,
    Finished,
}

// ---------------------------------------------------------------------------
// Passenger
// ---------------------------------------------------------------------------

/// One passenger, bound to a seat for the whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passenger {
    target: CellId,
    location: Option<CellId>,
    phase: Phase,
    bags: u32,
    delay: Fixed64,
    sequence: u32,
    borrowed: Vec<CellId>,
    needed_to_wait: u32,
    /// Lane of the aisle serving the target seat, resolved on first use.
    target_lane: Option<u32>,
}

impl Passenger {
    pub fn new(target: CellId, bags: u32) -> Self {
        Self {
            target,
            location: None,
            phase: Phase::FindAisle,
            bags,
            delay: Fixed64::ZERO,
            sequence: 0,
            borrowed: Vec::new(),
            needed_to_wait: 0,
            target_lane: None,
        }
    }

    pub fn target(&self) -> CellId {
        self.target
    }

    /// Current cell, or `None` before boarding.
    pub fn location(&self) -> Option<CellId> {
        self.location
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Bags still carried.
    pub fn bags(&self) -> u32 {
        self.bags
    }

    /// Time left before the passenger may act again.
    pub fn delay(&self) -> Fixed64 {
        self.delay
    }

    /// Position in the roster; used as a tiebreaker by boarding orders.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Cells held in addition to the location until the next action.
    pub fn borrowed(&self) -> &[CellId] {
        &self.borrowed
    }

    /// How many times the passenger found its way blocked.
    pub fn needed_to_wait(&self) -> u32 {
        self.needed_to_wait
    }

    pub fn is_boarded(&self) -> bool {
        self.location.is_some()
    }

    /// Seated, idle, and holding nothing but the seat.
    pub fn is_finished(&self) -> bool {
        self.location == Some(self.target)
            && self.delay == Fixed64::ZERO
            && self.borrowed.is_empty()
    }

    pub(crate) fn set_sequence(&mut self, sequence: u32) {
        self.sequence = sequence;
    }

    pub(crate) fn set_bags(&mut self, bags: u32) {
        self.bags = bags;
    }

    pub(crate) fn set_location(&mut self, cell: CellId) {
        self.location = Some(cell);
    }

    pub(crate) fn add_delay(&mut self, delay: Fixed64) {
        self.delay = self.delay.saturating_add(delay);
    }

    pub(crate) fn set_delay(&mut self, delay: Fixed64) {
        self.delay = delay;
    }

    pub(crate) fn record_wait(&mut self) {
        self.needed_to_wait += 1;
    }

    pub(crate) fn borrow_cell(&mut self, cell: CellId) {
        self.borrowed.push(cell);
    }

    /// Move to `next` if it is later than the current phase.
    pub(crate) fn advance_phase(&mut self, next: Phase) {
        debug_assert!(next >= self.phase, "phase regression");
        if next > self.phase {
            self.phase = next;
        }
    }
}

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

/// Everything a passenger step draws on besides the cabin itself.
pub struct StepEnv<'a> {
    pub delays: &'a mut DelayModel,
    pub rng: &'a mut SimRng,
    pub events: &'a mut EventLog,
    pub time: Time,
}

/// What a single step did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    /// The passenger was idle and evaluated its next action.
    pub acted: bool,
    /// Other passengers whose delay grew because they were crossed.
    pub disturbed: Vec<PassengerId>,
}

impl Cabin {
    /// Advance one passenger by one action, if it is idle.
    pub fn step_passenger(
        &mut self,
        id: PassengerId,
        env: &mut StepEnv<'_>,
    ) -> Result<StepOutcome, StepError> {
        let mut outcome = StepOutcome::default();
        match self.passengers.get(id) {
            Some(p) if p.delay == Fixed64::ZERO => {}
            _ => return Ok(outcome),
        }

        self.release_borrowed(id)?;

        let (location, target) = match self.passengers.get(id) {
            Some(p) => match p.location {
                Some(loc) => (loc, p.target),
                None => return Ok(outcome),
            },
            None => return Ok(outcome),
        };
        outcome.acted = true;
        if location == target {
            self.passenger_mut(id).advance_phase(Phase::Finished);
            return Ok(outcome);
        }

        // Phase changes without a move fall through to the next phase.
        if self.phase_of(id) == Phase::FindAisle {
            self.find_aisle(id, env);
        }
        if self.phase_of(id) == Phase::FindRow {
            self.find_row(id, env);
        }
        if self.phase_of(id) == Phase::FindSeat {
            self.find_seat(id, env, &mut outcome);
        }

        Ok(outcome)
    }

    /// Hand back every borrowed cell. A borrowed cell held by anybody else
    /// means the bookkeeping is broken.
    fn release_borrowed(&mut self, id: PassengerId) -> Result<(), StepError> {
        let borrowed = std::mem::take(&mut self.passenger_mut(id).borrowed);
        for cell in borrowed {
            match self.graph.occupant(cell) {
                Some(holder) if holder == id => self.graph.release(cell),
                holder => {
                    tracing::error!(
                        passenger = ?id,
                        cell = ?cell,
                        holder = ?holder,
                        "inconsistent ownership of a borrowed cell"
                    );
                    return Err(StepError::BorrowedCellNotOwned {
                        passenger: id,
                        cell,
                        holder,
                    });
                }
            }
        }
        Ok(())
    }

    fn find_aisle(&mut self, id: PassengerId, env: &mut StepEnv<'_>) {
        let Some(location) = self.location_of(id) else {
            return;
        };
        let target_lane = self.target_lane(id);
        let Some(cell) = self.graph.get(location) else {
            return;
        };

        let direction = match cell.lane {
            Some(lane) if lane == target_lane => {
                self.passenger_mut(id).advance_phase(Phase::FindRow);
                return;
            }
            Some(lane) if target_lane > lane => Direction::East,
            Some(_) => Direction::West,
            None => {
                if target_lane >= cell.major_file.unwrap_or(0) {
                    Direction::East
                } else {
                    Direction::West
                }
            }
        };

        self.walk(id, location, direction, env);
    }

    fn find_row(&mut self, id: PassengerId, env: &mut StepEnv<'_>) {
        let Some(location) = self.location_of(id) else {
            return;
        };
        let target = self.passengers[id].target;
        let (Some(here), Some(there)) = (self.graph.get(location), self.graph.get(target)) else {
            return;
        };

        let direction = match here.row.cmp(&there.row) {
            std::cmp::Ordering::Less => Direction::South,
            std::cmp::Ordering::Greater => Direction::North,
            std::cmp::Ordering::Equal => {
                self.passenger_mut(id).advance_phase(Phase::FindSeat);
                return;
            }
        };

        self.walk(id, location, direction, env);
    }

    fn find_seat(&mut self, id: PassengerId, env: &mut StepEnv<'_>, outcome: &mut StepOutcome) {
        let Some(location) = self.location_of(id) else {
            return;
        };
        self.stow_bags(id, location, env);

        let target = self.passengers[id].target;
        let (Some(here), Some(there)) = (self.graph.get(location), self.graph.get(target)) else {
            return;
        };
        let direction = match here.file.cmp(&there.file) {
            std::cmp::Ordering::Greater => Direction::West,
            std::cmp::Ordering::Less => Direction::East,
            std::cmp::Ordering::Equal => return,
        };

        let Some(next) = self.graph.neighbor(location, direction) else {
            self.report_anomaly(id, AnomalyKind::MissingConnector { direction }, env);
            return;
        };

        if self.graph.is_available(next) {
            let cost = if self.graph.is_aisle(location) {
                env.delays.as_(env.rng)
            } else {
                env.delays.ss(env.rng)
            };
            let p = self.passenger_mut(id);
            p.add_delay(cost);
            p.borrow_cell(location);
            self.enter(id, next);
        } else {
            self.cross(id, location, direction, next, env, outcome);
        }
    }

    fn stow_bags(&mut self, id: PassengerId, location: CellId, env: &mut StepEnv<'_>) {
        let bags = self.passengers[id].bags;
        if bags == 0 {
            return;
        }
        let Some(bin) = self.graph.get(location).and_then(|c| c.bin) else {
            return;
        };
        let Some(bin) = self.bins.get_mut(bin) else {
            return;
        };

        let delay = bin.stow(bags, env.delays.bin_load.as_mut(), env.rng);
        let p = self.passenger_mut(id);
        p.add_delay(delay);
        p.bags = 0;
        env.events.push(BoardingEvent::LuggageStowed {
            passenger: id,
            bags,
            delay,
            time: env.time,
        });
    }

    /// Plain aisle movement: leave the current cell for a free neighbor at
    /// the cost of one aisle-to-aisle move, or wait.
    fn walk(&mut self, id: PassengerId, from: CellId, direction: Direction, env: &mut StepEnv<'_>) {
        match self.graph.neighbor(from, direction) {
            None => self.report_anomaly(id, AnomalyKind::MissingConnector { direction }, env),
            Some(next) if self.graph.is_available(next) => {
                let cost = env.delays.aa(env.rng);
                self.passenger_mut(id).add_delay(cost);
                self.graph.release(from);
                self.enter(id, next);
            }
            Some(_) => self.passenger_mut(id).record_wait(),
        }
    }

    /// Claim `cell` as the passenger's new location. The old location is
    /// not released here; callers either release it or borrow it.
    pub(crate) fn enter(&mut self, id: PassengerId, cell: CellId) {
        self.graph.claim(cell, id);
        let p = self.passenger_mut(id);
        p.set_location(cell);
        if cell == p.target {
            p.advance_phase(Phase::Finished);
        }
    }

    /// Hold `cell` on top of the location until the next action.
    pub(crate) fn borrow(&mut self, id: PassengerId, cell: CellId) {
        self.graph.claim(cell, id);
        self.passenger_mut(id).borrow_cell(cell);
    }

    pub(crate) fn report_anomaly(&mut self, id: PassengerId, kind: AnomalyKind, env: &mut StepEnv<'_>) {
        tracing::warn!(passenger = ?id, ?kind, "movement anomaly");
        env.events.push(BoardingEvent::Anomaly {
            passenger: id,
            kind,
            time: env.time,
        });
    }

    pub(crate) fn passenger_mut(&mut self, id: PassengerId) -> &mut Passenger {
        &mut self.passengers[id]
    }

    fn phase_of(&self, id: PassengerId) -> Phase {
        self.passengers[id].phase
    }

    fn location_of(&self, id: PassengerId) -> Option<CellId> {
        self.passengers[id].location
    }

    /// Lane of the aisle nearest to the passenger's seat, cached.
    fn target_lane(&mut self, id: PassengerId) -> u32 {
        if let Some(lane) = self.passengers[id].target_lane {
            return lane;
        }
        let target = self.passengers[id].target;
        let lane = self
            .graph
            .nearest_aisle(target)
            .and_then(|(_, aisle)| self.graph.get(aisle))
            .and_then(|c| c.lane)
            .unwrap_or(0);
        self.passengers[id].target_lane = Some(lane);
        lane
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GridLayout;
    use crate::test_utils::*;

    #[test]
    fn new_passenger_is_unboarded() {
        let cabin = single_aisle(1, vec![1, 1]);
        let id = cabin.roster()[0];
        let p = cabin.passenger(id).unwrap();
        assert_eq!(p.phase(), Phase::FindAisle);
        assert!(!p.is_boarded());
        assert!(!p.is_finished());
        assert_eq!(p.delay(), Fixed64::ZERO);
    }

    #[test]
    fn phases_are_ordered() {
        assert!(Phase::FindAisle < Phase::FindRow);
        assert!(Phase::FindRow < Phase::FindSeat);
        assert!(Phase::FindSeat < Phase::Finished);
    }

    #[test]
    fn busy_passengers_do_nothing() {
        let mut cabin = single_aisle(2, vec![1, 1]);
        let mut h = Harness::unit();
        let id = cabin.roster()[0];
        let entrance = cabin.sections()[0].entrance();
        cabin.place(id, entrance);
        cabin.passenger_mut(id).set_delay(Fixed64::from_num(3));

        let outcome = h.step(&mut cabin, id).unwrap();
        assert!(!outcome.acted);
        assert_eq!(cabin.passenger(id).unwrap().location(), Some(entrance));
    }

    #[test]
    fn walks_to_its_row_then_into_the_seat() {
        // One aisle, one seat on each side, two rows.
        let mut cabin = single_aisle(2, vec![1, 1]);
        let mut h = Harness::unit();
        let id = passenger_for(&cabin, 2, 2);
        cabin.place(id, cabin.sections()[0].entrance());

        let mut phases = vec![cabin.passenger(id).unwrap().phase()];
        for _ in 0..20 {
            h.tick(&mut cabin, &[id]).unwrap();
            phases.push(cabin.passenger(id).unwrap().phase());
        }

        let p = cabin.passenger(id).unwrap();
        assert_eq!(p.location(), Some(p.target()));
        assert!(p.is_finished());
        assert!(phases.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*phases.last().unwrap(), Phase::Finished);
    }

    #[test]
    fn stows_bags_at_the_target_row() {
        let layout = GridLayout::new(1, vec![1, 1]).with_bins(4, 2);
        let mut cabin = cabin_with_bags(layout, 2);
        let mut h = Harness::unit();
        h.delays = crate::delay::DelayModel::uniform(1.0)
            .with_bin_load(crate::delay::BinDelay::PerBag(5.0));
        let id = passenger_for(&cabin, 1, 0);
        cabin.place(id, cabin.sections()[0].entrance());

        // Tick 1: walk south to row 1 (AA = 1).
        h.tick(&mut cabin, &[id]).unwrap();
        assert_eq!(cabin.passenger(id).unwrap().bags(), 2);
        // Tick 2: reach row, stow two bags (10), step west into the seat (AS = 1).
        h.tick(&mut cabin, &[id]).unwrap();
        let p = cabin.passenger(id).unwrap();
        assert_eq!(p.bags(), 0);
        assert_eq!(p.delay(), Fixed64::from_num(11));
        assert_eq!(p.location(), Some(p.target()));
        let bin = cabin
            .graph()
            .get(cabin.sections()[0].aisles[0].cell(1).unwrap())
            .unwrap()
            .bin
            .unwrap();
        assert_eq!(cabin.bin(bin).unwrap().load(), 2);
    }

    #[test]
    fn simple_seat_entry_borrows_the_aisle_cell() {
        let mut cabin = single_aisle(1, vec![1, 1]);
        let mut h = Harness::unit();
        let id = passenger_for(&cabin, 1, 0);
        let aisle_row1 = cabin.sections()[0].aisles[0].cell(1).unwrap();
        cabin.place(id, aisle_row1);
        cabin.passenger_mut(id).advance_phase(Phase::FindSeat);

        h.step(&mut cabin, id).unwrap();
        let p = cabin.passenger(id).unwrap();
        assert_eq!(p.location(), Some(p.target()));
        assert_eq!(p.borrowed(), &[aisle_row1]);
        assert_eq!(cabin.graph().occupant(aisle_row1), Some(id));

        // Idle again: the aisle cell goes back.
        cabin.passenger_mut(id).set_delay(Fixed64::ZERO);
        h.step(&mut cabin, id).unwrap();
        assert!(cabin.graph().is_available(aisle_row1));
        assert!(cabin.passenger(id).unwrap().is_finished());
    }

    #[test]
    fn blocked_aisle_counts_a_wait() {
        let mut cabin = single_aisle(2, vec![1, 1]);
        let mut h = Harness::unit();
        let front = passenger_for(&cabin, 2, 0);
        let blocker = passenger_for(&cabin, 1, 0);
        let a0 = cabin.sections()[0].aisles[0].cell(0).unwrap();
        let a1 = cabin.sections()[0].aisles[0].cell(1).unwrap();
        cabin.place(front, a0);
        cabin.place(blocker, a1);
        cabin.passenger_mut(blocker).set_delay(Fixed64::from_num(10));

        h.step(&mut cabin, front).unwrap();
        assert_eq!(cabin.passenger(front).unwrap().location(), Some(a0));
        assert_eq!(cabin.passenger(front).unwrap().needed_to_wait(), 1);
    }

    #[test]
    fn foreign_holder_of_a_borrowed_cell_is_an_error() {
        let mut cabin = single_aisle(1, vec![1, 1]);
        let mut h = Harness::unit();
        let a = cabin.roster()[0];
        let b = cabin.roster()[1];
        let cell = cabin.sections()[0].aisles[0].cell(0).unwrap();
        cabin.place(a, cabin.sections()[0].aisles[0].cell(1).unwrap());
        cabin.passenger_mut(a).borrow_cell(cell);
        cabin.graph.claim(cell, b);

        let err = h.step(&mut cabin, a).unwrap_err();
        assert!(matches!(
            err,
            StepError::BorrowedCellNotOwned { holder: Some(holder), .. } if holder == b
        ));
    }
}
