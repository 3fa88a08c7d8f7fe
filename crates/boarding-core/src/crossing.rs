//! Seat crossing and cell borrowing.
//!
//! When the next cell toward the seat is taken, the mover counts the seated
//! run: contiguous cells, starting next door, whose holder is physically
//! standing there rather than borrowing. Then:
//!
//! - no one seated in the way: wait.
//! - from the aisle, one seated: step over into the free cell beyond.
//! - from the aisle, two seated: step over both into the (free) target.
//! - from a seat: swap past the neighbor into the target.
//!
//! A crossing borrows the cells the crossed passengers step out into and
//! charges the same composed delay to the mover and to everybody crossed.
//! Borrowed cells come back at the mover's next action.

use crate::cell::Direction;
use crate::delay::DelayModel;
use crate::event::{AnomalyKind, BoardingEvent, CrossingKind};
use crate::fixed::Fixed64;
use crate::geometry::Cabin;
use crate::id::*;
use crate::passenger::{StepEnv, StepOutcome};
use crate::rng::SimRng;

fn max2(a: Fixed64, b: Fixed64) -> Fixed64 {
    a.max(b)
}

fn max3(a: Fixed64, b: Fixed64, c: Fixed64) -> Fixed64 {
    a.max(b).max(c)
}

/// `max(AA, SS) + AS + SA`
pub fn single_crossing_delay(delays: &mut DelayModel, rng: &mut SimRng) -> Fixed64 {
    let aa = delays.aa(rng);
    let ss = delays.ss(rng);
    let as_ = delays.as_(rng);
    let sa = delays.sa(rng);
    max2(aa, ss) + as_ + sa
}

/// `max(AA, SA, SS) + SA + AS + max(SA, SS) + max(SS, SS, AS)`
pub fn double_crossing_delay(delays: &mut DelayModel, rng: &mut SimRng) -> Fixed64 {
    let first = max3(delays.aa(rng), delays.sa(rng), delays.ss(rng));
    let step_out = delays.sa(rng);
    let step_in = delays.as_(rng);
    let shuffle = max2(delays.sa(rng), delays.ss(rng));
    let settle = max3(delays.ss(rng), delays.ss(rng), delays.as_(rng));
    first + step_out + step_in + shuffle + settle
}

/// `max(SA, SS) + SA + AS + max(SS, AS) + SS`
pub fn swap_delay(delays: &mut DelayModel, rng: &mut SimRng) -> Fixed64 {
    let first = max2(delays.sa(rng), delays.ss(rng));
    let step_out = delays.sa(rng);
    let step_in = delays.as_(rng);
    let settle = max2(delays.ss(rng), delays.as_(rng));
    first + step_out + step_in + settle + delays.ss(rng)
}

/// `0` when the aisle cell behind is free to step into, `AA + AA` otherwise.
fn aisle_base_delay(free_south: bool, delays: &mut DelayModel, rng: &mut SimRng) -> Fixed64 {
    if free_south {
        Fixed64::ZERO
    } else {
        delays.aa(rng) + delays.aa(rng)
    }
}

impl Cabin {
    /// Number of contiguous cells from `from`'s neighbor in `direction` whose
    /// holder is standing on them.
    pub fn seated_run(&self, from: CellId, direction: Direction) -> u32 {
        let mut count = 0;
        let mut next = self.graph.neighbor(from, direction);
        while let Some(cell) = next {
            let seated = self
                .graph
                .occupant(cell)
                .and_then(|p| self.passengers.get(p))
                .is_some_and(|p| p.location() == Some(cell));
            if !seated {
                break;
            }
            count += 1;
            next = self.graph.neighbor(cell, direction);
        }
        count
    }

    /// Resolve a blocked sideways move from `location` toward `next`.
    pub(crate) fn cross(
        &mut self,
        id: PassengerId,
        location: CellId,
        direction: Direction,
        next: CellId,
        env: &mut StepEnv<'_>,
        outcome: &mut StepOutcome,
    ) {
        let n = self.seated_run(location, direction);
        if n == 0 {
            self.passenger_mut(id).record_wait();
            return;
        }

        if self.graph.is_aisle(location) {
            self.cross_from_aisle(id, location, direction, next, n, env, outcome);
        } else {
            self.swap(id, location, direction, next, env, outcome);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn cross_from_aisle(
        &mut self,
        id: PassengerId,
        location: CellId,
        direction: Direction,
        next: CellId,
        n: u32,
        env: &mut StepEnv<'_>,
        outcome: &mut StepOutcome,
    ) {
        let target = self.passengers[id].target();
        let (kind, landing) = match n {
            1 => {
                let beyond = self
                    .graph
                    .neighbor(next, direction)
                    .filter(|&c| self.graph.is_available(c));
                match beyond {
                    Some(cell) => (CrossingKind::Single, cell),
                    None => {
                        self.passenger_mut(id).record_wait();
                        return;
                    }
                }
            }
            2 => {
                if !self.graph.is_available(target) {
                    self.passenger_mut(id).record_wait();
                    return;
                }
                (CrossingKind::Double, target)
            }
            _ => {
                self.report_anomaly(id, AnomalyKind::TooManyToCross { count: n }, env);
                self.passenger_mut(id).record_wait();
                return;
            }
        };

        let crossed: Vec<PassengerId> = self
            .graph
            .trail(next, direction)
            .into_iter()
            .take(n as usize)
            .filter_map(|c| self.graph.occupant(c))
            .collect();

        let south = self
            .graph
            .neighbor(location, Direction::South)
            .filter(|&c| self.graph.is_available(c));

        let base = aisle_base_delay(south.is_some(), env.delays, env.rng);
        let delay = base
            + match kind {
                CrossingKind::Double => double_crossing_delay(env.delays, env.rng),
                _ => single_crossing_delay(env.delays, env.rng),
            };

        self.passenger_mut(id).borrow_cell(location);
        if let Some(cell) = south {
            self.borrow(id, cell);
        }
        self.settle_crossing(id, landing, kind, crossed, delay, env, outcome);
    }

    fn swap(
        &mut self,
        id: PassengerId,
        location: CellId,
        direction: Direction,
        next: CellId,
        env: &mut StepEnv<'_>,
        outcome: &mut StepOutcome,
    ) {
        let target = self.passengers[id].target();
        let behind = self
            .graph
            .neighbor(location, direction.opposite())
            .filter(|&c| self.graph.is_available(c));
        let neighbor = self.graph.occupant(next);
        let neighbor_idle = neighbor
            .and_then(|p| self.passengers.get(p))
            .is_some_and(|p| p.delay() == Fixed64::ZERO);

        let (Some(behind), Some(neighbor), true, true) = (
            behind,
            neighbor,
            neighbor_idle,
            self.graph.is_available(target),
        ) else {
            self.passenger_mut(id).record_wait();
            return;
        };

        let delay = swap_delay(env.delays, env.rng);
        self.borrow(id, behind);
        self.passenger_mut(id).borrow_cell(location);
        self.settle_crossing(
            id,
            target,
            CrossingKind::Swap,
            vec![neighbor],
            delay,
            env,
            outcome,
        );
    }

    /// Charge `delay` to the mover and everybody crossed, then land the
    /// mover on `landing`.
    #[allow(clippy::too_many_arguments)]
    fn settle_crossing(
        &mut self,
        id: PassengerId,
        landing: CellId,
        kind: CrossingKind,
        crossed: Vec<PassengerId>,
        delay: Fixed64,
        env: &mut StepEnv<'_>,
        outcome: &mut StepOutcome,
    ) {
        self.passenger_mut(id).add_delay(delay);
        for &other in &crossed {
            if let Some(p) = self.passengers.get_mut(other) {
                p.add_delay(delay);
            }
        }
        self.enter(id, landing);

        tracing::trace!(passenger = ?id, ?kind, crossed = crossed.len(), "seat crossing");
        outcome.disturbed.extend(crossed.iter().copied());
        env.events.push(BoardingEvent::SeatCrossed {
            passenger: id,
            kind,
            crossed,
            delay,
            time: env.time,
        });
    }
}
