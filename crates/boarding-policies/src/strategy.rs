//! Queue orderings.
//!
//! Every ordering sees only the passengers still waiting to board, so the
//! block boundaries and the "outermost seats" shrink as boarding goes on.

use std::fmt;
use std::str::FromStr;

use boarding_core::geometry::{Cabin, SeatInfo};
use boarding_core::id::PassengerId;
use boarding_core::rng::SimRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::UnknownName;

/// Number of zones used by the block orderings.
pub const BLOCK_COUNT: u32 = 5;

/// A boarding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Everyone at once in a random order.
    PreAssignedRandom,
    /// Everyone at once, front to back in seat order.
    Sequential,
    /// Everyone at once, back to front.
    ReverseSequential,
    /// Five zones front to back, random inside each zone.
    SequentialBlock,
    /// Five zones back to front.
    ReverseBlock,
    /// Zones in the order 0, 4, 1, 3, 2.
    RotatingBlock,
    /// Only the seats farthest from an aisle, windows first.
    OutsideIn,
    /// A diagonal wave: far rows and outer seats before near rows and
    /// aisle seats.
    ReversePyramid,
}

impl Strategy {
    pub const ALL: [Strategy; 8] = [
        Strategy::PreAssignedRandom,
        Strategy::Sequential,
        Strategy::ReverseSequential,
        Strategy::SequentialBlock,
        Strategy::ReverseBlock,
        Strategy::RotatingBlock,
        Strategy::OutsideIn,
        Strategy::ReversePyramid,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::PreAssignedRandom => "pre_assigned_random",
            Strategy::Sequential => "sequential",
            Strategy::ReverseSequential => "reverse_sequential",
            Strategy::SequentialBlock => "sequential_block",
            Strategy::ReverseBlock => "reverse_block",
            Strategy::RotatingBlock => "rotating_block",
            Strategy::OutsideIn => "outside_in",
            Strategy::ReversePyramid => "reverse_pyramid",
        }
    }

    /// Whether a single call always returns every waiting passenger.
    pub fn is_exhaustive(self) -> bool {
        !matches!(self, Strategy::OutsideIn | Strategy::ReversePyramid)
    }

    /// The next batch, drawn from `unboarded`.
    pub fn order(self, unboarded: &[PassengerId], cabin: &Cabin, rng: &mut SimRng) -> Vec<PassengerId> {
        match self {
            Strategy::Sequential => unboarded.to_vec(),
            Strategy::ReverseSequential => unboarded.iter().rev().copied().collect(),
            Strategy::PreAssignedRandom => shuffled(unboarded, rng),
            Strategy::SequentialBlock => zones_in(unboarded, cabin, rng, &[0, 1, 2, 3, 4]),
            Strategy::ReverseBlock => zones_in(unboarded, cabin, rng, &[4, 3, 2, 1, 0]),
            Strategy::RotatingBlock => zones_in(unboarded, cabin, rng, &[0, 4, 1, 3, 2]),
            Strategy::OutsideIn => {
                let seats = seats_of(&shuffled(unboarded, rng), cabin);
                let widest = seats.iter().map(|(_, s)| s.aisle_distance).max().unwrap_or(0);
                seats
                    .into_iter()
                    .filter(|(_, s)| s.aisle_distance == widest)
                    .map(|(id, _)| id)
                    .collect()
            }
            Strategy::ReversePyramid => {
                let seats = seats_of(&shuffled(unboarded, rng), cabin);
                let widest = seats.iter().map(|(_, s)| s.aisle_distance).max().unwrap_or(0);
                let half = farthest_row(&seats) / 2;
                seats
                    .into_iter()
                    .filter(|(_, s)| (widest - s.aisle_distance) * half < s.row)
                    .map(|(id, _)| id)
                    .collect()
            }
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| UnknownName::Strategy(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Zones
// ---------------------------------------------------------------------------

/// Split passengers into `count` zones of roughly equal row span.
///
/// Zone boundaries are computed from the farthest row still waiting, so the
/// zones shrink as the back of the cabin fills. Order inside each zone is
/// the input order.
pub fn blocks(unboarded: &[PassengerId], cabin: &Cabin, count: u32) -> Vec<Vec<PassengerId>> {
    let seats = seats_of(unboarded, cabin);
    let span = farthest_row(&seats) + 1;
    let mut zones = vec![Vec::new(); count as usize];
    for (id, seat) in seats {
        let zone = (seat.row * count / span) as usize;
        if let Some(zone) = zones.get_mut(zone) {
            zone.push(id);
        }
    }
    zones
}

fn zones_in(unboarded: &[PassengerId], cabin: &Cabin, rng: &mut SimRng, order: &[usize]) -> Vec<PassengerId> {
    let mut zones = blocks(&shuffled(unboarded, rng), cabin, BLOCK_COUNT);
    order
        .iter()
        .flat_map(|&z| std::mem::take(&mut zones[z]))
        .collect()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn shuffled(unboarded: &[PassengerId], rng: &mut SimRng) -> Vec<PassengerId> {
    let mut batch = unboarded.to_vec();
    batch.shuffle(rng);
    batch
}

fn seats_of(ids: &[PassengerId], cabin: &Cabin) -> Vec<(PassengerId, SeatInfo)> {
    ids.iter()
        .filter_map(|&id| cabin.seat_info(id).map(|seat| (id, seat)))
        .collect()
}

fn farthest_row(seats: &[(PassengerId, SeatInfo)]) -> u32 {
    seats.iter().map(|(_, s)| s.row).max().unwrap_or(0)
}
