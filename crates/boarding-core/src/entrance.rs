//! Admission onto the cabin graph.

use crate::delay::{DelayModel, DelaySource};
use crate::fixed::Fixed64;
use crate::geometry::{Cabin, GeometryError};
use crate::id::*;
use crate::rng::SimRng;
use serde::{Deserialize, Serialize};

/// Serializable choice of entrance arrangement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntranceKind {
    /// Single door for one-deck cabins, one door per deck otherwise.
    #[default]
    Auto,
    Single,
    Multi,
    PerFloor,
}

/// One door: a cell passengers step onto, and the aisle lane it leads down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entrance {
    pub cell: CellId,
    pub lane: u32,
}

/// Decides whether the head of the queue can board, and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntranceManager {
    /// One door at the head of the first aisle.
    Single(Entrance),
    /// A door at the head of every aisle of the front section. Passengers
    /// never use a door east of their own aisle, so the cross-over row only
    /// carries eastbound traffic.
    Multi(Vec<Entrance>),
    /// One door per deck. Upper deck passengers pay a floor change delay.
    PerFloor { lower: Entrance, upper: Entrance },
}

impl EntranceManager {
    pub fn single(cabin: &Cabin) -> Self {
        EntranceManager::Single(front_door(cabin, Floor::Lower))
    }

    pub fn multi(cabin: &Cabin) -> Self {
        let doors = cabin
            .sections()
            .first()
            .map(|s| {
                s.aisles
                    .iter()
                    .map(|a| Entrance {
                        cell: a.head(),
                        lane: a.lane,
                    })
                    .collect()
            })
            .unwrap_or_default();
        EntranceManager::Multi(doors)
    }

    /// A cabin without an upper deck gets the lower door for both.
    pub fn per_floor(cabin: &Cabin) -> Self {
        let lower = front_door(cabin, Floor::Lower);
        let upper = if cabin.has_floor(Floor::Upper) {
            front_door(cabin, Floor::Upper)
        } else {
            lower
        };
        EntranceManager::PerFloor { lower, upper }
    }

    /// Doors of the requested kind. `Single` and `Multi` only reach the
    /// lower deck and are rejected on a cabin with an upper one.
    pub fn for_cabin(cabin: &Cabin, kind: EntranceKind) -> Result<Self, GeometryError> {
        let two_decks = cabin.has_floor(Floor::Upper);
        match kind {
            EntranceKind::Single | EntranceKind::Multi if two_decks => {
                Err(GeometryError::LowerDeckEntrance { kind })
            }
            EntranceKind::Single => Ok(Self::single(cabin)),
            EntranceKind::Multi => Ok(Self::multi(cabin)),
            EntranceKind::PerFloor => Ok(Self::per_floor(cabin)),
            EntranceKind::Auto if two_decks => Ok(Self::per_floor(cabin)),
            EntranceKind::Auto => Ok(Self::single(cabin)),
        }
    }

    pub fn entrances(&self) -> Vec<Entrance> {
        match self {
            EntranceManager::Single(door) => vec![*door],
            EntranceManager::Multi(doors) => doors.clone(),
            EntranceManager::PerFloor { lower, upper } if lower == upper => vec![*lower],
            EntranceManager::PerFloor { lower, upper } => vec![*lower, *upper],
        }
    }

    /// Whether `passenger` could board right now.
    pub fn available(&self, cabin: &Cabin, passenger: PassengerId) -> bool {
        self.choose(cabin, passenger).is_some()
    }

    /// The door `passenger` would use, if one is free.
    pub fn choose(&self, cabin: &Cabin, passenger: PassengerId) -> Option<Entrance> {
        let free = |door: &Entrance| cabin.graph().is_available(door.cell);
        match self {
            EntranceManager::Single(door) => Some(*door).filter(free),
            EntranceManager::Multi(doors) => {
                let lane = target_lane(cabin, passenger);
                doors
                    .iter()
                    .filter(|d| d.lane <= lane && free(d))
                    .min_by_key(|d| (aisle_load(cabin, d), lane - d.lane))
                    .copied()
            }
            EntranceManager::PerFloor { lower, upper } => {
                let floor = cabin.seat_info(passenger).map(|s| s.floor);
                let door = if floor == Some(Floor::Upper) { upper } else { lower };
                Some(*door).filter(free)
            }
        }
    }

    /// Put `passenger` on a free door. Returns the door used, or `None` when
    /// every suitable door is taken.
    pub fn board(
        &self,
        cabin: &mut Cabin,
        passenger: PassengerId,
        delays: &mut DelayModel,
        rng: &mut SimRng,
    ) -> Option<Entrance> {
        let door = self.choose(cabin, passenger)?;
        cabin.place(passenger, door.cell);

        let upper = matches!(self, EntranceManager::PerFloor { .. })
            && cabin.graph().get(door.cell).map(|c| c.floor) == Some(Floor::Upper);
        if upper {
            let climb = delays.floor_change.sample(rng);
            if climb > Fixed64::ZERO {
                cabin.passenger_mut(passenger).add_delay(climb);
            }
        }
        Some(door)
    }
}

fn front_door(cabin: &Cabin, floor: Floor) -> Entrance {
    let section = cabin
        .sections_on(floor)
        .next()
        .or_else(|| cabin.sections().first());
    match section {
        Some(s) => Entrance {
            cell: s.entrance(),
            lane: s.aisles[0].lane,
        },
        // Cabins are built with at least one section.
        None => Entrance {
            cell: CellId::default(),
            lane: 0,
        },
    }
}

fn target_lane(cabin: &Cabin, passenger: PassengerId) -> u32 {
    cabin
        .passenger(passenger)
        .and_then(|p| cabin.graph().nearest_aisle(p.target()))
        .and_then(|(_, aisle)| cabin.graph().get(aisle))
        .and_then(|c| c.lane)
        .unwrap_or(0)
}

fn aisle_load(cabin: &Cabin, door: &Entrance) -> usize {
    cabin
        .sections()
        .iter()
        .flat_map(|s| s.aisles.iter())
        .find(|a| a.head() == door.cell)
        .map_or(0, |a| cabin.aisle_load(a))
}
