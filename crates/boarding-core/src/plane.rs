//! Planes: a cabin plus its doors, and the built-in aircraft presets.

use crate::delay::DelayModel;
use crate::entrance::{Entrance, EntranceKind, EntranceManager};
use crate::geometry::{Cabin, GeometryError, GridLayout};
use crate::id::PassengerId;
use crate::rng::SimRng;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CabinLayout
// ---------------------------------------------------------------------------

/// A serializable cabin description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CabinLayout {
    Grid(GridLayout),
    Combined { front: GridLayout, rear: GridLayout },
    TwoFloor { lower: GridLayout, upper: GridLayout },
}

impl CabinLayout {
    pub fn build(&self) -> Result<Cabin, GeometryError> {
        match self {
            CabinLayout::Grid(layout) => Cabin::grid(layout),
            CabinLayout::Combined { front, rear } => Cabin::combined(front, rear),
            CabinLayout::TwoFloor { lower, upper } => Cabin::two_floor(lower, upper),
        }
    }

    pub fn seat_count(&self) -> u32 {
        match self {
            CabinLayout::Grid(layout) => layout.seat_count(),
            CabinLayout::Combined { front: a, rear: b }
            | CabinLayout::TwoFloor { lower: a, upper: b } => a.seat_count() + b.seat_count(),
        }
    }
}

// ---------------------------------------------------------------------------
// Aircraft presets
// ---------------------------------------------------------------------------

/// Named cabin presets, from a narrow-body to a double-decker.
///
/// Serialized as `"airbus-320"`; the underscore spelling is accepted too,
/// for formats where variant names must be identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Aircraft {
    #[serde(rename = "airbus-320", alias = "airbus_320")]
    Airbus320,
    #[serde(rename = "boeing-767-200", alias = "boeing_767_200")]
    Boeing767_200,
    #[serde(rename = "boeing-767-400", alias = "boeing_767_400")]
    Boeing767_400,
    #[serde(rename = "airbus-a300-600", alias = "airbus_a300_600")]
    AirbusA300_600,
    #[serde(rename = "boeing-747", alias = "boeing_747")]
    Boeing747,
    #[serde(rename = "airbus-380", alias = "airbus_380")]
    Airbus380,
}

impl Aircraft {
    pub const ALL: [Aircraft; 6] = [
        Aircraft::Airbus320,
        Aircraft::Boeing767_200,
        Aircraft::Boeing767_400,
        Aircraft::AirbusA300_600,
        Aircraft::Boeing747,
        Aircraft::Airbus380,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Aircraft::Airbus320 => "airbus-320",
            Aircraft::Boeing767_200 => "boeing-767-200",
            Aircraft::Boeing767_400 => "boeing-767-400",
            Aircraft::AirbusA300_600 => "airbus-a300-600",
            Aircraft::Boeing747 => "boeing-747",
            Aircraft::Airbus380 => "airbus-380",
        }
    }

    /// Size class: S(mall), M(edium) or L(arge) plus an index.
    pub fn class(self) -> &'static str {
        match self {
            Aircraft::Airbus320 => "S1",
            Aircraft::Boeing767_200 => "S2",
            Aircraft::Boeing767_400 => "M1",
            Aircraft::AirbusA300_600 => "M2",
            Aircraft::Boeing747 => "L1",
            Aircraft::Airbus380 => "L2",
        }
    }

    pub fn layout(self) -> CabinLayout {
        match self {
            Aircraft::Airbus320 => CabinLayout::Grid(GridLayout::new(23, vec![3, 3]).with_bins(4, 2)),
            // Both 767 variants share the cabin; they differ in name only.
            Aircraft::Boeing767_200 | Aircraft::Boeing767_400 => CabinLayout::Combined {
                front: GridLayout::new(8, vec![2, 2, 2]).with_bins(8, 3),
                rear: GridLayout::new(25, vec![2, 3, 2]).with_bins(8, 3),
            },
            Aircraft::AirbusA300_600 => {
                CabinLayout::Grid(GridLayout::new(50, vec![2, 4, 2]).with_bins(4, 2))
            }
            Aircraft::Boeing747 => {
                CabinLayout::Grid(GridLayout::new(40, vec![3, 4, 3]).with_bins(4, 2))
            }
            Aircraft::Airbus380 => CabinLayout::TwoFloor {
                lower: GridLayout::new(40, vec![3, 4, 3]).with_bins(4, 2),
                upper: GridLayout::new(30, vec![2, 4, 2]).with_bins(4, 2),
            },
        }
    }

    pub fn build(self) -> Result<Plane, GeometryError> {
        Plane::from_layout(self.name(), &self.layout(), EntranceKind::Auto)
    }
}

impl std::fmt::Display for Aircraft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Plane
// ---------------------------------------------------------------------------

/// A cabin and the doors passengers board through.
#[derive(Debug, Clone)]
pub struct Plane {
    pub name: String,
    pub cabin: Cabin,
    pub entrances: EntranceManager,
}

impl Plane {
    pub fn new(name: impl Into<String>, cabin: Cabin, entrances: EntranceManager) -> Self {
        Self {
            name: name.into(),
            cabin,
            entrances,
        }
    }

    pub fn from_layout(
        name: impl Into<String>,
        layout: &CabinLayout,
        entrance: EntranceKind,
    ) -> Result<Self, GeometryError> {
        let cabin = layout.build()?;
        let entrances = EntranceManager::for_cabin(&cabin, entrance)?;
        Ok(Self::new(name, cabin, entrances))
    }

    pub fn available(&self, passenger: PassengerId) -> bool {
        self.entrances.available(&self.cabin, passenger)
    }

    pub fn board(
        &mut self,
        passenger: PassengerId,
        delays: &mut DelayModel,
        rng: &mut SimRng,
    ) -> Option<Entrance> {
        self.entrances
            .board(&mut self.cabin, passenger, delays, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::Floor;

    #[test]
    fn presets_have_the_expected_seat_counts() {
        let expected = [
            (Aircraft::Airbus320, 23 * 6),
            (Aircraft::Boeing767_200, 8 * 6 + 25 * 7),
            (Aircraft::Boeing767_400, 8 * 6 + 25 * 7),
            (Aircraft::AirbusA300_600, 50 * 8),
            (Aircraft::Boeing747, 40 * 10),
            (Aircraft::Airbus380, 40 * 10 + 30 * 8),
        ];
        for (aircraft, seats) in expected {
            let plane = aircraft.build().unwrap();
            assert_eq!(plane.cabin.roster().len(), seats, "{aircraft}");
            assert_eq!(aircraft.layout().seat_count() as usize, seats);
        }
    }

    #[test]
    fn double_decker_gets_a_door_per_floor() {
        let plane = Aircraft::Airbus380.build().unwrap();
        assert!(matches!(plane.entrances, EntranceManager::PerFloor { .. }));
        let floors: Vec<Floor> = plane
            .entrances
            .entrances()
            .iter()
            .map(|d| plane.cabin.graph().get(d.cell).unwrap().floor)
            .collect();
        assert_eq!(floors, vec![Floor::Lower, Floor::Upper]);
    }

    #[test]
    fn double_decker_refuses_lower_deck_doors() {
        let layout = Aircraft::Airbus380.layout();
        for kind in [EntranceKind::Single, EntranceKind::Multi] {
            let err = Plane::from_layout("a380", &layout, kind).unwrap_err();
            assert_eq!(err, GeometryError::LowerDeckEntrance { kind });
        }
        let plane = Plane::from_layout("a380", &layout, EntranceKind::PerFloor).unwrap();
        assert_eq!(plane.entrances.entrances().len(), 2);
    }

    #[test]
    fn aircraft_names_round_trip_through_serde() {
        for aircraft in Aircraft::ALL {
            let json = serde_json::to_string(&aircraft).unwrap();
            assert_eq!(json, format!("\"{}\"", aircraft.name()));
            let back: Aircraft = serde_json::from_str(&json).unwrap();
            assert_eq!(back, aircraft);
        }
    }

    #[test]
    fn plane_delegates_boarding() {
        let mut plane = Aircraft::Airbus320.build().unwrap();
        let mut delays = DelayModel::uniform(1.0);
        let mut rng = SimRng::new(0);
        let first = plane.cabin.roster()[0];
        let second = plane.cabin.roster()[1];
        assert!(plane.available(first));
        plane.board(first, &mut delays, &mut rng).unwrap();
        assert!(!plane.available(second));
    }
}
