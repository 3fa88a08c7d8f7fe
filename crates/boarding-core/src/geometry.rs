//! Cabin geometries.
//!
//! A [`Cabin`] owns the cell graph, the luggage bins and one [`Passenger`]
//! per seat. It is assembled from one or more grid [`Section`]s:
//!
//! - [`Cabin::grid`] -- a single section.
//! - [`Cabin::combined`] -- two sections front to back, rear rows numbered
//!   after the front ones and the aisles joined lane by lane.
//! - [`Cabin::two_floor`] -- a lower and an upper deck, not connected.
//!
//! Every section starts with a seatless cross-over row 0 that bridges the
//! aisles. Seat rows follow at 1..=rows, then an optional rear galley.

use crate::aisle::{Aisle, AisleSpec};
use crate::cell::{CellGraph, Direction};
use crate::delay::BagSource;
use crate::entrance::EntranceKind;
use crate::id::*;
use crate::luggage::LuggageBin;
use crate::passenger::Passenger;
use crate::rng::SimRng;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors from cabin construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    #[error("a layout needs at least two seat bands to place an aisle, got {bands}")]
    NoAisles { bands: usize },
    #[error("a layout needs at least one seat row")]
    NoRows,
    #[error("luggage bins need a non-zero capacity")]
    ZeroBinCapacity,
    #[error("luggage bins must span at least one row")]
    ZeroBinSpan,
    #[error("cannot join {north} aisle(s) to {south} aisle(s)")]
    AisleCountMismatch { north: usize, south: usize },
    #[error("{kind:?} doors only reach the lower deck; use per-floor doors on a two-deck cabin")]
    LowerDeckEntrance { kind: EntranceKind },
}

// ---------------------------------------------------------------------------
// GridLayout
// ---------------------------------------------------------------------------

fn default_bin_capacity() -> u32 {
    4
}

fn default_bin_row_span() -> u32 {
    2
}

/// Parameters of one rectangular seating section.
///
/// `seat_files` lists the number of seats in each band, west to east. An
/// aisle runs between every two adjacent bands, so `[3, 3]` is a single
/// aisle cabin and `[2, 4, 2]` a twin aisle one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLayout {
    pub rows: u32,
    pub seat_files: Vec<u32>,
    #[serde(default = "default_bin_capacity")]
    pub bin_capacity: u32,
    #[serde(default = "default_bin_row_span")]
    pub bin_row_span: u32,
    /// Add a seatless cross-over row behind the last seat row.
    #[serde(default)]
    pub rear_galley: bool,
}

impl GridLayout {
    pub fn new(rows: u32, seat_files: Vec<u32>) -> Self {
        Self {
            rows,
            seat_files,
            bin_capacity: default_bin_capacity(),
            bin_row_span: default_bin_row_span(),
            rear_galley: false,
        }
    }

    pub fn with_bins(mut self, capacity: u32, row_span: u32) -> Self {
        self.bin_capacity = capacity;
        self.bin_row_span = row_span;
        self
    }

    pub fn with_rear_galley(mut self) -> Self {
        self.rear_galley = true;
        self
    }

    /// Number of aisles.
    pub fn lanes(&self) -> usize {
        self.seat_files.len().saturating_sub(1)
    }

    /// Cells along each aisle: row 0, the seat rows and the galley.
    pub fn length(&self) -> u32 {
        self.rows + 1 + u32::from(self.rear_galley)
    }

    /// Seats in the section.
    pub fn seat_count(&self) -> u32 {
        self.rows * self.seat_files.iter().sum::<u32>()
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.lanes() == 0 {
            return Err(GeometryError::NoAisles {
                bands: self.seat_files.len(),
            });
        }
        if self.rows == 0 {
            return Err(GeometryError::NoRows);
        }
        if self.bin_capacity == 0 {
            return Err(GeometryError::ZeroBinCapacity);
        }
        if self.bin_row_span == 0 {
            return Err(GeometryError::ZeroBinSpan);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Section
// ---------------------------------------------------------------------------

/// One grid section of a cabin.
#[derive(Debug, Clone)]
pub struct Section {
    pub floor: Floor,
    /// Global row of the section's cross-over row 0.
    pub row_offset: u32,
    /// Number of seat rows.
    pub seat_rows: u32,
    pub aisles: Vec<Aisle>,
    seats: Vec<CellId>,
}

impl Section {
    /// Head of the westmost aisle: where passengers step on board.
    pub fn entrance(&self) -> CellId {
        self.aisles[0].head()
    }

    /// Heads of every aisle, west to east.
    pub fn heads(&self) -> Vec<CellId> {
        self.aisles.iter().map(Aisle::head).collect()
    }

    /// Rows including the cross-over row and galley.
    pub fn len(&self) -> u32 {
        self.aisles[0].len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.aisles[0].is_empty()
    }

    /// Seat cells, front to back, west to east.
    pub fn seats(&self) -> &[CellId] {
        &self.seats
    }

    /// Every cell of a section-local row, west to east.
    pub fn row(&self, graph: &CellGraph, local_row: u32) -> Vec<CellId> {
        match self.aisles[0].cell(local_row) {
            Some(cell) => graph.row_through(cell),
            None => Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Seat info
// ---------------------------------------------------------------------------

/// Where a passenger's seat is, as seen by boarding orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatInfo {
    pub row: u32,
    pub file: u32,
    pub floor: Floor,
    pub major_file: u32,
    /// Steps from the seat to its nearest aisle.
    pub aisle_distance: u32,
}

// ---------------------------------------------------------------------------
// Cabin
// ---------------------------------------------------------------------------

/// The cabin aggregate: cell graph, bins, sections and passenger roster.
#[derive(Debug, Clone)]
pub struct Cabin {
    pub(crate) graph: CellGraph,
    pub(crate) bins: SlotMap<BinId, LuggageBin>,
    pub(crate) passengers: SlotMap<PassengerId, Passenger>,
    sections: Vec<Section>,
    roster: Vec<PassengerId>,
}

impl Cabin {
    /// A single grid section.
    pub fn grid(layout: &GridLayout) -> Result<Self, GeometryError> {
        let mut builder = CabinBuilder::default();
        builder.add_grid(layout, Floor::Lower, 0)?;
        Ok(builder.finish())
    }

    /// Two sections front to back, their aisles joined lane by lane.
    pub fn combined(front: &GridLayout, rear: &GridLayout) -> Result<Self, GeometryError> {
        if front.lanes() != rear.lanes() {
            return Err(GeometryError::AisleCountMismatch {
                north: front.lanes(),
                south: rear.lanes(),
            });
        }
        let mut builder = CabinBuilder::default();
        let north = builder.add_grid(front, Floor::Lower, 0)?;
        let south = builder.add_grid(rear, Floor::Lower, front.length())?;
        builder.join_lanes(north, south)?;
        Ok(builder.finish())
    }

    /// Two unconnected decks. Lower deck passengers come first in the roster.
    pub fn two_floor(lower: &GridLayout, upper: &GridLayout) -> Result<Self, GeometryError> {
        let mut builder = CabinBuilder::default();
        builder.add_grid(lower, Floor::Lower, 0)?;
        builder.add_grid(upper, Floor::Upper, 0)?;
        Ok(builder.finish())
    }

    pub fn graph(&self) -> &CellGraph {
        &self.graph
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Sections on one floor, front to back.
    pub fn sections_on(&self, floor: Floor) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(move |s| s.floor == floor)
    }

    pub fn has_floor(&self, floor: Floor) -> bool {
        self.sections_on(floor).next().is_some()
    }

    /// Every passenger in seat order.
    pub fn roster(&self) -> &[PassengerId] {
        &self.roster
    }

    pub fn passenger(&self, id: PassengerId) -> Option<&Passenger> {
        self.passengers.get(id)
    }

    pub fn passengers(&self) -> impl Iterator<Item = (PassengerId, &Passenger)> {
        self.passengers.iter()
    }

    pub fn bin(&self, id: BinId) -> Option<&LuggageBin> {
        self.bins.get(id)
    }

    pub fn bins(&self) -> impl Iterator<Item = (BinId, &LuggageBin)> {
        self.bins.iter()
    }

    /// Rows of the longest floor, cross-over rows and galleys included.
    pub fn row_count(&self) -> u32 {
        [Floor::Lower, Floor::Upper]
            .into_iter()
            .map(|floor| self.sections_on(floor).map(Section::len).sum::<u32>())
            .max()
            .unwrap_or(0)
    }

    /// Seat details for a passenger's target.
    pub fn seat_info(&self, id: PassengerId) -> Option<SeatInfo> {
        let target = self.passengers.get(id)?.target();
        let cell = self.graph.get(target)?;
        Some(SeatInfo {
            row: cell.row,
            file: cell.file,
            floor: cell.floor,
            major_file: cell.major_file.unwrap_or(0),
            aisle_distance: self.graph.nearest_aisle(target).map_or(0, |(d, _)| d),
        })
    }

    /// Draw a bag count for every passenger, in roster order.
    pub fn assign_bags(&mut self, source: &mut dyn BagSource, rng: &mut SimRng) {
        for &id in &self.roster {
            if let Some(p) = self.passengers.get_mut(id) {
                p.set_bags(source.bags(rng));
            }
        }
    }

    /// Put a passenger on `cell` directly, without an entrance check.
    pub(crate) fn place(&mut self, id: PassengerId, cell: CellId) {
        self.enter(id, cell);
    }

    /// Passengers physically standing on a cell of the given aisle.
    pub fn aisle_load(&self, aisle: &Aisle) -> usize {
        aisle
            .cells()
            .iter()
            .filter_map(|&c| self.graph.occupant(c).map(|p| (c, p)))
            .filter(|&(c, p)| self.passengers.get(p).and_then(Passenger::location) == Some(c))
            .count()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

#[derive(Default)]
struct CabinBuilder {
    graph: CellGraph,
    bins: SlotMap<BinId, LuggageBin>,
    sections: Vec<Section>,
}

impl CabinBuilder {
    /// Build one grid section with its rows starting at `row_offset`.
    /// Returns the section index.
    fn add_grid(
        &mut self,
        layout: &GridLayout,
        floor: Floor,
        row_offset: u32,
    ) -> Result<usize, GeometryError> {
        layout.validate()?;
        let lanes = layout.lanes();

        let mut aisles = Vec::with_capacity(lanes);
        for lane in 0..lanes {
            let file = layout.seat_files[..=lane].iter().sum::<u32>() + lane as u32;
            let spec = AisleSpec {
                lane: lane as u32,
                file,
                length: layout.length(),
                first_row: row_offset,
                floor,
                bin_capacity: layout.bin_capacity,
                bin_row_span: layout.bin_row_span,
            };
            aisles.push(Aisle::build(&mut self.graph, &mut self.bins, spec));
        }

        let east_band = lanes;
        let mut seats = Vec::new();
        for local_row in 0..layout.length() {
            let seated = (1..=layout.rows).contains(&local_row);
            if seated {
                aisles[0].add_window_row(
                    &mut self.graph,
                    local_row,
                    Direction::West,
                    layout.seat_files[0],
                    0,
                );
            }
            for band in 1..lanes {
                aisles[band - 1].add_bridge_row(
                    &mut self.graph,
                    &aisles[band],
                    local_row,
                    layout.seat_files[band],
                    band as u32,
                );
            }
            if seated {
                aisles[lanes - 1].add_window_row(
                    &mut self.graph,
                    local_row,
                    Direction::East,
                    layout.seat_files[east_band],
                    east_band as u32,
                );
                if let Some(cell) = aisles[0].cell(local_row) {
                    let row = self.graph.row_through(cell);
                    seats.extend(row.into_iter().filter(|&c| !self.graph.is_aisle(c)));
                }
            }
        }

        self.sections.push(Section {
            floor,
            row_offset,
            seat_rows: layout.rows,
            aisles,
            seats,
        });
        Ok(self.sections.len() - 1)
    }

    /// Connect the tail of every aisle of `north` to the head of the aisle
    /// with the same lane in `south`.
    fn join_lanes(&mut self, north: usize, south: usize) -> Result<(), GeometryError> {
        let (n, s) = (&self.sections[north], &self.sections[south]);
        if n.aisles.len() != s.aisles.len() {
            return Err(GeometryError::AisleCountMismatch {
                north: n.aisles.len(),
                south: s.aisles.len(),
            });
        }
        let pairs: Vec<(CellId, CellId)> = n
            .aisles
            .iter()
            .zip(&s.aisles)
            .map(|(a, b)| (a.tail(), b.head()))
            .collect();
        for (tail, head) in pairs {
            self.graph.connect(tail, Direction::South, head);
        }
        Ok(())
    }

    /// One passenger per seat, sequence numbers following the roster.
    fn finish(self) -> Cabin {
        let mut passengers = SlotMap::with_key();
        let mut roster = Vec::new();
        for section in &self.sections {
            for &seat in &section.seats {
                let mut p = Passenger::new(seat, 0);
                p.set_sequence(roster.len() as u32);
                roster.push(passengers.insert(p));
            }
        }
        Cabin {
            graph: self.graph,
            bins: self.bins,
            passengers,
            sections: self.sections,
            roster,
        }
    }
}
