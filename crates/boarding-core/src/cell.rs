//! The cabin floor graph.
//!
//! Every floor position is a [`Cell`] with up to four neighbors. Rows run
//! north (front) to south (back), files run west to east:
//!
//! ```text
//!  SSS A SSS A SSS      row 1
//!      A     A
//!  SSS A SSS A SSS      row 2
//! ```
//!
//! Links are always symmetric: connecting A to B eastward links B to A
//! westward. A cell with a north or south neighbor is an aisle cell; every
//! other cell is a seat.

use crate::id::*;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Compass direction of a link between two cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All four directions.
    pub fn all() -> [Direction; 4] {
        [
            Direction::North,
            Direction::East,
            Direction::South,
            Direction::West,
        ]
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// `+1` for east and south (increasing file/row), `-1` otherwise.
    pub fn ordinal(self) -> i64 {
        match self {
            Direction::East | Direction::South => 1,
            Direction::North | Direction::West => -1,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// One discrete floor position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    /// Row index, 0 at the front of the (combined) cabin.
    pub row: u32,
    /// File index, 0 at the west wall of the section.
    pub file: u32,
    pub floor: Floor,
    /// Overhead bin reachable from this cell. Aisle cells only.
    pub bin: Option<BinId>,
    /// Seat band index: band `b` lies between aisle `b - 1` and aisle `b`.
    /// Seats only.
    pub major_file: Option<u32>,
    /// Aisle index within the section. Aisle cells only.
    pub lane: Option<u32>,
    neighbors: [Option<CellId>; 4],
    occupant: Option<PassengerId>,
}

impl Cell {
    fn new(row: u32, file: u32, floor: Floor) -> Self {
        Self {
            row,
            file,
            floor,
            bin: None,
            major_file: None,
            lane: None,
            neighbors: [None; 4],
            occupant: None,
        }
    }

    pub fn neighbor(&self, direction: Direction) -> Option<CellId> {
        self.neighbors[direction.index()]
    }

    /// The passenger holding this cell, either as its location or as a
    /// borrowed cell.
    pub fn occupant(&self) -> Option<PassengerId> {
        self.occupant
    }

    pub fn is_available(&self) -> bool {
        self.occupant.is_none()
    }

    pub fn is_aisle(&self) -> bool {
        self.neighbor(Direction::North).is_some() || self.neighbor(Direction::South).is_some()
    }

    pub fn is_seat(&self) -> bool {
        !self.is_aisle()
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.bin.is_some() {
            write!(f, " B({:3}, {:3})B ", self.row, self.file)
        } else {
            write!(f, "  ({:3}, {:3})  ", self.row, self.file)
        }
    }
}

// ---------------------------------------------------------------------------
// CellGraph
// ---------------------------------------------------------------------------

/// Arena of cells plus the symmetric links between them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CellGraph {
    cells: SlotMap<CellId, Cell>,
}

impl CellGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an unconnected cell.
    pub fn add_cell(&mut self, row: u32, file: u32, floor: Floor) -> CellId {
        self.cells.insert(Cell::new(row, file, floor))
    }

    /// Link `from` to `to` in `direction` and `to` back to `from` in the
    /// opposite direction. Returns `to` so chains read left to right.
    pub fn connect(&mut self, from: CellId, direction: Direction, to: CellId) -> CellId {
        self.cells[from].neighbors[direction.index()] = Some(to);
        self.cells[to].neighbors[direction.opposite().index()] = Some(from);
        to
    }

    pub fn get(&self, cell: CellId) -> Option<&Cell> {
        self.cells.get(cell)
    }

    pub fn get_mut(&mut self, cell: CellId) -> Option<&mut Cell> {
        self.cells.get_mut(cell)
    }

    pub fn contains(&self, cell: CellId) -> bool {
        self.cells.contains_key(cell)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CellId, &Cell)> {
        self.cells.iter()
    }

    pub fn neighbor(&self, cell: CellId, direction: Direction) -> Option<CellId> {
        self.cells.get(cell).and_then(|c| c.neighbor(direction))
    }

    pub fn is_aisle(&self, cell: CellId) -> bool {
        self.cells.get(cell).is_some_and(Cell::is_aisle)
    }

    pub fn is_available(&self, cell: CellId) -> bool {
        self.cells.get(cell).is_some_and(Cell::is_available)
    }

    pub fn occupant(&self, cell: CellId) -> Option<PassengerId> {
        self.cells.get(cell).and_then(Cell::occupant)
    }

    // -----------------------------------------------------------------------
    // Occupancy
    // -----------------------------------------------------------------------

    /// Record `passenger` as the holder of `cell`.
    pub(crate) fn claim(&mut self, cell: CellId, passenger: PassengerId) {
        if let Some(c) = self.cells.get_mut(cell) {
            c.occupant = Some(passenger);
        }
    }

    /// Clear the holder of `cell`.
    pub(crate) fn release(&mut self, cell: CellId) {
        if let Some(c) = self.cells.get_mut(cell) {
            c.occupant = None;
        }
    }

    // -----------------------------------------------------------------------
    // Walks
    // -----------------------------------------------------------------------

    /// Follow `direction` until there is no further link.
    pub fn shoot_off(&self, cell: CellId, direction: Direction) -> CellId {
        let mut n = cell;
        while let Some(next) = self.neighbor(n, direction) {
            n = next;
        }
        n
    }

    /// `cell` followed by every cell reachable in `direction`.
    pub fn trail(&self, cell: CellId, direction: Direction) -> Vec<CellId> {
        let mut out = vec![cell];
        let mut n = cell;
        while let Some(next) = self.neighbor(n, direction) {
            out.push(next);
            n = next;
        }
        out
    }

    /// The cell `distance` steps away, if the links reach that far.
    pub fn travel(&self, cell: CellId, direction: Direction, distance: u32) -> Option<CellId> {
        let mut n = cell;
        for _ in 0..distance {
            n = self.neighbor(n, direction)?;
        }
        Some(n)
    }

    /// The full physical row through `cell`, west to east.
    pub fn row_through(&self, cell: CellId) -> Vec<CellId> {
        self.trail(self.shoot_off(cell, Direction::West), Direction::East)
    }

    /// Closest aisle cell in the same row and the number of steps to it.
    ///
    /// Walks west and east until an aisle or the row boundary. When both
    /// directions reach an aisle the shorter walk wins, ties going east.
    /// An aisle cell is its own nearest aisle at distance 0.
    pub fn nearest_aisle(&self, cell: CellId) -> Option<(u32, CellId)> {
        if self.is_aisle(cell) {
            return Some((0, cell));
        }
        let west = self.walk_to_aisle(cell, Direction::West);
        let east = self.walk_to_aisle(cell, Direction::East);
        match (west, east) {
            (Some(w), Some(e)) => Some(if e.0 <= w.0 { e } else { w }),
            (w, e) => e.or(w),
        }
    }

    fn walk_to_aisle(&self, cell: CellId, direction: Direction) -> Option<(u32, CellId)> {
        let mut steps = 0;
        let mut n = cell;
        while let Some(next) = self.neighbor(n, direction) {
            steps += 1;
            if self.is_aisle(next) {
                return Some((steps, next));
            }
            n = next;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two-row single aisle: `S S A S` on rows 0 and 1.
    fn tiny() -> (CellGraph, Vec<Vec<CellId>>) {
        let mut g = CellGraph::new();
        let a0 = g.add_cell(0, 2, Floor::Lower);
        let a1 = g.add_cell(1, 2, Floor::Lower);
        g.connect(a0, Direction::South, a1);

        let mut rows = Vec::new();
        for aisle in [a0, a1] {
            let row = g.get(aisle).unwrap().row;
            let w1 = g.add_cell(row, 1, Floor::Lower);
            let w0 = g.add_cell(row, 0, Floor::Lower);
            let e3 = g.add_cell(row, 3, Floor::Lower);
            g.connect(aisle, Direction::West, w1);
            g.connect(w1, Direction::West, w0);
            g.connect(aisle, Direction::East, e3);
            rows.push(vec![w0, w1, aisle, e3]);
        }
        (g, rows)
    }

    #[test]
    fn connect_is_symmetric() {
        let (g, rows) = tiny();
        for (id, cell) in g.iter() {
            for d in Direction::all() {
                if let Some(n) = cell.neighbor(d) {
                    assert_eq!(g.neighbor(n, d.opposite()), Some(id));
                }
            }
        }
        assert_eq!(g.neighbor(rows[0][2], Direction::South), Some(rows[1][2]));
    }

    #[test]
    fn aisle_classification() {
        let (g, rows) = tiny();
        assert!(g.is_aisle(rows[0][2]));
        assert!(g.is_aisle(rows[1][2]));
        assert!(!g.is_aisle(rows[0][0]));
        assert!(!g.is_aisle(rows[1][3]));
    }

    #[test]
    fn row_through_any_cell_lists_the_whole_row() {
        let (g, rows) = tiny();
        assert_eq!(g.row_through(rows[1][2]), rows[1]);
        assert_eq!(g.row_through(rows[1][3]), rows[1]);
    }

    #[test]
    fn nearest_aisle_counts_steps() {
        let (g, rows) = tiny();
        assert_eq!(g.nearest_aisle(rows[0][0]), Some((2, rows[0][2])));
        assert_eq!(g.nearest_aisle(rows[0][1]), Some((1, rows[0][2])));
        assert_eq!(g.nearest_aisle(rows[0][3]), Some((1, rows[0][2])));
        assert_eq!(g.nearest_aisle(rows[0][2]), Some((0, rows[0][2])));
    }

    #[test]
    fn nearest_aisle_ties_go_east() {
        let mut g = CellGraph::new();
        let w = g.add_cell(0, 0, Floor::Lower);
        let w_n = g.add_cell(1, 0, Floor::Lower);
        g.connect(w_n, Direction::South, w);
        let seat = g.add_cell(0, 1, Floor::Lower);
        let e = g.add_cell(0, 2, Floor::Lower);
        let e_n = g.add_cell(1, 2, Floor::Lower);
        g.connect(e_n, Direction::South, e);
        g.connect(w, Direction::East, seat);
        g.connect(seat, Direction::East, e);

        assert_eq!(g.nearest_aisle(seat), Some((1, e)));
    }

    #[test]
    fn travel_stops_at_the_boundary() {
        let (g, rows) = tiny();
        assert_eq!(g.travel(rows[0][2], Direction::West, 2), Some(rows[0][0]));
        assert_eq!(g.travel(rows[0][2], Direction::West, 3), None);
        assert_eq!(g.shoot_off(rows[0][2], Direction::East), rows[0][3]);
    }

    #[test]
    fn claim_and_release() {
        let (mut g, rows) = tiny();
        let mut passengers: SlotMap<PassengerId, ()> = SlotMap::with_key();
        let p = passengers.insert(());
        assert!(g.is_available(rows[0][0]));
        g.claim(rows[0][0], p);
        assert_eq!(g.occupant(rows[0][0]), Some(p));
        g.release(rows[0][0]);
        assert!(g.is_available(rows[0][0]));
    }

    #[test]
    fn display_marks_bins() {
        let mut cell = Cell::new(3, 4, Floor::Lower);
        assert_eq!(cell.to_string(), "  (  3,   4)  ");
        let mut bins: SlotMap<BinId, ()> = SlotMap::with_key();
        cell.bin = Some(bins.insert(()));
        assert_eq!(cell.to_string(), " B(  3,   4)B ");
    }
}
