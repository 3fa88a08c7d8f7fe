//! Aisles: south-linked chains of cells under their overhead bins. Seat rows
//! hang off either side.

use crate::cell::{CellGraph, Direction};
use crate::id::*;
use crate::luggage::LuggageBin;
use slotmap::SlotMap;

/// A south-linked chain of aisle cells. Seats are hung off it with
/// [`Aisle::add_window_row`] and [`Aisle::add_bridge_row`].
#[derive(Debug, Clone)]
pub struct Aisle {
    /// Aisle index within its section, counted west to east.
    pub lane: u32,
    /// File the aisle runs along.
    pub file: u32,
    cells: Vec<CellId>,
    bins: Vec<BinId>,
}

/// Construction parameters shared by every aisle of a section.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AisleSpec {
    pub lane: u32,
    pub file: u32,
    /// Number of cells, front to back.
    pub length: u32,
    /// Global row of the first cell.
    pub first_row: u32,
    pub floor: Floor,
    pub bin_capacity: u32,
    pub bin_row_span: u32,
}

impl Aisle {
    /// Build the chain. Cell 0 and the first `bin_row_span` seat rows share a
    /// bin; after that a new bin starts every `bin_row_span` rows.
    pub(crate) fn build(
        graph: &mut CellGraph,
        bins: &mut SlotMap<BinId, LuggageBin>,
        spec: AisleSpec,
    ) -> Self {
        let span = spec.bin_row_span.max(1);
        let mut cells = Vec::with_capacity(spec.length as usize);
        let mut aisle_bins = Vec::new();

        let mut last_bin = bins.insert(LuggageBin::new(spec.bin_capacity));
        aisle_bins.push(last_bin);
        let mut last_bin_row = 1;

        for i in 0..spec.length {
            if i > last_bin_row + span - 1 {
                last_bin = bins.insert(LuggageBin::new(spec.bin_capacity));
                aisle_bins.push(last_bin);
                last_bin_row = i;
            }

            let cell = graph.add_cell(spec.first_row + i, spec.file, spec.floor);
            if let Some(c) = graph.get_mut(cell) {
                c.bin = Some(last_bin);
                c.lane = Some(spec.lane);
            }
            if let Some(&prev) = cells.last() {
                graph.connect(prev, Direction::South, cell);
            }
            cells.push(cell);
        }

        Self {
            lane: spec.lane,
            file: spec.file,
            cells,
            bins: aisle_bins,
        }
    }

    /// Front-most cell.
    pub fn head(&self) -> CellId {
        self.cells[0]
    }

    /// Rear-most cell.
    pub fn tail(&self) -> CellId {
        self.cells[self.cells.len() - 1]
    }

    /// The aisle cell at a section-local row.
    pub fn cell(&self, local_row: u32) -> Option<CellId> {
        self.cells.get(local_row as usize).copied()
    }

    pub fn cells(&self) -> &[CellId] {
        &self.cells
    }

    pub fn bins(&self) -> &[BinId] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Hang `files` seats off the aisle cell at `local_row`, heading
    /// `direction`. Returns the outermost (window) seat.
    pub(crate) fn add_window_row(
        &self,
        graph: &mut CellGraph,
        local_row: u32,
        direction: Direction,
        files: u32,
        major_file: u32,
    ) -> CellId {
        let mut base = self.cells[local_row as usize];
        let (row, floor) = match graph.get(base) {
            Some(c) => (c.row, c.floor),
            None => return base,
        };

        for i in 0..files {
            let offset = (i as i64 + 1) * direction.ordinal();
            let file = (self.file as i64 + offset).max(0) as u32;
            let seat = graph.add_cell(row, file, floor);
            if let Some(c) = graph.get_mut(seat) {
                c.major_file = Some(major_file);
            }
            base = graph.connect(base, direction, seat);
        }

        base
    }

    /// Lay `files` seats eastward from this aisle and join the last one to
    /// `bridged` at the same row. Returns the bridged aisle's cell.
    pub(crate) fn add_bridge_row(
        &self,
        graph: &mut CellGraph,
        bridged: &Aisle,
        local_row: u32,
        files: u32,
        major_file: u32,
    ) -> CellId {
        let last = self.add_window_row(graph, local_row, Direction::East, files, major_file);
        graph.connect(last, Direction::East, bridged.cells[local_row as usize])
    }
}
