//! Text renderings of a cabin.
//!
//! [`Cabin::compact`] prints one fixed-width token per cell:
//!
//! | token         | meaning                                   |
//! |---------------|-------------------------------------------|
//! | ` -DDD-B- `   | cell borrowed by a passenger (delay, bags) |
//! | ` #DDD-B# `   | passenger standing in the aisle            |
//! | ` ++WWW++ `   | passenger on a seat (times it waited)      |
//! | `    \|    `  | empty aisle cell                           |
//! | `    -    `   | empty seat                                 |
//!
//! [`Cabin::layout`] lists the `(row, file)` of every cell instead, marking
//! aisle cells that reach a luggage bin.

use crate::fixed::whole_units;
use crate::geometry::{Cabin, Section};
use crate::id::*;

impl Cabin {
    /// Occupancy token for one cell.
    pub fn compact_cell(&self, cell: CellId) -> String {
        let Some(c) = self.graph.get(cell) else {
            return String::new();
        };
        let occupant = c.occupant().and_then(|id| self.passengers.get(id));
        match occupant {
            Some(p) if p.location() != Some(cell) => {
                format!(" -{:03}-{:01}- ", whole_units(p.delay()), p.bags())
            }
            Some(p) if c.is_aisle() => {
                format!(" #{:03}-{:01}# ", whole_units(p.delay()), p.bags())
            }
            Some(p) => format!(" ++{:03}++ ", p.needed_to_wait()),
            None if c.is_aisle() => "    |    ".to_string(),
            None => "    -    ".to_string(),
        }
    }

    /// Row-major occupancy grid. Two-deck cabins print the upper deck first.
    pub fn compact(&self) -> String {
        self.render(|cabin, cell| cabin.compact_cell(cell))
    }

    /// Row-major `(row, file)` listing of every cell.
    pub fn layout(&self) -> String {
        self.render(|cabin, cell| {
            cabin
                .graph
                .get(cell)
                .map(ToString::to_string)
                .unwrap_or_default()
        })
    }

    fn render(&self, token: impl Fn(&Cabin, CellId) -> String) -> String {
        let floor = |floor: Floor| {
            self.sections_on(floor)
                .map(|s| self.render_section(s, &token))
                .collect::<Vec<_>>()
                .join("\n\n")
        };
        if self.has_floor(Floor::Upper) {
            format!(
                "Upper floor:\n{}\nLower floor:\n{}",
                floor(Floor::Upper),
                floor(Floor::Lower)
            )
        } else {
            floor(Floor::Lower)
        }
    }

    fn render_section(&self, section: &Section, token: &impl Fn(&Cabin, CellId) -> String) -> String {
        let mut out = String::new();
        for local_row in 0..section.len() {
            for cell in section.row(&self.graph, local_row) {
                out.push_str(&token(self, cell));
            }
            out.push('\n');
        }
        out
    }
}
