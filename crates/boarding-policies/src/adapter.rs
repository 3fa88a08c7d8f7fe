//! Reorderings layered over a [`Strategy`](crate::Strategy).
//!
//! An adapter keeps the passengers its inner ordering returned and only
//! splits them into two passes, preserving relative order inside each pass.

use std::fmt;
use std::str::FromStr;

use boarding_core::geometry::Cabin;
use boarding_core::id::PassengerId;
use serde::{Deserialize, Serialize};

use crate::UnknownName;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Adapter {
    /// The inner order unchanged.
    #[default]
    Original,
    /// Even rows, then odd rows.
    EvenOdd,
    /// Rows whose parity matches the seat's side of the cabin first, so
    /// neighbours across a band are never queued back to back.
    Staggered,
}

impl Adapter {
    pub const ALL: [Adapter; 3] = [Adapter::Original, Adapter::EvenOdd, Adapter::Staggered];

    pub fn name(self) -> &'static str {
        match self {
            Adapter::Original => "original",
            Adapter::EvenOdd => "even_odd",
            Adapter::Staggered => "staggered",
        }
    }

    pub fn apply(self, batch: Vec<PassengerId>, cabin: &Cabin) -> Vec<PassengerId> {
        let first_pass = |id: &PassengerId| {
            cabin.seat_info(*id).is_some_and(|seat| match self {
                Adapter::Original => true,
                Adapter::EvenOdd => seat.row % 2 == 0,
                Adapter::Staggered => seat.row % 2 == seat.major_file % 2,
            })
        };
        let (mut first, second): (Vec<_>, Vec<_>) = batch.into_iter().partition(first_pass);
        first.extend(second);
        first
    }
}

impl fmt::Display for Adapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Adapter {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Adapter::ALL
            .into_iter()
            .find(|adapter| adapter.name() == s)
            .ok_or_else(|| UnknownName::Adapter(s.to_string()))
    }
}
