use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a floor cell (aisle segment or seat) in the cabin graph.
    pub struct CellId;

    /// Identifies a passenger in the roster.
    pub struct PassengerId;

    /// Identifies an overhead luggage bin.
    pub struct BinId;
}

/// The deck a cell belongs to. Single-deck cabins only use `Lower`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Floor {
    #[default]
    Lower,
    Upper,
}

impl std::fmt::Display for Floor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Floor::Lower => write!(f, "lower"),
            Floor::Upper => write!(f, "upper"),
        }
    }
}
