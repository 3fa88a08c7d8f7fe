//! Overhead bins and the time it takes to stow bags in them.

use crate::delay::LoadDelay;
use crate::fixed::Fixed64;
use crate::rng::SimRng;
use serde::{Deserialize, Serialize};

/// An overhead bin shared by a span of aisle rows.
///
/// The load only ever grows; bins are never emptied during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LuggageBin {
    capacity: u32,
    load: u32,
}

impl LuggageBin {
    pub fn new(capacity: u32) -> Self {
        Self { capacity, load: 0 }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Bags stowed so far.
    pub fn load(&self) -> u32 {
        self.load
    }

    /// Put one bag in and return its delay at the new load.
    pub fn load_one_bag(&mut self, delay: &mut dyn LoadDelay, rng: &mut SimRng) -> Fixed64 {
        self.load += 1;
        delay.delay(self.load, self.capacity, rng)
    }

    /// Stow `bags` bags in one go. The total delay is the sum of the per-bag
    /// delays, each computed at the load it produced.
    pub fn stow(&mut self, bags: u32, delay: &mut dyn LoadDelay, rng: &mut SimRng) -> Fixed64 {
        (0..bags).fold(Fixed64::ZERO, |acc, _| {
            acc.saturating_add(self.load_one_bag(delay, rng))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delay::BinDelay;

    #[test]
    fn stowing_accumulates_load() {
        let mut rng = SimRng::new(0);
        let mut bin = LuggageBin::new(4);
        let mut per_bag = BinDelay::PerBag(2.0);
        let d = bin.stow(3, &mut per_bag, &mut rng);
        assert_eq!(d, Fixed64::from_num(6));
        assert_eq!(bin.load(), 3);
        bin.stow(2, &mut per_bag, &mut rng);
        assert_eq!(bin.load(), 5);
    }

    #[test]
    fn delay_sees_the_load_after_each_bag() {
        let mut rng = SimRng::new(0);
        let mut bin = LuggageBin::new(10);
        let mut seen = Vec::new();
        let mut recording = |load: u32, capacity: u32, _: &mut SimRng| {
            seen.push((load, capacity));
            Fixed64::from_num(load)
        };
        let d = bin.stow(3, &mut recording, &mut rng);
        assert_eq!(d, Fixed64::from_num(1 + 2 + 3));
        assert_eq!(seen, vec![(1, 10), (2, 10), (3, 10)]);
    }

    #[test]
    fn zero_bags_cost_nothing() {
        let mut rng = SimRng::new(0);
        let mut bin = LuggageBin::new(4);
        let mut per_bag = BinDelay::PerBag(2.0);
        assert_eq!(bin.stow(0, &mut per_bag, &mut rng), Fixed64::ZERO);
        assert_eq!(bin.load(), 0);
    }
}
