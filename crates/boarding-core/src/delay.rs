//! Pluggable delay sampling.
//!
//! The movement model composes four base costs: Seat-to-Seat (SS),
//! Aisle-to-Seat (AS), Seat-to-Aisle (SA) and Aisle-to-Aisle (AA). Each is an
//! independent [`DelaySource`]. Luggage bins use a [`LoadDelay`], bag counts
//! come from a [`BagSource`]. Closures implement all three traits, and the
//! serializable [`Delay`], [`BinDelay`] and [`BagCount`] enums cover the
//! distributions used by scenario files.
//!
//! Every source draws from a caller-supplied [`SimRng`]; sources never own
//! hidden randomness.

use crate::fixed::{Fixed64, f64_to_fixed64, non_negative};
use crate::rng::SimRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// A source of non-negative delay samples.
pub trait DelaySource {
    fn sample(&mut self, rng: &mut SimRng) -> Fixed64;
}

impl<F> DelaySource for F
where
    F: FnMut(&mut SimRng) -> Fixed64,
{
    fn sample(&mut self, rng: &mut SimRng) -> Fixed64 {
        non_negative(self(rng))
    }
}

/// Delay for putting one bag into a bin, given the bin's load after the bag
/// went in and its nominal capacity.
pub trait LoadDelay {
    fn delay(&mut self, load: u32, capacity: u32, rng: &mut SimRng) -> Fixed64;
}

impl<F> LoadDelay for F
where
    F: FnMut(u32, u32, &mut SimRng) -> Fixed64,
{
    fn delay(&mut self, load: u32, capacity: u32, rng: &mut SimRng) -> Fixed64 {
        non_negative(self(load, capacity, rng))
    }
}

/// Number of bags a passenger carries on board.
pub trait BagSource {
    fn bags(&mut self, rng: &mut SimRng) -> u32;
}

impl<F> BagSource for F
where
    F: FnMut(&mut SimRng) -> u32,
{
    fn bags(&mut self, rng: &mut SimRng) -> u32 {
        self(rng)
    }
}

// ---------------------------------------------------------------------------
// Distributions
// ---------------------------------------------------------------------------

/// A serializable delay distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delay {
    /// Always the same value.
    Fixed(f64),
    /// Normal distribution, truncated at zero.
    Gaussian { mean: f64, std_dev: f64 },
    /// Uniform in `[min, max)`.
    Uniform { min: f64, max: f64 },
}

impl Delay {
    /// A constant delay.
    pub fn fixed(v: f64) -> Self {
        Delay::Fixed(v)
    }

    fn draw(&self, rng: &mut SimRng) -> f64 {
        match *self {
            Delay::Fixed(v) => v,
            Delay::Gaussian { mean, std_dev } => gaussian(mean, std_dev, rng),
            Delay::Uniform { min, max } => {
                if max <= min {
                    min
                } else {
                    min + (max - min) * rng.next_f64()
                }
            }
        }
    }
}

impl DelaySource for Delay {
    fn sample(&mut self, rng: &mut SimRng) -> Fixed64 {
        non_negative(f64_to_fixed64(self.draw(rng)))
    }
}

/// Per-bag stowing delay as a function of the bin's fill level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinDelay {
    /// Every bag costs the same.
    PerBag(f64),
    /// `sqrt(load) * N(mean, mean / 6)`: fuller bins are slower to use.
    SqrtLoad { mean: f64 },
    /// Delay grows linearly with `load / capacity`, reaching `full` when the
    /// bin is at capacity.
    Linear { empty: f64, full: f64 },
}

impl LoadDelay for BinDelay {
    fn delay(&mut self, load: u32, capacity: u32, rng: &mut SimRng) -> Fixed64 {
        let v = match *self {
            BinDelay::PerBag(v) => v,
            BinDelay::SqrtLoad { mean } => (load as f64).sqrt() * gaussian(mean, mean / 6.0, rng),
            BinDelay::Linear { empty, full } => {
                let fill = load as f64 / capacity.max(1) as f64;
                empty + (full - empty) * fill
            }
        };
        non_negative(f64_to_fixed64(v))
    }
}

/// A serializable bag-count distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BagCount {
    Fixed(u32),
    /// Uniform over the inclusive range.
    Uniform { min: u32, max: u32 },
}

impl BagSource for BagCount {
    fn bags(&mut self, rng: &mut SimRng) -> u32 {
        match *self {
            BagCount::Fixed(n) => n,
            BagCount::Uniform { min, max } => rng.range_inclusive(min, max),
        }
    }
}

fn gaussian(mean: f64, std_dev: f64, rng: &mut SimRng) -> f64 {
    match Normal::new(mean, std_dev.abs()) {
        Ok(normal) => normal.sample(rng),
        Err(_) => mean,
    }
}

// ---------------------------------------------------------------------------
// DelayModel
// ---------------------------------------------------------------------------

/// The complete set of delay sources a simulation draws from.
pub struct DelayModel {
    pub aisle_aisle: Box<dyn DelaySource>,
    pub aisle_seat: Box<dyn DelaySource>,
    pub seat_aisle: Box<dyn DelaySource>,
    pub seat_seat: Box<dyn DelaySource>,
    /// Per-bag luggage bin delay.
    pub bin_load: Box<dyn LoadDelay>,
    /// Extra delay for passengers admitted to the upper deck.
    pub floor_change: Box<dyn DelaySource>,
}

impl std::fmt::Debug for DelayModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelayModel").finish_non_exhaustive()
    }
}

impl DelayModel {
    /// Build a model from the four base costs. Bins cost nothing and there is
    /// no floor-change delay until overridden.
    pub fn new(
        aisle_aisle: impl DelaySource + 'static,
        aisle_seat: impl DelaySource + 'static,
        seat_aisle: impl DelaySource + 'static,
        seat_seat: impl DelaySource + 'static,
    ) -> Self {
        Self {
            aisle_aisle: Box::new(aisle_aisle),
            aisle_seat: Box::new(aisle_seat),
            seat_aisle: Box::new(seat_aisle),
            seat_seat: Box::new(seat_seat),
            bin_load: Box::new(BinDelay::PerBag(0.0)),
            floor_change: Box::new(Delay::Fixed(0.0)),
        }
    }

    /// Every base cost fixed at `v`.
    pub fn uniform(v: f64) -> Self {
        Self::new(
            Delay::Fixed(v),
            Delay::Fixed(v),
            Delay::Fixed(v),
            Delay::Fixed(v),
        )
    }

    pub fn with_bin_load(mut self, bin_load: impl LoadDelay + 'static) -> Self {
        self.bin_load = Box::new(bin_load);
        self
    }

    pub fn with_floor_change(mut self, floor_change: impl DelaySource + 'static) -> Self {
        self.floor_change = Box::new(floor_change);
        self
    }

    pub fn aa(&mut self, rng: &mut SimRng) -> Fixed64 {
        self.aisle_aisle.sample(rng)
    }

    pub fn as_(&mut self, rng: &mut SimRng) -> Fixed64 {
        self.aisle_seat.sample(rng)
    }

    pub fn sa(&mut self, rng: &mut SimRng) -> Fixed64 {
        self.seat_aisle.sample(rng)
    }

    pub fn ss(&mut self, rng: &mut SimRng) -> Fixed64 {
        self.seat_seat.sample(rng)
    }
}
