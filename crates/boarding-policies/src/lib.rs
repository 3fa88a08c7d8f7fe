//! Boarding orders for the boarding simulator.
//!
//! A [`NamedPolicy`] combines one of the [`Strategy`] orderings with an
//! [`Adapter`] and its own [`SimRng`], and plugs into
//! [`Simulation`](boarding_core::sim::Simulation) as a
//! [`BoardingPolicy`].
//!
//! # Usage
//!
//! ```ignore
//! let policy = NamedPolicy::new(Strategy::ReverseBlock, Adapter::Staggered, rng.fork());
//! assert_eq!(policy.name(), "staggered_reverse_block");
//! let mut sim = Simulation::new(plane, policy, delays, rng);
//! ```

pub mod adapter;
pub mod strategy;

pub use adapter::Adapter;
pub use strategy::{Strategy, blocks};

use boarding_core::fixed::Time;
use boarding_core::geometry::Cabin;
use boarding_core::id::PassengerId;
use boarding_core::policy::BoardingPolicy;
use boarding_core::rng::SimRng;

/// A strategy or adapter name that is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnknownName {
    #[error("unknown boarding strategy `{0}`")]
    Strategy(String),
    #[error("unknown boarding adapter `{0}`")]
    Adapter(String),
}

/// A strategy wrapped in an adapter.
#[derive(Debug, Clone)]
pub struct NamedPolicy {
    strategy: Strategy,
    adapter: Adapter,
    rng: SimRng,
    name: String,
}

impl NamedPolicy {
    /// `rng` drives the shuffles; fork it from the run's generator to keep
    /// runs reproducible.
    pub fn new(strategy: Strategy, adapter: Adapter, rng: SimRng) -> Self {
        Self {
            strategy,
            adapter,
            rng,
            name: format!("{adapter}_{strategy}"),
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn adapter(&self) -> Adapter {
        self.adapter
    }

    /// Every strategy under every adapter.
    pub fn all(seed: u64) -> Vec<NamedPolicy> {
        let mut rng = SimRng::new(seed);
        Adapter::ALL
            .into_iter()
            .flat_map(|adapter| Strategy::ALL.into_iter().map(move |strategy| (adapter, strategy)))
            .map(|(adapter, strategy)| NamedPolicy::new(strategy, adapter, rng.fork()))
            .collect()
    }
}

impl BoardingPolicy for NamedPolicy {
    fn name(&self) -> &str {
        &self.name
    }

    fn select(&mut self, _time: Time, unboarded: &[PassengerId], cabin: &Cabin) -> Vec<PassengerId> {
        let batch = self.strategy.order(unboarded, cabin, &mut self.rng);
        self.adapter.apply(batch, cabin)
    }
}
