//! Boarding Core -- a time-stepped aircraft boarding simulator.
//!
//! Passengers walk a graph of floor cells from the door to their seats. The
//! model captures aisle congestion, luggage stowing that slows down as bins
//! fill, and the shuffle of seated passengers stepping out to let somebody
//! reach a window seat. Comparing total boarding time across queue orders is
//! the point of the exercise.
//!
//! # Tick Pipeline
//!
//! Each tick of [`sim::Simulation::run`]:
//!
//! 1. **Enqueue** -- the [`policy::BoardingPolicy`] refills an empty queue.
//! 2. **Admit** -- the head of the queue boards through a free door.
//! 3. **Clock** -- time advances by one step.
//! 4. **Count down** -- every active passenger's delay shrinks.
//! 5. **Step** -- idle passengers act (see [`passenger`] and [`crossing`]).
//! 6. **Retire** -- seated, idle passengers leave the active set.
//!
//! # Key Types
//!
//! - [`geometry::Cabin`] -- cell graph, luggage bins and passenger roster.
//! - [`plane::Plane`] -- a cabin plus its [`entrance::EntranceManager`];
//!   [`plane::Aircraft`] lists the built-in presets.
//! - [`delay::DelayModel`] -- the pluggable AA/AS/SA/SS cost sources.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type used for time and delays.
//! - [`rng::SimRng`] -- seeded generator passed to every random draw.
//! - [`event::EventLog`] -- ring buffer of typed boarding events.

pub mod aisle;
pub mod cell;
pub mod crossing;
pub mod delay;
pub mod entrance;
pub mod event;
pub mod fixed;
pub mod geometry;
pub mod id;
pub mod luggage;
pub mod passenger;
pub mod plane;
pub mod policy;
pub mod render;
pub mod rng;
pub mod sim;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
