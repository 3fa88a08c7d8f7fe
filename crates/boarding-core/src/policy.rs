//! The boarding-order interface the simulation consumes.

use crate::fixed::Time;
use crate::geometry::Cabin;
use crate::id::PassengerId;

/// Chooses who joins the boarding queue next.
///
/// Called whenever the queue runs empty while passengers are still waiting.
/// The returned ids are queued in order; ids that are not in `unboarded`,
/// and repeats, are ignored. Returning an empty batch is allowed and simply
/// asks again on the next tick.
pub trait BoardingPolicy {
    fn name(&self) -> &str;

    fn select(&mut self, time: Time, unboarded: &[PassengerId], cabin: &Cabin) -> Vec<PassengerId>;
}

impl<P: BoardingPolicy + ?Sized> BoardingPolicy for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn select(&mut self, time: Time, unboarded: &[PassengerId], cabin: &Cabin) -> Vec<PassengerId> {
        (**self).select(time, unboarded, cabin)
    }
}

/// A named closure as a policy.
pub struct FnPolicy<F> {
    name: String,
    select: F,
}

impl<F> FnPolicy<F>
where
    F: FnMut(Time, &[PassengerId], &Cabin) -> Vec<PassengerId>,
{
    pub fn new(name: impl Into<String>, select: F) -> Self {
        Self {
            name: name.into(),
            select,
        }
    }
}

impl<F> BoardingPolicy for FnPolicy<F>
where
    F: FnMut(Time, &[PassengerId], &Cabin) -> Vec<PassengerId>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn select(&mut self, time: Time, unboarded: &[PassengerId], cabin: &Cabin) -> Vec<PassengerId> {
        (self.select)(time, unboarded, cabin)
    }
}

/// Everybody at once, in seat order.
pub fn in_seat_order() -> impl BoardingPolicy {
    FnPolicy::new("sequential", |_: Time, unboarded: &[PassengerId], _: &Cabin| {
        unboarded.to_vec()
    })
}
