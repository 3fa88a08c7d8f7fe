//! Typed boarding events in a bounded ring buffer.
//!
//! Passengers and the simulation loop push events as they happen. The
//! [`EventLog`] keeps the most recent ones up to its capacity, counts every
//! event per kind (dropped or not), and forwards each event to passive
//! listeners. Kinds can be suppressed, which skips both recording and
//! delivery.

use crate::cell::Direction;
use crate::fixed::{Fixed64, Time};
use crate::id::*;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// Which crossing manoeuvre a passenger performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrossingKind {
    /// From the aisle past one seated passenger.
    Single,
    /// From the aisle past two seated passengers.
    Double,
    /// From a seat, trading places with the neighbor.
    Swap,
}

/// A recoverable movement problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnomalyKind {
    /// The passenger tried to move where there is no cell.
    MissingConnector { direction: Direction },
    /// More seated passengers in the way than a crossing handles.
    TooManyToCross { count: u32 },
}

/// A boarding event. Every event carries the simulated time it happened at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardingEvent {
    BatchEnqueued {
        count: usize,
        time: Time,
    },
    Admitted {
        passenger: PassengerId,
        entrance: CellId,
        time: Time,
    },
    LuggageStowed {
        passenger: PassengerId,
        bags: u32,
        delay: Fixed64,
        time: Time,
    },
    SeatCrossed {
        passenger: PassengerId,
        kind: CrossingKind,
        crossed: Vec<PassengerId>,
        delay: Fixed64,
        time: Time,
    },
    Seated {
        passenger: PassengerId,
        time: Time,
    },
    Anomaly {
        passenger: PassengerId,
        kind: AnomalyKind,
        time: Time,
    },
}

/// Discriminant tag for event types, used for suppression and counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    BatchEnqueued,
    Admitted,
    LuggageStowed,
    SeatCrossed,
    Seated,
    Anomaly,
}

const EVENT_KIND_COUNT: usize = 6;

impl BoardingEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            BoardingEvent::BatchEnqueued { .. } => EventKind::BatchEnqueued,
            BoardingEvent::Admitted { .. } => EventKind::Admitted,
            BoardingEvent::LuggageStowed { .. } => EventKind::LuggageStowed,
            BoardingEvent::SeatCrossed { .. } => EventKind::SeatCrossed,
            BoardingEvent::Seated { .. } => EventKind::Seated,
            BoardingEvent::Anomaly { .. } => EventKind::Anomaly,
        }
    }

    pub fn time(&self) -> Time {
        match *self {
            BoardingEvent::BatchEnqueued { time, .. }
            | BoardingEvent::Admitted { time, .. }
            | BoardingEvent::LuggageStowed { time, .. }
            | BoardingEvent::SeatCrossed { time, .. }
            | BoardingEvent::Seated { time, .. }
            | BoardingEvent::Anomaly { time, .. } => time,
        }
    }
}

impl EventKind {
    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// EventLog
// ---------------------------------------------------------------------------

/// A passive listener receives events read-only.
pub type Listener = Box<dyn FnMut(&BoardingEvent)>;

/// Ring buffer of the most recent events. When full, the oldest event is
/// dropped.
pub struct EventLog {
    events: Vec<Option<BoardingEvent>>,
    /// Write position (wraps around).
    head: usize,
    len: usize,
    counts: [u64; EVENT_KIND_COUNT],
    suppressed: [bool; EVENT_KIND_COUNT],
    listeners: Vec<Listener>,
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog")
            .field("capacity", &self.capacity())
            .field("len", &self.len)
            .field("counts", &self.counts)
            .field("suppressed", &self.suppressed)
            .finish_non_exhaustive()
    }
}

impl EventLog {
    /// A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
            counts: [0; EVENT_KIND_COUNT],
            suppressed: [false; EVENT_KIND_COUNT],
            listeners: Vec::new(),
        }
    }

    pub fn push(&mut self, event: BoardingEvent) {
        let kind = event.kind().index();
        if self.suppressed[kind] {
            return;
        }
        self.counts[kind] += 1;
        for listener in &mut self.listeners {
            listener(&event);
        }

        let capacity = self.capacity();
        self.events[self.head] = Some(event);
        self.head = (self.head + 1) % capacity;
        if self.len < capacity {
            self.len += 1;
        }
    }

    /// Stop recording and delivering events of `kind`.
    pub fn suppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = true;
    }

    pub fn is_suppressed(&self, kind: EventKind) -> bool {
        self.suppressed[kind.index()]
    }

    pub fn on_event(&mut self, listener: impl FnMut(&BoardingEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn capacity(&self) -> usize {
        self.events.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Events of `kind` recorded since creation, including dropped ones.
    pub fn count(&self, kind: EventKind) -> u64 {
        self.counts[kind.index()]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn dropped_count(&self) -> u64 {
        self.total().saturating_sub(self.len as u64)
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &BoardingEvent> {
        let start = if self.len < self.capacity() { 0 } else { self.head };
        (0..self.len).filter_map(move |i| self.events[(start + i) % self.capacity()].as_ref())
    }

    pub fn of_kind(&self, kind: EventKind) -> impl Iterator<Item = &BoardingEvent> {
        self.iter().filter(move |e| e.kind() == kind)
    }

    /// Forget the buffered events and counts. Listeners and suppression stay.
    pub fn clear(&mut self) {
        for slot in &mut self.events {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
        self.counts = [0; EVENT_KIND_COUNT];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn seated(p: PassengerId, t: i32) -> BoardingEvent {
        BoardingEvent::Seated {
            passenger: p,
            time: Fixed64::from_num(t),
        }
    }

    fn pid() -> PassengerId {
        let mut sm: SlotMap<PassengerId, ()> = SlotMap::with_key();
        sm.insert(())
    }

    #[test]
    fn ring_drops_the_oldest() {
        let p = pid();
        let mut log = EventLog::new(3);
        for t in 0..5 {
            log.push(seated(p, t));
        }
        let times: Vec<Time> = log.iter().map(BoardingEvent::time).collect();
        assert_eq!(
            times,
            vec![Fixed64::from_num(2), Fixed64::from_num(3), Fixed64::from_num(4)]
        );
        assert_eq!(log.count(EventKind::Seated), 5);
        assert_eq!(log.dropped_count(), 2);
    }

    #[test]
    fn suppressed_kinds_are_ignored() {
        let p = pid();
        let mut log = EventLog::new(8);
        log.suppress(EventKind::Seated);
        log.push(seated(p, 1));
        log.push(BoardingEvent::BatchEnqueued {
            count: 3,
            time: Fixed64::ZERO,
        });
        assert_eq!(log.len(), 1);
        assert_eq!(log.count(EventKind::Seated), 0);
        assert_eq!(log.of_kind(EventKind::BatchEnqueued).count(), 1);
    }

    #[test]
    fn listeners_see_every_event() {
        let p = pid();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut log = EventLog::new(1);
        log.on_event(move |e| sink.borrow_mut().push(e.kind()));
        log.push(seated(p, 1));
        log.push(seated(p, 2));
        assert_eq!(*seen.borrow(), vec![EventKind::Seated, EventKind::Seated]);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let log = EventLog::new(0);
        assert_eq!(log.capacity(), 1);
        assert!(log.is_empty());
    }
}
