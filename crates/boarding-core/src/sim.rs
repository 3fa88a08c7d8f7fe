//! The time-stepped boarding loop.
//!
//! Every tick runs the same pipeline:
//!
//! 1. **Enqueue** -- if the queue is empty and passengers are still waiting,
//!    ask the policy for the next batch.
//! 2. **Admit** -- board the head of the queue if a door is free and the
//!    inter-arrival gap has passed.
//! 3. **Clock** -- advance time by one step.
//! 4. **Count down** -- shorten every active passenger's delay. All
//!    countdowns happen before any passenger acts.
//! 5. **Step** -- let every active passenger act.
//! 6. **Retire** -- move seated, idle passengers out of the active set.
//!
//! The run ends when nobody is waiting, queued or active.

use std::collections::{HashSet, VecDeque};

use crate::delay::{DelayModel, DelaySource};
use crate::event::{BoardingEvent, EventKind, EventLog};
use crate::fixed::{Fixed64, Time, countdown, fixed64_to_f64};
use crate::id::PassengerId;
use crate::passenger::{Passenger, StepEnv, StepError};
use crate::plane::Plane;
use crate::policy::BoardingPolicy;
use crate::rng::SimRng;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that abort a run.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error(transparent)]
    Step(#[from] StepError),
    #[error("boarding did not finish within {ticks} ticks ({unfinished} passenger(s) left)")]
    TickLimitExceeded { ticks: u64, unfinished: usize },
    #[error("time step must be positive")]
    NonPositiveTimeStep,
    #[error("this simulation has already run")]
    AlreadyRun,
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Run-wide switches. Passed explicitly; nothing here is global.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimContext {
    /// Emit the compact cabin rendering at `trace` level.
    pub trace_grid: bool,
    /// Ticks between grid dumps.
    pub trace_interval: u64,
    /// Abort after this many ticks.
    pub max_ticks: u64,
    /// Events kept in the log.
    pub event_capacity: usize,
}

impl Default for SimContext {
    fn default() -> Self {
        Self {
            trace_grid: false,
            trace_interval: 1,
            max_ticks: 1_000_000,
            event_capacity: 4096,
        }
    }
}

// ---------------------------------------------------------------------------
// Simulation state
// ---------------------------------------------------------------------------

/// Where every participating passenger is in the boarding process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimState {
    pub unboarded: Vec<PassengerId>,
    pub queue: VecDeque<PassengerId>,
    pub active: Vec<PassengerId>,
    pub retired: Vec<PassengerId>,
    pub time: Time,
    pub ticks: u64,
    pub next_admission: Time,
}

impl SimState {
    /// Passengers in any of the four groups.
    pub fn population(&self) -> usize {
        self.unboarded.len() + self.queue.len() + self.active.len() + self.retired.len()
    }

    pub fn is_done(&self) -> bool {
        self.unboarded.is_empty() && self.queue.is_empty() && self.active.is_empty()
    }

    fn unfinished(&self) -> usize {
        self.unboarded.len() + self.queue.len() + self.active.len()
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimStats {
    pub elapsed: f64,
    pub ticks: u64,
    pub passengers: usize,
    pub total_waits: u64,
    pub crossings: u64,
    pub anomalies: u64,
}

// ---------------------------------------------------------------------------
// State hash
// ---------------------------------------------------------------------------

/// FNV-1a (64-bit) digest of the cabin's passenger state, for comparing runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateHash(pub u64);

impl StateHash {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self(Self::FNV_OFFSET)
    }

    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(Self::FNV_PRIME);
        }
    }

    pub fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_fixed64(&mut self, v: Fixed64) {
        self.write(&v.to_bits().to_le_bytes());
    }

    pub fn finish(self) -> u64 {
        self.0
    }
}

impl Default for StateHash {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// Drives one boarding run of a plane under a policy.
pub struct Simulation {
    plane: Plane,
    policy: Box<dyn BoardingPolicy>,
    delays: DelayModel,
    rng: SimRng,
    context: SimContext,
    events: EventLog,
    state: SimState,
    time_step: Time,
    started: bool,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("plane", &self.plane.name)
            .field("policy", &self.policy.name())
            .field("context", &self.context)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Simulation {
    pub fn new(
        plane: Plane,
        policy: impl BoardingPolicy + 'static,
        delays: DelayModel,
        rng: SimRng,
    ) -> Self {
        let context = SimContext::default();
        Self {
            plane,
            policy: Box::new(policy),
            delays,
            rng,
            events: EventLog::new(context.event_capacity),
            context,
            state: SimState::default(),
            time_step: Fixed64::from_num(1),
            started: false,
        }
    }

    pub fn with_context(mut self, context: SimContext) -> Self {
        self.events = EventLog::new(context.event_capacity);
        self.context = context;
        self
    }

    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    pub fn policy_name(&self) -> &str {
        self.policy.name()
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Board every passenger `selector` accepts. Returns the elapsed time.
    pub fn run(
        &mut self,
        selector: impl FnMut(&Passenger) -> bool,
        mut boarding_delay: impl DelaySource,
        time_step: Time,
    ) -> Result<Time, SimError> {
        self.begin(selector, time_step)?;
        while !self.state.is_done() {
            self.advance(&mut boarding_delay)?;
        }

        tracing::info!(
            plane = %self.plane.name,
            policy = self.policy.name(),
            elapsed = fixed64_to_f64(self.state.time),
            ticks = self.state.ticks,
            "boarding finished"
        );
        Ok(self.state.time)
    }

    /// Pick the participating passengers and reset the clock. [`run`]
    /// calls this; drive [`advance`] by hand to observe single ticks.
    ///
    /// [`run`]: Simulation::run
    /// [`advance`]: Simulation::advance
    pub fn begin(
        &mut self,
        mut selector: impl FnMut(&Passenger) -> bool,
        time_step: Time,
    ) -> Result<(), SimError> {
        if self.started {
            return Err(SimError::AlreadyRun);
        }
        if time_step <= Fixed64::ZERO {
            return Err(SimError::NonPositiveTimeStep);
        }
        self.started = true;
        self.time_step = time_step;

        let cabin = &self.plane.cabin;
        self.state = SimState {
            unboarded: cabin
                .roster()
                .iter()
                .copied()
                .filter(|&id| cabin.passenger(id).is_some_and(&mut selector))
                .collect(),
            ..SimState::default()
        };

        tracing::info!(
            plane = %self.plane.name,
            policy = self.policy.name(),
            passengers = self.state.unboarded.len(),
            "boarding started"
        );
        Ok(())
    }

    /// One pass of the pipeline.
    pub fn advance(&mut self, boarding_delay: &mut dyn DelaySource) -> Result<(), SimError> {
        let time_step = self.time_step;
        self.state.ticks += 1;
        if self.state.ticks > self.context.max_ticks {
            tracing::error!(
                ticks = self.context.max_ticks,
                unfinished = self.state.unfinished(),
                "tick limit exceeded"
            );
            return Err(SimError::TickLimitExceeded {
                ticks: self.context.max_ticks,
                unfinished: self.state.unfinished(),
            });
        }
        if self.context.trace_grid && self.state.ticks % self.context.trace_interval.max(1) == 0 {
            tracing::trace!(
                time = fixed64_to_f64(self.state.time),
                "\n{}",
                self.plane.cabin.compact()
            );
        }

        self.enqueue();
        self.admit(boarding_delay);
        self.state.time = self.state.time.saturating_add(time_step);
        for &id in &self.state.active {
            if let Some(p) = self.plane.cabin.passengers.get_mut(id) {
                p.set_delay(countdown(p.delay(), time_step));
            }
        }
        self.step_active()?;
        self.retire();
        Ok(())
    }

    fn enqueue(&mut self) {
        if !self.state.queue.is_empty() || self.state.unboarded.is_empty() {
            return;
        }
        let batch = self
            .policy
            .select(self.state.time, &self.state.unboarded, &self.plane.cabin);

        let waiting: HashSet<PassengerId> = self.state.unboarded.iter().copied().collect();
        let mut seen = HashSet::new();
        let accepted: Vec<PassengerId> = batch
            .into_iter()
            .filter(|id| waiting.contains(id) && seen.insert(*id))
            .collect();

        self.state.unboarded.retain(|id| !seen.contains(id));
        tracing::debug!(count = accepted.len(), "enqueued batch");
        self.events.push(BoardingEvent::BatchEnqueued {
            count: accepted.len(),
            time: self.state.time,
        });
        self.state.queue.extend(accepted);
    }

    fn admit(&mut self, boarding_delay: &mut dyn DelaySource) {
        let Some(&head) = self.state.queue.front() else {
            return;
        };
        if self.state.time <= self.state.next_admission {
            return;
        }
        let Some(door) = self.plane.board(head, &mut self.delays, &mut self.rng) else {
            return;
        };

        self.state.queue.pop_front();
        self.state.active.push(head);
        self.state.next_admission = self.state.time + boarding_delay.sample(&mut self.rng);
        tracing::debug!(passenger = ?head, time = fixed64_to_f64(self.state.time), "admitted");
        self.events.push(BoardingEvent::Admitted {
            passenger: head,
            entrance: door.cell,
            time: self.state.time,
        });
    }

    fn step_active(&mut self) -> Result<(), StepError> {
        let mut env = StepEnv {
            delays: &mut self.delays,
            rng: &mut self.rng,
            events: &mut self.events,
            time: self.state.time,
        };

        let mut disturbed = Vec::new();
        for &id in &self.state.active {
            let outcome = self.plane.cabin.step_passenger(id, &mut env)?;
            disturbed.extend(outcome.disturbed);
        }

        // Crossed passengers who had already retired sit out their delay
        // in the active set again.
        if !disturbed.is_empty() {
            let disturbed: HashSet<PassengerId> = disturbed.into_iter().collect();
            let (back, stay): (Vec<_>, Vec<_>) = std::mem::take(&mut self.state.retired)
                .into_iter()
                .partition(|id| disturbed.contains(id));
            self.state.retired = stay;
            self.state.active.extend(back);
        }
        Ok(())
    }

    fn retire(&mut self) {
        let cabin = &self.plane.cabin;
        let (done, active): (Vec<_>, Vec<_>) = std::mem::take(&mut self.state.active)
            .into_iter()
            .partition(|&id| cabin.passenger(id).is_some_and(Passenger::is_finished));
        self.state.active = active;
        for id in done {
            self.events.push(BoardingEvent::Seated {
                passenger: id,
                time: self.state.time,
            });
            self.state.retired.push(id);
        }
    }

    /// Summary of the run so far.
    pub fn stats(&self) -> SimStats {
        let cabin = &self.plane.cabin;
        let total_waits = self
            .state
            .retired
            .iter()
            .chain(&self.state.active)
            .filter_map(|&id| cabin.passenger(id))
            .map(|p| u64::from(p.needed_to_wait()))
            .sum();
        SimStats {
            elapsed: fixed64_to_f64(self.state.time),
            ticks: self.state.ticks,
            passengers: self.state.population(),
            total_waits,
            crossings: self.events.count(EventKind::SeatCrossed),
            anomalies: self.events.count(EventKind::Anomaly),
        }
    }

    /// Digest of every passenger's location, phase and delay.
    pub fn state_hash(&self) -> u64 {
        let cabin = &self.plane.cabin;
        let mut hash = StateHash::new();
        hash.write_u64(self.state.ticks);
        hash.write_fixed64(self.state.time);
        for &id in cabin.roster() {
            if let Some(p) = cabin.passenger(id) {
                let location = p
                    .location()
                    .and_then(|c| cabin.graph().get(c))
                    .map_or(u64::MAX, |c| (u64::from(c.row) << 32) | u64::from(c.file));
                hash.write_u64(location);
                hash.write_u64(p.phase() as u64);
                hash.write_fixed64(p.delay());
            }
        }
        hash.finish()
    }
}
