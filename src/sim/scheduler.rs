//! Deferred transitions on a virtual clock
//!
//! The engine never sleeps. It asks a [`Scheduler`] to fire a [`TimerEvent`]
//! later, stamped with the epoch it was scheduled in, and the host drives the
//! clock forward with `Game::advance`.

use serde::{Deserialize, Serialize};

/// Transitions the engine defers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerEvent {
    /// Calm down after a wrong answer
    ClearAnger,
    /// Show the next problem of the round
    NextProblem,
    /// Round cleared: bump the level and show its intro
    AdvanceLevel,
    /// Enter the given sickness phase (1..=4)
    SicknessPhase(u8),
    /// One step of the departure animation (repeating)
    DepartureTick,
    /// End the run
    GameOver,
}

/// Handle for cancelling a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(u64);

/// A pending timer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    pub id: TimerId,
    pub due_ms: u64,
    /// Re-arm period for repeating timers
    pub period_ms: Option<u64>,
    /// Engine epoch at scheduling time
    pub epoch: u64,
    pub event: TimerEvent,
}

/// Timing collaborator for the engine
pub trait Scheduler {
    /// Current virtual time (ms)
    fn now_ms(&self) -> u64;

    /// Fire `event` once, `delay_ms` from now
    fn schedule(&mut self, delay_ms: u64, epoch: u64, event: TimerEvent) -> TimerId;

    /// Fire `event` every `period_ms` until cancelled
    fn schedule_repeating(&mut self, period_ms: u64, epoch: u64, event: TimerEvent) -> TimerId;

    /// Returns false if the timer already fired or never existed
    fn cancel(&mut self, id: TimerId) -> bool;

    /// Remove the earliest timer due at or before `until_ms` and move the
    /// clock to its due time. Repeating timers are re-armed before returning.
    fn pop_due(&mut self, until_ms: u64) -> Option<Timer>;

    /// Move the clock forward without firing anything
    fn advance_to(&mut self, ms: u64);

    /// Due time of the earliest pending timer
    fn next_due_ms(&self) -> Option<u64>;

    fn pending(&self) -> usize;
}

/// In-memory scheduler driven entirely by the caller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimerQueue {
    now_ms: u64,
    next_id: u64,
    timers: Vec<Timer>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, due_ms: u64, period_ms: Option<u64>, epoch: u64, event: TimerEvent) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            due_ms,
            period_ms,
            epoch,
            event,
        });
        id
    }

    /// Pending timers, unordered
    pub fn timers(&self) -> &[Timer] {
        &self.timers
    }
}

impl Scheduler for TimerQueue {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn schedule(&mut self, delay_ms: u64, epoch: u64, event: TimerEvent) -> TimerId {
        let due = self.now_ms.saturating_add(delay_ms);
        log::debug!("Scheduled {:?} at {} ms (epoch {})", event, due, epoch);
        self.push(due, None, epoch, event)
    }

    fn schedule_repeating(&mut self, period_ms: u64, epoch: u64, event: TimerEvent) -> TimerId {
        let period = period_ms.max(1);
        let due = self.now_ms.saturating_add(period);
        log::debug!("Scheduled {:?} every {} ms (epoch {})", event, period, epoch);
        self.push(due, Some(period), epoch, event)
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    fn pop_due(&mut self, until_ms: u64) -> Option<Timer> {
        // Ties fire in scheduling order
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= until_ms)
            .min_by_key(|(_, t)| (t.due_ms, t.id))
            .map(|(i, _)| i)?;

        let timer = self.timers.swap_remove(index);
        self.now_ms = self.now_ms.max(timer.due_ms);

        if let Some(period) = timer.period_ms {
            let mut rearmed = timer.clone();
            rearmed.due_ms = timer.due_ms.saturating_add(period);
            self.timers.push(rearmed);
        }

        Some(timer)
    }

    fn advance_to(&mut self, ms: u64) {
        self.now_ms = self.now_ms.max(ms);
    }

    fn next_due_ms(&self) -> Option<u64> {
        self.timers.iter().map(|t| t.due_ms).min()
    }

    fn pending(&self) -> usize {
        self.timers.len()
    }
}
