#![forbid(unsafe_code)]

//! Cooperative scheduler for named recurring tasks.
//!
//! Every fixed-interval loop of the scrubber (settle animations, edge
//! scrolling, playback polling) is a named task with an explicit start/stop
//! lifecycle. The scheduler owns no thread and reads no clock: the host
//! passes `now` into [`TaskScheduler::due`] and runs whatever is returned.
//!
//! # Invariants
//!
//! 1. A name is scheduled at most once; rescheduling replaces the task and
//!    cancels the previous token.
//! 2. [`due`](TaskScheduler::due) reports each due task once per call, even
//!    if several intervals elapsed since the last call.
//! 3. A cancelled task is never reported as due again.
//!
//! # Failure Modes
//!
//! - A zero interval fires on every `due` call.
//! - Cancelling an unknown name is a no-op returning `false`.

use tracing::{debug, trace};
use web_time::{Duration, Instant};

use crate::cancellation::{CancellationSource, CancellationToken};

/// Stable identifier of a recurring task.
pub type TaskName = &'static str;

#[derive(Debug)]
struct ScheduledTask {
    name: TaskName,
    interval: Duration,
    next_fire: Instant,
    source: CancellationSource,
}

/// Named recurring tasks driven by an injected clock.
#[derive(Debug, Default)]
pub struct TaskScheduler {
    tasks: Vec<ScheduledTask>,
}

impl TaskScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) `name`, first firing one `interval` after `now`.
    ///
    /// Returns a token that is cancelled when the task stops.
    pub fn schedule(&mut self, name: TaskName, interval: Duration, now: Instant) -> CancellationToken {
        self.cancel(name);
        let source = CancellationSource::new();
        let token = source.token();
        self.tasks.push(ScheduledTask {
            name,
            interval,
            next_fire: now + interval,
            source,
        });
        debug!(task = name, interval_ms = interval.as_millis() as u64, "task started");
        token
    }

    /// Stop `name`. Returns `true` if it was running.
    pub fn cancel(&mut self, name: TaskName) -> bool {
        let Some(index) = self.tasks.iter().position(|t| t.name == name) else {
            return false;
        };
        let task = self.tasks.remove(index);
        task.source.cancel();
        debug!(task = name, "task stopped");
        true
    }

    /// Stop every task.
    pub fn cancel_all(&mut self) {
        for task in self.tasks.drain(..) {
            task.source.cancel();
            debug!(task = task.name, "task stopped");
        }
    }

    #[must_use]
    pub fn is_active(&self, name: TaskName) -> bool {
        self.tasks.iter().any(|t| t.name == name)
    }

    /// Token of a running task.
    #[must_use]
    pub fn token(&self, name: TaskName) -> Option<CancellationToken> {
        self.tasks
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.source.token())
    }

    /// Names of all running tasks, in start order.
    #[must_use]
    pub fn active(&self) -> Vec<TaskName> {
        self.tasks.iter().map(|t| t.name).collect()
    }

    /// Earliest pending fire time.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.tasks.iter().map(|t| t.next_fire).min()
    }

    /// Tasks due at `now`, in start order. Their next fire time advances past
    /// `now`; missed intervals are coalesced.
    pub fn due(&mut self, now: Instant) -> Vec<TaskName> {
        let mut fired = Vec::new();
        for task in &mut self.tasks {
            if task.next_fire > now {
                continue;
            }
            task.next_fire = next_fire_after(task.next_fire, task.interval, now);
            fired.push(task.name);
        }
        if !fired.is_empty() {
            trace!(count = fired.len(), "tasks due");
        }
        fired
    }
}

/// First multiple of `interval` past `fire` that lies after `now`, computed
/// without stepping through each missed interval.
fn next_fire_after(fire: Instant, interval: Duration, now: Instant) -> Instant {
    if interval.is_zero() {
        return now;
    }
    let behind = now.saturating_duration_since(fire).as_nanos();
    let missed = behind / interval.as_nanos() + 1;
    let skip = interval.as_nanos().saturating_mul(missed);
    let skip = Duration::from_nanos(u64::try_from(skip).unwrap_or(u64::MAX));
    fire.checked_add(skip).unwrap_or(now + interval)
}
