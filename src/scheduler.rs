//! Debounced reflow scheduling.
//!
//! A single pending slot: scheduling again before the deadline replaces the
//! pending request and restarts the delay, so a burst of edits yields one
//! pass that reads the document as it is when the timer fires. Callers pass
//! the current [`Instant`] in, which keeps the scheduler free of threads and
//! timers of its own.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Why a pass was requested. Only the latest reason survives debouncing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReflowReason {
    Initial,
    ContentChanged { revision: u64 },
    AdjustmentMode { enabled: bool },
    GapAdjusted { name: String },
    Resized,
}

#[derive(Debug, Clone)]
struct Pending {
    due: Instant,
    reason: ReflowReason,
}

#[derive(Debug, Clone)]
pub struct ReflowScheduler {
    delay: Duration,
    pending: Option<Pending>,
}

impl Default for ReflowScheduler {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_DEBOUNCE_MS))
    }
}

impl ReflowScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Request a pass `delay` after `now`. Returns true when an earlier
    /// request was replaced.
    pub fn schedule(&mut self, reason: ReflowReason, now: Instant) -> bool {
        let replaced = self.pending.is_some();
        if replaced {
            log::trace!("debounce: replacing pending pass with {reason:?}");
        }
        self.pending = Some(Pending {
            due: now + self.delay,
            reason,
        });
        replaced
    }

    /// Take the pending request if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<ReflowReason> {
        match &self.pending {
            Some(p) if now >= p.due => self.pending.take().map(|p| p.reason),
            _ => None,
        }
    }

    pub fn cancel(&mut self) -> Option<ReflowReason> {
        self.pending.take().map(|p| p.reason)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Time until the pending pass is due; zero when overdue, `None` when
    /// nothing is scheduled.
    pub fn time_remaining(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|p| p.due.saturating_duration_since(now))
    }
}
