//! Coalescing redraw scheduler.
//!
//! A single slot holds the latest pending state. Marking dirty replaces
//! whatever was pending, [`RedrawThrottle::poll`] hands out at most one state
//! per frame interval, and [`RedrawThrottle::flush`] hands out the pending
//! state immediately (used when input ends so the last state is always
//! drawn).
//!
//! Time is passed in by the caller, so any timer primitive can drive it.

use std::time::{Duration, Instant};

/// Default frame interval, about 60 Hz.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Refresh cycle: `Idle -> Dirty -> Rendering -> Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Dirty,
    Rendering,
}

#[derive(Debug)]
pub struct RedrawThrottle<T> {
    interval: Duration,
    state: RefreshState,
    pending: Option<T>,
    last_render: Option<Instant>,
    coalesced: u64,
}

impl<T> RedrawThrottle<T> {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            state: RefreshState::Idle,
            pending: None,
            last_render: None,
            coalesced: 0,
        }
    }

    pub fn state(&self) -> RefreshState {
        self.state
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of pending states replaced before they were rendered.
    pub fn coalesced(&self) -> u64 {
        self.coalesced
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Queue `value` for the next render, replacing any pending state.
    pub fn mark_dirty(&mut self, value: T) {
        if self.pending.replace(value).is_some() {
            self.coalesced += 1;
        }
        if self.state == RefreshState::Idle {
            self.state = RefreshState::Dirty;
        }
    }

    /// When the pending state may next be rendered.
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.state != RefreshState::Dirty {
            return None;
        }
        Some(match self.last_render {
            Some(last) => last + self.interval,
            None => Instant::now(),
        })
    }

    fn take(&mut self, now: Instant) -> Option<T> {
        let value = self.pending.take()?;
        self.state = RefreshState::Rendering;
        self.last_render = Some(now);
        Some(value)
    }

    /// The pending state, if dirty and a frame interval has passed since
    /// the last render.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.state != RefreshState::Dirty {
            return None;
        }
        let due = match self.last_render {
            Some(last) => now.saturating_duration_since(last) >= self.interval,
            None => true,
        };
        if due {
            self.take(now)
        } else {
            None
        }
    }

    /// The pending state regardless of the frame interval.
    pub fn flush(&mut self, now: Instant) -> Option<T> {
        if self.state == RefreshState::Rendering {
            return None;
        }
        self.take(now)
    }

    /// End a render. Goes back to `Dirty` if a new state arrived meanwhile.
    pub fn finish(&mut self) {
        self.state = if self.pending.is_some() {
            RefreshState::Dirty
        } else {
            RefreshState::Idle
        };
    }
}

impl<T> Default for RedrawThrottle<T> {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL)
    }
}
