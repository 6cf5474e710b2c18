//! Millisecond time sources.
//!
//! Hurt windows, ladder cooldowns, the heart float and the hurt flicker all
//! read a `now_ms` value handed in by the caller. A [`Clock`] produces that
//! value: [`SystemClock`] reads the wall clock, [`SteppedClock`] only moves
//! when the tick loop advances it, so headless runs repeat exactly.

use std::time::Instant;

/// Source of the current time in milliseconds.
pub trait Clock {
    fn now_ms(&self) -> u64;

    /// Called by the tick loop after every frame.
    fn on_tick(&mut self, _frame_ms: u64) {}
}

/// Wall-clock time since construction.
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Deterministic clock advanced by a fixed step per frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SteppedClock {
    now_ms: u64,
}

impl SteppedClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start at an arbitrary time.
    pub fn starting_at(now_ms: u64) -> Self {
        Self { now_ms }
    }

    pub fn advance(&mut self, ms: u64) {
        self.now_ms = self.now_ms.saturating_add(ms);
    }
}

impl Clock for SteppedClock {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn on_tick(&mut self, frame_ms: u64) {
        self.advance(frame_ms);
    }
}
