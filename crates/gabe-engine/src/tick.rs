//! Fixed-timestep frame loop.
//!
//! The [`TickLoop`] drives a [`GameSession`] forward. Each tick:
//!
//! 1. The session reads the frame's input and updates with the clock's time.
//! 2. Unless headless, the session draws through the supplied renderer.
//! 3. The clock is told a frame has passed and the tick counter advances.
//!
//! With a [`SteppedClock`](crate::clock::SteppedClock) the loop is fully
//! deterministic: the same map, the same inputs and the same frame time give
//! the same final state.
//!
//! # Example
//!
//! ```
//! use gabe_engine::prelude::*;
//!
//! let session = GameSession::new(
//!     MapSource::Text("level 1:\n1-----E\n".into()),
//!     1,
//!     PhysicsConfig::default(),
//! );
//! let config = TickConfig { headless: true, ..Default::default() };
//! let mut tick_loop = TickLoop::new(session, SteppedClock::new(), config);
//!
//! let right = InputFrame::new().with(Action::Right);
//! for _ in 0..10 {
//!     tick_loop.tick(&right, None);
//! }
//!
//! assert_eq!(tick_loop.tick_count(), 10);
//! assert_eq!(tick_loop.now_ms(), 170);
//! ```

use std::time::{Duration, Instant};

use crate::clock::Clock;
use crate::input::InputSource;
use crate::render::Renderer;
use crate::session::{GameSession, SessionSignal};

// ---------------------------------------------------------------------------
// TickConfig
// ---------------------------------------------------------------------------

/// Configuration for the fixed-timestep loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickConfig {
    /// Milliseconds per frame. Must be positive.
    pub frame_ms: u64,
    /// Headless mode: no rendering, tick as fast as possible.
    pub headless: bool,
}

impl Default for TickConfig {
    /// Defaults to roughly 60 Hz (17 ms per frame), headless off.
    fn default() -> Self {
        Self {
            frame_ms: 17,
            headless: false,
        }
    }
}

// ---------------------------------------------------------------------------
// TickDiagnostics
// ---------------------------------------------------------------------------

/// Timing diagnostics for the last tick.
#[derive(Debug, Clone, Default)]
pub struct TickDiagnostics {
    /// Time spent in the session update.
    pub update_time: Duration,
    /// Time spent drawing (zero when headless).
    pub draw_time: Duration,
    /// Total time for the tick, excluding frame pacing.
    pub total_time: Duration,
}

// ---------------------------------------------------------------------------
// TickLoop
// ---------------------------------------------------------------------------

/// The fixed-timestep loop around a session.
pub struct TickLoop<C: Clock> {
    session: GameSession,
    clock: C,
    tick_counter: u64,
    config: TickConfig,
    last_diagnostics: TickDiagnostics,
}

impl<C: Clock> TickLoop<C> {
    /// Create a loop over `session`, reading time from `clock`.
    ///
    /// # Panics
    ///
    /// Panics if `config.frame_ms` is zero.
    pub fn new(session: GameSession, clock: C, config: TickConfig) -> Self {
        assert!(config.frame_ms > 0, "frame_ms must be positive, got {}", config.frame_ms);
        Self {
            session,
            clock,
            tick_counter: 0,
            config,
            last_diagnostics: TickDiagnostics::default(),
        }
    }

    /// Execute one frame.
    pub fn tick(&mut self, input: &dyn InputSource, renderer: Option<&mut dyn Renderer>) -> SessionSignal {
        let tick_start = Instant::now();
        let now_ms = self.clock.now_ms();

        let update_start = Instant::now();
        let signal = self.session.update(input, now_ms);
        let update_time = update_start.elapsed();

        let draw_start = Instant::now();
        if !self.config.headless {
            if let Some(renderer) = renderer {
                self.session.draw(renderer, now_ms);
            }
        }
        let draw_time = draw_start.elapsed();

        self.clock.on_tick(self.config.frame_ms);
        self.tick_counter += 1;

        self.last_diagnostics = TickDiagnostics {
            update_time,
            draw_time,
            total_time: tick_start.elapsed(),
        };
        signal
    }

    /// Run up to `max_ticks` frames, pulling each frame's input from
    /// `input_for(tick)`.
    ///
    /// Stops early on [`SessionSignal::Quit`] or once the session is
    /// finished. Outside headless mode each frame is padded to `frame_ms` of
    /// wall time. Returns the number of ticks executed.
    pub fn run<I, F>(&mut self, max_ticks: u64, mut input_for: F, mut renderer: Option<&mut dyn Renderer>) -> u64
    where
        I: InputSource,
        F: FnMut(u64) -> I,
    {
        let frame = Duration::from_millis(self.config.frame_ms);
        let mut executed = 0;
        while executed < max_ticks {
            let frame_start = Instant::now();
            let input = input_for(self.tick_counter);
            let signal = match renderer {
                Some(ref mut r) => self.tick(&input, Some(&mut **r)),
                None => self.tick(&input, None),
            };
            executed += 1;

            if signal == SessionSignal::Quit || self.session.is_finished() {
                break;
            }
            if !self.config.headless {
                if let Some(rest) = frame.checked_sub(frame_start.elapsed()) {
                    std::thread::sleep(rest);
                }
            }
        }
        executed
    }

    // -- accessors ----------------------------------------------------------

    /// The number of ticks executed so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    /// The clock's current time in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn frame_ms(&self) -> u64 {
        self.config.frame_ms
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GameSession {
        &mut self.session
    }

    /// Diagnostics from the last tick.
    pub fn last_diagnostics(&self) -> &TickDiagnostics {
        &self.last_diagnostics
    }

    /// Whether headless mode is enabled.
    pub fn is_headless(&self) -> bool {
        self.config.headless
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
