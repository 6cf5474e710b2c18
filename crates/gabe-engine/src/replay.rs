//! Deterministic replay with input recording and checkpoint verification.
//!
//! The replay system records [`InputFrame`]s and periodic state digest
//! checkpoints while a level runs, producing a [`ReplayLog`]. The log can then
//! be replayed from the same map text: [`replay`] rebuilds the level, feeds
//! the recorded inputs frame by frame at the recorded times, and compares
//! digests at each checkpoint.
//!
//! A replay log is not a save file. It carries no level state, only what is
//! needed to re-simulate from the map.
//!
//! # Recording and replaying
//!
//! ```
//! use gabe_engine::prelude::*;
//! use gabe_engine::replay::{replay, ReplayRecorder};
//!
//! let map = "level 1:\n1  C  E\n-------\n";
//! let config = PhysicsConfig::default();
//! let mut level = LevelSimulation::load(map, 1, &config).unwrap();
//! let mut recorder = ReplayRecorder::new(1, 17, 5);
//!
//! let right = InputFrame::new().with(Action::Right);
//! for tick in 0..30 {
//!     recorder.record_tick(tick, &right, Some(state_hash(&level).unwrap()));
//!     level.update(&right, tick * 17);
//! }
//! let log = recorder.finish();
//!
//! let result = replay(map, &log, &config).unwrap();
//! assert!(result.completed);
//! assert!(result.first_divergence.is_none());
//! ```

use std::collections::BTreeMap;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::config::PhysicsConfig;
use crate::digest::state_hash;
use crate::input::InputFrame;
use crate::level::LevelSimulation;

// ---------------------------------------------------------------------------
// ReplayLog
// ---------------------------------------------------------------------------

/// A complete replay log: which level, the frame timing, and an ordered
/// sequence of inputs and checkpoints.
///
/// The log is fully serializable to JSON for storage or regression fixtures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayLog {
    /// Level number the recording was made on.
    pub level: u32,
    /// Milliseconds between frames; frame `t` runs at `start_ms + t * frame_ms`.
    pub frame_ms: u64,
    /// Clock value at tick 0.
    pub start_ms: u64,
    /// Total number of ticks that were recorded. Replay executes exactly this
    /// many ticks, regardless of how many entries exist.
    pub total_ticks: u64,
    /// Ordered sequence of replay entries.
    pub entries: Vec<ReplayEntry>,
}

// ---------------------------------------------------------------------------
// ReplayEntry
// ---------------------------------------------------------------------------

/// A single entry in a [`ReplayLog`]: either an input frame or a digest
/// checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReplayEntry {
    /// Actions held during the given tick.
    Input { tick: u64, input: InputFrame },
    /// Digest of the level state before the given tick ran.
    Checkpoint { tick: u64, state_hash: String },
}

// ---------------------------------------------------------------------------
// ReplayResult
// ---------------------------------------------------------------------------

/// The outcome of replaying a [`ReplayLog`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayResult {
    /// Whether every recorded tick was replayed without divergence.
    pub completed: bool,
    /// The number of ticks replayed.
    pub ticks_replayed: u64,
    /// The first checkpoint whose digest did not match. `None` if all matched.
    pub first_divergence: Option<ReplayDivergence>,
    /// Level flags after the last replayed tick.
    pub level_complete: bool,
    pub game_over: bool,
    pub score: u32,
}

/// Details about a determinism failure detected during replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayDivergence {
    pub tick: u64,
    pub expected_hash: String,
    pub actual_hash: String,
}

// ---------------------------------------------------------------------------
// ReplayRecorder
// ---------------------------------------------------------------------------

/// Records a level run into a [`ReplayLog`].
///
/// Call [`record_tick`](Self::record_tick) before each level update, then
/// [`finish`](Self::finish) to produce the log. Ticks must be recorded in
/// strictly increasing order.
pub struct ReplayRecorder {
    log: ReplayLog,
    checkpoint_interval: u64,
    ticks_recorded: u64,
    last_tick: Option<u64>,
}

impl ReplayRecorder {
    /// Create a recorder for `level` with frames `frame_ms` apart.
    ///
    /// A checkpoint is kept every `checkpoint_interval` ticks; `0` keeps one
    /// whenever a digest is supplied.
    pub fn new(level: u32, frame_ms: u64, checkpoint_interval: u64) -> Self {
        Self {
            log: ReplayLog {
                level,
                frame_ms,
                start_ms: 0,
                total_ticks: 0,
                entries: Vec::new(),
            },
            checkpoint_interval,
            ticks_recorded: 0,
            last_tick: None,
        }
    }

    /// Clock value of tick 0 (defaults to zero).
    pub fn starting_at(mut self, start_ms: u64) -> Self {
        self.log.start_ms = start_ms;
        self
    }

    /// Record a single tick. Call this **before** updating the level.
    ///
    /// Non-empty inputs are always kept. `state_hash` becomes a checkpoint
    /// when the tick falls on the checkpoint interval.
    ///
    /// # Panics
    ///
    /// Panics if `tick` is not strictly greater than the previous tick.
    pub fn record_tick(&mut self, tick: u64, input: &InputFrame, state_hash: Option<String>) {
        if let Some(prev) = self.last_tick {
            assert!(
                tick > prev,
                "ReplayRecorder::record_tick: tick {tick} is not strictly greater than previous tick {prev}"
            );
        }
        self.last_tick = Some(tick);
        self.ticks_recorded += 1;

        if !input.is_empty() {
            self.log.entries.push(ReplayEntry::Input {
                tick,
                input: input.clone(),
            });
        }

        if let Some(hash) = state_hash {
            let due = self.checkpoint_interval == 0 || tick % self.checkpoint_interval == 0;
            if due {
                self.log.entries.push(ReplayEntry::Checkpoint {
                    tick,
                    state_hash: hash,
                });
            }
        }
    }

    /// Finish recording and return the completed [`ReplayLog`].
    pub fn finish(mut self) -> ReplayLog {
        self.log.total_ticks = self.ticks_recorded;
        self.log
    }
}

// ---------------------------------------------------------------------------
// replay()
// ---------------------------------------------------------------------------

/// Re-simulate a [`ReplayLog`] from `map_text`, verifying every checkpoint.
///
/// The log is validated before anything is simulated. Replay stops at the
/// first divergence and reports how far it got.
///
/// # Errors
///
/// Returns an error if the log holds duplicate entries for a tick, if its
/// tick range overflows, or if the level cannot be loaded from `map_text`.
pub fn replay(map_text: &str, log: &ReplayLog, config: &PhysicsConfig) -> anyhow::Result<ReplayResult> {
    let mut input_map: BTreeMap<u64, &InputFrame> = BTreeMap::new();
    let mut checkpoint_map: BTreeMap<u64, &str> = BTreeMap::new();

    for entry in &log.entries {
        match entry {
            ReplayEntry::Input { tick, input } => {
                if input_map.insert(*tick, input).is_some() {
                    bail!("replay log contains duplicate Input entry at tick {tick}");
                }
            }
            ReplayEntry::Checkpoint { tick, state_hash } => {
                if checkpoint_map.insert(*tick, state_hash).is_some() {
                    bail!("replay log contains duplicate Checkpoint entry at tick {tick}");
                }
            }
        }
    }

    let in_range = log
        .total_ticks
        .checked_mul(log.frame_ms)
        .and_then(|span| span.checked_add(log.start_ms))
        .is_some();
    if !in_range {
        bail!(
            "tick range overflow: {} ticks of {} ms from {} ms",
            log.total_ticks,
            log.frame_ms,
            log.start_ms
        );
    }

    let mut level = LevelSimulation::load(map_text, log.level, config)
        .with_context(|| format!("failed to load level {} for replay", log.level))?;

    let empty = InputFrame::new();
    let mut ticks_replayed = 0;
    let mut first_divergence = None;

    for tick in 0..log.total_ticks {
        if let Some(&expected) = checkpoint_map.get(&tick) {
            let actual = state_hash(&level).context("failed to hash level state")?;
            if actual != expected {
                first_divergence = Some(ReplayDivergence {
                    tick,
                    expected_hash: expected.to_owned(),
                    actual_hash: actual,
                });
                break;
            }
        }

        let input = input_map.get(&tick).copied().unwrap_or(&empty);
        level.update(input, log.start_ms + tick * log.frame_ms);
        ticks_replayed += 1;
    }

    Ok(ReplayResult {
        completed: first_divergence.is_none(),
        ticks_replayed,
        first_divergence,
        level_complete: level.is_complete(),
        game_over: level.is_game_over(),
        score: level.score(),
    })
}
