//! Headless driver for Gabe Adventure levels.
//!
//! Usage:
//!   gabe-headless [LEVEL] [--map PATH] [--ticks N] [--config PATH]
//!   gabe-headless --verify replay.json     # re-simulate a recorded log
//!
//! The player walks right, hopping every couple of seconds, and takes the
//! next level or restarts whenever the session allows it. Set `RUST_LOG` to
//! `trace` to see every draw call when running with `--render`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use gabe_engine::prelude::*;
use tracing::{info, trace, warn};

#[derive(Parser)]
#[command(name = "gabe-headless")]
#[command(about = "Run Gabe Adventure levels without a window")]
struct Cli {
    /// Level to start on
    #[arg(default_value_t = 1)]
    level: u32,

    /// Map file holding the `level N:` sections
    #[arg(long, default_value = "assets/maps.txt")]
    map: PathBuf,

    /// Maximum number of frames to run
    #[arg(long, default_value_t = 3600)]
    ticks: u64,

    /// JSON physics tuning file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Draw every frame through the tracing renderer at real-time pace
    #[arg(long)]
    render: bool,

    /// Replay log to verify against the map instead of playing
    #[arg(long)]
    verify: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Renderer that turns draw calls into `trace!` events.
#[derive(Default)]
struct TraceRenderer {
    frames: u64,
}

impl Renderer for TraceRenderer {
    fn draw(&mut self, sprite: &Sprite, screen_pos: Vec2) {
        trace!(kind = ?sprite.kind, frame = sprite.frame, flip = sprite.flip_x, x = screen_pos.x, y = screen_pos.y, "draw");
    }

    fn draw_background(&mut self, background: &Background, xs: [f64; 2]) {
        self.frames += 1;
        trace!(image = background.image, x0 = xs[0], x1 = xs[1], "background");
    }

    fn draw_hud(&mut self, score: u32, health: u32, max_health: u32) {
        trace!(score, health, max_health, "hud");
    }

    fn draw_overlay_message(&mut self, text: &str) {
        info!(text, "overlay");
    }
}

// ---------------------------------------------------------------------------
// Input script
// ---------------------------------------------------------------------------

fn scripted_input(tick: u64) -> InputFrame {
    let mut input = InputFrame::new()
        .with(Action::Right)
        .with(Action::Advance)
        .with(Action::Restart);
    if tick % 120 < 12 {
        input.press(Action::Jump);
    }
    input
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let physics = match &cli.config {
        Some(path) => load_physics(path)?,
        None => PhysicsConfig::default(),
    };

    if let Some(log_path) = &cli.verify {
        return verify(&cli.map, log_path, &physics);
    }

    let session = GameSession::new(MapSource::File(cli.map.clone()), cli.level, physics);
    if let Some(err) = session.load_error() {
        warn!(level = cli.level, error = %err, "starting without a level");
    }

    let tick_config = TickConfig {
        headless: !cli.render,
        ..Default::default()
    };
    let last_level = if cli.render {
        let mut renderer = TraceRenderer::default();
        let mut tick_loop = TickLoop::new(session, SystemClock::new(), tick_config);
        tick_loop.run(cli.ticks, scripted_input, Some(&mut renderer));
        info!(frames = renderer.frames, "rendered");
        report(&tick_loop);
        tick_loop.session().level_number()
    } else {
        let mut tick_loop = TickLoop::new(session, SteppedClock::new(), tick_config);
        tick_loop.run(cli.ticks, scripted_input, None);
        report(&tick_loop);
        tick_loop.session().level_number()
    };
    info!(last_level, "done");
    Ok(())
}

fn load_physics(path: &Path) -> Result<PhysicsConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read physics config {}", path.display()))?;
    PhysicsConfig::from_json_str(&text).with_context(|| format!("invalid physics config {}", path.display()))
}

fn verify(map: &Path, log_path: &Path, physics: &PhysicsConfig) -> Result<()> {
    let map_text =
        std::fs::read_to_string(map).with_context(|| format!("failed to read map file {}", map.display()))?;
    let log_text = std::fs::read_to_string(log_path)
        .with_context(|| format!("failed to read replay log {}", log_path.display()))?;
    let log: ReplayLog = serde_json::from_str(&log_text)
        .with_context(|| format!("failed to parse replay log {}", log_path.display()))?;

    let result = replay(&map_text, &log, physics)?;
    match &result.first_divergence {
        None => info!(
            ticks = result.ticks_replayed,
            score = result.score,
            complete = result.level_complete,
            game_over = result.game_over,
            "replay matched"
        ),
        Some(divergence) => warn!(
            tick = divergence.tick,
            expected = %divergence.expected_hash,
            actual = %divergence.actual_hash,
            "replay diverged"
        ),
    }
    Ok(())
}

fn report<C: Clock>(tick_loop: &TickLoop<C>) {
    let session = tick_loop.session();
    match session.level() {
        Some(level) => info!(
            ticks = tick_loop.tick_count(),
            level = level.level(),
            score = level.score(),
            health = level.player().health(),
            complete = level.is_complete(),
            game_over = level.is_game_over(),
            finished = session.is_finished(),
            "run finished"
        ),
        None => warn!(
            ticks = tick_loop.tick_count(),
            level = session.level_number(),
            error = ?session.load_error().map(|e| e.to_string()),
            "run finished without a level"
        ),
    }
}
