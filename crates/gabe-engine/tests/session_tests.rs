//! Integration tests for level progression and the tick loop.

use std::path::PathBuf;

use gabe_engine::prelude::*;

const TWO_LEVELS: &str = "\
level 1:
1E
--
level 2:
biome: snow
1 E
---
";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Overlay {
    messages: Vec<String>,
    sprites: usize,
}

impl Renderer for Overlay {
    fn draw(&mut self, _sprite: &Sprite, _screen_pos: Vec2) {
        self.sprites += 1;
    }

    fn draw_background(&mut self, _background: &Background, _xs: [f64; 2]) {}

    fn draw_hud(&mut self, _score: u32, _health: u32, _max_health: u32) {}

    fn draw_overlay_message(&mut self, text: &str) {
        self.messages.push(text.to_owned());
    }
}

fn text_session(text: &str, level: u32) -> GameSession {
    GameSession::new(MapSource::Text(text.to_owned()), level, PhysicsConfig::default())
}

fn overlay(session: &mut GameSession) -> Vec<String> {
    let mut renderer = Overlay::default();
    session.draw(&mut renderer, 0);
    renderer.messages
}

fn idle() -> InputFrame {
    InputFrame::new()
}

// ---------------------------------------------------------------------------
// Progression
// ---------------------------------------------------------------------------

#[test]
fn completing_every_level_finishes_the_session() {
    let mut session = text_session(TWO_LEVELS, 1);
    let advance = InputFrame::new().with(Action::Advance);

    session.update(&idle(), 0);
    assert!(session.level().unwrap().is_complete());
    assert_eq!(overlay(&mut session), vec!["LEVEL COMPLETE!", "Press SPACE for Next Level"]);

    session.update(&advance, 17);
    assert_eq!(session.level_number(), 2);
    assert_eq!(session.level().unwrap().biome(), Biome::Snow);
    assert!(!session.level().unwrap().is_complete());

    let right = InputFrame::new().with(Action::Right);
    for frame in 0..100 {
        session.update(&right, 34 + frame * 17);
        if session.level().unwrap().is_complete() {
            break;
        }
    }
    assert!(session.level().unwrap().is_complete());

    session.update(&advance, 5000);
    assert!(session.is_finished());
    assert_eq!(overlay(&mut session), vec!["YOU CONQUERED ALL LEVELS!", "Press Esc to Exit"]);

    // Finished sessions ignore everything but quit.
    assert_eq!(session.update(&advance, 6000), SessionSignal::Continue);
    assert!(session.is_finished());
}

#[test]
fn advance_is_ignored_until_the_level_is_complete() {
    let mut session = text_session("level 1:\n1  E\n----\nlevel 2:\n1\n-\n", 1);
    session.update(&InputFrame::new().with(Action::Advance), 0);
    assert_eq!(session.level_number(), 1);
}

#[test]
fn restart_reloads_after_game_over() {
    let mut session = text_session("level 1:\n1\n", 1);
    for frame in 0..100 {
        session.update(&idle(), frame * 17);
    }
    assert!(session.level().unwrap().is_game_over());
    assert_eq!(overlay(&mut session), vec!["GAME OVER", "Press R to Restart"]);

    session.update(&InputFrame::new().with(Action::Restart), 2000);
    let level = session.level().unwrap();
    assert!(!level.is_game_over());
    assert_eq!(level.player().health(), 5);
    assert_eq!(session.level_number(), 1);
}

#[test]
fn restart_is_ignored_while_playing() {
    let mut session = text_session("level 1:\n1---\n", 1);
    session.update(&idle(), 0);
    let before = session.level().unwrap().player().body().x;
    let input = InputFrame::new().with(Action::Right).with(Action::Restart);
    session.update(&input, 17);
    // The level kept running instead of reloading.
    assert!(session.level().unwrap().player().body().x > before);
}

#[test]
fn quit_is_reported_in_any_state() {
    let mut session = text_session(TWO_LEVELS, 9);
    assert_eq!(
        session.update(&InputFrame::new().with(Action::Quit), 0),
        SessionSignal::Quit
    );
}

// ---------------------------------------------------------------------------
// Load failures
// ---------------------------------------------------------------------------

#[test]
fn missing_level_is_kept_as_an_error() {
    let mut session = text_session(TWO_LEVELS, 7);
    assert!(session.level().is_none());
    assert!(matches!(session.load_error(), Some(MapError::LevelNotFound { level: 7 })));
    assert_eq!(overlay(&mut session), vec!["Level 7 could not be loaded"]);
    assert_eq!(session.update(&idle(), 0), SessionSignal::Continue);
}

#[test]
fn missing_map_file_is_reported() {
    let path = PathBuf::from("/definitely/not/here/maps.txt");
    let session = GameSession::new(MapSource::File(path), 1, PhysicsConfig::default());
    assert!(matches!(session.load_error(), Some(MapError::MapFileMissing { .. })));
}

#[test]
fn map_file_is_read_from_disk() {
    let path = std::env::temp_dir().join(format!("gabe-session-{}.txt", std::process::id()));
    std::fs::write(&path, TWO_LEVELS).unwrap();

    let session = GameSession::new(MapSource::File(path.clone()), 2, PhysicsConfig::default());
    std::fs::remove_file(&path).unwrap();

    assert!(session.load_error().is_none());
    assert_eq!(session.level().unwrap().level(), 2);
}

#[test]
fn gap_in_level_numbers_ends_the_session() {
    let mut session = text_session("level 1:\n1E\n--\nlevel 3:\n1E\n--\n", 1);
    session.update(&idle(), 0);
    assert!(session.level().unwrap().is_complete());

    session.update(&InputFrame::new().with(Action::Advance), 17);
    assert!(session.is_finished());
    assert_eq!(session.level_number(), 1);
    assert!(session.load_error().is_none());
}

#[test]
fn advancing_rereads_the_map_file() {
    let path = std::env::temp_dir().join(format!("gabe-advance-{}.txt", std::process::id()));
    std::fs::write(&path, "level 1:\n1E\n--\n").unwrap();
    let mut session = GameSession::new(MapSource::File(path.clone()), 1, PhysicsConfig::default());
    session.update(&idle(), 0);
    std::fs::remove_file(&path).unwrap();

    session.update(&InputFrame::new().with(Action::Advance), 17);
    assert!(!session.is_finished());
    assert_eq!(session.level_number(), 2);
    assert!(session.level().is_none());
    assert!(matches!(session.load_error(), Some(MapError::MapFileMissing { .. })));
}

#[test]
fn last_level_in_file_finishes_the_session() {
    let path = std::env::temp_dir().join(format!("gabe-last-{}.txt", std::process::id()));
    std::fs::write(&path, "level 1:\n1E\n--\n").unwrap();
    let mut session = GameSession::new(MapSource::File(path.clone()), 1, PhysicsConfig::default());
    session.update(&idle(), 0);
    session.update(&InputFrame::new().with(Action::Advance), 17);
    std::fs::remove_file(&path).unwrap();

    assert!(session.is_finished());
    assert!(session.load_error().is_none());
}

// ---------------------------------------------------------------------------
// Camera
// ---------------------------------------------------------------------------

#[test]
fn custom_viewport_is_used_when_drawing() {
    let mut session = text_session("level 1:\n1    E\n------\n", 1)
        .with_camera(CameraView::new(Vec2::new(320.0, 240.0)));
    assert_eq!(session.camera().viewport(), Vec2::new(320.0, 240.0));

    overlay(&mut session);
    // Wider than the view: clamped to the left edge. Shorter: centred.
    assert_eq!(session.camera().offset(), Vec2::new(0.0, (128.0 - 240.0) / 2.0));
}

// ---------------------------------------------------------------------------
// Tick loop
// ---------------------------------------------------------------------------

#[test]
fn tick_loop_draws_unless_headless() {
    let session = text_session("level 1:\n1---\n", 1);
    let mut tick_loop = TickLoop::new(
        session,
        SteppedClock::new(),
        TickConfig {
            frame_ms: 1,
            headless: false,
        },
    );
    let mut renderer = Overlay::default();
    tick_loop.tick(&idle(), Some(&mut renderer));
    // Start flag, three ground tiles, player.
    assert_eq!(renderer.sprites, 5);

    let session = text_session("level 1:\n1---\n", 1);
    let mut headless = TickLoop::new(
        session,
        SteppedClock::new(),
        TickConfig {
            frame_ms: 17,
            headless: true,
        },
    );
    let mut renderer = Overlay::default();
    headless.tick(&idle(), Some(&mut renderer));
    assert_eq!(renderer.sprites, 0);
}

#[test]
fn tick_loop_stops_when_the_session_finishes() {
    let session = text_session("level 1:\n1E\n--\n", 1);
    let mut tick_loop = TickLoop::new(
        session,
        SteppedClock::new(),
        TickConfig {
            frame_ms: 17,
            headless: true,
        },
    );
    let ran = tick_loop.run(
        50,
        |tick| {
            if tick >= 1 {
                InputFrame::new().with(Action::Advance)
            } else {
                InputFrame::new()
            }
        },
        None,
    );
    assert_eq!(ran, 2);
    assert!(tick_loop.session().is_finished());
}
