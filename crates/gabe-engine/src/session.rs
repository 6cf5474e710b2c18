//! Level progression: load, restart, advance, victory.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::camera::CameraView;
use crate::config::PhysicsConfig;
use crate::input::{Action, InputSource};
use crate::level::LevelSimulation;
use crate::map::{self, MapError};
use crate::render::{draw_level, Renderer};

/// Where level sections are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapSource {
    /// Re-read from disk on every load, so edits show up on restart.
    File(PathBuf),
    Text(String),
}

impl MapSource {
    fn load(&self, level: u32, config: &PhysicsConfig) -> Result<LevelSimulation, MapError> {
        match self {
            MapSource::File(path) => LevelSimulation::load_file(path, level, config),
            MapSource::Text(text) => LevelSimulation::load(text, level, config),
        }
    }

    /// Level numbers the source currently declares.
    fn level_numbers(&self) -> Result<Vec<u32>, MapError> {
        match self {
            MapSource::File(path) => Ok(map::level_numbers(&map::read_file(path)?)),
            MapSource::Text(text) => Ok(map::level_numbers(text)),
        }
    }
}

/// What the driver should do after a session update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSignal {
    Continue,
    Quit,
}

/// A play-through across consecutive levels.
#[derive(Debug)]
pub struct GameSession {
    source: MapSource,
    config: PhysicsConfig,
    level_number: u32,
    level: Option<LevelSimulation>,
    load_error: Option<MapError>,
    finished: bool,
    camera: CameraView,
}

impl GameSession {
    /// Start a session at `level`. A failed load is kept, not returned.
    pub fn new(source: MapSource, level: u32, config: PhysicsConfig) -> Self {
        let mut session = Self {
            source,
            config,
            level_number: level,
            level: None,
            load_error: None,
            finished: false,
            camera: CameraView::default(),
        };
        session.load_current();
        session
    }

    /// Replace the default viewport.
    pub fn with_camera(mut self, camera: CameraView) -> Self {
        self.camera = camera;
        self
    }

    pub fn level_number(&self) -> u32 {
        self.level_number
    }

    pub fn level(&self) -> Option<&LevelSimulation> {
        self.level.as_ref()
    }

    pub fn load_error(&self) -> Option<&MapError> {
        self.load_error.as_ref()
    }

    /// Every level has been completed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn camera(&self) -> &CameraView {
        &self.camera
    }

    /// Handle session-level input, then advance the current level.
    pub fn update(&mut self, input: &dyn InputSource, now_ms: u64) -> SessionSignal {
        if input.is_pressed(Action::Quit) {
            info!(level = self.level_number, "quit requested");
            return SessionSignal::Quit;
        }
        if self.finished {
            return SessionSignal::Continue;
        }

        let (complete, game_over) = match &self.level {
            Some(level) => (level.is_complete(), level.is_game_over()),
            None => return SessionSignal::Continue,
        };

        if game_over {
            if input.is_pressed(Action::Restart) {
                info!(level = self.level_number, "restarting level");
                self.load_current();
            }
        } else if complete {
            if input.is_pressed(Action::Advance) {
                self.advance();
            }
        } else if let Some(level) = self.level.as_mut() {
            level.update(input, now_ms);
        }
        SessionSignal::Continue
    }

    /// Draw the current level and any overlay text.
    pub fn draw(&mut self, renderer: &mut dyn Renderer, now_ms: u64) {
        if self.finished {
            renderer.draw_overlay_message("YOU CONQUERED ALL LEVELS!");
            renderer.draw_overlay_message("Press Esc to Exit");
            return;
        }
        let Some(level) = &self.level else {
            renderer.draw_overlay_message(&format!("Level {} could not be loaded", self.level_number));
            return;
        };

        self.camera.follow(level);
        draw_level(level, &self.camera, renderer, now_ms);
        if level.is_complete() {
            renderer.draw_overlay_message("LEVEL COMPLETE!");
            renderer.draw_overlay_message("Press SPACE for Next Level");
        } else if level.is_game_over() {
            renderer.draw_overlay_message("GAME OVER");
            renderer.draw_overlay_message("Press R to Restart");
        }
    }

    fn load_current(&mut self) {
        match self.source.load(self.level_number, &self.config) {
            Ok(level) => {
                self.level = Some(level);
                self.load_error = None;
            }
            Err(err) => {
                warn!(level = self.level_number, error = %err, "level failed to load");
                self.level = None;
                self.load_error = Some(err);
            }
        }
    }

    fn advance(&mut self) {
        let next = self.level_number + 1;
        let loaded = self.source.level_numbers().and_then(|levels| {
            if levels.contains(&next) {
                self.source.load(next, &self.config).map(Some)
            } else {
                Ok(None)
            }
        });
        match loaded {
            Ok(Some(level)) => {
                info!(from = self.level_number, to = next, "advancing to next level");
                self.level_number = next;
                self.level = Some(level);
                self.load_error = None;
            }
            Ok(None) => {
                info!(last = self.level_number, "all levels completed");
                self.finished = true;
            }
            Err(err) => {
                warn!(level = next, error = %err, "level failed to load");
                self.level_number = next;
                self.level = None;
                self.load_error = Some(err);
            }
        }
    }
}
