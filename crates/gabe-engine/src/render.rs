//! Rendering seam.
//!
//! The core never touches pixels. [`draw_level`] walks a level and describes
//! each thing to draw as a [`Sprite`] at a screen position; a [`Renderer`]
//! implementation decides how (or whether) to put it on screen.

use crate::camera::CameraView;
use crate::entities::enemy::MoveStrategy;
use crate::entities::player::PlayerStatus;
use crate::entities::{Behavior, Entity, EntityKind};
use crate::geometry::Vec2;
use crate::level::LevelSimulation;
use crate::map::Biome;

/// What a sprite depicts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpriteKind {
    /// Ground block textured by the level's biome.
    Ground { texture: &'static str },
    Box,
    Coin,
    Spikes,
    Water,
    StartFlag,
    Exit,
    Ladder,
    LuckyBlock { spent: bool },
    Heart,
    Enemy { strategy: MoveStrategy },
    Player { status: PlayerStatus },
}

/// One draw request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub kind: SpriteKind,
    /// Animation frame index.
    pub frame: usize,
    /// Mirror horizontally (facing left).
    pub flip_x: bool,
}

impl Sprite {
    fn still(kind: SpriteKind) -> Self {
        Self {
            kind,
            frame: 0,
            flip_x: false,
        }
    }
}

/// Parallax backdrop of a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Background {
    pub image: &'static str,
}

/// Drawing backend.
pub trait Renderer {
    fn draw(&mut self, sprite: &Sprite, screen_pos: Vec2);

    /// Draw the backdrop at each of the given x positions.
    fn draw_background(&mut self, background: &Background, xs: [f64; 2]);

    fn draw_hud(&mut self, score: u32, health: u32, max_health: u32);

    fn draw_overlay_message(&mut self, text: &str);
}

/// Describe how `entity` looks, plus its vertical draw offset.
pub fn sprite_for(entity: &Entity, biome: Biome) -> (Sprite, f64) {
    let still = |kind| (Sprite::still(kind), 0.0);
    match (&entity.behavior, entity.kind) {
        (Behavior::Coin(coin), _) => (
            Sprite {
                kind: SpriteKind::Coin,
                frame: coin.animation.index(),
                flip_x: false,
            },
            0.0,
        ),
        (Behavior::Walker(walker), _) => (
            Sprite {
                kind: SpriteKind::Enemy {
                    strategy: walker.strategy,
                },
                frame: 0,
                flip_x: !walker.facing_right(),
            },
            0.0,
        ),
        (Behavior::LuckyBlock(block), _) => (
            Sprite::still(SpriteKind::LuckyBlock {
                spent: block.is_spent(),
            }),
            block.draw_offset(),
        ),
        (Behavior::Heart(_), _) => still(SpriteKind::Heart),
        (Behavior::PushBox(_), _) => still(SpriteKind::Box),
        (Behavior::Static, EntityKind::Ground) => still(SpriteKind::Ground {
            texture: biome.assets().ground_texture,
        }),
        (Behavior::Static, EntityKind::Hazard) => still(SpriteKind::Spikes),
        (Behavior::Static, EntityKind::Water) => still(SpriteKind::Water),
        (Behavior::Static, EntityKind::Exit) => still(SpriteKind::Exit),
        (Behavior::Static, EntityKind::Ladder) => still(SpriteKind::Ladder),
        (Behavior::Static, _) => still(SpriteKind::StartFlag),
    }
}

/// Draw a level: background, every visible entity, the player and the HUD.
///
/// The player is skipped on the dark half of its hurt flicker.
pub fn draw_level(level: &LevelSimulation, camera: &CameraView, renderer: &mut dyn Renderer, now_ms: u64) {
    let background = Background {
        image: level.biome().assets().background,
    };
    renderer.draw_background(&background, camera.parallax());

    for (_, entity) in level.visible() {
        let (sprite, dy) = sprite_for(entity, level.biome());
        let pos = camera.to_screen(&entity.body);
        renderer.draw(&sprite, Vec2::new(pos.x, pos.y + dy));
    }

    let player = level.player();
    if player.flicker_visible(now_ms) {
        let sprite = Sprite {
            kind: SpriteKind::Player {
                status: player.status(),
            },
            frame: player.animation_frame(),
            flip_x: !player.facing_right(),
        };
        renderer.draw(&sprite, camera.to_screen(&player.body()));
    }

    renderer.draw_hud(level.score(), player.health(), level.config().start_health);
}
