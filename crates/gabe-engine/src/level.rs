//! One running level.
//!
//! [`LevelSimulation`] owns every body of a level in an [`Arena`], indexes
//! them by [`Category`], and advances the whole level by one frame in
//! [`update`](LevelSimulation::update). The frame order is fixed:
//!
//! 1. ladder zone test (climbing needs an overlap and an elapsed cooldown)
//! 2. active entities in insertion order, then the player; bumps are applied
//! 3. coin pickup
//! 4. hazard overlap
//! 5. water zone test
//! 6. enemy contact
//! 7. heart pickup
//! 8. level boundary (clamp, fall-out, death)
//! 9. exit contact
//!
//! Contact tests (coins, enemies, hearts, exit) accept shared edges. Hazards,
//! zones (water, ladders) and solid collisions require a strict overlap, so
//! spikes set into the floor do not hurt a player standing beside them.

use std::path::Path;

use gabe_world::{Arena, CategoryIndex, EntityId};
use tracing::{debug, info, warn};

use crate::collision::CollisionWorld;
use crate::config::{PhysicsConfig, PLAYER_HEIGHT, TILE_SIZE};
use crate::entities::player::Player;
use crate::entities::{Behave, Behavior, Category, Entity, FrameContext};
use crate::geometry::{Aabb, Vec2};
use crate::input::InputSource;
use crate::map::{self, Biome, LevelMap, MapError, PlayerSpawn};

/// The simulation state of a single level.
#[derive(Debug, Clone)]
pub struct LevelSimulation {
    level: u32,
    entities: Arena<Entity>,
    categories: CategoryIndex<Category>,
    player: Player,
    config: PhysicsConfig,
    score: u32,
    level_complete: bool,
    game_over: bool,
    width: f64,
    height: f64,
    biome: Biome,
    spawn: PlayerSpawn,
}

impl LevelSimulation {
    /// Build a level from a parsed map.
    pub fn from_map(map: &LevelMap, config: &PhysicsConfig) -> Self {
        let mut entities = Arena::new();
        let mut categories = CategoryIndex::new();
        for spawn in &map.spawns {
            let (entity, groups) = Entity::from_tile(spawn.kind, spawn.origin());
            let id = entities.insert(entity);
            for &group in groups {
                categories.insert(group, id);
            }
        }

        let cell = map.player_spawn.cell;
        let mut player = Player::new(Vec2::new(cell.x, cell.y + TILE_SIZE - PLAYER_HEIGHT), config);
        {
            let mut world = CollisionWorld::new(&mut entities, categories.members(Category::Obstacle));
            player.settle(&mut world);
        }

        info!(
            level = map.level,
            entities = entities.len(),
            biome = ?map.biome,
            "level loaded"
        );

        Self {
            level: map.level,
            entities,
            categories,
            player,
            config: config.clone(),
            score: 0,
            level_complete: false,
            game_over: false,
            width: map.grid.pixel_width(),
            height: map.grid.pixel_height(),
            biome: map.biome,
            spawn: map.player_spawn,
        }
    }

    /// Parse `level` out of map text and build it.
    ///
    /// # Errors
    ///
    /// [`MapError::LevelNotFound`] if the text has no such level.
    pub fn load(text: &str, level: u32, config: &PhysicsConfig) -> Result<Self, MapError> {
        Ok(Self::from_map(&map::load(text, level)?, config))
    }

    /// Read a map file and build `level` from it.
    ///
    /// # Errors
    ///
    /// As [`map::load_file`].
    pub fn load_file(path: impl AsRef<Path>, level: u32, config: &PhysicsConfig) -> Result<Self, MapError> {
        Ok(Self::from_map(&map::load_file(path, level)?, config))
    }

    // -- accessors ----------------------------------------------------------

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn is_complete(&self) -> bool {
        self.level_complete
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Level extent in pixels (grid width and height times the tile size).
    pub fn bounds(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn biome(&self) -> Biome {
        self.biome
    }

    pub fn spawn(&self) -> PlayerSpawn {
        self.spawn
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Number of live entities in `category`.
    pub fn count(&self, category: Category) -> usize {
        self.categories.count(category)
    }

    /// Live members of `category` in insertion order.
    pub fn members(&self, category: Category) -> impl Iterator<Item = (EntityId, &Entity)> + '_ {
        self.categories
            .members(category)
            .iter()
            .filter_map(|&id| self.entities.get(id).map(|entity| (id, entity)))
    }

    /// Every entity that is drawn, in insertion order.
    pub fn visible(&self) -> impl Iterator<Item = (EntityId, &Entity)> + '_ {
        self.members(Category::Visible)
    }

    /// Every live entity in slot order.
    pub fn entities(&self) -> &Arena<Entity> {
        &self.entities
    }

    // -- frame ----------------------------------------------------------------

    /// Advance one frame. Does nothing once the level is complete or over.
    pub fn update(&mut self, input: &dyn InputSource, now_ms: u64) {
        if self.level_complete || self.game_over || !self.player.is_alive() {
            return;
        }

        self.update_ladder(now_ms);
        let bumped = self.update_bodies(input, now_ms);
        self.apply_bumps(&bumped);

        self.collect_coins();
        if self.player_overlaps(Category::Hazard) {
            self.player.get_damage(now_ms, &self.config);
        }
        let in_water = self.player_overlaps(Category::Water);
        self.player.set_in_water(in_water);
        if self.player_touches(Category::Enemy) {
            self.player.get_damage(now_ms, &self.config);
        }
        self.collect_hearts();
        self.check_boundary();

        if !self.game_over && self.player_touches(Category::Exit) {
            self.level_complete = true;
            info!(level = self.level, score = self.score, "level complete");
        }
    }

    fn update_ladder(&mut self, now_ms: u64) {
        let on_ladder = self.player_overlaps(Category::Ladder);
        let climbing = on_ladder && self.player.ladder_ready(now_ms, &self.config);
        self.player.set_climbing(climbing);
    }

    fn update_bodies(&mut self, input: &dyn InputSource, now_ms: u64) -> Vec<EntityId> {
        let active = self.categories.members(Category::Active);
        let mut world = CollisionWorld::new(&mut self.entities, self.categories.members(Category::Obstacle));
        let mut ctx = FrameContext {
            now_ms,
            player_center: self.player.body().center(),
            self_id: None,
            config: &self.config,
        };

        for &id in active {
            let Some(mut entity) = world.entity(id).cloned() else {
                continue;
            };
            ctx.self_id = Some(id);
            let Entity {
                body,
                velocity,
                behavior,
                ..
            } = &mut entity;
            behavior.movement(body, velocity, &mut world, &ctx);
            behavior.animate(&ctx);
            if let Some(slot) = world.entity_mut(id) {
                *slot = entity;
            }
        }

        self.player.update(input, &mut world, now_ms, &self.config)
    }

    fn apply_bumps(&mut self, bumped: &[EntityId]) {
        for &id in bumped {
            let Some(entity) = self.entities.get_mut(id) else {
                continue;
            };
            let Behavior::LuckyBlock(block) = &mut entity.behavior else {
                continue;
            };
            if !block.hit() {
                continue;
            }
            let block_body = entity.body;
            let (heart, groups) = Entity::heart_above(&block_body);
            let heart_id = self.spawn_entity(heart, groups);
            debug!(block = %id, heart = %heart_id, "lucky block hit");
        }
    }

    fn collect_coins(&mut self) {
        let touched = self.touched(Category::Coin);
        for &id in &touched {
            self.despawn(id);
        }
        if !touched.is_empty() {
            self.score += touched.len() as u32;
            debug!(collected = touched.len(), score = self.score, "coins collected");
        }
    }

    fn collect_hearts(&mut self) {
        for id in self.touched(Category::Item) {
            self.despawn(id);
            self.player.heal(&self.config);
        }
    }

    fn check_boundary(&mut self) {
        self.player.clamp_x(0.0, self.width);
        if self.player.body().top() > self.height {
            self.player.kill();
            info!(level = self.level, "player fell out of the level");
        }
        if !self.player.is_alive() {
            self.game_over = true;
            info!(level = self.level, score = self.score, "game over");
        }
    }

    // -- helpers ----------------------------------------------------------------

    fn spawn_entity(&mut self, entity: Entity, groups: &[Category]) -> EntityId {
        let id = self.entities.insert(entity);
        for &group in groups {
            self.categories.insert(group, id);
        }
        id
    }

    fn despawn(&mut self, id: EntityId) {
        self.categories.remove_everywhere(id);
        if let Err(err) = self.entities.remove(id) {
            warn!(%err, "despawn of a dead entity");
        }
    }

    fn bodies(&self, category: Category) -> impl Iterator<Item = (EntityId, Aabb)> + '_ {
        self.members(category).map(|(id, entity)| (id, entity.body))
    }

    /// Members of `category` in contact with the player.
    fn touched(&self, category: Category) -> Vec<EntityId> {
        let player = self.player.body();
        self.bodies(category)
            .filter(|(_, body)| body.touches(&player))
            .map(|(id, _)| id)
            .collect()
    }

    fn player_touches(&self, category: Category) -> bool {
        let player = self.player.body();
        self.bodies(category).any(|(_, body)| body.touches(&player))
    }

    fn player_overlaps(&self, category: Category) -> bool {
        let player = self.player.body();
        self.bodies(category).any(|(_, body)| body.overlaps(&player))
    }
}
