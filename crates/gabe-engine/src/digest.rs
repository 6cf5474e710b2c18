//! BLAKE3 fingerprint of a level's simulation state.
//!
//! Two levels with the same digest hold the same bodies, behaviors, player
//! state, score and flags. Replays compare digests to detect divergence.

use gabe_world::Arena;
use serde::Serialize;

use crate::entities::player::Player;
use crate::entities::Entity;
use crate::level::LevelSimulation;

/// Compute the BLAKE3 hex digest of the level's dynamic state.
///
/// # Errors
///
/// Returns the serializer error if the state cannot be encoded as JSON.
pub fn state_hash(level: &LevelSimulation) -> Result<String, serde_json::Error> {
    #[derive(Serialize)]
    struct HashableState<'a> {
        level: u32,
        score: u32,
        level_complete: bool,
        game_over: bool,
        player: &'a Player,
        entities: &'a Arena<Entity>,
    }

    let hashable = HashableState {
        level: level.level(),
        score: level.score(),
        level_complete: level.is_complete(),
        game_over: level.is_game_over(),
        player: level.player(),
        entities: level.entities(),
    };

    let json_bytes = serde_json::to_vec(&hashable)?;
    Ok(blake3::hash(&json_bytes).to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConfig;
    use crate::input::{Action, InputFrame};

    const MAP: &str = "level 1:\n1 C  X\n------\n";

    #[test]
    fn identical_levels_hash_identically() {
        let config = PhysicsConfig::default();
        let a = LevelSimulation::load(MAP, 1, &config).unwrap();
        let b = LevelSimulation::load(MAP, 1, &config).unwrap();
        let hash = state_hash(&a).unwrap();
        assert_eq!(hash, state_hash(&b).unwrap());
        assert_eq!(hash.len(), 64);
    }

    #[test]
    fn movement_changes_the_hash() {
        let config = PhysicsConfig::default();
        let mut level = LevelSimulation::load(MAP, 1, &config).unwrap();
        let before = state_hash(&level).unwrap();
        level.update(&InputFrame::new().with(Action::Right), 0);
        assert_ne!(before, state_hash(&level).unwrap());
    }
}
