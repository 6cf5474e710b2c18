//! Property tests for map parsing, health, collision and scoring.

use gabe_engine::collision::CollisionWorld;
use gabe_engine::map;
use gabe_engine::prelude::*;
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn map_row() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec![' ', '-', 'B', 'C', 'S', 'W', '1', 'E', 'X', 'Y', '?', '#', '.', 'z']),
        0..16,
    )
    .prop_map(|cells| cells.into_iter().collect::<String>())
}

fn map_text() -> impl Strategy<Value = String> {
    (prop::collection::vec(map_row(), 0..10), prop::option::of(prop::sample::select(vec!["snow", "lava", "desert"])))
        .prop_map(|(rows, biome)| {
            let mut text = String::from("level 1:\n");
            if let Some(biome) = biome {
                text.push_str(&format!("biome: {biome}\n"));
            }
            for row in rows {
                text.push_str(&row);
                text.push('\n');
            }
            text.push_str("level 2:\n-\n");
            text
        })
}

#[derive(Debug, Clone)]
enum HealthOp {
    Damage(u64),
    Heal,
    Wait(u64),
}

fn health_op() -> impl Strategy<Value = HealthOp> {
    prop_oneof![
        (0..3000u64).prop_map(HealthOp::Damage),
        Just(HealthOp::Heal),
        (0..3000u64).prop_map(HealthOp::Wait),
    ]
}

fn action_set() -> impl Strategy<Value = InputFrame> {
    prop::collection::vec(
        prop::sample::select(vec![Action::Left, Action::Right, Action::Run, Action::Jump, Action::Up, Action::Down]),
        0..3,
    )
    .prop_map(|actions| actions.into_iter().collect::<InputFrame>())
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn loading_is_idempotent(text in map_text()) {
        let a = map::load(&text, 1).unwrap();
        let b = map::load(&text, 1).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn health_stays_within_bounds(ops in prop::collection::vec(health_op(), 1..80)) {
        let config = PhysicsConfig::default();
        let mut player = Player::new(Vec2::ZERO, &config);
        let mut now = 0u64;
        for op in ops {
            match op {
                HealthOp::Damage(dt) => {
                    now += dt;
                    player.refresh_hurt(now, &config);
                    player.get_damage(now, &config);
                }
                HealthOp::Heal => player.heal(&config),
                HealthOp::Wait(dt) => {
                    now += dt;
                    player.refresh_hurt(now, &config);
                }
            }
            prop_assert!(player.health() <= config.start_health);
        }
    }

    /// Two hits inside one hurt window cost one point.
    #[test]
    fn damage_within_cooldown_counts_once(first in 0..10_000u64, gap in 0..1000u64) {
        let config = PhysicsConfig::default();
        let mut player = Player::new(Vec2::ZERO, &config);
        player.get_damage(first, &config);
        player.refresh_hurt(first + gap, &config);
        player.get_damage(first + gap, &config);
        prop_assert_eq!(player.health(), config.start_health - 1);
    }

    #[test]
    fn resolved_bodies_never_overlap_obstacles(
        solid in prop::collection::vec(any::<bool>(), 36),
        start in 0..36usize,
        dx in -30.0..30.0f64,
        vy in -30.0..30.0f64,
    ) {
        let mut arena = Arena::new();
        let mut obstacles = Vec::new();
        for (cell, &filled) in solid.iter().enumerate() {
            if filled && cell != start {
                let origin = Vec2::new((cell % 6) as f64 * TILE_SIZE, (cell / 6) as f64 * TILE_SIZE);
                let (tile, _) = Entity::from_tile(TileKind::Ground, origin);
                obstacles.push(arena.insert(tile));
            }
        }
        let mut world = CollisionWorld::new(&mut arena, &obstacles);
        let mut body = Aabb::new(
            (start % 6) as f64 * TILE_SIZE,
            (start / 6) as f64 * TILE_SIZE,
            TILE_SIZE,
            TILE_SIZE,
        );

        world.move_horizontal(&mut body, dx, None, false);
        for &id in &obstacles {
            let solid = world.body_of(id).unwrap();
            prop_assert!(!solid.overlaps(&body), "horizontal: {body:?} overlaps {solid:?}");
        }

        let mut vy = vy;
        world.fall(&mut body, &mut vy, 0.8, None);
        for &id in &obstacles {
            let solid = world.body_of(id).unwrap();
            prop_assert!(!solid.overlaps(&body), "vertical: {body:?} overlaps {solid:?}");
        }
    }

    #[test]
    fn score_never_decreases(inputs in prop::collection::vec(action_set(), 1..200)) {
        let mut level = LevelSimulation::load(
            "level 1:\n  C C C C\n1 C C C C\n----------\n",
            1,
            &PhysicsConfig::default(),
        ).unwrap();
        let coins = level.count(Category::Coin) as u32;
        let mut last = 0;
        for (frame, input) in inputs.iter().enumerate() {
            level.update(input, frame as u64 * 17);
            prop_assert!(level.score() >= last);
            prop_assert_eq!(level.score() + level.count(Category::Coin) as u32, coins);
            last = level.score();
        }
    }
}
