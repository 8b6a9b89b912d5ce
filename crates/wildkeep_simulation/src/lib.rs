//! Wildkeep Simulation Core
//!
//! ECS-симуляция на Bevy 0.16: здоровье/урон/смерть, target tracking,
//! блуждание, hostile FSM (включая flight variant), ally follow, boundary.
//!
//! Движок (рендер, анимации, звук, UI) - внешний слой: читает компоненты
//! (Transform, Locomotion, AnimationFlags, DamageFlash) и события ядра.

use std::time::Duration;

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod boundary;
pub mod combat;
pub mod components;
pub mod error;
pub mod logger;
pub mod movement;
pub mod spawn;

// Re-export базовых типов для удобства
pub use ai::{
    AIPlugin, BehaviorConfig, BehaviorMode, BehaviorPhase, BehaviorState, FlightConfig,
    FlightState, FollowConfig, Follower, VerticalPhase, WanderConfig, WanderState,
};
pub use boundary::{BoundaryField, BoundaryNotice, BoundaryPlugin, BoundaryPolicy, BoundaryViolation};
pub use combat::{
    Attacker, CombatPlugin, DamageDealt, DamageRequest, Dead, DespawnAfter, EntityDied,
    EntityRevived, Healed, TargetTracker,
};
pub use components::*;
pub use error::ConfigError;
pub use logger::{init_logger, log, log_error, log_info, log_warning, LogLevel, LogPrinter};
pub use movement::{Locomotion, MovementSpeed, ObstacleField};
pub use spawn::{spawn_actor, ActorConfig};

/// Длительность одного simulation tick (60Hz)
pub const FIXED_TICK: Duration = Duration::from_nanos(16_666_667);

/// Фазы одного simulation tick (FixedUpdate), строго по порядку
///
/// Spatial факты этого тика готовы до того, как behavior принимает решения.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Overlaps, player contacts, boundary enforcement
    Spatial,
    /// FSM, wander/follow, attack intents
    Behavior,
    /// Damage/heal/death/revive → lifecycle events
    Resolve,
    /// Реакции AI на lifecycle events (disable/restore)
    Reactions,
    /// Locomotion → Transform
    Integrate,
}

/// Главный plugin симуляции (объединяет все подсистемы)
#[derive(Default)]
pub struct SimulationPlugin {
    pub boundary: BoundaryField,
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Seed из create_headless_app не перетираем
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_duration(FIXED_TICK))
            .init_resource::<ObstacleField>()
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::Spatial,
                    SimulationSet::Behavior,
                    SimulationSet::Resolve,
                    SimulationSet::Reactions,
                    SimulationSet::Integrate,
                )
                    .chain(),
            )
            // Подсистемы (ECS strategic layer)
            .add_plugins((
                CombatPlugin,
                BoundaryPlugin {
                    field: self.boundary,
                },
                AIPlugin,
            ))
            .add_systems(
                FixedUpdate,
                movement::integrate_locomotion.in_set(SimulationSet::Integrate),
            );
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_duration(FIXED_TICK)); // 60Hz FixedUpdate

    app
}

/// Позиции всех акторов, отсортированные по Entity index
///
/// Для сравнения двух прогонов с одним seed.
pub fn actor_positions(world: &mut World) -> Vec<(u32, Vec3)> {
    let mut query = world.query_filtered::<(Entity, &Transform), With<Actor>>();
    let mut positions: Vec<_> = query
        .iter(world)
        .map(|(entity, transform)| (entity.index(), transform.translation))
        .collect();

    positions.sort_by_key(|(index, _)| *index);
    positions
}
