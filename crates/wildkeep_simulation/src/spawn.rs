//! Спавн акторов из конфига (валидация до появления entity в мире)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ai::{
    BehaviorConfig, BehaviorMode, BehaviorState, FlightConfig, FollowConfig, Follower,
    WanderConfig, WanderState,
};
use crate::boundary::BoundaryPolicy;
use crate::combat::{AttackConfig, Attacker, Hitbox, TargetTracker};
use crate::components::{Actor, EntityCategory, Health};
use crate::error::{ensure_positive, ConfigError};
use crate::movement::MovementSpeed;

/// Полный статический конфиг актора
///
/// Загружается хостом (serde) или собирается конструкторами ниже.
/// `behavior` - hostile FSM, `follow` - ally за лидером.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    pub category: EntityCategory,
    pub max_health: f32,
    pub movement: MovementSpeed,
    pub hitbox_radius: f32,
    pub detection_radius: f32,
    pub attack: Option<AttackConfig>,
    pub behavior: Option<BehaviorConfig>,
    pub wander: Option<WanderConfig>,
    pub flight: Option<FlightConfig>,
    pub follow: Option<FollowConfig>,
    pub formation_index: u32,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self::hostile(BehaviorMode::Aggressive)
    }
}

impl ActorConfig {
    pub fn player() -> Self {
        Self {
            category: EntityCategory::Player,
            max_health: 100.0,
            movement: MovementSpeed::default(),
            hitbox_radius: 0.5,
            detection_radius: 8.0,
            attack: Some(AttackConfig::default()),
            behavior: None,
            wander: None,
            flight: None,
            follow: None,
            formation_index: 0,
        }
    }

    pub fn ally(formation_index: u32) -> Self {
        Self {
            category: EntityCategory::Ally,
            max_health: 60.0,
            follow: Some(FollowConfig::default()),
            formation_index,
            attack: None,
            ..Self::player()
        }
    }

    pub fn hostile(mode: BehaviorMode) -> Self {
        Self {
            category: EntityCategory::Hostile,
            max_health: 50.0,
            behavior: Some(BehaviorConfig {
                mode,
                ..Default::default()
            }),
            wander: Some(WanderConfig::default()),
            ..Self::player()
        }
    }

    /// Летающий hostile: больше радиус обнаружения (патрулирует на высоте)
    pub fn flying_hostile(mode: BehaviorMode) -> Self {
        Self {
            detection_radius: 12.0,
            flight: Some(FlightConfig::default()),
            ..Self::hostile(mode)
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("max_health", self.max_health)?;
        self.movement.validate()?;
        ensure_positive("hitbox_radius", self.hitbox_radius)?;
        ensure_positive("detection_radius", self.detection_radius)?;
        if let Some(attack) = self.attack {
            Attacker::new(attack)?;
        }
        if let Some(behavior) = &self.behavior {
            behavior.validate()?;
        }
        if let Some(wander) = &self.wander {
            wander.validate()?;
        }
        if let Some(flight) = &self.flight {
            flight.validate()?;
        }
        if let Some(follow) = &self.follow {
            follow.validate()?;
        }
        Ok(())
    }
}

/// Спавн актора в мир
///
/// Невалидный конфиг → ConfigError, entity не создаётся.
/// Player получает VelocityCancel на границе, остальные - Bounce.
pub fn spawn_actor(
    world: &mut World,
    config: &ActorConfig,
    position: Vec3,
    leader: Option<Entity>,
) -> Result<Entity, ConfigError> {
    config.validate()?;

    let boundary_policy = match config.category {
        EntityCategory::Player => BoundaryPolicy::VelocityCancel,
        EntityCategory::Ally | EntityCategory::Hostile => BoundaryPolicy::Bounce,
    };

    let mut entity = world.spawn((
        Actor::new(config.category),
        Health::new(config.max_health),
        Transform::from_translation(position),
        Hitbox {
            radius: config.hitbox_radius,
        },
        config.movement,
        config.category.collision_groups(),
        TargetTracker::new(config.detection_radius),
        boundary_policy,
    ));

    // Hostile FSM без явного attack конфига бьёт дефолтным ударом
    let attack = match (config.attack, &config.behavior) {
        (Some(attack), _) => Some(attack),
        (None, Some(_)) => Some(AttackConfig::default()),
        (None, None) => None,
    };
    if let Some(attack) = attack {
        entity.insert(Attacker::new(attack)?);
    }

    if let Some(behavior) = config.behavior {
        entity.insert((behavior, BehaviorState::default()));
    }
    if let Some(wander) = config.wander {
        entity.insert((wander, WanderState::default()));
    }
    if let Some(flight) = config.flight {
        entity.insert(flight);
    }

    match (config.follow, leader) {
        (Some(follow), Some(leader)) => {
            entity.insert((
                follow,
                Follower {
                    leader,
                    formation_index: config.formation_index,
                },
            ));
        }
        (Some(_), None) => {
            crate::logger::log_warning("Follow config without leader: ally will idle");
        }
        _ => {}
    }

    let id = entity.id();
    crate::log(&format!("🐣 Spawned {:?} {:?} at {:?}", config.category, id, position));
    Ok(id)
}
