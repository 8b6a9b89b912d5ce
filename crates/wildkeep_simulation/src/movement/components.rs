//! Movement компоненты: скорость, intent, анимационные флаги

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive, ConfigError};

/// Скорость актора
///
/// move_speed - м/с, rotation_speed - рад/с (ограничение поворота за тик).
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct MovementSpeed {
    pub move_speed: f32,
    pub rotation_speed: f32,
}

impl Default for MovementSpeed {
    fn default() -> Self {
        Self {
            move_speed: 3.0,
            rotation_speed: std::f32::consts::PI, // пол-оборота в секунду
        }
    }
}

impl MovementSpeed {
    pub fn new(move_speed: f32, rotation_speed: f32) -> Result<Self, ConfigError> {
        Ok(Self {
            move_speed: ensure_positive("move_speed", move_speed)?,
            rotation_speed: ensure_positive("rotation_speed", rotation_speed)?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::new(self.move_speed, self.rotation_speed).map(|_| ())
    }

    /// Максимальный поворот за тик (радианы)
    pub fn max_turn(&self, delta: f32) -> f32 {
        self.rotation_speed * delta
    }
}

/// Желаемая velocity на текущий тик
///
/// Пишется behavior/wander/follow системами, читается движком
/// (или integrate_locomotion в headless режиме).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Locomotion {
    pub velocity: Vec3,
}

impl Locomotion {
    pub fn stop(&mut self) {
        self.velocity = Vec3::ZERO;
    }

    pub fn is_moving(&self) -> bool {
        self.velocity.length_squared() > 1e-4
    }
}

/// Сигналы для внешнего animation player
///
/// Ядро никогда не ждёт анимацию (кроме AttackAnimationFinished ack).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct AnimationFlags {
    pub walking: bool,
    pub attacking: bool,
}
