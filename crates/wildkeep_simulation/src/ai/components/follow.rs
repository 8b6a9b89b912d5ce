//! Follow components - ally следует за лидером в формации

use std::f32::consts::FRAC_PI_4;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, ensure_positive, ConfigError};
use crate::movement::flatten;

/// Ссылка на лидера + место в формации
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
#[require(FollowConfig, FollowState)]
pub struct Follower {
    pub leader: Entity,
    pub formation_index: u32,
}

/// Параметры следования
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct FollowConfig {
    /// Дистанция позади лидера
    pub follow_distance: f32,
    /// Угловой шаг между слотами формации (радианы)
    pub formation_spacing: f32,
    /// Дальше этого - телепорт к слоту
    pub teleport_distance: f32,
    /// Время сглаживания (SmoothDamp)
    pub smooth_time: f32,
    /// В пределах этого радиуса - стоим и смотрим на лидера
    pub arrival_tolerance: f32,
}

impl Default for FollowConfig {
    fn default() -> Self {
        Self {
            follow_distance: 2.5,
            formation_spacing: FRAC_PI_4,
            teleport_distance: 25.0,
            smooth_time: 0.3,
            arrival_tolerance: 0.3,
        }
    }
}

impl FollowConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_non_negative("follow_distance", self.follow_distance)?;
        ensure_non_negative("formation_spacing", self.formation_spacing)?;
        ensure_positive("teleport_distance", self.teleport_distance)?;
        ensure_positive("smooth_time", self.smooth_time)?;
        ensure_non_negative("arrival_tolerance", self.arrival_tolerance)?;
        Ok(())
    }

    /// Слот формации: позади лидера, слоты чередуются влево/вправо
    ///
    /// index 0 → прямо позади, 1 → +spacing, 2 → -spacing, 3 → +2·spacing ...
    pub fn slot_position(&self, leader: &Transform, index: u32) -> Vec3 {
        let mut back = flatten(leader.back().as_vec3()).normalize_or_zero();
        if back == Vec3::ZERO {
            back = Vec3::Z;
        }

        let step = index.div_ceil(2) as f32;
        let side = if index % 2 == 1 { 1.0 } else { -1.0 };
        let angle = side * step * self.formation_spacing;

        leader.translation + Quat::from_rotation_y(angle) * back * self.follow_distance
    }
}

/// Runtime состояние: velocity accumulator для SmoothDamp
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct FollowState {
    pub smoothed_velocity: Vec3,
}

/// Critically damped приближение current → target
///
/// Возвращает новую позицию, обновляет `velocity`. Шаг ограничен `max_speed`,
/// перелёт через target гасится.
pub fn smooth_damp(
    current: Vec3,
    target: Vec3,
    velocity: &mut Vec3,
    smooth_time: f32,
    max_speed: f32,
    delta: f32,
) -> Vec3 {
    if delta <= 0.0 {
        return current;
    }

    let smooth_time = smooth_time.max(1e-4);
    let omega = 2.0 / smooth_time;
    let x = omega * delta;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let mut change = current - target;
    let max_change = max_speed * smooth_time;
    change = change.clamp_length_max(max_change);
    let clamped_target = current - change;

    let temp = (*velocity + omega * change) * delta;
    *velocity = (*velocity - omega * temp) * exp;
    let mut output = clamped_target + (change + temp) * exp;

    // Не перелетаем
    let to_target = target - current;
    if to_target.dot(output - target) > 0.0 {
        output = target;
        *velocity = Vec3::ZERO;
    }

    *velocity = velocity.clamp_length_max(max_speed);
    output
}
