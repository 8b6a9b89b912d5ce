//! Flight variant - ортогональный vertical sub-state поверх BehaviorState

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, ensure_positive, ConfigError};

/// Вертикальная подфаза
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Reflect)]
pub enum VerticalPhase {
    /// Держим cruise altitude над землёй
    #[default]
    Cruising,
    /// Снижаемся к hover height над целью
    Descending,
    /// После удара - обратно на cruise altitude
    Ascending,
}

/// Параметры полёта
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[require(FlightState)]
#[serde(default)]
pub struct FlightConfig {
    /// Высота земли (y)
    pub ground_level: f32,
    /// Высота патрулирования над землёй
    pub cruise_altitude: f32,
    /// Высота зависания над целью при атаке
    pub hover_height: f32,
    /// Скорость снижения/подъёма (м/с)
    pub vertical_speed: f32,
    /// Допуск по высоте для "достигли"
    pub altitude_tolerance: f32,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            ground_level: 0.0,
            cruise_altitude: 6.0,
            hover_height: 1.5,
            vertical_speed: 2.0,
            altitude_tolerance: 0.1,
        }
    }
}

impl FlightConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("cruise_altitude", self.cruise_altitude)?;
        ensure_non_negative("hover_height", self.hover_height)?;
        ensure_positive("vertical_speed", self.vertical_speed)?;
        ensure_positive("altitude_tolerance", self.altitude_tolerance)?;
        if !self.ground_level.is_finite() {
            return Err(ConfigError::NotFinite { field: "ground_level" });
        }
        Ok(())
    }

    pub fn cruise_y(&self) -> f32 {
        self.ground_level + self.cruise_altitude
    }

    pub fn hover_y(&self, target: Vec3) -> f32 {
        target.y + self.hover_height
    }

    pub fn reached(&self, y: f32, target_y: f32) -> bool {
        (y - target_y).abs() <= self.altitude_tolerance
    }

    /// Вертикальная скорость к target_y (без перелёта за один тик)
    pub fn vertical_velocity(&self, y: f32, target_y: f32, delta: f32) -> f32 {
        let diff = target_y - y;
        if diff.abs() <= self.altitude_tolerance * 0.5 {
            return 0.0;
        }
        let max_speed = if delta > 0.0 {
            self.vertical_speed.min(diff.abs() / delta)
        } else {
            self.vertical_speed
        };
        diff.signum() * max_speed
    }
}

/// Runtime состояние полёта
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct FlightState {
    pub vertical: VerticalPhase,
}

impl FlightState {
    /// true если подфаза изменилась
    pub fn set_vertical(&mut self, vertical: VerticalPhase) -> bool {
        if self.vertical == vertical {
            return false;
        }
        self.vertical = vertical;
        true
    }
}
