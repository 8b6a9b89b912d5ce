//! Boundary domain - сферическая зона containment
//!
//! Игрок: VelocityCancel + one-shot BoundaryNotice (UI показывает подсказку).
//! NPC: Bounce + BoundaryViolation (behavior выбирает inward waypoint).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::SimulationSet;

pub mod field;
pub mod systems;

pub use field::*;
pub use systems::*;

/// Политика коррекции на границе
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[require(BoundaryContact)]
pub enum BoundaryPolicy {
    VelocityCancel,
    #[default]
    Bounce,
}

/// Per-entity состояние на границе
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct BoundaryContact {
    /// До следующего допустимого отскока (секунды)
    pub cooldown_remaining: f32,
    /// BoundaryNotice уже показан (re-arm когда снова внутри)
    pub notified: bool,
}

/// NPC отскочил от границы: нужен новый waypoint внутрь
#[derive(Event, Debug, Clone, PartialEq)]
pub struct BoundaryViolation {
    pub entity: Entity,
    /// Направление внутрь (normalized)
    pub inward: Vec3,
}

/// Игрок упёрся в границу (one-shot подсказка для UI)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct BoundaryNotice {
    pub entity: Entity,
}

/// Boundary Plugin
pub struct BoundaryPlugin {
    pub field: BoundaryField,
}

impl Plugin for BoundaryPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<BoundaryViolation>()
            .add_event::<BoundaryNotice>()
            .insert_resource(self.field);

        app.add_systems(
            FixedUpdate,
            enforce_boundaries
                .in_set(SimulationSet::Spatial)
                .after(crate::combat::apply_player_contacts),
        );
    }
}
