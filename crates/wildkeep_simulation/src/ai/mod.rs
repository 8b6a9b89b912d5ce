//! AI decision-making module
//!
//! Hostile FSM (BehaviorState + опциональный FlightState), wander цикл,
//! ally follow. Всё - явные per-entity state structs, один шаг за тик.

use bevy::prelude::*;

use crate::combat::acknowledge_attack_animations;
use crate::SimulationSet;

pub mod components;
pub mod systems;

// Re-export основных типов
pub use components::*;
pub use systems::*;

/// AI Plugin
///
/// Регистрирует AI системы в FixedUpdate.
/// Порядок выполнения (Behavior):
/// 1. record_provocations - DamageDealt → provoker set
/// 2. behavior_transitions - FSM + vertical sub-state
/// 3. apply_boundary_violations - BoundaryRedirect + inward waypoint
/// 4. wander_locomotion / behavior_locomotion / follow_leader - velocity intents
/// 5. behavior_attack_execution - AttackPerformed + DamageRequest
///
/// Reactions (после Resolve): disable_on_death, restore_on_revive.
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (
                record_provocations,
                behavior_transitions,
                apply_boundary_violations,
                wander_locomotion,
                behavior_locomotion,
                follow_leader,
                behavior_attack_execution,
            )
                .chain() // Последовательное выполнение для детерминизма
                .in_set(SimulationSet::Behavior)
                .after(acknowledge_attack_animations),
        );

        app.add_systems(
            FixedUpdate,
            (disable_on_death, restore_on_revive)
                .chain()
                .in_set(SimulationSet::Reactions),
        );
    }
}
