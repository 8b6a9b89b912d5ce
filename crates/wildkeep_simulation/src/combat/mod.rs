//! Combat system module
//!
//! ECS ответственность:
//! - Game state: Health, Attacker stats, TargetTracker
//! - Combat rules: damage/heal/death/revive, cooldown окна
//! - Events: DamageDealt, Healed, EntityDied, EntityRevived
//!
//! Движок (внешний слой):
//! - анимация удара, вспышка, звуки (читают события и DamageFlash)
//! - опционально: trigger callbacks → OverlapEvent / PlayerContactEvent

use bevy::prelude::*;

use crate::SimulationSet;

pub mod attacker;
pub mod damage;
pub mod hitbox;

// Re-export основных типов
pub use attacker::{
    acknowledge_attack_animations, AttackAnimationFinished, AttackConfig, AttackPerformed,
    Attacker,
};
pub use damage::{
    apply_damage_requests, apply_heal_requests, apply_kill_requests, apply_max_health_requests,
    apply_revive_requests, despawn_after_timeout, handle_death, handle_revival, tick_damage_flash,
    DamageDealt, DamageFlash, DamageRequest, Dead, DespawnAfter, EntityDied, EntityRevived,
    HealRequest, Healed, KillRequest, LifecycleSettings, ReviveRequest, SetMaxHealthRequest,
};
pub use hitbox::{
    apply_overlap_events, apply_player_contacts, detect_overlaps, detect_player_contacts,
    purge_dead_targets, Hitbox, OverlapEvent, PlayerContact, PlayerContactEvent, PlayerLost,
    PlayerSpotted, TargetTracker,
};

/// Combat Plugin
///
/// Регистрирует combat системы в FixedUpdate.
///
/// Порядок выполнения:
/// 1. Spatial: detect_overlaps → apply_overlap_events → player contacts
/// 2. Behavior (начало): acknowledge_attack_animations
/// 3. Resolve: requests → Health → lifecycle события → purge/death/revive → flash → despawn
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<DamageRequest>()
            .add_event::<HealRequest>()
            .add_event::<KillRequest>()
            .add_event::<ReviveRequest>()
            .add_event::<SetMaxHealthRequest>()
            .add_event::<DamageDealt>()
            .add_event::<Healed>()
            .add_event::<EntityDied>()
            .add_event::<EntityRevived>()
            .add_event::<AttackPerformed>()
            .add_event::<AttackAnimationFinished>()
            .add_event::<OverlapEvent>()
            .add_event::<PlayerContactEvent>()
            .add_event::<PlayerSpotted>()
            .add_event::<PlayerLost>();

        app.init_resource::<LifecycleSettings>();

        app.add_systems(
            FixedUpdate,
            (
                detect_overlaps,
                apply_overlap_events,
                detect_player_contacts,
                apply_player_contacts,
            )
                .chain()
                .in_set(SimulationSet::Spatial),
        );

        app.add_systems(
            FixedUpdate,
            acknowledge_attack_animations.in_set(SimulationSet::Behavior),
        );

        app.add_systems(
            FixedUpdate,
            (
                apply_damage_requests,
                apply_kill_requests,
                apply_heal_requests,
                apply_max_health_requests,
                apply_revive_requests,
                purge_dead_targets,
                handle_death,
                handle_revival,
                tick_damage_flash,
                despawn_after_timeout,
            )
                .chain()
                .in_set(SimulationSet::Resolve),
        );
    }
}
