//! AI reaction systems (death, revive).

use bevy::prelude::*;

use crate::ai::{
    BehaviorState, FlightState, FollowState, VerticalPhase, WanderConfig, WanderState,
};
use crate::combat::{Attacker, EntityDied, EntityRevived};
use crate::DeterministicRng;

/// System: смерть → Disabled, все in-flight таймеры сброшены
pub fn disable_on_death(
    mut death_events: EventReader<EntityDied>,
    mut actors: Query<(
        Option<&mut BehaviorState>,
        Option<&mut Attacker>,
        Option<(&mut WanderState, &WanderConfig)>,
        Option<&mut FollowState>,
    )>,
    mut rng: ResMut<DeterministicRng>,
) {
    for event in death_events.read() {
        let Ok((behavior, attacker, wander, follow)) = actors.get_mut(event.entity) else {
            continue;
        };

        if let Some(mut behavior) = behavior {
            if behavior.disable() {
                crate::logger::log(&format!("💀 {:?} died → AI disabled", event.entity));
            }
        }
        if let Some(mut attacker) = attacker {
            attacker.interrupt();
        }
        if let Some((mut wander, wander_config)) = wander {
            wander.interrupt(wander_config, &mut rng.rng);
        }
        if let Some(mut follow) = follow {
            follow.smoothed_velocity = Vec3::ZERO;
        }
    }
}

/// System: revive → Wandering (flight: набрать cruise altitude)
pub fn restore_on_revive(
    mut revive_events: EventReader<EntityRevived>,
    mut actors: Query<(&mut BehaviorState, Option<&mut FlightState>)>,
) {
    for event in revive_events.read() {
        let Ok((mut behavior, flight)) = actors.get_mut(event.entity) else {
            continue;
        };

        if behavior.enable() {
            crate::logger::log(&format!("✨ {:?} revived → Wandering", event.entity));
        }
        if let Some(mut flight) = flight {
            flight.set_vertical(VerticalPhase::Ascending);
        }
    }
}
