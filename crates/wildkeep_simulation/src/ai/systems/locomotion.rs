//! Locomotion systems: wander cycle + behavior-driven движение hostile

use bevy::prelude::*;

use crate::ai::{
    BehaviorPhase, BehaviorState, FlightConfig, FlightState, VerticalPhase, WanderConfig,
    WanderState,
};
use crate::combat::{Attacker, PlayerContact};
use crate::components::Health;
use crate::movement::{face_point, flatten, turn_towards, Locomotion, MovementSpeed, ObstacleField};
use crate::DeterministicRng;

/// Система: WanderLocomotion → горизонтальная velocity
///
/// Работает для фаз Wandering/BoundaryRedirect (или без BehaviorState вовсе).
/// Движение идёт вдоль facing: сначала довернуться, потом идти.
pub fn wander_locomotion(
    mut wanderers: Query<(
        &mut Transform,
        &mut Locomotion,
        &mut WanderState,
        &WanderConfig,
        &MovementSpeed,
        &Health,
        Option<&BehaviorState>,
        Option<&PlayerContact>,
    )>,
    obstacles: Res<ObstacleField>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time>,
) {
    let delta = time.delta_secs();

    for (mut transform, mut locomotion, mut wander, config, speed, health, behavior, contact) in
        wanderers.iter_mut()
    {
        if health.is_dead() {
            continue;
        }
        if behavior.is_some_and(|state| !state.is_wandering()) {
            continue;
        }
        if contact.is_some_and(|contact| contact.player.is_some()) {
            continue;
        }

        let position = transform.translation;
        let direction = wander.tick(position, delta, config, &mut rng.rng, |origin, dir| {
            obstacles.cast_ray(origin, dir, config.probe_distance)
        });

        let Some(direction) = direction else {
            locomotion.velocity.x = 0.0;
            locomotion.velocity.z = 0.0;
            continue;
        };

        turn_towards(&mut transform, direction, speed.max_turn(delta));

        // Не идём боком/назад пока не развернулись
        let forward = flatten(transform.forward().as_vec3()).normalize_or_zero();
        let alignment = direction.dot(forward).max(0.0);
        let horizontal = forward * speed.move_speed * alignment;

        locomotion.velocity.x = horizontal.x;
        locomotion.velocity.z = horizontal.z;
    }
}

/// Система: движение hostile вне wander фаз + вертикаль flight variant
///
/// - Player contact: стоим, мгновенно разворачиваемся к игроку
/// - Approaching: к цели по горизонтали, к hover height по вертикали
/// - Attacking: стоим, разворачиваемся к цели
///
/// Цели hostile - player/allies (без BehaviorState), отсюда Without фильтр.
pub fn behavior_locomotion(
    mut hostiles: Query<(
        &mut Transform,
        &mut Locomotion,
        &BehaviorState,
        &MovementSpeed,
        &Attacker,
        &Health,
        &PlayerContact,
        Option<(&FlightConfig, &FlightState)>,
    )>,
    targets: Query<&Transform, Without<BehaviorState>>,
    time: Res<Time>,
) {
    let delta = time.delta_secs();

    for (mut transform, mut locomotion, state, speed, attacker, health, contact, flight) in
        hostiles.iter_mut()
    {
        if health.is_dead() || state.is_disabled() {
            continue;
        }

        let position = transform.translation;
        let max_turn = speed.max_turn(delta);

        // Контакт с игроком: стоим и сразу лицом к нему
        if let Some(player) = contact.player.and_then(|player| targets.get(player).ok()) {
            locomotion.velocity = Vec3::ZERO;
            face_point(&mut transform, player.translation);
            continue;
        }

        let target = state
            .target()
            .and_then(|target| targets.get(target).ok())
            .map(|target| target.translation);

        match (state.phase(), target) {
            (BehaviorPhase::Wandering | BehaviorPhase::BoundaryRedirect, _) => {
                // горизонталь уже задал wander_locomotion
            }
            (BehaviorPhase::Approaching, Some(target)) => {
                let to_target = flatten(target - position);
                let distance = to_target.length();
                let stop_at = attacker.range * 0.5;

                locomotion.velocity.x = 0.0;
                locomotion.velocity.z = 0.0;
                if distance > stop_at && delta > 0.0 {
                    let speed_cap = speed.move_speed.min((distance - stop_at) / delta);
                    let horizontal = to_target / distance * speed_cap;
                    locomotion.velocity.x = horizontal.x;
                    locomotion.velocity.z = horizontal.z;
                }
                turn_towards(&mut transform, to_target, max_turn);
            }
            (BehaviorPhase::Attacking, Some(target)) => {
                locomotion.velocity.x = 0.0;
                locomotion.velocity.z = 0.0;
                turn_towards(&mut transform, target - position, max_turn);
            }
            _ => {
                locomotion.velocity.x = 0.0;
                locomotion.velocity.z = 0.0;
            }
        }

        let Some((flight_config, flight_state)) = flight else {
            locomotion.velocity.y = 0.0;
            continue;
        };

        let target_y = match (flight_state.vertical, target) {
            (VerticalPhase::Descending, Some(target)) => flight_config.hover_y(target),
            _ => flight_config.cruise_y(),
        };
        locomotion.velocity.y = flight_config.vertical_velocity(position.y, target_y, delta);
    }
}
