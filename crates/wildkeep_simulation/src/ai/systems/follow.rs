//! Follow system - ally держит слот формации за лидером

use bevy::prelude::*;

use crate::ai::{smooth_damp, FollowConfig, FollowState, Follower};
use crate::components::Health;
use crate::movement::{turn_towards, Locomotion, MovementSpeed};

/// Система: FollowLocomotion
///
/// - далеко (> teleport_distance) - snap в слот
/// - в пределах arrival_tolerance - стоим лицом к лидеру
/// - иначе SmoothDamp к слоту, скорость ≤ move_speed, лицом по ходу
///
/// Лидер не может сам быть Follower (цепочки не поддерживаются).
pub fn follow_leader(
    mut followers: Query<(
        Entity,
        &mut Transform,
        &mut Locomotion,
        &Follower,
        &FollowConfig,
        &mut FollowState,
        &MovementSpeed,
        &Health,
    )>,
    leaders: Query<(&Transform, &Health), Without<Follower>>,
    time: Res<Time>,
) {
    let delta = time.delta_secs();

    for (entity, mut transform, mut locomotion, follower, config, mut state, speed, health) in
        followers.iter_mut()
    {
        if health.is_dead() {
            state.smoothed_velocity = Vec3::ZERO;
            continue;
        }

        let leader = leaders
            .get(follower.leader)
            .ok()
            .filter(|(_, leader_health)| leader_health.is_alive());

        let Some((leader_transform, _)) = leader else {
            // Нет лидера - idle
            locomotion.stop();
            state.smoothed_velocity = Vec3::ZERO;
            continue;
        };

        let position = transform.translation;
        let slot = config.slot_position(leader_transform, follower.formation_index);
        let distance = position.distance(slot);
        let max_turn = speed.max_turn(delta);

        if distance > config.teleport_distance {
            transform.translation = slot;
            locomotion.stop();
            state.smoothed_velocity = Vec3::ZERO;
            crate::log(&format!(
                "🌀 {:?} teleported to formation slot ({:.1}m behind)",
                entity, distance
            ));
            continue;
        }

        if distance <= config.arrival_tolerance || delta <= 0.0 {
            locomotion.stop();
            state.smoothed_velocity = Vec3::ZERO;
            turn_towards(&mut transform, leader_transform.translation - position, max_turn);
            continue;
        }

        let next = smooth_damp(
            position,
            slot,
            &mut state.smoothed_velocity,
            config.smooth_time,
            speed.move_speed,
            delta,
        );
        let step = (next - position).clamp_length_max(speed.move_speed * delta);
        locomotion.velocity = step / delta;

        turn_towards(&mut transform, step, max_turn);
    }
}
