//! Movement helpers + интеграция velocity → Transform

use bevy::prelude::*;

use crate::components::Health;
use crate::movement::{AnimationFlags, Locomotion};

/// Горизонтальная проекция (y = 0)
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Горизонтальная дистанция (XZ)
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    flatten(a - b).length()
}

/// Поворот current → target не больше чем на max_angle радиан
pub fn rotate_towards(current: Quat, target: Quat, max_angle: f32) -> Quat {
    let angle = current.angle_between(target);
    if angle <= max_angle || angle <= f32::EPSILON {
        target
    } else {
        current.slerp(target, max_angle / angle)
    }
}

/// Повернуть transform лицом к горизонтальному направлению (ограниченная угловая скорость)
pub fn turn_towards(transform: &mut Transform, direction: Vec3, max_angle: f32) {
    let flat = flatten(direction);
    if flat.length_squared() <= 1e-6 {
        return;
    }
    let target = Transform::IDENTITY.looking_to(flat, Vec3::Y).rotation;
    transform.rotation = rotate_towards(transform.rotation, target, max_angle);
}

/// Мгновенно развернуть к точке (in-place facing)
pub fn face_point(transform: &mut Transform, point: Vec3) {
    let flat = flatten(point - transform.translation);
    if flat.length_squared() <= 1e-6 {
        return;
    }
    transform.rotation = Transform::IDENTITY.looking_to(flat, Vec3::Y).rotation;
}

/// Система: интеграция Locomotion → Transform (headless режим)
///
/// В движке transform двигает физика/CharacterController, здесь - напрямую.
pub fn integrate_locomotion(
    mut query: Query<(&mut Transform, &mut Locomotion, &mut AnimationFlags, &Health)>,
    time: Res<Time>,
) {
    let delta = time.delta_secs();

    for (mut transform, mut locomotion, mut animation, health) in query.iter_mut() {
        if health.is_dead() {
            locomotion.stop();
            animation.walking = false;
            continue;
        }

        transform.translation += locomotion.velocity * delta;

        let walking = locomotion.is_moving();
        if animation.walking != walking {
            animation.walking = walking;
        }
    }
}
