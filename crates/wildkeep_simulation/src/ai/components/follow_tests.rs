//! Tests for follow components.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use super::super::follow::{smooth_damp, FollowConfig};

    #[test]
    fn test_slots_spread_out() {
        let config = FollowConfig::default();
        let leader = Transform::from_xyz(0.0, 0.0, 0.0);

        let slots: Vec<Vec3> = (0..4).map(|i| config.slot_position(&leader, i)).collect();

        // Все слоты на follow_distance от лидера
        for slot in &slots {
            assert!((slot.length() - config.follow_distance).abs() < 1e-4);
        }
        // Никакие два слота не совпадают
        for i in 0..slots.len() {
            for j in (i + 1)..slots.len() {
                assert!(slots[i].distance(slots[j]) > 0.5, "slots {} and {} stack", i, j);
            }
        }
        // Слот 0 - прямо позади (лидер смотрит в -Z)
        assert!((slots[0] - Vec3::new(0.0, 0.0, config.follow_distance)).length() < 1e-4);
    }

    #[test]
    fn test_smooth_damp_converges_without_overshoot() {
        let target = Vec3::new(10.0, 0.0, 0.0);
        let mut position = Vec3::ZERO;
        let mut velocity = Vec3::ZERO;
        let dt = 1.0 / 60.0;

        for _ in 0..600 {
            position = smooth_damp(position, target, &mut velocity, 0.3, 5.0, dt);
            assert!(position.x <= target.x + 1e-4);
        }

        assert!(position.distance(target) < 0.01);
    }

    #[test]
    fn test_smooth_damp_respects_max_speed() {
        let mut velocity = Vec3::ZERO;
        let dt = 1.0 / 60.0;
        let mut position = Vec3::ZERO;

        for _ in 0..30 {
            position = smooth_damp(position, Vec3::new(100.0, 0.0, 0.0), &mut velocity, 0.3, 4.0, dt);
            assert!(velocity.length() <= 4.0 + 1e-4);
        }
    }

    #[test]
    fn test_validation() {
        assert!(FollowConfig::default().validate().is_ok());
        let bad = FollowConfig {
            smooth_time: 0.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
