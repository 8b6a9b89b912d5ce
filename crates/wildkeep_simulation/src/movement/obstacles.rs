//! Препятствия для wander raycasts
//!
//! Не navmesh: только набор сфер и аналитический ray cast.
//! Хост может наполнить ObstacleField из своей сцены (деревья, камни, стены).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Сферическое препятствие
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct SphereObstacle {
    pub center: Vec3,
    pub radius: f32,
}

/// Попадание луча
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    /// Нормаль поверхности в точке попадания (наружу из препятствия)
    pub normal: Vec3,
    pub distance: f32,
}

/// Все препятствия мира
#[derive(Resource, Debug, Clone, Default, Reflect)]
#[reflect(Resource)]
pub struct ObstacleField {
    pub obstacles: Vec<SphereObstacle>,
}

impl ObstacleField {
    pub fn add_sphere(&mut self, center: Vec3, radius: f32) {
        if radius.is_finite() && radius > 0.0 {
            self.obstacles.push(SphereObstacle { center, radius });
        }
    }

    /// Ближайшее попадание луча в пределах max_distance
    pub fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO || max_distance <= 0.0 {
            return None;
        }

        self.obstacles
            .iter()
            .filter_map(|obstacle| ray_sphere(origin, dir, max_distance, obstacle))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

fn ray_sphere(origin: Vec3, dir: Vec3, max_distance: f32, sphere: &SphereObstacle) -> Option<RayHit> {
    let oc = origin - sphere.center;
    let b = oc.dot(dir);
    let c = oc.length_squared() - sphere.radius * sphere.radius;

    // Снаружи и смотрим от сферы
    if c > 0.0 && b > 0.0 {
        return None;
    }

    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    // Внутри сферы → попадание в origin
    let t = (-b - discriminant.sqrt()).max(0.0);
    if t > max_distance {
        return None;
    }

    let point = origin + dir * t;
    let mut normal = (point - sphere.center).normalize_or_zero();
    if normal == Vec3::ZERO {
        normal = -dir;
    }

    Some(RayHit {
        point,
        normal,
        distance: t,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_hits_sphere_ahead() {
        let mut field = ObstacleField::default();
        field.add_sphere(Vec3::new(0.0, 0.0, -5.0), 1.0);

        let hit = field
            .cast_ray(Vec3::ZERO, Vec3::NEG_Z, 10.0)
            .expect("sphere is straight ahead");

        assert!((hit.distance - 4.0).abs() < 1e-4);
        assert!((hit.normal - Vec3::Z).length() < 1e-4);
    }

    #[test]
    fn test_ray_misses_out_of_range() {
        let mut field = ObstacleField::default();
        field.add_sphere(Vec3::new(0.0, 0.0, -5.0), 1.0);

        assert!(field.cast_ray(Vec3::ZERO, Vec3::NEG_Z, 3.0).is_none());
        assert!(field.cast_ray(Vec3::ZERO, Vec3::Z, 10.0).is_none());
        assert!(field.cast_ray(Vec3::ZERO, Vec3::X, 10.0).is_none());
    }

    #[test]
    fn test_ray_picks_closest() {
        let mut field = ObstacleField::default();
        field.add_sphere(Vec3::new(0.0, 0.0, -8.0), 1.0);
        field.add_sphere(Vec3::new(0.0, 0.0, -3.0), 1.0);

        let hit = field.cast_ray(Vec3::ZERO, Vec3::NEG_Z, 10.0).unwrap();
        assert!((hit.distance - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_invalid_sphere_ignored() {
        let mut field = ObstacleField::default();
        field.add_sphere(Vec3::ZERO, 0.0);
        field.add_sphere(Vec3::ZERO, f32::NAN);
        assert!(field.obstacles.is_empty());
    }
}
