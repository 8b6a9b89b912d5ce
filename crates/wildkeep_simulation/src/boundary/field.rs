//! BoundaryField - сферическая зона, внутри которой живут все акторы
//!
//! Stateless query surface + две политики коррекции:
//! - velocity-cancel (игрок): срезать наружную составляющую, за границей - snap
//! - bounce (NPC): отразить направление от нормали + небольшой разброс

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, ensure_positive, ConfigError};

/// Допуск "на поверхности" (float после clamp)
const SURFACE_EPSILON: f32 = 1e-3;

/// Сфера containment (инвариант: radius > 0)
#[derive(Resource, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Resource)]
pub struct BoundaryField {
    center: Vec3,
    radius: f32,
    /// Ширина полосы у края, где velocity-cancel уже срезает движение наружу
    pub edge_margin: f32,
    /// Cooldown между отскоками одного актора (секунды)
    pub bounce_cooldown: f32,
    /// Максимальный разброс направления при отскоке (радианы)
    pub bounce_jitter: f32,
}

impl Default for BoundaryField {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            radius: 50.0,
            edge_margin: 1.0,
            bounce_cooldown: 1.5,
            bounce_jitter: 0.35, // ~20°
        }
    }
}

/// Результат velocity-cancel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeCorrection {
    /// Глубоко внутри - ничего не делали
    Inside,
    /// В полосе у края (наружная скорость срезана, если была)
    NearEdge,
    /// Был снаружи - вернули на поверхность
    SnappedBack,
}

/// Результат bounce
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BounceCorrection {
    Inside,
    /// Отскок: направление внутрь (для нового waypoint)
    Bounced { inward: Vec3 },
    /// Снаружи во время cooldown - только clamp + срез наружной скорости
    Clamped,
}

impl BoundaryField {
    pub fn new(center: Vec3, radius: f32) -> Result<Self, ConfigError> {
        if !center.is_finite() {
            return Err(ConfigError::NotFinite { field: "boundary_center" });
        }
        Ok(Self {
            center,
            radius: ensure_positive("boundary_radius", radius)?,
            ..default()
        })
    }

    pub fn with_edge_margin(mut self, edge_margin: f32) -> Result<Self, ConfigError> {
        self.edge_margin = ensure_non_negative("boundary_edge_margin", edge_margin)?;
        Ok(self)
    }

    pub fn with_bounce(mut self, cooldown: f32, jitter: f32) -> Result<Self, ConfigError> {
        self.bounce_cooldown = ensure_non_negative("bounce_cooldown", cooldown)?;
        self.bounce_jitter = ensure_non_negative("bounce_jitter", jitter)?;
        Ok(self)
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn distance_from_center(&self, position: Vec3) -> f32 {
        position.distance(self.center)
    }

    pub fn is_inside(&self, position: Vec3) -> bool {
        self.distance_from_center(position) <= self.radius
    }

    /// Нормаль наружу в точке (ноль в центре)
    pub fn outward_normal(&self, position: Vec3) -> Vec3 {
        (position - self.center).normalize_or_zero()
    }

    /// Ближайшая точка внутри сферы
    pub fn clamp_to_inside(&self, position: Vec3) -> Vec3 {
        if self.is_inside(position) {
            return position;
        }
        self.center + self.outward_normal(position) * self.radius
    }

    /// Проекция velocity на наружную нормаль (>0 - движемся наружу)
    pub fn outward_component(&self, velocity: Vec3, position: Vec3) -> f32 {
        velocity.dot(self.outward_normal(position))
    }

    /// Снаружи, либо на поверхности и движется наружу
    pub fn is_crossing(&self, position: Vec3, velocity: Vec3) -> bool {
        let distance = self.distance_from_center(position);
        distance > self.radius
            || (distance >= self.radius - SURFACE_EPSILON
                && self.outward_component(velocity, position) > 0.0)
    }

    /// Velocity без наружной составляющей
    pub fn cancel_outward(&self, velocity: Vec3, position: Vec3) -> Vec3 {
        let outward = self.outward_component(velocity, position);
        if outward > 0.0 {
            velocity - self.outward_normal(position) * outward
        } else {
            velocity
        }
    }

    /// Политика (a): velocity-cancel
    pub fn enforce_velocity_cancel(&self, position: &mut Vec3, velocity: &mut Vec3) -> EdgeCorrection {
        let distance = self.distance_from_center(*position);

        if distance > self.radius {
            *position = self.clamp_to_inside(*position);
            *velocity = self.cancel_outward(*velocity, *position);
            return EdgeCorrection::SnappedBack;
        }

        if distance >= self.radius - self.edge_margin {
            *velocity = self.cancel_outward(*velocity, *position);
            return EdgeCorrection::NearEdge;
        }

        EdgeCorrection::Inside
    }

    /// Политика (b): bounce
    ///
    /// `jitter` - уже выбранный случайный угол поворота (вокруг Y).
    /// После коррекции позиция внутри, наружная составляющая velocity <= 0.
    pub fn enforce_bounce(
        &self,
        position: &mut Vec3,
        velocity: &mut Vec3,
        jitter: f32,
        cooldown_ready: bool,
    ) -> BounceCorrection {
        if !self.is_crossing(*position, *velocity) {
            return BounceCorrection::Inside;
        }

        *position = self.clamp_to_inside(*position);
        let normal = self.outward_normal(*position);

        if !cooldown_ready {
            *velocity = self.cancel_outward(*velocity, *position);
            return BounceCorrection::Clamped;
        }

        let rotation = Quat::from_rotation_y(jitter);
        let outward = velocity.dot(normal);
        if outward > 0.0 {
            *velocity -= normal * (2.0 * outward);
        }
        *velocity = self.cancel_outward(rotation * *velocity, *position);

        let mut inward = (rotation * -normal).normalize_or_zero();
        if inward.dot(normal) > 0.0 || inward == Vec3::ZERO {
            inward = -normal;
        }

        BounceCorrection::Bounced { inward }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> BoundaryField {
        BoundaryField::new(Vec3::ZERO, 50.0).unwrap()
    }

    #[test]
    fn test_rejects_non_positive_radius() {
        assert!(BoundaryField::new(Vec3::ZERO, 0.0).is_err());
        assert!(BoundaryField::new(Vec3::ZERO, -3.0).is_err());
        assert!(BoundaryField::new(Vec3::splat(f32::NAN), 3.0).is_err());
    }

    #[test]
    fn test_queries() {
        let field = field();
        assert!(field.is_inside(Vec3::new(49.0, 0.0, 0.0)));
        assert!(!field.is_inside(Vec3::new(51.0, 0.0, 0.0)));

        let clamped = field.clamp_to_inside(Vec3::new(0.0, 0.0, 80.0));
        assert!((clamped - Vec3::new(0.0, 0.0, 50.0)).length() < 1e-4);

        let position = Vec3::new(40.0, 0.0, 0.0);
        assert!(field.outward_component(Vec3::X, position) > 0.0);
        assert!(field.outward_component(Vec3::NEG_X, position) < 0.0);
    }

    #[test]
    fn test_velocity_cancel_near_edge() {
        let field = field();
        let mut position = Vec3::new(49.5, 0.0, 0.0);
        let mut velocity = Vec3::new(3.0, 0.0, 2.0);

        let correction = field.enforce_velocity_cancel(&mut position, &mut velocity);

        assert_eq!(correction, EdgeCorrection::NearEdge);
        assert!(velocity.x.abs() < 1e-5);
        assert!((velocity.z - 2.0).abs() < 1e-5); // касательная сохранена
    }

    #[test]
    fn test_velocity_cancel_snaps_back() {
        let field = field();
        let mut position = Vec3::new(0.0, 0.0, -53.0);
        let mut velocity = Vec3::NEG_Z;

        let correction = field.enforce_velocity_cancel(&mut position, &mut velocity);

        assert_eq!(correction, EdgeCorrection::SnappedBack);
        assert!(field.distance_from_center(position) <= 50.0 + 1e-4);
        assert!(field.outward_component(velocity, position) <= 1e-6);
    }

    #[test]
    fn test_bounce_from_outside() {
        let field = field();
        let mut position = Vec3::new(51.0, 0.0, 0.0);
        let mut velocity = Vec3::new(2.0, 0.0, 0.5);

        let correction = field.enforce_bounce(&mut position, &mut velocity, 0.2, true);

        assert!(matches!(correction, BounceCorrection::Bounced { .. }));
        assert!(field.distance_from_center(position) <= 50.0 + 1e-4);
        assert!(field.outward_component(velocity, position) <= 1e-5);
    }

    #[test]
    fn test_bounce_inward_direction_points_inside() {
        let field = field();
        let mut position = Vec3::new(0.0, 0.0, 50.0);
        let mut velocity = Vec3::Z;

        let BounceCorrection::Bounced { inward } =
            field.enforce_bounce(&mut position, &mut velocity, -0.3, true)
        else {
            panic!("expected bounce");
        };

        assert!(inward.dot(field.outward_normal(position)) < 0.0);
    }

    #[test]
    fn test_bounce_on_cooldown_only_clamps() {
        let field = field();
        let mut position = Vec3::new(52.0, 0.0, 0.0);
        let mut velocity = Vec3::X;

        let correction = field.enforce_bounce(&mut position, &mut velocity, 0.0, false);

        assert_eq!(correction, BounceCorrection::Clamped);
        assert!(field.distance_from_center(position) <= 50.0 + 1e-4);
        assert!(velocity.length() < 1e-5);
    }

    #[test]
    fn test_bounce_ignores_inside() {
        let field = field();
        let mut position = Vec3::new(10.0, 0.0, 0.0);
        let mut velocity = Vec3::X;

        assert_eq!(
            field.enforce_bounce(&mut position, &mut velocity, 0.0, true),
            BounceCorrection::Inside
        );
        assert_eq!(velocity, Vec3::X);
    }
}
