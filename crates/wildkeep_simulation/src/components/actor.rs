//! Базовые компоненты акторов: Actor, EntityCategory, Health

use bevy::prelude::*;
use bevy_rapier3d::prelude::{CollisionGroups, Group};
use serde::{Deserialize, Serialize};

use crate::combat::{DamageFlash, Hitbox};
use crate::movement::{AnimationFlags, Locomotion, MovementSpeed};

/// Минимально допустимый max health (SetMaxHealth клампит сюда)
pub const MIN_MAX_HEALTH: f32 = 1.0;

/// Категория актора - определяет collision groups и кого он таргетит
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum EntityCategory {
    Player,
    Ally,
    #[default]
    Hostile,
}

impl EntityCategory {
    /// Membership bit категории
    pub fn group(self) -> Group {
        match self {
            EntityCategory::Player => Group::GROUP_1,
            EntityCategory::Ally => Group::GROUP_2,
            EntityCategory::Hostile => Group::GROUP_3,
        }
    }

    /// Маска целей по умолчанию:
    /// hostiles атакуют player+allies, player/allies - только hostiles
    pub fn default_target_mask(self) -> Group {
        match self {
            EntityCategory::Hostile => Group::GROUP_1 | Group::GROUP_2,
            EntityCategory::Player | EntityCategory::Ally => Group::GROUP_3,
        }
    }

    /// Collision groups: memberships = своя категория, filters = маска целей
    pub fn collision_groups(self) -> CollisionGroups {
        CollisionGroups::new(self.group(), self.default_target_mask())
    }
}

/// Актор (player, ally, hostile) - базовый компонент для живых существ
///
/// Автоматически добавляет Health, Transform, Hitbox и выходы локомоции
/// через Required Components.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(Health, Transform, Hitbox, DamageFlash, MovementSpeed, Locomotion, AnimationFlags)]
pub struct Actor {
    pub category: EntityCategory,
}

impl Actor {
    pub fn new(category: EntityCategory) -> Self {
        Self { category }
    }

    pub fn is_player(&self) -> bool {
        self.category == EntityCategory::Player
    }
}

/// Результат TakeDamage
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// Мертв, неуязвим или нулевой урон - ничего не изменилось
    Ignored,
    /// Урон применён, актор жив
    Damaged { dealt: f32, remaining: f32 },
    /// Урон применён и довёл health до 0 (Die() вызван ровно один раз)
    Killed { dealt: f32 },
}

/// Результат Heal
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HealOutcome {
    Ignored,
    Healed { amount: f32, current: f32 },
}

/// Здоровье актора
///
/// Инвариант: 0 ≤ current ≤ max, `dead` true только между Die() и Revive().
/// Мутируется только через take_damage / heal / die / revive / set_max_health.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Health {
    current: f32,
    max: f32,
    dead: bool,
    invulnerable: bool,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0) // Default 100 HP
    }
}

/// NaN/inf/отрицательные входы → 0
fn sanitize(amount: f32) -> f32 {
    if amount.is_finite() {
        amount.max(0.0)
    } else {
        0.0
    }
}

impl Health {
    /// Спавн с полным здоровьем
    pub fn new(max: f32) -> Self {
        let max = sanitize(max).max(MIN_MAX_HEALTH);
        Self {
            current: max,
            max,
            dead: false,
            invulnerable: false,
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable
    }

    pub fn set_invulnerable(&mut self, invulnerable: bool) {
        self.invulnerable = invulnerable;
    }

    pub fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        if self.dead || self.invulnerable {
            return DamageOutcome::Ignored;
        }

        let amount = sanitize(amount);
        if amount <= 0.0 {
            return DamageOutcome::Ignored;
        }

        let dealt = amount.min(self.current);
        self.current = (self.current - amount).max(0.0);

        if self.current <= 0.0 {
            self.die();
            DamageOutcome::Killed { dealt }
        } else {
            DamageOutcome::Damaged {
                dealt,
                remaining: self.current,
            }
        }
    }

    pub fn heal(&mut self, amount: f32) -> HealOutcome {
        if self.dead {
            return HealOutcome::Ignored;
        }

        let before = self.current;
        self.current = (self.current + sanitize(amount)).min(self.max);

        if self.current > before {
            HealOutcome::Healed {
                amount: self.current - before,
                current: self.current,
            }
        } else {
            HealOutcome::Ignored
        }
    }

    /// Идемпотентно: true только на первом вызове
    pub fn die(&mut self) -> bool {
        if self.dead {
            return false;
        }
        self.dead = true;
        self.current = 0.0;
        true
    }

    /// No-op если жив. Health = max × clamp01(fraction)
    pub fn revive(&mut self, health_fraction: f32) -> bool {
        if !self.dead {
            return false;
        }
        let fraction = if health_fraction.is_finite() {
            health_fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.dead = false;
        self.current = self.max * fraction;
        true
    }

    /// Пересчёт max health (leveling/attributes извне)
    ///
    /// proportional: current масштабируется тем же коэффициентом, что и max.
    /// Иначе current просто клампится к новому max.
    pub fn set_max_health(&mut self, new_max: f32, proportional: bool) {
        let new_max = sanitize(new_max).max(MIN_MAX_HEALTH);

        if proportional {
            let ratio = new_max / self.max;
            self.current = (self.current * ratio).min(new_max);
        } else {
            self.current = self.current.min(new_max);
        }
        self.max = new_max;

        if self.dead {
            self.current = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_damage() {
        let mut health = Health::new(100.0);
        assert_eq!(health.current(), 100.0);

        let outcome = health.take_damage(40.0);
        assert_eq!(outcome, DamageOutcome::Damaged { dealt: 40.0, remaining: 60.0 });
        assert!(health.is_alive());

        let outcome = health.take_damage(70.0); // Clamp к 0
        assert_eq!(outcome, DamageOutcome::Killed { dealt: 60.0 });
        assert_eq!(health.current(), 0.0);
        assert!(health.is_dead());

        // Третий удар по мертвому - игнор
        assert_eq!(health.take_damage(10.0), DamageOutcome::Ignored);
    }

    #[test]
    fn test_invulnerable_ignores_damage() {
        let mut health = Health::new(50.0);
        health.set_invulnerable(true);

        assert_eq!(health.take_damage(30.0), DamageOutcome::Ignored);
        assert_eq!(health.current(), 50.0);
    }

    #[test]
    fn test_garbage_damage_is_clamped() {
        let mut health = Health::new(50.0);

        assert_eq!(health.take_damage(-10.0), DamageOutcome::Ignored);
        assert_eq!(health.take_damage(f32::NAN), DamageOutcome::Ignored);
        assert_eq!(health.current(), 50.0);
    }

    #[test]
    fn test_health_heal() {
        let mut health = Health::new(100.0);
        health.take_damage(50.0);

        assert_eq!(health.heal(30.0), HealOutcome::Healed { amount: 30.0, current: 80.0 });

        // Clamp к max - healed только на реальный прирост
        assert_eq!(health.heal(100.0), HealOutcome::Healed { amount: 20.0, current: 100.0 });

        // Уже полный - событие не нужно
        assert_eq!(health.heal(10.0), HealOutcome::Ignored);
    }

    #[test]
    fn test_heal_dead_is_noop() {
        let mut health = Health::new(100.0);
        health.die();

        assert_eq!(health.heal(50.0), HealOutcome::Ignored);
        assert_eq!(health.current(), 0.0);
    }

    #[test]
    fn test_die_is_idempotent() {
        let mut health = Health::new(100.0);

        assert!(health.die());
        assert!(!health.die());
        assert!(health.is_dead());
        assert_eq!(health.current(), 0.0);
    }

    #[test]
    fn test_revive() {
        let mut health = Health::new(80.0);

        // Живого не воскрешаем
        assert!(!health.revive(1.0));

        health.die();
        assert!(health.revive(0.5));
        assert!(health.is_alive());
        assert_eq!(health.current(), 40.0);

        health.die();
        assert!(health.revive(7.0)); // clamp01
        assert_eq!(health.current(), 80.0);
    }

    #[test]
    fn test_set_max_health_proportional() {
        let mut health = Health::new(100.0);
        health.take_damage(50.0);

        health.set_max_health(200.0, true);
        assert_eq!(health.max(), 200.0);
        assert_eq!(health.current(), 100.0);
    }

    #[test]
    fn test_set_max_health_caps_current() {
        let mut health = Health::new(100.0);
        health.take_damage(10.0);

        health.set_max_health(50.0, false);
        assert_eq!(health.current(), 50.0);

        health.set_max_health(120.0, false);
        assert_eq!(health.current(), 50.0); // Не растёт без proportional
    }

    #[test]
    fn test_set_max_health_rejects_garbage() {
        let mut health = Health::new(100.0);
        health.set_max_health(-5.0, false);
        assert_eq!(health.max(), MIN_MAX_HEALTH);
        assert!(health.current() <= health.max());
    }

    #[test]
    fn test_category_masks() {
        let hostile = EntityCategory::Hostile.collision_groups();
        assert!(hostile.filters.intersects(EntityCategory::Player.group()));
        assert!(hostile.filters.intersects(EntityCategory::Ally.group()));
        assert!(!hostile.filters.intersects(EntityCategory::Hostile.group()));

        let ally = EntityCategory::Ally.collision_groups();
        assert!(ally.filters.intersects(EntityCategory::Hostile.group()));
        assert!(!ally.filters.intersects(EntityCategory::Player.group()));
    }
}
