//! Attacker component - характеристики атакующего актора
//!
//! Архитектура:
//! - ECS хранит: damage, cooldown, range, last attack timestamp
//! - Внешний animation player проигрывает удар и (опционально)
//!   подтверждает завершение через AttackAnimationFinished

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, ensure_positive, ConfigError};

/// Attacker - компонент для акторов которые могут атаковать
///
/// Инвариант: две атаки одного актора никогда не ближе чем `cooldown` секунд.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Attacker {
    /// Урон за удар
    pub damage: f32,
    /// Минимальный интервал между атаками (секунды)
    pub cooldown: f32,
    /// Дистанция атаки (метры, от центра до центра)
    pub range: f32,
    /// Ждать AttackAnimationFinished перед следующим ударом
    pub requires_animation_ack: bool,
    last_attack_at: Option<f32>,
    awaiting_ack: bool,
}

/// Сериализуемая часть Attacker (конфиг спавна)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackConfig {
    pub damage: f32,
    pub cooldown: f32,
    pub range: f32,
    #[serde(default)]
    pub requires_animation_ack: bool,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            damage: 10.0,
            cooldown: 1.0, // 1 атака в секунду
            range: 2.0,
            requires_animation_ack: false,
        }
    }
}

impl Default for Attacker {
    fn default() -> Self {
        let config = AttackConfig::default();
        Self {
            damage: config.damage,
            cooldown: config.cooldown,
            range: config.range,
            requires_animation_ack: false,
            last_attack_at: None,
            awaiting_ack: false,
        }
    }
}

impl Attacker {
    pub fn new(config: AttackConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            damage: ensure_non_negative("attack_damage", config.damage)?,
            cooldown: ensure_non_negative("attack_cooldown", config.cooldown)?,
            range: ensure_positive("attack_range", config.range)?,
            requires_animation_ack: config.requires_animation_ack,
            last_attack_at: None,
            awaiting_ack: false,
        })
    }

    pub fn last_attack_at(&self) -> Option<f32> {
        self.last_attack_at
    }

    pub fn is_awaiting_animation(&self) -> bool {
        self.awaiting_ack
    }

    /// Cooldown истёк (с учётом elapsed time симуляции)
    pub fn cooldown_elapsed(&self, now: f32) -> bool {
        match self.last_attack_at {
            Some(last) => now - last >= self.cooldown,
            None => true,
        }
    }

    /// Может ли атаковать прямо сейчас
    pub fn can_attack(&self, now: f32) -> bool {
        !self.awaiting_ack && self.cooldown_elapsed(now)
    }

    /// Зафиксировать удар: открывает новое cooldown окно
    pub fn record_attack(&mut self, now: f32) {
        self.last_attack_at = Some(now);
        self.awaiting_ack = self.requires_animation_ack;
    }

    /// Animation player сообщил что удар доигран
    pub fn acknowledge_animation(&mut self) {
        self.awaiting_ack = false;
    }

    /// Прерывание атаки (цель потеряна, смерть).
    /// Cooldown НЕ сбрасывается - иначе можно было бы ударить дважды за окно.
    pub fn interrupt(&mut self) {
        self.awaiting_ack = false;
    }
}

/// Событие: атака выполнена (для анимации/звука)
#[derive(Event, Debug, Clone)]
pub struct AttackPerformed {
    pub attacker: Entity,
    pub target: Entity,
    pub damage: f32,
}

/// Событие (inbound): animation player доиграл удар
#[derive(Event, Debug, Clone)]
pub struct AttackAnimationFinished {
    pub entity: Entity,
}

/// System: AttackAnimationFinished → переоткрыть окно атаки
pub fn acknowledge_attack_animations(
    mut events: EventReader<AttackAnimationFinished>,
    mut attackers: Query<&mut Attacker>,
) {
    for event in events.read() {
        if let Ok(mut attacker) = attackers.get_mut(event.entity) {
            attacker.acknowledge_animation();
        }
    }
}
