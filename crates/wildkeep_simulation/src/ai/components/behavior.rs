//! Behavior components - hostile FSM (mode, phase, цель, provokers)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::{PlayerContact, TargetTracker};
use crate::error::{ensure_non_negative, ConfigError};

/// Политика вступления в бой (конфиг, в runtime не меняется)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum BehaviorMode {
    /// Атакует любую валидную цель в радиусе
    #[default]
    Aggressive,
    /// Атакует только тех, кто уже нанёс ему урон
    Passive,
    /// Никогда не начинает атаку
    UltraPassive,
}

/// Фаза FSM (runtime)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Reflect)]
pub enum BehaviorPhase {
    #[default]
    Wandering,
    /// Только flight variant: снижение к цели
    Approaching,
    Attacking,
    BoundaryRedirect,
    /// Мертв - никакой логики
    Disabled,
}

/// Параметры поведения
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct BehaviorConfig {
    pub mode: BehaviorMode,
    /// Сколько держится BoundaryRedirect после отскока (секунды)
    pub redirect_duration: f32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            mode: BehaviorMode::Aggressive,
            redirect_duration: 1.0,
        }
    }
}

impl BehaviorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_non_negative("redirect_duration", self.redirect_duration)?;
        Ok(())
    }
}

/// Runtime состояние hostile FSM
///
/// `provokers` - sticky множество тех, кто наносил урон (Passive mode).
/// Очищается только вместе с entity.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(BehaviorConfig, TargetTracker, PlayerContact)]
pub struct BehaviorState {
    phase: BehaviorPhase,
    target: Option<Entity>,
    provokers: Vec<Entity>,
    redirect_remaining: f32,
}

impl BehaviorState {
    pub fn phase(&self) -> BehaviorPhase {
        self.phase
    }

    pub fn target(&self) -> Option<Entity> {
        self.target
    }

    pub fn is_disabled(&self) -> bool {
        self.phase == BehaviorPhase::Disabled
    }

    /// Фаза, в которой работает WanderLocomotion
    pub fn is_wandering(&self) -> bool {
        matches!(
            self.phase,
            BehaviorPhase::Wandering | BehaviorPhase::BoundaryRedirect
        )
    }

    pub fn redirect_remaining(&self) -> f32 {
        self.redirect_remaining
    }

    /// Переход фазы. true если фаза изменилась.
    pub fn transition(&mut self, phase: BehaviorPhase, target: Option<Entity>) -> bool {
        self.target = target;
        if self.phase == phase {
            return false;
        }
        self.phase = phase;
        if phase != BehaviorPhase::BoundaryRedirect {
            self.redirect_remaining = 0.0;
        }
        true
    }

    /// Потеря цели → Wandering
    pub fn return_to_wander(&mut self) -> bool {
        self.transition(BehaviorPhase::Wandering, None)
    }

    pub fn begin_redirect(&mut self, duration: f32) {
        self.transition(BehaviorPhase::BoundaryRedirect, None);
        self.redirect_remaining = duration.max(0.0);
    }

    /// true когда redirect cooldown истёк
    pub fn tick_redirect(&mut self, delta: f32) -> bool {
        self.redirect_remaining = (self.redirect_remaining - delta).max(0.0);
        self.redirect_remaining <= 0.0
    }

    pub fn disable(&mut self) -> bool {
        self.transition(BehaviorPhase::Disabled, None)
    }

    /// Revive: обратно к блужданию (provokers сохраняются)
    pub fn enable(&mut self) -> bool {
        if !self.is_disabled() {
            return false;
        }
        self.return_to_wander()
    }

    /// true если провокатор новый
    pub fn record_provocation(&mut self, source: Entity) -> bool {
        if self.provokers.contains(&source) {
            return false;
        }
        self.provokers.push(source);
        true
    }

    pub fn was_provoked_by(&self, source: Entity) -> bool {
        self.provokers.contains(&source)
    }

    pub fn provokers(&self) -> &[Entity] {
        &self.provokers
    }

    /// Политика режима: может ли этот entity начать атаку на `candidate`
    pub fn may_engage(&self, mode: BehaviorMode, candidate: Entity) -> bool {
        match mode {
            BehaviorMode::Aggressive => true,
            BehaviorMode::Passive => self.was_provoked_by(candidate),
            BehaviorMode::UltraPassive => false,
        }
    }
}
