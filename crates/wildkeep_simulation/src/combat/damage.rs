//! Health lifecycle: damage / heal / death / revive
//!
//! Все мутации Health идут через request-события, чтобы каждое
//! lifecycle-событие (damaged, healed, died, revived) писалось ровно
//! один раз на реальный переход.

use bevy::prelude::*;

use crate::components::{DamageOutcome, HealOutcome, Health};
use crate::movement::{AnimationFlags, Locomotion};

/// Request: нанести урон (от атаки AI, игрока, окружения)
#[derive(Event, Debug, Clone)]
pub struct DamageRequest {
    pub target: Entity,
    pub amount: f32,
    pub source: Option<Entity>,
}

/// Request: вылечить
#[derive(Event, Debug, Clone)]
pub struct HealRequest {
    pub target: Entity,
    pub amount: f32,
}

/// Request: убить немедленно (Die())
#[derive(Event, Debug, Clone)]
pub struct KillRequest {
    pub target: Entity,
    pub killer: Option<Entity>,
}

/// Request: воскресить с долей здоровья
#[derive(Event, Debug, Clone)]
pub struct ReviveRequest {
    pub target: Entity,
    pub health_fraction: f32,
}

/// Request: внешний leveling пересчитал max health
#[derive(Event, Debug, Clone)]
pub struct SetMaxHealthRequest {
    pub target: Entity,
    pub max_health: f32,
    pub proportional: bool,
}

/// Событие: урон нанесен ("damaged")
#[derive(Event, Debug, Clone, PartialEq)]
pub struct DamageDealt {
    pub attacker: Option<Entity>,
    pub target: Entity,
    pub damage: f32,
    pub remaining: f32,
    pub target_died: bool,
}

/// Событие: здоровье реально выросло ("healed")
#[derive(Event, Debug, Clone, PartialEq)]
pub struct Healed {
    pub entity: Entity,
    pub amount: f32,
    pub current: f32,
}

/// Событие: entity умер ("died") - ровно один раз на смерть
#[derive(Event, Debug, Clone, PartialEq)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Событие: entity воскрешён ("revived")
#[derive(Event, Debug, Clone, PartialEq)]
pub struct EntityRevived {
    pub entity: Entity,
    pub health: f32,
}

/// Компонент-маркер: entity мертв
///
/// Для визуальных эффектов (death animation, fade-out).
#[derive(Component, Debug)]
pub struct Dead;

/// Деспавн entity после указанного времени (секунды elapsed симуляции)
///
/// Снимается при Revive - воскрешение отменяет уборку трупа.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct DespawnAfter {
    pub despawn_time: f32,
}

/// Вспышка при получении урона (визуальный cue, не блокирует логику)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct DamageFlash {
    pub remaining: f32,
}

impl DamageFlash {
    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }
}

/// Настройки lifecycle
#[derive(Resource, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct LifecycleSettings {
    /// Длительность вспышки урона (секунды)
    pub flash_duration: f32,
    /// Задержка деспавна трупа. None - труп остаётся (пулинг снаружи)
    pub despawn_delay: Option<f32>,
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self {
            flash_duration: 0.15,
            despawn_delay: Some(3.0),
        }
    }
}

fn emit_damage(
    outcome: DamageOutcome,
    target: Entity,
    source: Option<Entity>,
    flash: Option<Mut<DamageFlash>>,
    settings: &LifecycleSettings,
    damaged: &mut EventWriter<DamageDealt>,
    died: &mut EventWriter<EntityDied>,
) {
    let (dealt, remaining, killed) = match outcome {
        DamageOutcome::Ignored => return,
        DamageOutcome::Damaged { dealt, remaining } => (dealt, remaining, false),
        DamageOutcome::Killed { dealt } => (dealt, 0.0, true),
    };

    if let Some(mut flash) = flash {
        flash.remaining = settings.flash_duration;
    }

    damaged.write(DamageDealt {
        attacker: source,
        target,
        damage: dealt,
        remaining,
        target_died: killed,
    });

    if killed {
        died.write(EntityDied {
            entity: target,
            killer: source,
        });
        crate::logger::log_info(&format!("💀 Entity {:?} killed by {:?}", target, source));
    }
}

/// Система: DamageRequest → Health::take_damage → DamageDealt / EntityDied
pub fn apply_damage_requests(
    mut requests: EventReader<DamageRequest>,
    mut targets: Query<(&mut Health, Option<&mut DamageFlash>)>,
    settings: Res<LifecycleSettings>,
    mut damaged: EventWriter<DamageDealt>,
    mut died: EventWriter<EntityDied>,
) {
    for request in requests.read() {
        let Ok((mut health, flash)) = targets.get_mut(request.target) else {
            crate::log(&format!("DamageRequest: target {:?} is gone, ignored", request.target));
            continue;
        };

        let outcome = health.take_damage(request.amount);
        emit_damage(
            outcome,
            request.target,
            request.source,
            flash,
            &settings,
            &mut damaged,
            &mut died,
        );
    }
}

/// Система: KillRequest → Health::die (идемпотентно)
pub fn apply_kill_requests(
    mut requests: EventReader<KillRequest>,
    mut targets: Query<&mut Health>,
    mut died: EventWriter<EntityDied>,
) {
    for request in requests.read() {
        let Ok(mut health) = targets.get_mut(request.target) else {
            continue;
        };

        if health.die() {
            died.write(EntityDied {
                entity: request.target,
                killer: request.killer,
            });
            crate::logger::log_info(&format!("💀 Entity {:?} killed (direct)", request.target));
        }
    }
}

/// Система: HealRequest → Healed (только если health реально вырос)
pub fn apply_heal_requests(
    mut requests: EventReader<HealRequest>,
    mut targets: Query<&mut Health>,
    mut healed: EventWriter<Healed>,
) {
    for request in requests.read() {
        let Ok(mut health) = targets.get_mut(request.target) else {
            continue;
        };

        if let HealOutcome::Healed { amount, current } = health.heal(request.amount) {
            healed.write(Healed {
                entity: request.target,
                amount,
                current,
            });
        }
    }
}

/// Система: SetMaxHealthRequest → Health::set_max_health
pub fn apply_max_health_requests(
    mut requests: EventReader<SetMaxHealthRequest>,
    mut targets: Query<&mut Health>,
) {
    for request in requests.read() {
        if let Ok(mut health) = targets.get_mut(request.target) {
            health.set_max_health(request.max_health, request.proportional);
        }
    }
}

/// Система: ReviveRequest → EntityRevived
pub fn apply_revive_requests(
    mut requests: EventReader<ReviveRequest>,
    mut targets: Query<&mut Health>,
    mut revived: EventWriter<EntityRevived>,
) {
    for request in requests.read() {
        let Ok(mut health) = targets.get_mut(request.target) else {
            continue;
        };

        if health.revive(request.health_fraction) {
            revived.write(EntityRevived {
                entity: request.target,
                health: health.current(),
            });
            crate::logger::log_info(&format!(
                "✨ Entity {:?} revived with {:.1} HP",
                request.target,
                health.current()
            ));
        }
    }
}

/// Система: смерть → Dead маркер, остановка, отложенный деспавн
pub fn handle_death(
    mut commands: Commands,
    mut death_events: EventReader<EntityDied>,
    mut bodies: Query<(&mut Locomotion, &mut AnimationFlags)>,
    settings: Res<LifecycleSettings>,
    time: Res<Time>,
) {
    for event in death_events.read() {
        if let Ok((mut locomotion, mut animation)) = bodies.get_mut(event.entity) {
            locomotion.stop();
            *animation = AnimationFlags::default();
        }

        let Ok(mut entity_commands) = commands.get_entity(event.entity) else {
            continue;
        };
        entity_commands.try_insert(Dead);

        if let Some(delay) = settings.despawn_delay {
            entity_commands.try_insert(DespawnAfter {
                despawn_time: time.elapsed_secs() + delay,
            });
        }
    }
}

/// Система: revive → снять Dead и отменить деспавн
pub fn handle_revival(mut commands: Commands, mut revive_events: EventReader<EntityRevived>) {
    for event in revive_events.read() {
        if let Ok(mut entity_commands) = commands.get_entity(event.entity) {
            entity_commands.try_remove::<Dead>();
            entity_commands.try_remove::<DespawnAfter>();
        }
    }
}

/// Система: затухание DamageFlash
pub fn tick_damage_flash(mut flashes: Query<&mut DamageFlash>, time: Res<Time>) {
    let delta = time.delta_secs();

    for mut flash in flashes.iter_mut() {
        if flash.is_active() {
            flash.remaining = (flash.remaining - delta).max(0.0);
        }
    }
}

/// Система: деспавн entities с истёкшим DespawnAfter
pub fn despawn_after_timeout(
    mut commands: Commands,
    query: Query<(Entity, &DespawnAfter, &Health)>,
    time: Res<Time>,
) {
    let current_time = time.elapsed_secs();

    for (entity, despawn_after, health) in query.iter() {
        // Воскрешённый в этом же тике - не трогаем
        if health.is_alive() {
            continue;
        }
        if current_time >= despawn_after.despawn_time {
            crate::log(&format!("⚰️ Despawning entity {:?} (timeout)", entity));
            commands.entity(entity).try_despawn();
        }
    }
}
