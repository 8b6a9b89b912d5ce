//! Behavior systems: provocations, FSM transitions, boundary redirect, attack execution

use bevy::prelude::*;

use crate::ai::{
    BehaviorConfig, BehaviorPhase, BehaviorState, FlightConfig, FlightState, VerticalPhase,
    WanderConfig, WanderState,
};
use crate::boundary::BoundaryViolation;
use crate::combat::{
    AttackPerformed, Attacker, DamageDealt, DamageRequest, PlayerContact, TargetTracker,
};
use crate::components::Health;
use crate::movement::{horizontal_distance, AnimationFlags};
use crate::DeterministicRng;

/// Система: DamageDealt → sticky provoker record (Passive mode)
pub fn record_provocations(
    mut damage_events: EventReader<DamageDealt>,
    mut states: Query<&mut BehaviorState>,
) {
    for event in damage_events.read() {
        let Some(source) = event.attacker else {
            continue;
        };
        if source == event.target {
            continue;
        }
        let Ok(mut state) = states.get_mut(event.target) else {
            continue;
        };

        if state.record_provocation(source) {
            crate::log(&format!("⚠️ {:?} provoked by {:?}", event.target, source));
        }
    }
}

/// В радиусе атаки: наземные - по прямой, летающие - по горизонтали (высоту ведёт FlightState)
fn within_attack_range(position: Vec3, target: Vec3, range: f32, flying: bool) -> bool {
    if flying {
        horizontal_distance(position, target) <= range
    } else {
        position.distance(target) <= range
    }
}

/// Система: hostile FSM transitions
///
/// Порядок приоритетов:
/// 1. Disabled / player contact - FSM заморожен
/// 2. BoundaryRedirect - держится до истечения cooldown
/// 3. Attacking - коммит, пока цель валидна и в радиусе
/// 4. Выбор ближайшей разрешённой цели (каждый тик заново)
///
/// Flight variant дополнительно ведёт VerticalPhase:
/// Cruising → Descending (Approaching) → удар → Ascending → Cruising (Wandering).
pub fn behavior_transitions(
    mut hostiles: Query<(
        Entity,
        &mut BehaviorState,
        &BehaviorConfig,
        &TargetTracker,
        &mut Attacker,
        &Transform,
        &Health,
        &PlayerContact,
        Option<(&FlightConfig, &mut FlightState)>,
        Option<(&mut WanderState, &WanderConfig)>,
    )>,
    candidates: Query<(&Transform, &Health)>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time>,
) {
    let delta = time.delta_secs();
    let now = time.elapsed_secs();

    let lookup = |entity: Entity| {
        candidates
            .get(entity)
            .ok()
            .filter(|(_, health)| health.is_alive())
            .map(|(transform, _)| transform.translation)
    };

    for (
        entity,
        mut state,
        config,
        tracker,
        mut attacker,
        transform,
        health,
        contact,
        flight,
        wander,
    ) in hostiles.iter_mut()
    {
        if health.is_dead() || state.is_disabled() {
            continue;
        }

        // Player-in-hitbox short-circuit: решения принимают locomotion/attack системы
        if contact.player.and_then(lookup).is_some() {
            continue;
        }

        if state.phase() == BehaviorPhase::BoundaryRedirect {
            if state.tick_redirect(delta) {
                state.return_to_wander();
                crate::log(&format!("🧭 {:?} BoundaryRedirect → Wandering", entity));
            }
            continue;
        }

        let position = transform.translation;
        let mode = config.mode;
        let was_wandering = state.is_wandering();

        // Цель текущей фазы ещё валидна (жива и в трекере)?
        let committed = state
            .target()
            .filter(|target| tracker.contains(*target))
            .and_then(|target| lookup(target).map(|pos| (target, pos)));

        let closest = tracker
            .closest_valid_matching(position, lookup, |candidate| state.may_engage(mode, candidate))
            .and_then(|target| lookup(target).map(|pos| (target, pos)));

        match flight {
            None => {
                // Наземный вариант: Wandering ⇄ Attacking
                match state.phase() {
                    BehaviorPhase::Attacking => {
                        let still_valid = committed.is_some_and(|(_, pos)| {
                            within_attack_range(position, pos, attacker.range, false)
                        });
                        if !still_valid {
                            attacker.interrupt();
                            state.return_to_wander();
                            crate::log(&format!(
                                "🔄 {:?} Attacking → Wandering (target lost)",
                                entity
                            ));
                        }
                    }
                    _ => {
                        if let Some((target, pos)) = closest {
                            if within_attack_range(position, pos, attacker.range, false)
                                && attacker.cooldown_elapsed(now)
                            {
                                state.transition(BehaviorPhase::Attacking, Some(target));
                                crate::log(&format!(
                                    "⚔️ {:?} Wandering → Attacking (target {:?})",
                                    entity, target
                                ));
                            }
                        }
                    }
                }
            }
            Some((flight_config, mut flight_state)) => {
                let y = position.y;

                match (state.phase(), flight_state.vertical) {
                    (BehaviorPhase::Attacking, VerticalPhase::Ascending) => {
                        if flight_config.reached(y, flight_config.cruise_y()) {
                            state.return_to_wander();
                            flight_state.set_vertical(VerticalPhase::Cruising);
                            crate::log(&format!("🪽 {:?} back at cruise altitude → Wandering", entity));
                        }
                    }
                    (BehaviorPhase::Attacking, _) => match committed {
                        Some((target, pos)) => {
                            if !within_attack_range(position, pos, attacker.range, true) {
                                state.transition(BehaviorPhase::Approaching, Some(target));
                                flight_state.set_vertical(VerticalPhase::Descending);
                            }
                        }
                        None => {
                            attacker.interrupt();
                            state.return_to_wander();
                            flight_state.set_vertical(VerticalPhase::Ascending);
                            crate::log(&format!("🔄 {:?} Attacking → Wandering (target lost)", entity));
                        }
                    },
                    (BehaviorPhase::Approaching, _) => match closest {
                        Some((target, pos)) => {
                            if state.target() != Some(target) {
                                state.transition(BehaviorPhase::Approaching, Some(target));
                            }
                            let hovering = flight_config.reached(y, flight_config.hover_y(pos));
                            if hovering && within_attack_range(position, pos, attacker.range, true) {
                                state.transition(BehaviorPhase::Attacking, Some(target));
                                crate::log(&format!(
                                    "⚔️ {:?} Approaching → Attacking (target {:?})",
                                    entity, target
                                ));
                            }
                        }
                        None => {
                            state.return_to_wander();
                            flight_state.set_vertical(VerticalPhase::Ascending);
                            crate::log(&format!("🔄 {:?} Approaching → Wandering (target lost)", entity));
                        }
                    },
                    _ => {
                        if let Some((target, _)) = closest {
                            state.transition(BehaviorPhase::Approaching, Some(target));
                            flight_state.set_vertical(VerticalPhase::Descending);
                            crate::log(&format!(
                                "🦅 {:?} Wandering → Approaching (target {:?})",
                                entity, target
                            ));
                        } else if flight_state.vertical != VerticalPhase::Cruising
                            && flight_config.reached(y, flight_config.cruise_y())
                        {
                            flight_state.set_vertical(VerticalPhase::Cruising);
                        } else if flight_state.vertical == VerticalPhase::Descending {
                            flight_state.set_vertical(VerticalPhase::Ascending);
                        }
                    }
                }
            }
        }

        // Вход в бой обрывает цикл блуждания (waypoint и таймеры)
        if was_wandering && !state.is_wandering() {
            if let Some((mut wander, wander_config)) = wander {
                wander.interrupt(wander_config, &mut rng.rng);
            }
        }
    }
}

/// Система: BoundaryViolation → BoundaryRedirect + inward waypoint
///
/// Attacking/Approaching не прерываются (бой коммитится), позиция уже скорректирована.
pub fn apply_boundary_violations(
    mut violations: EventReader<BoundaryViolation>,
    mut actors: Query<(
        &Transform,
        Option<(&mut BehaviorState, &BehaviorConfig)>,
        Option<(&mut WanderState, &WanderConfig)>,
    )>,
    mut rng: ResMut<DeterministicRng>,
) {
    for violation in violations.read() {
        let Ok((transform, behavior, wander)) = actors.get_mut(violation.entity) else {
            continue;
        };

        if let Some((mut state, config)) = behavior {
            if !state.is_wandering() {
                continue;
            }
            state.begin_redirect(config.redirect_duration);
            crate::log(&format!("🧭 {:?} → BoundaryRedirect", violation.entity));
        }

        if let Some((mut wander, wander_config)) = wander {
            wander.force_inward_waypoint(
                transform.translation,
                violation.inward,
                wander_config,
                &mut rng.rng,
            );
        }
    }
}

/// Система: исполнение атаки (один удар на cooldown окно)
///
/// Цель: игрок в контакте (если режим разрешает) либо цель фазы Attacking.
/// Flight variant после удара уходит в Ascending.
pub fn behavior_attack_execution(
    mut hostiles: Query<(
        Entity,
        &BehaviorState,
        &BehaviorConfig,
        &mut Attacker,
        &Health,
        &PlayerContact,
        &mut AnimationFlags,
        Option<&mut FlightState>,
    )>,
    candidates: Query<&Health>,
    time: Res<Time>,
    mut performed: EventWriter<AttackPerformed>,
    mut damage_requests: EventWriter<DamageRequest>,
) {
    let now = time.elapsed_secs();
    let alive = |entity: Entity| candidates.get(entity).is_ok_and(|health| health.is_alive());

    for (entity, state, config, mut attacker, health, contact, mut animation, flight) in
        hostiles.iter_mut()
    {
        if health.is_dead() || state.is_disabled() {
            if animation.attacking {
                animation.attacking = false;
            }
            continue;
        }

        let ascending = flight
            .as_ref()
            .is_some_and(|flight| flight.vertical == VerticalPhase::Ascending);

        let target = match contact.player.filter(|player| alive(*player)) {
            Some(player) => Some(player).filter(|player| state.may_engage(config.mode, *player)),
            None if state.phase() == BehaviorPhase::Attacking && !ascending => {
                state.target().filter(|target| alive(*target))
            }
            None => None,
        };

        let engaged = target.is_some();
        if animation.attacking != engaged {
            animation.attacking = engaged;
        }

        let Some(target) = target else {
            continue;
        };
        if !attacker.can_attack(now) {
            continue;
        }

        attacker.record_attack(now);
        performed.write(AttackPerformed {
            attacker: entity,
            target,
            damage: attacker.damage,
        });
        damage_requests.write(DamageRequest {
            target,
            amount: attacker.damage,
            source: Some(entity),
        });
        crate::log(&format!(
            "🗡️ {:?} attacks {:?} for {:.1}",
            entity, target, attacker.damage
        ));

        if state.phase() == BehaviorPhase::Attacking {
            if let Some(mut flight) = flight {
                flight.set_vertical(VerticalPhase::Ascending);
            }
        }
    }
}
