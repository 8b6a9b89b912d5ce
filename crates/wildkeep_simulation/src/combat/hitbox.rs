//! Hitbox / TargetTracker - кто в радиусе обнаружения
//!
//! Архитектура:
//! - Hitbox: сфера тела актора (радиус)
//! - TargetTracker: набор кандидатов в detection радиусе (weak refs, порядок обнаружения)
//! - Маска категорий: CollisionGroups (memberships = кто я, filters = кого трекаю)
//! - detect_* системы генерируют enter/exit события (headless),
//!   движок может писать те же события из своих trigger callbacks
//!
//! Tracker чисто advisory - сам бой не запускает.

use bevy::prelude::*;
use bevy_rapier3d::prelude::CollisionGroups;

use crate::combat::EntityDied;
use crate::components::{Actor, Health};

/// Сфера тела актора (метры)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Hitbox {
    pub radius: f32,
}

impl Default for Hitbox {
    fn default() -> Self {
        Self { radius: 0.5 }
    }
}

/// Набор целей в радиусе обнаружения
///
/// Инвариант: мертвые entities удаляются в тот же тик, в котором умерли
/// (purge_dead_targets), плюс lazy-фильтр при запросе.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct TargetTracker {
    pub detection_radius: f32,
    /// Порядок = порядок обнаружения (tie-break для closest)
    in_range: Vec<Entity>,
    /// Кандидаты, по которым ушёл PlayerSpotted (ждут парный PlayerLost)
    spotted_players: Vec<Entity>,
}

impl Default for TargetTracker {
    fn default() -> Self {
        Self::new(8.0)
    }
}

impl TargetTracker {
    pub fn new(detection_radius: f32) -> Self {
        Self {
            detection_radius,
            in_range: Vec::new(),
            spotted_players: Vec::new(),
        }
    }

    pub fn in_range(&self) -> &[Entity] {
        &self.in_range
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.in_range.contains(&entity)
    }

    /// true если кандидат новый
    pub fn insert(&mut self, entity: Entity) -> bool {
        if self.contains(entity) {
            return false;
        }
        self.in_range.push(entity);
        true
    }

    /// Как insert, но помечает кандидата как игрока
    pub fn insert_player(&mut self, entity: Entity) -> bool {
        if !self.insert(entity) {
            return false;
        }
        self.spotted_players.push(entity);
        true
    }

    /// Игрок в наборе, и по нему уже был PlayerSpotted
    pub fn is_spotted_player(&self, entity: Entity) -> bool {
        self.spotted_players.contains(&entity)
    }

    pub fn spotted_players(&self) -> &[Entity] {
        &self.spotted_players
    }

    /// true если кандидат был в наборе
    pub fn remove(&mut self, entity: Entity) -> bool {
        self.spotted_players.retain(|&e| e != entity);
        let before = self.in_range.len();
        self.in_range.retain(|&e| e != entity);
        self.in_range.len() != before
    }

    pub fn clear(&mut self) {
        self.in_range.clear();
        self.spotted_players.clear();
    }

    pub fn has_targets_in_range(&self) -> bool {
        !self.in_range.is_empty()
    }

    /// Ближайший валидный кандидат
    ///
    /// `lookup` возвращает позицию живого кандидата или None (мертв/despawned).
    /// При равной дистанции побеждает обнаруженный раньше.
    pub fn closest_valid_target(
        &self,
        origin: Vec3,
        lookup: impl Fn(Entity) -> Option<Vec3>,
    ) -> Option<Entity> {
        self.closest_valid_matching(origin, lookup, |_| true)
    }

    /// Как closest_valid_target, но только среди кандидатов прошедших `accept`
    pub fn closest_valid_matching(
        &self,
        origin: Vec3,
        lookup: impl Fn(Entity) -> Option<Vec3>,
        accept: impl Fn(Entity) -> bool,
    ) -> Option<Entity> {
        let mut best: Option<(Entity, f32)> = None;

        for &candidate in &self.in_range {
            if !accept(candidate) {
                continue;
            }
            let Some(position) = lookup(candidate) else {
                continue;
            };

            let distance = origin.distance(position);
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((candidate, distance)),
            }
        }

        best.map(|(entity, _)| entity)
    }
}

/// Контакт hitbox игрока с этим актором (отдельно от generic detection)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct PlayerContact {
    pub player: Option<Entity>,
}

/// Spatial overlap callbacks (enter/exit detection радиуса)
#[derive(Event, Debug, Clone, PartialEq)]
pub enum OverlapEvent {
    Entered { observer: Entity, target: Entity },
    Exited { observer: Entity, target: Entity },
}

/// Hitbox игрока коснулся / перестал касаться актора
#[derive(Event, Debug, Clone, PartialEq)]
pub enum PlayerContactEvent {
    Began { entity: Entity, player: Entity },
    Ended { entity: Entity, player: Entity },
}

/// Отдельное уведомление: игрок вошёл в радиус обнаружения (auto-engage)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct PlayerSpotted {
    pub observer: Entity,
    pub player: Entity,
}

/// Игрок вышел из радиуса обнаружения
#[derive(Event, Debug, Clone, PartialEq)]
pub struct PlayerLost {
    pub observer: Entity,
    pub player: Entity,
}

fn mask_matches(observer: &CollisionGroups, candidate: &CollisionGroups) -> bool {
    observer.filters.intersects(candidate.memberships)
}

/// Система: геометрия → OverlapEvent (headless замена trigger callbacks)
///
/// Сравнивает фактическое перекрытие сфер с текущим набором трекера.
pub fn detect_overlaps(
    trackers: Query<(Entity, &Transform, &TargetTracker, &CollisionGroups, &Health)>,
    candidates: Query<(Entity, &Transform, &Hitbox, &CollisionGroups, &Health), With<Actor>>,
    mut overlap_events: EventWriter<OverlapEvent>,
) {
    for (observer, transform, tracker, observer_groups, observer_health) in trackers.iter() {
        if observer_health.is_dead() {
            continue;
        }

        for (candidate, candidate_transform, hitbox, candidate_groups, candidate_health) in
            candidates.iter()
        {
            if candidate == observer || !mask_matches(observer_groups, candidate_groups) {
                continue;
            }

            let distance = transform.translation.distance(candidate_transform.translation);
            let overlapping =
                candidate_health.is_alive() && distance <= tracker.detection_radius + hitbox.radius;
            let tracked = tracker.contains(candidate);

            if overlapping && !tracked {
                overlap_events.write(OverlapEvent::Entered { observer, target: candidate });
            } else if !overlapping && tracked {
                overlap_events.write(OverlapEvent::Exited { observer, target: candidate });
            }
        }

        // Despawned кандидаты не попадают в query - выписываем их отдельно
        for &tracked in tracker.in_range() {
            if candidates.get(tracked).is_err() {
                overlap_events.write(OverlapEvent::Exited { observer, target: tracked });
            }
        }
    }
}

/// Система: OverlapEvent → TargetTracker (единственный writer набора)
///
/// Фильтр по маске повторяется здесь: события может писать и движок.
pub fn apply_overlap_events(
    mut overlap_events: EventReader<OverlapEvent>,
    mut trackers: Query<(&mut TargetTracker, &CollisionGroups)>,
    candidates: Query<(&Actor, &CollisionGroups, &Health)>,
    mut spotted: EventWriter<PlayerSpotted>,
    mut lost: EventWriter<PlayerLost>,
) {
    for event in overlap_events.read() {
        match *event {
            OverlapEvent::Entered { observer, target } => {
                let Ok((mut tracker, observer_groups)) = trackers.get_mut(observer) else {
                    continue;
                };
                let Ok((actor, candidate_groups, health)) = candidates.get(target) else {
                    continue;
                };
                if target == observer
                    || health.is_dead()
                    || !mask_matches(observer_groups, candidate_groups)
                {
                    continue;
                }

                let is_player = actor.is_player();
                let inserted = if is_player {
                    tracker.insert_player(target)
                } else {
                    tracker.insert(target)
                };

                if inserted {
                    crate::log(&format!("👁️ {:?} detected {:?}", observer, target));
                    if is_player {
                        spotted.write(PlayerSpotted { observer, player: target });
                    }
                }
            }
            OverlapEvent::Exited { observer, target } => {
                let Ok((mut tracker, _)) = trackers.get_mut(observer) else {
                    continue;
                };

                // Кандидат мог быть уже despawned: флаг берём из трекера
                let was_player = tracker.is_spotted_player(target);
                if tracker.remove(target) {
                    crate::log(&format!("👻 {:?} lost {:?}", observer, target));
                    if was_player {
                        lost.write(PlayerLost { observer, player: target });
                    }
                }
            }
        }
    }
}

/// Система: hitbox игрока vs hitbox актора → PlayerContactEvent
pub fn detect_player_contacts(
    actors: Query<(Entity, &Actor, &Transform, &Hitbox, &Health)>,
    contacts: Query<(Entity, &Transform, &Hitbox, &PlayerContact, &Health)>,
    mut contact_events: EventWriter<PlayerContactEvent>,
) {
    let players: Vec<(Entity, Vec3, f32)> = actors
        .iter()
        .filter(|(_, actor, _, _, health)| actor.is_player() && health.is_alive())
        .map(|(entity, _, transform, hitbox, _)| (entity, transform.translation, hitbox.radius))
        .collect();

    for (entity, transform, hitbox, contact, health) in contacts.iter() {
        let touching = if health.is_alive() {
            players
                .iter()
                .find(|(player, position, radius)| {
                    *player != entity
                        && transform.translation.distance(*position) <= hitbox.radius + radius
                })
                .map(|(player, _, _)| *player)
        } else {
            None
        };

        if touching == contact.player {
            continue;
        }

        if let Some(previous) = contact.player {
            contact_events.write(PlayerContactEvent::Ended { entity, player: previous });
        }
        if let Some(player) = touching {
            contact_events.write(PlayerContactEvent::Began { entity, player });
        }
    }
}

/// Система: PlayerContactEvent → PlayerContact компонент
pub fn apply_player_contacts(
    mut contact_events: EventReader<PlayerContactEvent>,
    mut contacts: Query<&mut PlayerContact>,
) {
    for event in contact_events.read() {
        match *event {
            PlayerContactEvent::Began { entity, player } => {
                if let Ok(mut contact) = contacts.get_mut(entity) {
                    contact.player = Some(player);
                    crate::log(&format!("🤜 Player {:?} touched {:?}", player, entity));
                }
            }
            PlayerContactEvent::Ended { entity, player } => {
                if let Ok(mut contact) = contacts.get_mut(entity) {
                    if contact.player == Some(player) {
                        contact.player = None;
                    }
                }
            }
        }
    }
}

/// Система: очистка мертвых из всех трекеров в тике смерти
///
/// VisionCone-подобные триггеры не шлют exit при смерти - чистим сами.
/// Каждый ранее отправленный PlayerSpotted закрывается парным PlayerLost.
pub fn purge_dead_targets(
    mut death_events: EventReader<EntityDied>,
    mut trackers: Query<(Entity, &mut TargetTracker)>,
    mut contacts: Query<&mut PlayerContact>,
    mut lost: EventWriter<PlayerLost>,
) {
    let dead: Vec<Entity> = death_events.read().map(|event| event.entity).collect();
    if dead.is_empty() {
        return;
    }

    for (observer, mut tracker) in trackers.iter_mut() {
        let lost_players: Vec<Entity> = if dead.contains(&observer) {
            // Умерший сам больше ничего не трекает
            let players = tracker.spotted_players().to_vec();
            tracker.clear();
            players
        } else {
            dead.iter()
                .copied()
                .filter(|&entity| {
                    let was_player = tracker.is_spotted_player(entity);
                    tracker.remove(entity) && was_player
                })
                .collect()
        };

        for player in lost_players {
            crate::log(&format!("👻 {:?} lost {:?} (death)", observer, player));
            lost.write(PlayerLost { observer, player });
        }
    }

    for mut contact in contacts.iter_mut() {
        if contact.player.is_some_and(|player| dead.contains(&player)) {
            contact.player = None;
        }
    }

    for entity in &dead {
        if let Ok(mut contact) = contacts.get_mut(*entity) {
            contact.player = None;
        }
    }
}
