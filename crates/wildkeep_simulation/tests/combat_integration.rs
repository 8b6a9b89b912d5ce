//! Combat integration test
//!
//! Headless App + ManualDuration (ровно один FixedUpdate тик на update).
//!
//! Проверяем:
//! - Health сценарии (damaged/died ровно один раз)
//! - Aggressive: Wandering → Attacking в тике обнаружения
//! - Cooldown окна между атаками
//! - Passive/UltraPassive политика
//! - Смерть → деспавн, revive отменяет деспавн
//! - Heal / SetMaxHealth через request события
//! - PlayerSpotted всегда закрывается парным PlayerLost

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use wildkeep_simulation::ai::WanderPhase;
use wildkeep_simulation::combat::{
    AttackPerformed, HealRequest, KillRequest, PlayerLost, PlayerSpotted, ReviveRequest,
    SetMaxHealthRequest,
};
use wildkeep_simulation::*;

/// Записанные за прогон события
#[derive(Resource, Default)]
struct Recorded {
    damaged: Vec<DamageDealt>,
    died: Vec<EntityDied>,
    healed: Vec<Healed>,
    spotted: Vec<PlayerSpotted>,
    lost: Vec<PlayerLost>,
    attacks: Vec<(Entity, Entity, f32)>,
}

fn record_events(
    mut recorded: ResMut<Recorded>,
    mut damaged: EventReader<DamageDealt>,
    mut died: EventReader<EntityDied>,
    mut healed: EventReader<Healed>,
    mut spotted: EventReader<PlayerSpotted>,
    mut lost: EventReader<PlayerLost>,
    mut attacks: EventReader<AttackPerformed>,
    time: Res<Time>,
) {
    recorded.damaged.extend(damaged.read().cloned());
    recorded.died.extend(died.read().cloned());
    recorded.healed.extend(healed.read().cloned());
    recorded.spotted.extend(spotted.read().cloned());
    recorded.lost.extend(lost.read().cloned());
    let now = time.elapsed_secs();
    recorded
        .attacks
        .extend(attacks.read().map(|event| (event.attacker, event.target, now)));
}

/// Helper: полный App симуляции с записью событий
fn create_combat_app(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin::default())
        .insert_resource(TimeUpdateStrategy::ManualDuration(FIXED_TICK))
        .init_resource::<Recorded>()
        .add_systems(FixedUpdate, record_events.in_set(SimulationSet::Reactions));
    app
}

fn run_ticks(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        app.update();
    }
}

fn spawn(app: &mut App, config: &ActorConfig, position: Vec3) -> Entity {
    spawn_actor(app.world_mut(), config, position, None).unwrap()
}

fn health(app: &App, entity: Entity) -> Health {
    *app.world().get::<Health>(entity).unwrap()
}

fn phase(app: &App, entity: Entity) -> BehaviorPhase {
    app.world().get::<BehaviorState>(entity).unwrap().phase()
}

fn attacks_by(app: &App, attacker: Entity) -> Vec<f32> {
    app.world()
        .resource::<Recorded>()
        .attacks
        .iter()
        .filter(|(entity, _, _)| *entity == attacker)
        .map(|(_, _, at)| *at)
        .collect()
}

/// Неподвижная цель: без wander, стоит на месте
fn dummy_player() -> ActorConfig {
    ActorConfig {
        max_health: 1000.0,
        ..ActorConfig::player()
    }
}

#[test]
fn test_damage_scenario_fires_each_event_once() {
    let mut app = create_combat_app(42);
    let player = spawn(&mut app, &ActorConfig::player(), Vec3::ZERO);
    run_ticks(&mut app, 2);

    app.world_mut().send_event(DamageRequest {
        target: player,
        amount: 40.0,
        source: None,
    });
    run_ticks(&mut app, 1);

    assert_eq!(health(&app, player).current(), 60.0);
    assert_eq!(app.world().resource::<Recorded>().damaged.len(), 1);

    app.world_mut().send_event(DamageRequest {
        target: player,
        amount: 70.0,
        source: None,
    });
    run_ticks(&mut app, 1);

    assert_eq!(health(&app, player).current(), 0.0);
    assert!(health(&app, player).is_dead());

    // Третий удар по трупу - ничего
    app.world_mut().send_event(DamageRequest {
        target: player,
        amount: 10.0,
        source: None,
    });
    run_ticks(&mut app, 2);

    let recorded = app.world().resource::<Recorded>();
    assert_eq!(recorded.died.len(), 1);
    assert_eq!(recorded.damaged.len(), 2);
    assert!(recorded.damaged[1].target_died);
    assert!(app.world().get::<Dead>(player).is_some());
}

#[test]
fn test_aggressive_attacks_in_acquisition_tick() {
    let mut app = create_combat_app(42);
    let player = spawn(&mut app, &dummy_player(), Vec3::new(1.5, 0.0, 0.0));
    let hostile = spawn(&mut app, &ActorConfig::hostile(BehaviorMode::Aggressive), Vec3::ZERO);

    let mut acquired = false;
    for _ in 0..5 {
        app.update();
        let tracker = app.world().get::<TargetTracker>(hostile).unwrap();
        if tracker.contains(player) {
            acquired = true;
            break;
        }
    }

    assert!(acquired, "hostile never detected the player");
    assert_eq!(phase(&app, hostile), BehaviorPhase::Attacking);
    assert_eq!(app.world().get::<BehaviorState>(hostile).unwrap().target(), Some(player));
    assert_eq!(attacks_by(&app, hostile).len(), 1);
    assert!(app.world().get::<combat::PlayerContact>(hostile).unwrap().player.is_none());
}

#[test]
fn test_attacks_respect_cooldown() {
    let mut app = create_combat_app(42);
    let _player = spawn(&mut app, &dummy_player(), Vec3::new(1.5, 0.0, 0.0));
    let hostile = spawn(&mut app, &ActorConfig::hostile(BehaviorMode::Aggressive), Vec3::ZERO);

    run_ticks(&mut app, 330); // ~5.5 секунд

    let cooldown = app.world().get::<Attacker>(hostile).unwrap().cooldown;
    let attacks = attacks_by(&app, hostile);

    assert!(attacks.len() >= 5, "only {} attacks", attacks.len());
    for pair in attacks.windows(2) {
        assert!(
            pair[1] - pair[0] >= cooldown,
            "attacks at {} and {} closer than cooldown {}",
            pair[0],
            pair[1],
            cooldown
        );
    }
}

#[test]
fn test_passive_attacks_only_after_provocation() {
    let mut app = create_combat_app(42);
    let player = spawn(&mut app, &dummy_player(), Vec3::new(1.5, 0.0, 0.0));
    let hostile = spawn(&mut app, &ActorConfig::hostile(BehaviorMode::Passive), Vec3::ZERO);

    run_ticks(&mut app, 120);
    assert!(attacks_by(&app, hostile).is_empty());
    assert_eq!(phase(&app, hostile), BehaviorPhase::Wandering);

    // Игрок бьёт первым
    app.world_mut().send_event(DamageRequest {
        target: hostile,
        amount: 5.0,
        source: Some(player),
    });
    run_ticks(&mut app, 3);

    assert!(app
        .world()
        .get::<BehaviorState>(hostile)
        .unwrap()
        .was_provoked_by(player));

    // Wander мог увести hostile - возвращаем в радиус атаки
    app.world_mut().get_mut::<Transform>(hostile).unwrap().translation = Vec3::ZERO;
    run_ticks(&mut app, 3);

    let attacks = app.world().resource::<Recorded>().attacks.clone();
    assert!(attacks
        .iter()
        .any(|(attacker, target, _)| *attacker == hostile && *target == player));
}

#[test]
fn test_ultra_passive_never_attacks() {
    let mut app = create_combat_app(42);
    let player = spawn(&mut app, &dummy_player(), Vec3::new(1.5, 0.0, 0.0));
    let hostile = spawn(&mut app, &ActorConfig::hostile(BehaviorMode::UltraPassive), Vec3::ZERO);

    run_ticks(&mut app, 5);
    app.world_mut().send_event(DamageRequest {
        target: hostile,
        amount: 5.0,
        source: Some(player),
    });

    for _ in 0..200 {
        app.update();
        // Держим в радиусе атаки и в контакте, провокация есть - всё равно не атакует
        app.world_mut().get_mut::<Transform>(hostile).unwrap().translation =
            Vec3::new(0.8, 0.0, 0.0);
    }

    assert!(attacks_by(&app, hostile).is_empty());
    assert!(app
        .world()
        .get::<BehaviorState>(hostile)
        .unwrap()
        .was_provoked_by(player));
}

#[test]
fn test_player_contact_freezes_movement() {
    let mut app = create_combat_app(42);
    let player = spawn(&mut app, &dummy_player(), Vec3::new(0.8, 0.0, 0.0));
    let hostile = spawn(&mut app, &ActorConfig::hostile(BehaviorMode::Passive), Vec3::ZERO);

    // Разворот к игроку в тике контакта, без ограничения угловой скорости
    run_ticks(&mut app, 1);
    let forward = app.world().get::<Transform>(hostile).unwrap().forward().as_vec3();
    assert!(forward.dot(Vec3::X) > 0.999, "forward = {:?}", forward);

    run_ticks(&mut app, 59);

    let contact = app.world().get::<combat::PlayerContact>(hostile).unwrap();
    assert_eq!(contact.player, Some(player));

    // Unprovoked Passive: разворот на месте, без атаки
    let locomotion = app.world().get::<Locomotion>(hostile).unwrap();
    assert_eq!(locomotion.velocity, Vec3::ZERO);
    assert!(attacks_by(&app, hostile).is_empty());

    let forward = app.world().get::<Transform>(hostile).unwrap().forward().as_vec3();
    assert!(forward.dot(Vec3::X) > 0.99, "forward = {:?}", forward);
}

#[test]
fn test_dead_hostile_despawns_after_delay() {
    let mut app = create_combat_app(42);
    let hostile = spawn(&mut app, &ActorConfig::hostile(BehaviorMode::Aggressive), Vec3::ZERO);
    run_ticks(&mut app, 2);

    app.world_mut().send_event(KillRequest {
        target: hostile,
        killer: None,
    });
    run_ticks(&mut app, 1);

    assert_eq!(phase(&app, hostile), BehaviorPhase::Disabled);
    assert!(app.world().get::<DespawnAfter>(hostile).is_some());

    run_ticks(&mut app, 200); // > 3 секунд
    assert!(app.world().get_entity(hostile).is_err());
}

#[test]
fn test_revive_cancels_despawn() {
    let mut app = create_combat_app(42);
    let hostile = spawn(&mut app, &ActorConfig::hostile(BehaviorMode::Aggressive), Vec3::ZERO);
    run_ticks(&mut app, 2);

    app.world_mut().send_event(KillRequest {
        target: hostile,
        killer: None,
    });
    run_ticks(&mut app, 30);

    app.world_mut().send_event(ReviveRequest {
        target: hostile,
        health_fraction: 0.5,
    });
    run_ticks(&mut app, 1);

    assert!(health(&app, hostile).is_alive());
    assert_eq!(health(&app, hostile).current(), 25.0);
    assert_eq!(phase(&app, hostile), BehaviorPhase::Wandering);
    assert!(app.world().get::<Dead>(hostile).is_none());
    assert!(app.world().get::<DespawnAfter>(hostile).is_none());

    run_ticks(&mut app, 240);
    assert!(app.world().get_entity(hostile).is_ok());
}

#[test]
fn test_target_death_ends_attack() {
    let mut app = create_combat_app(42);
    let player = spawn(&mut app, &dummy_player(), Vec3::new(1.5, 0.0, 0.0));
    let hostile = spawn(&mut app, &ActorConfig::hostile(BehaviorMode::Aggressive), Vec3::ZERO);

    run_ticks(&mut app, 3);
    assert_eq!(phase(&app, hostile), BehaviorPhase::Attacking);

    app.world_mut().send_event(KillRequest {
        target: player,
        killer: Some(hostile),
    });
    run_ticks(&mut app, 1);

    // Purge в тике смерти
    let tracker = app.world().get::<TargetTracker>(hostile).unwrap();
    assert!(!tracker.contains(player));

    run_ticks(&mut app, 1);
    assert_eq!(phase(&app, hostile), BehaviorPhase::Wandering);
    let attacks_before = attacks_by(&app, hostile).len();

    run_ticks(&mut app, 120);
    assert_eq!(attacks_by(&app, hostile).len(), attacks_before);
}

#[test]
fn test_heal_fires_only_when_health_grows() {
    let mut app = create_combat_app(42);
    let player = spawn(&mut app, &ActorConfig::player(), Vec3::ZERO);
    run_ticks(&mut app, 2);

    app.world_mut().send_event(DamageRequest {
        target: player,
        amount: 30.0,
        source: None,
    });
    run_ticks(&mut app, 1);

    for amount in [10.0, 50.0, 5.0, 0.0] {
        app.world_mut().send_event(HealRequest {
            target: player,
            amount,
        });
        run_ticks(&mut app, 1);
    }

    // 70 → 80 → 100 (cap), дальше health не растёт
    assert_eq!(health(&app, player).current(), 100.0);
    let healed = &app.world().resource::<Recorded>().healed;
    assert_eq!(healed.len(), 2);
    assert_eq!((healed[0].amount, healed[0].current), (10.0, 80.0));
    assert_eq!((healed[1].amount, healed[1].current), (20.0, 100.0));

    // Мёртвых не лечим
    app.world_mut().send_event(KillRequest {
        target: player,
        killer: None,
    });
    run_ticks(&mut app, 1);
    app.world_mut().send_event(HealRequest {
        target: player,
        amount: 40.0,
    });
    run_ticks(&mut app, 1);

    assert_eq!(health(&app, player).current(), 0.0);
    assert_eq!(app.world().resource::<Recorded>().healed.len(), 2);
}

#[test]
fn test_set_max_health_request() {
    let mut app = create_combat_app(42);
    let player = spawn(&mut app, &ActorConfig::player(), Vec3::ZERO);
    run_ticks(&mut app, 2);

    app.world_mut().send_event(DamageRequest {
        target: player,
        amount: 50.0,
        source: None,
    });
    run_ticks(&mut app, 1);

    // Пропорционально: 50/100 → 100/200
    app.world_mut().send_event(SetMaxHealthRequest {
        target: player,
        max_health: 200.0,
        proportional: true,
    });
    run_ticks(&mut app, 1);
    assert_eq!(health(&app, player).max(), 200.0);
    assert_eq!(health(&app, player).current(), 100.0);

    // Без пропорции: current клампится к новому max
    app.world_mut().send_event(SetMaxHealthRequest {
        target: player,
        max_health: 80.0,
        proportional: false,
    });
    run_ticks(&mut app, 1);
    assert_eq!(health(&app, player).max(), 80.0);
    assert_eq!(health(&app, player).current(), 80.0);

    let recorded = app.world().resource::<Recorded>();
    assert!(recorded.healed.is_empty());
    assert!(recorded.died.is_empty());
}

#[test]
fn test_attacking_stays_committed_to_target() {
    let mut app = create_combat_app(42);
    let player = spawn(&mut app, &dummy_player(), Vec3::new(1.5, 0.0, 0.0));
    let hostile = spawn(&mut app, &ActorConfig::hostile(BehaviorMode::Aggressive), Vec3::ZERO);

    run_ticks(&mut app, 3);
    assert_eq!(phase(&app, hostile), BehaviorPhase::Attacking);

    // Ближе игрока появляется ally - атака не переключается
    let ally = spawn(&mut app, &ActorConfig::ally(0), Vec3::new(-0.5, 0.0, 0.0));
    run_ticks(&mut app, 120);

    assert!(app.world().get::<TargetTracker>(hostile).unwrap().contains(ally));
    assert_eq!(phase(&app, hostile), BehaviorPhase::Attacking);
    assert_eq!(app.world().get::<BehaviorState>(hostile).unwrap().target(), Some(player));

    let attacks = app.world().resource::<Recorded>().attacks.clone();
    assert!(attacks.len() >= 2);
    assert!(attacks
        .iter()
        .all(|(attacker, target, _)| *attacker == hostile && *target == player));
}

#[test]
fn test_engagement_and_death_reset_wander_cycle() {
    let mut app = create_combat_app(42);
    let hostile = spawn(&mut app, &ActorConfig::hostile(BehaviorMode::Aggressive), Vec3::ZERO);

    let mid_walk = WanderState {
        phase: WanderPhase::Moving,
        waypoint: Some(Vec3::new(0.0, 0.0, -8.0)),
        elapsed: 2.0,
        wait_duration: 0.0,
        stuck_timer: 2.0,
        probe_timer: 0.3,
    };
    app.world_mut().entity_mut(hostile).insert(mid_walk);
    let _player = spawn(&mut app, &dummy_player(), Vec3::new(1.5, 0.0, 0.0));

    run_ticks(&mut app, 1);
    assert_eq!(phase(&app, hostile), BehaviorPhase::Attacking);

    let config = *app.world().get::<WanderConfig>(hostile).unwrap();
    let wander = *app.world().get::<WanderState>(hostile).unwrap();
    assert_eq!(wander.phase, WanderPhase::Waiting);
    assert_eq!(wander.waypoint, None);
    assert_eq!((wander.elapsed, wander.stuck_timer, wander.probe_timer), (0.0, 0.0, 0.0));
    assert!(wander.wait_duration >= config.min_wait && wander.wait_duration <= config.max_wait);

    // Смерть тоже обрывает цикл
    app.world_mut().entity_mut(hostile).insert(mid_walk);
    app.world_mut().send_event(KillRequest {
        target: hostile,
        killer: None,
    });
    run_ticks(&mut app, 1);

    let wander = *app.world().get::<WanderState>(hostile).unwrap();
    assert_eq!(phase(&app, hostile), BehaviorPhase::Disabled);
    assert_eq!(wander.phase, WanderPhase::Waiting);
    assert_eq!(wander.waypoint, None);
    assert_eq!(wander.stuck_timer, 0.0);
}

fn spotted_lost_counts(app: &App) -> (usize, usize) {
    let recorded = app.world().resource::<Recorded>();
    (recorded.spotted.len(), recorded.lost.len())
}

#[test]
fn test_player_death_closes_spotted_with_lost() {
    let mut app = create_combat_app(42);
    let player = spawn(&mut app, &dummy_player(), Vec3::new(5.0, 0.0, 0.0));
    let hostile = spawn(&mut app, &ActorConfig::hostile(BehaviorMode::UltraPassive), Vec3::ZERO);

    run_ticks(&mut app, 3);
    assert_eq!(spotted_lost_counts(&app), (1, 0));

    app.world_mut().send_event(KillRequest {
        target: player,
        killer: None,
    });
    run_ticks(&mut app, 5);

    assert_eq!(spotted_lost_counts(&app), (1, 1));
    let lost = &app.world().resource::<Recorded>().lost[0];
    assert_eq!((lost.observer, lost.player), (hostile, player));
    assert!(!app.world().get::<TargetTracker>(hostile).unwrap().contains(player));
}

#[test]
fn test_player_despawn_closes_spotted_with_lost() {
    let mut app = create_combat_app(42);
    let player = spawn(&mut app, &dummy_player(), Vec3::new(5.0, 0.0, 0.0));
    let hostile = spawn(&mut app, &ActorConfig::hostile(BehaviorMode::UltraPassive), Vec3::ZERO);

    run_ticks(&mut app, 3);
    assert_eq!(spotted_lost_counts(&app), (1, 0));

    app.world_mut().despawn(player);
    run_ticks(&mut app, 2);

    assert_eq!(spotted_lost_counts(&app), (1, 1));
    assert!(!app.world().get::<TargetTracker>(hostile).unwrap().contains(player));
}

#[test]
fn test_observer_death_closes_spotted_with_lost() {
    let mut app = create_combat_app(42);
    let player = spawn(&mut app, &dummy_player(), Vec3::new(5.0, 0.0, 0.0));
    let hostile = spawn(&mut app, &ActorConfig::hostile(BehaviorMode::UltraPassive), Vec3::ZERO);

    run_ticks(&mut app, 3);
    app.world_mut().send_event(KillRequest {
        target: hostile,
        killer: Some(player),
    });
    run_ticks(&mut app, 3);

    assert_eq!(spotted_lost_counts(&app), (1, 1));
    assert!(app.world().get::<TargetTracker>(hostile).unwrap().in_range().is_empty());
}
