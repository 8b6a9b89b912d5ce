//! Headless симуляция Wildkeep
//!
//! Игрок, союзник и несколько hostile (наземные + летающий) на 1000 тиков.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use wildkeep_simulation::{
    create_headless_app, spawn_actor, ActorConfig, BehaviorMode, ConfigError, Health,
    ObstacleField, SimulationPlugin, FIXED_TICK,
};

fn main() -> Result<(), ConfigError> {
    let seed = 42;
    println!("Starting Wildkeep headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin::default())
        .insert_resource(TimeUpdateStrategy::ManualDuration(FIXED_TICK));

    let world = app.world_mut();
    {
        let mut obstacles = world.resource_mut::<ObstacleField>();
        obstacles.add_sphere(Vec3::new(6.0, 0.0, 6.0), 1.5);
        obstacles.add_sphere(Vec3::new(-8.0, 0.0, 3.0), 2.0);
    }

    let player = spawn_actor(world, &ActorConfig::player(), Vec3::ZERO, None)?;
    spawn_actor(world, &ActorConfig::ally(0), Vec3::new(0.0, 0.0, 3.0), Some(player))?;
    spawn_actor(
        world,
        &ActorConfig::hostile(BehaviorMode::Aggressive),
        Vec3::new(5.0, 0.0, -4.0),
        None,
    )?;
    spawn_actor(
        world,
        &ActorConfig::hostile(BehaviorMode::Passive),
        Vec3::new(-6.0, 0.0, -6.0),
        None,
    )?;
    spawn_actor(
        world,
        &ActorConfig::hostile(BehaviorMode::UltraPassive),
        Vec3::new(12.0, 0.0, 10.0),
        None,
    )?;
    spawn_actor(
        world,
        &ActorConfig::flying_hostile(BehaviorMode::Aggressive),
        Vec3::new(-4.0, 6.0, 8.0),
        None,
    )?;

    // Запускаем 1000 тиков симуляции
    for tick in 0..1000 {
        app.update();

        if tick % 100 == 0 {
            let world = app.world_mut();
            let mut query = world.query::<&Health>();
            let alive = query.iter(world).filter(|health| health.is_alive()).count();
            println!("Tick {}: {} alive", tick, alive);
        }
    }

    println!("Simulation complete!");
    Ok(())
}
