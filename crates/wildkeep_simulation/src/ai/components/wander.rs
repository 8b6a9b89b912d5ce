//! Wander components - кооперативный цикл Wait → Move → Wait
//!
//! Без корутин: фаза + таймеры в компоненте, один шаг за тик.

use std::f32::consts::{FRAC_PI_3, FRAC_PI_4, TAU};

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive, ensure_range, ConfigError};
use crate::movement::{flatten, RayHit};

/// Параметры блуждания
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct WanderConfig {
    pub min_wander_distance: f32,
    pub max_wander_distance: f32,
    pub min_wait: f32,
    pub max_wait: f32,
    /// Waypoint считается достигнутым внутри этого радиуса (XZ)
    pub waypoint_reached_distance: f32,
    /// Сколько можно идти к одному waypoint до форс-смены
    pub stuck_timeout: f32,
    /// Шанс ray probe растёт линейно и достигает 1 за этот интервал
    pub pathfinding_update_interval: f32,
    /// Длина ray probe вперёд
    pub probe_distance: f32,
}

impl Default for WanderConfig {
    fn default() -> Self {
        Self {
            min_wander_distance: 3.0,
            max_wander_distance: 10.0,
            min_wait: 1.0,
            max_wait: 3.0,
            waypoint_reached_distance: 0.5,
            stuck_timeout: 6.0,
            pathfinding_update_interval: 0.5,
            probe_distance: 2.5,
        }
    }
}

impl WanderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_range("wander_distance", self.min_wander_distance, self.max_wander_distance)?;
        ensure_positive("max_wander_distance", self.max_wander_distance)?;
        ensure_range("wander_wait", self.min_wait, self.max_wait)?;
        ensure_positive("waypoint_reached_distance", self.waypoint_reached_distance)?;
        ensure_positive("stuck_timeout", self.stuck_timeout)?;
        ensure_positive("pathfinding_update_interval", self.pathfinding_update_interval)?;
        ensure_positive("probe_distance", self.probe_distance)?;
        Ok(())
    }

    /// Случайная пауза в [min_wait, max_wait]
    pub fn sample_wait(&self, rng: &mut impl Rng) -> f32 {
        if self.max_wait > self.min_wait {
            rng.gen_range(self.min_wait..=self.max_wait)
        } else {
            self.min_wait
        }
    }

    fn sample_distance(&self, rng: &mut impl Rng) -> f32 {
        if self.max_wander_distance > self.min_wander_distance {
            rng.gen_range(self.min_wander_distance..=self.max_wander_distance)
        } else {
            self.min_wander_distance
        }
    }

    /// Waypoint на случайном угле, дистанция в [min, max] от origin (y сохраняется)
    pub fn pick_waypoint(&self, origin: Vec3, rng: &mut impl Rng) -> Vec3 {
        let angle = rng.gen_range(0.0..TAU);
        self.waypoint_at(origin, angle, rng)
    }

    /// Waypoint в конусе ±spread вокруг горизонтального `bias`
    pub fn pick_biased_waypoint(
        &self,
        origin: Vec3,
        bias: Vec3,
        spread: f32,
        rng: &mut impl Rng,
    ) -> Vec3 {
        let flat = flatten(bias);
        if flat.length_squared() <= 1e-6 {
            return self.pick_waypoint(origin, rng);
        }

        let base = flat.z.atan2(flat.x);
        let angle = if spread > 0.0 {
            base + rng.gen_range(-spread..=spread)
        } else {
            base
        };
        self.waypoint_at(origin, angle, rng)
    }

    fn waypoint_at(&self, origin: Vec3, angle: f32, rng: &mut impl Rng) -> Vec3 {
        let distance = self.sample_distance(rng);
        origin + Vec3::new(angle.cos(), 0.0, angle.sin()) * distance
    }
}

/// Фаза цикла
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub enum WanderPhase {
    #[default]
    Waiting,
    Moving,
}

/// Состояние блуждания (resumable)
///
/// Инвариант: любой выбранный waypoint лежит на дистанции
/// [min_wander_distance, max_wander_distance] от точки выбора.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct WanderState {
    pub phase: WanderPhase,
    pub waypoint: Option<Vec3>,
    /// Время в текущей фазе
    pub elapsed: f32,
    /// Длительность текущей паузы
    pub wait_duration: f32,
    /// Время погони за текущим waypoint
    pub stuck_timer: f32,
    /// Время с последнего ray probe
    pub probe_timer: f32,
}

impl WanderState {
    pub fn begin_wait(&mut self, duration: f32) {
        self.phase = WanderPhase::Waiting;
        self.waypoint = None;
        self.elapsed = 0.0;
        self.wait_duration = duration.max(0.0);
        self.stuck_timer = 0.0;
        self.probe_timer = 0.0;
    }

    /// Новый waypoint, все таймеры погони сбрасываются
    pub fn begin_move(&mut self, waypoint: Vec3) {
        self.phase = WanderPhase::Moving;
        self.waypoint = Some(waypoint);
        self.elapsed = 0.0;
        self.stuck_timer = 0.0;
        self.probe_timer = 0.0;
    }

    /// Отскок от границы: waypoint внутрь
    pub fn force_inward_waypoint(
        &mut self,
        origin: Vec3,
        inward: Vec3,
        config: &WanderConfig,
        rng: &mut impl Rng,
    ) -> Vec3 {
        let waypoint = config.pick_biased_waypoint(origin, inward, FRAC_PI_4, rng);
        self.begin_move(waypoint);
        waypoint
    }

    /// Прерывание (смерть, начало боя): обратно в паузу
    pub fn interrupt(&mut self, config: &WanderConfig, rng: &mut impl Rng) {
        self.begin_wait(config.sample_wait(rng));
    }

    /// Один шаг цикла
    ///
    /// Возвращает горизонтальное направление к waypoint (normalized),
    /// None - стоим (пауза или только что пришли).
    /// `probe(origin, direction)` - короткий raycast вперёд.
    pub fn tick(
        &mut self,
        position: Vec3,
        delta: f32,
        config: &WanderConfig,
        rng: &mut impl Rng,
        probe: impl Fn(Vec3, Vec3) -> Option<RayHit>,
    ) -> Option<Vec3> {
        self.elapsed += delta;

        match self.phase {
            WanderPhase::Waiting => {
                if self.elapsed < self.wait_duration {
                    return None;
                }
                let waypoint = config.pick_waypoint(position, rng);
                self.begin_move(waypoint);
            }
            WanderPhase::Moving => {
                self.stuck_timer += delta;
                self.probe_timer += delta;
            }
        }

        let Some(mut waypoint) = self.waypoint else {
            self.begin_wait(config.sample_wait(rng));
            return None;
        };

        if flatten(waypoint - position).length() <= config.waypoint_reached_distance {
            self.begin_wait(config.sample_wait(rng));
            return None;
        }

        if self.stuck_timer >= config.stuck_timeout {
            crate::log(&format!(
                "🪨 Wander stuck for {:.1}s, picking new waypoint",
                self.stuck_timer
            ));
            waypoint = config.pick_waypoint(position, rng);
            self.begin_move(waypoint);
        }

        let mut direction = flatten(waypoint - position).normalize_or_zero();

        let probe_chance = (self.probe_timer / config.pathfinding_update_interval).min(1.0);
        if probe_chance > 0.0 && rng.gen::<f32>() < probe_chance {
            self.probe_timer = 0.0;
            if let Some(hit) = probe(position, direction) {
                waypoint = config.pick_biased_waypoint(position, hit.normal, FRAC_PI_3, rng);
                self.begin_move(waypoint);
                direction = flatten(waypoint - position).normalize_or_zero();
            }
        }

        Some(direction)
    }
}
