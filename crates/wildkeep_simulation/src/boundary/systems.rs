//! Boundary enforcement system (Spatial фаза)

use bevy::prelude::*;
use rand::Rng;

use super::{
    BounceCorrection, BoundaryContact, BoundaryField, BoundaryNotice, BoundaryPolicy,
    BoundaryViolation, EdgeCorrection,
};
use crate::components::Health;
use crate::movement::Locomotion;
use crate::DeterministicRng;

/// Система: удержание акторов внутри BoundaryField
///
/// - VelocityCancel: срез наружной скорости у края, snap если вышел; one-shot notice
/// - Bounce: отражение + jitter, cooldown per-entity, BoundaryViolation для behavior
pub fn enforce_boundaries(
    field: Option<Res<BoundaryField>>,
    mut actors: Query<(
        Entity,
        &mut Transform,
        &mut Locomotion,
        &BoundaryPolicy,
        &mut BoundaryContact,
        &Health,
    )>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time>,
    mut violations: EventWriter<BoundaryViolation>,
    mut notices: EventWriter<BoundaryNotice>,
) {
    let Some(field) = field else {
        return;
    };
    let delta = time.delta_secs();

    for (entity, mut transform, mut locomotion, policy, mut contact, health) in actors.iter_mut() {
        contact.cooldown_remaining = (contact.cooldown_remaining - delta).max(0.0);

        if health.is_dead() {
            continue;
        }

        let mut position = transform.translation;
        let mut velocity = locomotion.velocity;

        match policy {
            BoundaryPolicy::VelocityCancel => {
                let correction = field.enforce_velocity_cancel(&mut position, &mut velocity);
                match correction {
                    EdgeCorrection::Inside => contact.notified = false,
                    EdgeCorrection::NearEdge | EdgeCorrection::SnappedBack => {
                        if correction == EdgeCorrection::SnappedBack {
                            crate::log(&format!("🧱 {:?} snapped back inside boundary", entity));
                        }
                        if !contact.notified {
                            contact.notified = true;
                            notices.write(BoundaryNotice { entity });
                        }
                    }
                }
            }
            BoundaryPolicy::Bounce => {
                if !field.is_crossing(position, velocity) {
                    continue;
                }

                let cooldown_ready = contact.cooldown_remaining <= 0.0;
                let jitter = if cooldown_ready && field.bounce_jitter > 0.0 {
                    rng.rng.gen_range(-field.bounce_jitter..=field.bounce_jitter)
                } else {
                    0.0
                };

                if let BounceCorrection::Bounced { inward } =
                    field.enforce_bounce(&mut position, &mut velocity, jitter, cooldown_ready)
                {
                    contact.cooldown_remaining = field.bounce_cooldown;
                    violations.write(BoundaryViolation { entity, inward });
                    crate::log(&format!("🧱 {:?} bounced off boundary", entity));
                }
            }
        }

        if transform.translation != position {
            transform.translation = position;
        }
        if locomotion.velocity != velocity {
            locomotion.velocity = velocity;
        }
    }
}
