// Per-tick integration of tank and projectile positions.

use crate::domain::state::{EffectPayload, TankId};
use crate::domain::store::EntityStore;
use crate::domain::tuning::{AbilityKind, RulesTuning};
use crate::domain::vector::{Vec2, rotate_towards};

/// Integrates every live, moving tank and clamps it to the arena.
pub fn move_tanks(store: &mut EntityStore, dt: f32) {
    let arena = store.arena();
    let multipliers: Vec<f32> = store
        .tanks
        .iter()
        .map(|t| dash_multiplier(store, t.id))
        .collect();

    for (tank, multiplier) in store.tanks.iter_mut().zip(multipliers) {
        if !tank.alive || !tank.movement.moving {
            continue;
        }

        let speed = tank.tuning().speed * multiplier;
        let step = Vec2::from_heading(tank.movement.direction) * (speed * dt);
        // Clamp, never wrap or reflect.
        tank.position = arena.clamp(tank.position + step, tank.radius());
    }
}

fn dash_multiplier(store: &EntityStore, tank_id: TankId) -> f32 {
    match store.active_effect(tank_id, AbilityKind::Dash).map(|e| &e.payload) {
        Some(EffectPayload::Dash {
            speed_multiplier, ..
        }) => *speed_multiplier,
        _ => 1.0,
    }
}

/// Steers homing projectiles, then advances every projectile and ages it.
pub fn move_projectiles(store: &mut EntityStore, rules: &RulesTuning, dt: f32) {
    let targets: Vec<(TankId, Vec2)> = store
        .tanks
        .iter()
        .filter(|t| t.alive)
        .map(|t| (t.id, t.position))
        .collect();

    for p in store.projectiles.iter_mut() {
        if p.homing {
            if let Some(target) = nearest_target(&targets, p.owner_id, p.position, rules.homing.range)
            {
                let desired = (target - p.position).heading();
                p.heading = rotate_towards(p.heading, desired, rules.homing.turn_per_tick);
            }
        }

        p.position += Vec2::from_heading(p.heading) * (p.speed * dt);
        p.ttl -= dt;
    }
}

/// Closest live tank other than `owner` within `range`; ties go to the earlier tank.
fn nearest_target(
    targets: &[(TankId, Vec2)],
    owner: TankId,
    from: Vec2,
    range: f32,
) -> Option<Vec2> {
    let range_sq = range * range;
    targets
        .iter()
        .filter(|(id, _)| *id != owner)
        .map(|(_, pos)| (*pos, from.distance_squared(*pos)))
        .filter(|(_, d)| *d <= range_sq)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(pos, _)| pos)
}
