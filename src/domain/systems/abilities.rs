// Specialist abilities: Idle -> Active -> Idle per tank and kind.
//
// Activation is gated by the class ability set, the per-kind cooldown and
// (unless stackable) the absence of an active instance. Deactivation is
// time-driven only, via `SpecialistEffect::is_expired`.

use crate::domain::state::{EffectId, EffectPayload, TankId, has_elapsed};
use crate::domain::store::EntityStore;
use crate::domain::systems::combat;
use crate::domain::tuning::{AbilityKind, RulesTuning};
use crate::domain::vector::Vec2;
use rand::Rng;
use tracing::{debug, info};

pub fn activate(
    store: &mut EntityStore,
    rules: &RulesTuning,
    tank_id: TankId,
    kind: AbilityKind,
    target: Option<Vec2>,
) -> Option<EffectId> {
    let tank = store
        .tank(tank_id)
        .filter(|t| t.alive && t.class.has_ability(kind) && t.ability_ready(kind))?;
    let origin = tank.position;

    let tuning = *rules.ability(kind);
    if !tuning.stackable && store.has_active_effect(tank_id, kind) {
        return None;
    }

    let (payload, duration) = match kind {
        AbilityKind::Dash => (
            EffectPayload::Dash {
                speed_multiplier: rules.dash.speed_multiplier,
                invulnerable_for: rules.dash.invulnerable_for,
            },
            tuning.duration,
        ),
        AbilityKind::Shield => (EffectPayload::Shield, tuning.duration),
        AbilityKind::Homing => (EffectPayload::Homing, tuning.duration),
        AbilityKind::Decoy => {
            let spread = rules.decoy.spread.abs();
            let positions = (0..rules.decoy.count)
                .map(|_| {
                    let offset = Vec2::new(
                        store.rng.gen_range(-spread..=spread),
                        store.rng.gen_range(-spread..=spread),
                    );
                    origin + offset
                })
                .collect();
            (EffectPayload::Decoy { positions }, tuning.duration)
        }
        AbilityKind::Aoe => {
            let arena = store.arena();
            let center = target
                .filter(|t| t.is_finite())
                .map(|t| arena.clamp(t, 0.0))
                .unwrap_or(origin);
            let payload = EffectPayload::Aoe {
                center,
                radius: rules.aoe.radius,
                damage: rules.aoe.damage,
                delay: rules.aoe.delay,
                detonated: false,
            };
            // The effect must outlive its own impact delay.
            (payload, tuning.duration.max(rules.aoe.delay))
        }
    };

    let id = store.add_effect(tank_id, duration, payload);
    if let Some(tank) = store.tank_mut(tank_id) {
        tank.ability_cooldowns[kind.index()] = tuning.cooldown;
    }

    debug!(tank_id, effect_id = id, ?kind, "ability activated");
    Some(id)
}

/// Fires due area strikes, then drops every expired effect.
pub fn resolve_effects(store: &mut EntityStore, rules: &RulesTuning) {
    let now = store.now();

    let due: Vec<(EffectId, TankId, Vec2, f32, i32)> = store
        .effects
        .iter()
        .filter_map(|e| match e.payload {
            EffectPayload::Aoe {
                center,
                radius,
                damage,
                delay,
                detonated: false,
            } if has_elapsed(e.elapsed(now), delay) || e.is_expired(now) => {
                Some((e.id, e.owner_id, center, radius, damage))
            }
            _ => None,
        })
        .collect();

    for (effect_id, owner_id, center, radius, damage) in due {
        strike(store, rules, effect_id, owner_id, center, radius, damage);
    }

    store.retain_effects(|e| !e.is_expired(now));
}

fn strike(
    store: &mut EntityStore,
    rules: &RulesTuning,
    effect_id: EffectId,
    owner_id: TankId,
    center: Vec2,
    radius: f32,
    damage: i32,
) {
    if let Some(EffectPayload::Aoe { detonated, .. }) = store
        .effects
        .iter_mut()
        .find(|e| e.id == effect_id)
        .map(|e| &mut e.payload)
    {
        *detonated = true;
    }

    store.push_explosion(center, radius, rules.explosion_duration);

    let victims: Vec<TankId> = store
        .tanks
        .iter()
        .filter(|t| t.alive && t.id != owner_id)
        .filter(|t| t.position.distance(center) <= radius + t.radius())
        .map(|t| t.id)
        .collect();

    info!(
        owner_id,
        effect_id,
        victims = victims.len(),
        "area strike detonated"
    );
    for victim in victims {
        combat::apply_damage(store, rules, victim, damage, Some(owner_id));
    }
}
