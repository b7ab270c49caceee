// Firing, blast damage and projectile expiry.

use crate::domain::state::{Projectile, ProjectileId, TankId};
use crate::domain::store::EntityStore;
use crate::domain::systems::combat;
use crate::domain::tuning::{AbilityKind, RulesTuning, WeaponBehavior};
use crate::domain::vector::Vec2;
use tracing::debug;

/// Fires one projectile from the tank's position along its heading.
///
/// Returns `None` without side effects while the fire cooldown is pending.
pub fn shoot(store: &mut EntityStore, tank_id: TankId) -> Option<ProjectileId> {
    let homing_window = store.has_active_effect(tank_id, AbilityKind::Homing);
    let tank = store.tank(tank_id).filter(|t| t.alive && t.can_fire())?;

    let tuning = tank.tuning();
    let (class, position, heading) = (tank.class, tank.position, tank.heading);
    let id = store.next_projectile_id();
    let spawn_tick = store.tick();

    store.projectiles.push(Projectile {
        id,
        owner_id: tank_id,
        class,
        position,
        heading,
        speed: tuning.projectile.speed,
        damage: tuning.projectile.damage,
        radius: tuning.projectile.radius,
        behavior: tuning.behavior,
        spawn_tick,
        ttl: tuning.projectile.lifetime,
        homing: homing_window || tuning.behavior == WeaponBehavior::Homing,
        pierced: Vec::new(),
    });

    if let Some(tank) = store.tank_mut(tank_id) {
        tank.fire_cooldown = tuning.fire_cooldown;
    }

    debug!(tank_id, projectile_id = id, "projectile fired");
    Some(id)
}

/// Enqueues an explosion and damages every live tank overlapping the blast.
///
/// `spared` is the directly hit tank, which already took impact damage.
pub fn detonate(
    store: &mut EntityStore,
    rules: &RulesTuning,
    owner_id: TankId,
    center: Vec2,
    blast_radius: f32,
    splash_damage: i32,
    spared: Option<TankId>,
) {
    store.push_explosion(center, blast_radius, rules.explosion_duration);

    // No teams: the owner is caught in its own blast too.
    let victims: Vec<TankId> = store
        .tanks
        .iter()
        .filter(|t| t.alive && Some(t.id) != spared)
        .filter(|t| t.position.distance(center) <= blast_radius + t.radius())
        .map(|t| t.id)
        .collect();

    for victim in victims {
        combat::apply_damage(store, rules, victim, splash_damage, Some(owner_id));
    }
}

/// Removes projectiles past their TTL or outside the arena.
///
/// Area-damage projectiles detonate where they stop.
pub fn expire_projectiles(store: &mut EntityStore, rules: &RulesTuning) {
    let arena = store.arena();
    let (expired, live): (Vec<Projectile>, Vec<Projectile>) = store
        .projectiles
        .drain(..)
        .partition(|p| p.is_expired() || !arena.contains(p.position));
    store.projectiles = live;

    for p in expired {
        if let WeaponBehavior::AreaDamage {
            blast_radius,
            splash_damage,
        } = p.behavior
        {
            let center = arena.clamp(p.position, 0.0);
            detonate(store, rules, p.owner_id, center, blast_radius, splash_damage, None);
        }
    }
}
