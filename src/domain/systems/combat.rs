// Hit resolution, damage, elimination and respawn timers.

use crate::domain::state::{TankId, has_elapsed};
use crate::domain::store::EntityStore;
use crate::domain::systems::weapons;
use crate::domain::tuning::{AbilityKind, RulesTuning, WeaponBehavior};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Target missing or already eliminated.
    Ignored,
    /// Shield or dash invulnerability swallowed the hit.
    Absorbed,
    Damaged,
    Eliminated,
}

/// Applies damage, floors health at zero and eliminates on depletion.
pub fn apply_damage(
    store: &mut EntityStore,
    rules: &RulesTuning,
    victim_id: TankId,
    amount: i32,
    attacker: Option<TankId>,
) -> DamageOutcome {
    if !store.tank(victim_id).is_some_and(|t| t.alive) {
        return DamageOutcome::Ignored;
    }
    if store.is_protected(victim_id) {
        return DamageOutcome::Absorbed;
    }
    let Some(victim) = store.tank_mut(victim_id) else {
        return DamageOutcome::Ignored;
    };

    victim.health = (victim.health - amount.max(0)).max(0);
    if let Some(attacker) = attacker.filter(|a| *a != victim_id) {
        victim.last_hit_by = Some(attacker);
    }

    if victim.health > 0 {
        return DamageOutcome::Damaged;
    }

    eliminate(store, rules, victim_id);
    DamageOutcome::Eliminated
}

fn eliminate(store: &mut EntityStore, rules: &RulesTuning, victim_id: TankId) {
    let Some(victim) = store.tank_mut(victim_id) else {
        return;
    };
    victim.alive = false;
    victim.respawn_timer = rules.respawn_delay;
    victim.movement.moving = false;
    let killer = victim.last_hit_by.take();

    // Personal buffs end with the tank; scheduled strikes and decoys play out.
    store.retain_effects(|e| {
        e.owner_id != victim_id || matches!(e.kind(), AbilityKind::Aoe | AbilityKind::Decoy)
    });

    if let Some(killer) = killer.and_then(|id| store.tank_mut(id)) {
        killer.score += rules.kill_score;
        info!(
            victim_id,
            killer_id = killer.id,
            killer_score = killer.score,
            "tank eliminated"
        );
    } else {
        info!(victim_id, "tank eliminated");
    }
}

/// Tests every projectile against every tank and resolves the first hit.
///
/// Projectiles are visited in creation order and tanks in insertion order;
/// when several tanks overlap a projectile, the earliest inserted one is hit.
pub fn resolve_collisions(store: &mut EntityStore, rules: &RulesTuning) {
    let mut i = 0;
    while i < store.projectiles.len() {
        let p = &store.projectiles[i];
        let hit = store
            .tanks
            .iter()
            .filter(|t| t.alive && t.id != p.owner_id && !p.pierced.contains(&t.id))
            .find(|t| {
                let reach = p.radius + t.radius();
                t.position.distance_squared(p.position) <= reach * reach
            })
            .map(|t| t.id);

        let Some(target) = hit else {
            i += 1;
            continue;
        };

        let (projectile_id, owner_id, damage, behavior, position) =
            (p.id, p.owner_id, p.damage, p.behavior, p.position);
        let outcome = apply_damage(store, rules, target, damage, Some(owner_id));
        debug!(
            victim_id = target,
            shooter_id = owner_id,
            projectile_id,
            ?outcome,
            "projectile hit"
        );

        match behavior {
            WeaponBehavior::AreaDamage {
                blast_radius,
                splash_damage,
            } => {
                store.projectiles.remove(i);
                weapons::detonate(
                    store,
                    rules,
                    owner_id,
                    position,
                    blast_radius,
                    splash_damage,
                    Some(target),
                );
            }
            WeaponBehavior::Piercing { max_targets } if outcome != DamageOutcome::Absorbed => {
                store.push_explosion(
                    position,
                    rules.impact_explosion_radius,
                    rules.explosion_duration,
                );
                let p = &mut store.projectiles[i];
                p.pierced.push(target);
                if p.pierced.len() >= max_targets as usize {
                    store.projectiles.remove(i);
                } else {
                    i += 1;
                }
            }
            _ => {
                store.projectiles.remove(i);
                store.push_explosion(
                    position,
                    rules.impact_explosion_radius,
                    rules.explosion_duration,
                );
            }
        }
    }
}

/// Counts down cooldowns and respawn timers; respawns tanks whose delay elapsed.
pub fn tick_timers(store: &mut EntityStore, dt: f32) {
    let mut due = Vec::new();
    for tank in store.tanks.iter_mut() {
        tank.fire_cooldown = (tank.fire_cooldown - dt).max(0.0);
        for cooldown in tank.ability_cooldowns.iter_mut() {
            *cooldown = (*cooldown - dt).max(0.0);
        }

        if !tank.alive {
            tank.respawn_timer -= dt;
            if has_elapsed(0.0, tank.respawn_timer) {
                due.push(tank.id);
            }
        }
    }

    for id in due {
        respawn(store, id);
    }
}

fn respawn(store: &mut EntityStore, tank_id: TankId) {
    let arena = store.arena();
    let Some(radius) = store.tank(tank_id).map(|t| t.radius()) else {
        return;
    };
    let position = arena.random_position(&mut store.rng, radius);

    let Some(tank) = store.tank_mut(tank_id) else {
        return;
    };
    tank.position = position;
    tank.health = tank.max_health();
    tank.alive = true;
    tank.respawn_timer = 0.0;
    tank.fire_cooldown = 0.0;
    tank.ability_cooldowns = [0.0; 5];
    tank.movement.moving = false;
    tank.last_hit_by = None;

    info!(tank_id, x = position.x, y = position.y, "tank respawned");
}

pub fn expire_explosions(store: &mut EntityStore) {
    let now = store.now();
    store.explosions.retain(|e| !e.is_expired(now));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::state::EffectPayload;
    use crate::domain::store::test_support::store;
    use crate::domain::systems::{abilities, movement, weapons};
    use crate::domain::tuning::TankClass;
    use crate::domain::vector::Vec2;

    const DT: f32 = 1.0 / 30.0;

    #[test]
    fn when_projectile_overlaps_tank_then_exact_class_damage_is_applied() {
        let mut store = store();
        let rules = RulesTuning::default();
        let a = store.spawn_tank_at(TankClass::Sentinel, Vec2::new(100.0, 100.0));
        let b = store.spawn_tank_at(TankClass::Sentinel, Vec2::new(100.0, 100.0));
        weapons::shoot(&mut store, a).expect("shot");

        resolve_collisions(&mut store, &rules);

        let damage = TankClass::Sentinel.tuning().projectile.damage;
        let tank_b = store.tank(b).expect("tank b");
        assert_eq!(tank_b.health, tank_b.max_health() - damage);
        assert_eq!(tank_b.last_hit_by, Some(a));
        assert!(store.projectiles.is_empty());
        assert!(store.snapshot().projectiles.is_empty());
        // The shooter is never hit by its own projectile.
        let tank_a = store.tank(a).expect("tank a");
        assert_eq!(tank_a.health, tank_a.max_health());
    }

    #[test]
    fn when_target_is_shielded_then_health_is_unchanged_and_projectile_destroyed() {
        let mut store = store();
        let rules = RulesTuning::default();
        let a = store.spawn_tank_at(TankClass::Juggernaut, Vec2::new(300.0, 300.0));
        let c = store.spawn_tank_at(TankClass::Sentinel, Vec2::new(300.0, 300.0));
        abilities::activate(&mut store, &rules, c, AbilityKind::Shield, None).expect("shield");
        weapons::shoot(&mut store, a).expect("shot");

        resolve_collisions(&mut store, &rules);

        let tank_c = store.tank(c).expect("tank c");
        assert_eq!(tank_c.health, tank_c.max_health());
        assert!(store.projectiles.is_empty());
    }

    #[test]
    fn when_dash_invulnerability_is_active_then_damage_is_absorbed() {
        let mut store = store();
        let rules = RulesTuning::default();
        let a = store.spawn_tank(TankClass::Sentinel);
        let b = store.spawn_tank(TankClass::Sentinel);
        abilities::activate(&mut store, &rules, b, AbilityKind::Dash, None).expect("dash");

        assert_eq!(apply_damage(&mut store, &rules, b, 50, Some(a)), DamageOutcome::Absorbed);

        // Past the invulnerability window the dash no longer protects.
        let ticks = (rules.dash.invulnerable_for / DT).ceil() as usize + 1;
        for _ in 0..ticks {
            store.advance_clock(DT);
        }
        assert_eq!(apply_damage(&mut store, &rules, b, 50, Some(a)), DamageOutcome::Damaged);
    }

    #[test]
    fn when_several_tanks_overlap_then_first_inserted_is_hit() {
        let mut store = store();
        let rules = RulesTuning::default();
        let shooter = store.spawn_tank_at(TankClass::Sentinel, Vec2::new(500.0, 500.0));
        let first = store.spawn_tank_at(TankClass::Sentinel, Vec2::new(505.0, 500.0));
        let second = store.spawn_tank_at(TankClass::Sentinel, Vec2::new(498.0, 500.0));
        weapons::shoot(&mut store, shooter).expect("shot");

        resolve_collisions(&mut store, &rules);

        let max = TankClass::Sentinel.tuning().max_health;
        assert!(store.tank(first).expect("first").health < max);
        assert_eq!(store.tank(second).expect("second").health, max);
    }

    #[test]
    fn when_piercing_projectile_hits_then_it_continues_until_budget_is_spent() {
        let mut store = store();
        let rules = RulesTuning::default();
        let shooter = store.spawn_tank_at(TankClass::Shredder, Vec2::new(100.0, 500.0));
        let victims: Vec<TankId> = (0..3)
            .map(|_| store.spawn_tank_at(TankClass::Sentinel, Vec2::new(100.0, 500.0)))
            .collect();
        weapons::shoot(&mut store, shooter).expect("shot");

        resolve_collisions(&mut store, &rules);
        assert_eq!(store.projectiles.len(), 1);
        assert_eq!(store.projectiles[0].pierced, vec![victims[0]]);

        resolve_collisions(&mut store, &rules);
        resolve_collisions(&mut store, &rules);
        assert!(store.projectiles.is_empty());

        let damage = TankClass::Shredder.tuning().projectile.damage;
        for v in victims {
            let tank = store.tank(v).expect("victim");
            assert_eq!(tank.health, tank.max_health() - damage);
        }
    }

    #[test]
    fn when_area_projectile_hits_then_neighbours_take_splash() {
        let mut store = store();
        let rules = RulesTuning::default();
        let shooter = store.spawn_tank_at(TankClass::Thunderbolt, Vec2::new(100.0, 100.0));
        let target = store.spawn_tank_at(TankClass::Sentinel, Vec2::new(400.0, 400.0));
        let neighbour = store.spawn_tank_at(TankClass::Sentinel, Vec2::new(440.0, 400.0));
        let far = store.spawn_tank_at(TankClass::Sentinel, Vec2::new(800.0, 800.0));
        weapons::shoot(&mut store, shooter).expect("shot");
        store.projectiles[0].position = Vec2::new(400.0, 400.0);

        resolve_collisions(&mut store, &rules);

        let tuning = TankClass::Thunderbolt.tuning();
        let WeaponBehavior::AreaDamage { splash_damage, .. } = tuning.behavior else {
            panic!("thunderbolt should deal area damage");
        };
        let max = TankClass::Sentinel.tuning().max_health;
        assert_eq!(
            store.tank(target).expect("target").health,
            max - tuning.projectile.damage
        );
        assert_eq!(store.tank(neighbour).expect("neighbour").health, max - splash_damage);
        assert_eq!(store.tank(far).expect("far").health, max);
        assert_eq!(store.explosions.len(), 1);
        assert!(store.projectiles.is_empty());
    }

    #[test]
    fn when_health_reaches_zero_then_tank_is_eliminated_and_killer_scores_once() {
        let mut store = store();
        let rules = RulesTuning::default();
        let d = store.spawn_tank(TankClass::Sentinel);
        let e = store.spawn_tank(TankClass::Sentinel);
        store.tank_mut(d).expect("d").health = 5;
        store.add_effect(d, 3.0, EffectPayload::Homing);

        assert_eq!(apply_damage(&mut store, &rules, d, 10, Some(e)), DamageOutcome::Eliminated);
        assert_eq!(apply_damage(&mut store, &rules, d, 10, Some(e)), DamageOutcome::Ignored);

        let tank_d = store.tank(d).expect("d");
        assert_eq!(tank_d.health, 0);
        assert!(!tank_d.alive);
        assert_eq!(store.tank(e).expect("e").score, rules.kill_score);
        // Personal effects end on elimination.
        assert!(store.effects.is_empty());
        assert!(tank_d.effects.is_empty());
    }

    #[test]
    fn when_tank_destroys_itself_then_no_score_is_awarded() {
        let mut store = store();
        let rules = RulesTuning::default();
        let t = store.spawn_tank(TankClass::Thunderbolt);

        apply_damage(&mut store, &rules, t, 1000, Some(t));

        assert_eq!(store.tank(t).expect("tank").score, 0);
    }

    #[test]
    fn when_respawn_delay_elapses_then_tank_returns_with_full_health() {
        let mut store = store();
        let rules = RulesTuning::default();
        let d = store.spawn_tank(TankClass::Sentinel);
        apply_damage(&mut store, &rules, d, 1000, None);

        let ticks = (rules.respawn_delay / DT).round() as usize;
        for _ in 0..ticks - 2 {
            tick_timers(&mut store, DT);
        }
        assert!(!store.tank(d).expect("d").alive);

        for _ in 0..4 {
            tick_timers(&mut store, DT);
        }
        let tank = store.tank(d).expect("d");
        assert!(tank.alive);
        assert_eq!(tank.health, tank.max_health());
        let arena = store.arena();
        assert!(arena.contains(tank.position));
    }

    #[test]
    fn when_explosion_duration_elapses_then_it_is_removed() {
        let mut store = store();
        store.push_explosion(Vec2::new(10.0, 10.0), 5.0, 0.1);
        store.advance_clock(0.05);
        expire_explosions(&mut store);
        assert_eq!(store.explosions.len(), 1);

        store.advance_clock(0.05);
        expire_explosions(&mut store);
        assert!(store.explosions.is_empty());
    }

    #[test]
    fn when_projectile_crosses_decoy_then_nothing_is_hit() {
        let mut store = store();
        let rules = RulesTuning::default();
        let shooter = store.spawn_tank_at(TankClass::Sentinel, Vec2::new(100.0, 100.0));
        let guardian = store.spawn_tank_at(TankClass::Guardian, Vec2::new(500.0, 500.0));
        abilities::activate(&mut store, &rules, guardian, AbilityKind::Decoy, None)
            .expect("decoy");
        let EffectPayload::Decoy { positions } = &store.effects[0].payload else {
            panic!("expected decoy payload");
        };
        let decoy = positions[0];
        // Markers stay put while the real tank drives away.
        store.tank_mut(guardian).expect("guardian").position = Vec2::new(900.0, 900.0);

        weapons::shoot(&mut store, shooter).expect("shot");
        store.projectiles[0].position = decoy;
        resolve_collisions(&mut store, &rules);
        movement::move_projectiles(&mut store, &rules, DT);
        resolve_collisions(&mut store, &rules);

        assert_eq!(store.projectiles.len(), 1);
        assert!(store.explosions.is_empty());
        for tank in &store.tanks {
            assert_eq!(tank.health, tank.max_health(), "tank {}", tank.id);
        }
    }
}
