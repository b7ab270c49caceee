// Authoritative entity storage, owned by the simulation loop.

use super::arena::{Arena, ArenaError};
use super::state::{
    EffectPayload, EliminatedSnapshot, Explosion, ExplosionId, Projectile, ProjectileId,
    ProjectileSnapshot, SimTime, SpecialistEffect, Tank, TankId, TankSnapshot, WorldSnapshot,
};
use super::tuning::{AbilityKind, TankClass};
use super::vector::Vec2;
use rand::SeedableRng;
use rand::rngs::SmallRng;

pub struct EntityStore {
    arena: Arena,

    /// Insertion order is the collision tie-break order.
    pub tanks: Vec<Tank>,
    pub projectiles: Vec<Projectile>,
    pub effects: Vec<SpecialistEffect>,
    pub explosions: Vec<Explosion>,

    pub rng: SmallRng,

    tick: u64,
    now: SimTime,

    next_tank_id: TankId,
    next_projectile_id: ProjectileId,
    next_effect_id: u64,
    next_explosion_id: ExplosionId,
}

impl EntityStore {
    pub fn new(arena: Arena, seed: u64) -> Self {
        Self {
            arena,
            tanks: Vec::new(),
            projectiles: Vec::new(),
            effects: Vec::new(),
            explosions: Vec::new(),
            rng: SmallRng::seed_from_u64(seed),
            tick: 0,
            now: 0.0,
            next_tank_id: 1,
            next_projectile_id: 1,
            next_effect_id: 1,
            next_explosion_id: 1,
        }
    }

    pub fn arena(&self) -> Arena {
        self.arena
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulation seconds since the store was created.
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Moves the clock to the next tick boundary.
    pub fn advance_clock(&mut self, dt: f32) {
        self.tick += 1;
        // Derived from the tick count so rounding does not accumulate.
        self.now = self.tick as SimTime * SimTime::from(dt);
    }

    /// Adds a tank of `class` at a random valid arena position.
    pub fn spawn_tank(&mut self, class: TankClass) -> TankId {
        let position = self
            .arena
            .random_position(&mut self.rng, class.tuning().radius);
        self.spawn_tank_at(class, position)
    }

    pub fn spawn_tank_at(&mut self, class: TankClass, position: Vec2) -> TankId {
        let id = self.next_tank_id;
        self.next_tank_id += 1;
        self.tanks.push(Tank::new(id, class, position));
        id
    }

    /// Removes a tank together with everything it owns.
    pub fn remove_tank(&mut self, id: TankId) -> Option<Tank> {
        let index = self.tanks.iter().position(|t| t.id == id)?;
        let tank = self.tanks.remove(index);
        self.projectiles.retain(|p| p.owner_id != id);
        self.effects.retain(|e| e.owner_id != id);
        for other in &mut self.tanks {
            if other.last_hit_by == Some(id) {
                other.last_hit_by = None;
            }
        }
        Some(tank)
    }

    pub fn tank(&self, id: TankId) -> Option<&Tank> {
        self.tanks.iter().find(|t| t.id == id)
    }

    pub fn tank_mut(&mut self, id: TankId) -> Option<&mut Tank> {
        self.tanks.iter_mut().find(|t| t.id == id)
    }

    pub fn next_projectile_id(&mut self) -> ProjectileId {
        let id = self.next_projectile_id;
        self.next_projectile_id += 1;
        id
    }

    /// Registers an effect and links it to its owner.
    pub fn add_effect(&mut self, owner_id: TankId, duration: f32, payload: EffectPayload) -> u64 {
        let id = self.next_effect_id;
        self.next_effect_id += 1;
        self.effects.push(SpecialistEffect {
            id,
            owner_id,
            created_at: self.now,
            duration,
            payload,
        });
        if let Some(tank) = self.tank_mut(owner_id) {
            tank.effects.push(id);
        }
        id
    }

    /// Keeps effects matching `keep` and unlinks the rest from their owners.
    pub fn retain_effects<F>(&mut self, mut keep: F)
    where
        F: FnMut(&SpecialistEffect) -> bool,
    {
        self.effects.retain(|e| keep(e));
        let effects = &self.effects;
        for tank in &mut self.tanks {
            tank.effects
                .retain(|id| effects.iter().any(|e| e.id == *id));
        }
    }

    pub fn push_explosion(&mut self, position: Vec2, radius: f32, duration: f32) -> ExplosionId {
        let id = self.next_explosion_id;
        self.next_explosion_id += 1;
        self.explosions.push(Explosion {
            id,
            position,
            radius,
            created_at: self.now,
            duration,
        });
        id
    }

    /// True if `owner` has an unexpired effect of `kind`.
    pub fn has_active_effect(&self, owner: TankId, kind: AbilityKind) -> bool {
        self.active_effect(owner, kind).is_some()
    }

    pub fn active_effect(&self, owner: TankId, kind: AbilityKind) -> Option<&SpecialistEffect> {
        self.effects
            .iter()
            .find(|e| e.owner_id == owner && e.kind() == kind && !e.is_expired(self.now))
    }

    /// True while damage against `id` is suppressed (shield or early dash).
    pub fn is_protected(&self, id: TankId) -> bool {
        let now = self.now;
        self.effects
            .iter()
            .filter(|e| e.owner_id == id && !e.is_expired(now))
            .any(|e| match e.payload {
                EffectPayload::Shield => true,
                EffectPayload::Dash {
                    invulnerable_for, ..
                } => e.elapsed(now) < invulnerable_for,
                _ => false,
            })
    }

    /// Applies new arena dimensions and pulls tanks back inside.
    ///
    /// Invalid dimensions leave the store untouched.
    pub fn resize_arena(&mut self, width: f32, height: f32) -> Result<Arena, ArenaError> {
        self.arena.resize(width, height)?;
        let arena = self.arena;
        for tank in &mut self.tanks {
            tank.position = arena.clamp(tank.position, tank.radius());
        }
        Ok(arena)
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            tick: self.tick,
            arena_width: self.arena.width(),
            arena_height: self.arena.height(),
            tanks: self
                .tanks
                .iter()
                .filter(|t| t.alive)
                .map(TankSnapshot::from)
                .collect(),
            eliminated: self
                .tanks
                .iter()
                .filter(|t| !t.alive)
                .map(EliminatedSnapshot::from)
                .collect(),
            projectiles: self
                .projectiles
                .iter()
                .map(ProjectileSnapshot::from)
                .collect(),
            effects: self.effects.clone(),
            explosions: self.explosions.clone(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::store;
    use super::*;

    #[test]
    fn when_spawning_tanks_then_ids_are_unique_and_positions_valid() {
        let mut store = store();
        let a = store.spawn_tank(TankClass::Sentinel);
        let b = store.spawn_tank(TankClass::Juggernaut);
        assert_ne!(a, b);

        let arena = store.arena();
        for tank in &store.tanks {
            let r = tank.radius();
            assert!(tank.position.x >= r && tank.position.x <= arena.width() - r);
            assert!(tank.position.y >= r && tank.position.y <= arena.height() - r);
            assert_eq!(tank.health, tank.max_health());
        }
    }

    #[test]
    fn when_removing_tank_then_owned_entities_are_removed() {
        let mut store = store();
        let a = store.spawn_tank(TankClass::Sentinel);
        let b = store.spawn_tank(TankClass::Sentinel);
        store.add_effect(a, 3.0, EffectPayload::Shield);
        store.add_effect(b, 3.0, EffectPayload::Shield);
        store.tank_mut(b).expect("tank b").last_hit_by = Some(a);

        let removed = store.remove_tank(a);
        assert!(removed.is_some());
        assert!(store.tank(a).is_none());
        assert!(store.effects.iter().all(|e| e.owner_id == b));
        assert_eq!(store.tank(b).expect("tank b").last_hit_by, None);
        assert!(store.remove_tank(a).is_none());
    }

    #[test]
    fn when_effects_are_retained_then_tank_links_follow() {
        let mut store = store();
        let a = store.spawn_tank(TankClass::Sentinel);
        let shield = store.add_effect(a, 3.0, EffectPayload::Shield);
        let homing = store.add_effect(a, 3.0, EffectPayload::Homing);
        assert_eq!(store.tank(a).expect("tank").effects, vec![shield, homing]);

        store.retain_effects(|e| e.id != shield);
        assert_eq!(store.tank(a).expect("tank").effects, vec![homing]);
    }

    #[test]
    fn when_resize_is_valid_then_tanks_are_clamped_inside() {
        let mut store = store();
        let id = store.spawn_tank_at(TankClass::Sentinel, Vec2::new(900.0, 900.0));

        let arena = store.resize_arena(400.0, 300.0).expect("valid resize");
        assert_eq!((arena.width(), arena.height()), (400.0, 300.0));
        let pos = store.tank(id).expect("tank").position;
        assert_eq!(pos, Vec2::new(380.0, 280.0));

        assert!(store.resize_arena(-1.0, 300.0).is_err());
        assert_eq!(store.arena().width(), 400.0);
    }

    #[test]
    fn when_tank_is_eliminated_then_snapshot_lists_it_separately() {
        let mut store = store();
        let a = store.spawn_tank(TankClass::Sentinel);
        let b = store.spawn_tank(TankClass::Shredder);
        store.tank_mut(b).expect("tank b").alive = false;

        let snapshot = store.snapshot();
        assert!(snapshot.tank(a).is_some());
        assert!(snapshot.tank(b).is_none());
        assert_eq!(snapshot.eliminated.len(), 1);
        assert_eq!(snapshot.eliminated[0].id, b);
    }

    #[test]
    fn when_clock_advances_then_time_follows_tick_count() {
        let mut store = store();
        for _ in 0..30 {
            store.advance_clock(1.0 / 30.0);
        }
        assert_eq!(store.tick(), 30);
        assert!((store.now() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn when_uptime_is_days_long_then_every_tick_still_advances_time() {
        let mut store = store();
        let dt = 1.0 / 30.0;
        // Past the point where an f32 clock stops resolving a 30 Hz step.
        store.tick = 1 << 24;
        let mut last = store.now();
        for _ in 0..8 {
            store.advance_clock(dt);
            let step = store.now() - last;
            assert!((step - f64::from(dt)).abs() < 1e-6, "step {step}");
            last = store.now();
        }

        // Effects created this late still expire on the tick their duration ends.
        let owner = store.spawn_tank(TankClass::Sentinel);
        store.add_effect(owner, 0.1, EffectPayload::Shield);
        store.advance_clock(dt);
        store.advance_clock(dt);
        assert!(!store.effects[0].is_expired(store.now()));
        store.advance_clock(dt);
        assert!(store.effects[0].is_expired(store.now()));
    }
}
