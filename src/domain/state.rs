// Domain-level simulation entities and input/snapshot types.

use super::tuning::{AbilityKind, ClassTuning, TankClass, WeaponBehavior};
use super::vector::Vec2;

pub type TankId = u64;
pub type ProjectileId = u64;
pub type EffectId = u64;
pub type ExplosionId = u64;

/// Simulation clock in seconds. Wide enough that `tick * dt` keeps
/// sub-millisecond resolution for years of uptime.
pub type SimTime = f64;

/// Slack for comparing accumulated f32 seconds against tuning values.
pub const TIME_EPSILON: f32 = 1e-4;

/// Returns true once `elapsed` has reached `duration`.
pub fn has_elapsed(elapsed: f32, duration: f32) -> bool {
    elapsed + TIME_EPSILON >= duration
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveIntent {
    pub moving: bool,
    /// Degrees.
    pub direction: f32,
}

/// A validated client request, applied at the next tick boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerIntent {
    Move { moving: bool, direction: f32 },
    Shoot,
    Activate {
        ability: AbilityKind,
        target: Option<Vec2>,
    },
}

#[derive(Debug, Clone)]
pub struct Tank {
    pub id: TankId,
    pub class: TankClass,
    pub position: Vec2,
    /// Degrees; projectiles leave along this heading.
    pub heading: f32,
    pub health: i32,
    pub score: u32,

    // Movement-only state (not serialized to clients beyond `moving`).
    pub movement: MoveIntent,

    // Seconds until the next allowed use.
    pub fire_cooldown: f32,
    pub ability_cooldowns: [f32; 5],

    /// Effects currently owned by this tank, in activation order.
    pub effects: Vec<EffectId>,

    // Combat state.
    pub alive: bool,
    pub respawn_timer: f32,
    pub last_hit_by: Option<TankId>,
}

impl Tank {
    pub fn new(id: TankId, class: TankClass, position: Vec2) -> Self {
        Self {
            id,
            class,
            position,
            heading: 0.0,
            health: class.tuning().max_health,
            score: 0,
            movement: MoveIntent {
                moving: false,
                direction: 0.0,
            },
            fire_cooldown: 0.0,
            ability_cooldowns: [0.0; 5],
            effects: Vec::new(),
            alive: true,
            respawn_timer: 0.0,
            last_hit_by: None,
        }
    }

    pub fn tuning(&self) -> ClassTuning {
        self.class.tuning()
    }

    pub fn radius(&self) -> f32 {
        self.tuning().radius
    }

    pub fn max_health(&self) -> i32 {
        self.tuning().max_health
    }

    pub fn can_fire(&self) -> bool {
        self.fire_cooldown <= TIME_EPSILON
    }

    pub fn ability_ready(&self, kind: AbilityKind) -> bool {
        self.ability_cooldowns[kind.index()] <= TIME_EPSILON
    }
}

#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: ProjectileId,
    pub owner_id: TankId,
    pub class: TankClass,
    pub position: Vec2,
    /// Degrees.
    pub heading: f32,
    pub speed: f32,
    pub damage: i32,
    pub radius: f32,
    pub behavior: WeaponBehavior,
    pub spawn_tick: u64,
    /// Seconds left before expiry.
    pub ttl: f32,
    pub homing: bool,
    /// Tanks already hit by a piercing projectile.
    pub pierced: Vec<TankId>,
}

impl Projectile {
    pub fn is_expired(&self) -> bool {
        self.ttl <= TIME_EPSILON
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EffectPayload {
    Dash {
        speed_multiplier: f32,
        invulnerable_for: f32,
    },
    Shield,
    Homing,
    /// Phantom markers; broadcast only, never collide.
    Decoy { positions: Vec<Vec2> },
    /// Single delayed damage pulse.
    Aoe {
        center: Vec2,
        radius: f32,
        damage: i32,
        delay: f32,
        detonated: bool,
    },
}

impl EffectPayload {
    pub fn kind(&self) -> AbilityKind {
        match self {
            EffectPayload::Dash { .. } => AbilityKind::Dash,
            EffectPayload::Shield => AbilityKind::Shield,
            EffectPayload::Homing => AbilityKind::Homing,
            EffectPayload::Decoy { .. } => AbilityKind::Decoy,
            EffectPayload::Aoe { .. } => AbilityKind::Aoe,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpecialistEffect {
    pub id: EffectId,
    pub owner_id: TankId,
    /// Simulation seconds at activation.
    pub created_at: SimTime,
    pub duration: f32,
    pub payload: EffectPayload,
}

impl SpecialistEffect {
    pub fn kind(&self) -> AbilityKind {
        self.payload.kind()
    }

    /// Seconds since activation; small enough for `f32` tuning comparisons.
    pub fn elapsed(&self, now: SimTime) -> f32 {
        (now - self.created_at) as f32
    }

    /// Expiry is purely time-driven; nothing can shorten an effect.
    pub fn is_expired(&self, now: SimTime) -> bool {
        has_elapsed(self.elapsed(now), self.duration)
    }
}

/// Visual record only; irrelevant to collision.
#[derive(Debug, Clone, PartialEq)]
pub struct Explosion {
    pub id: ExplosionId,
    pub position: Vec2,
    pub radius: f32,
    pub created_at: SimTime,
    pub duration: f32,
}

impl Explosion {
    pub fn is_expired(&self, now: SimTime) -> bool {
        has_elapsed((now - self.created_at) as f32, self.duration)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TankSnapshot {
    pub id: TankId,
    pub class: TankClass,
    pub position: Vec2,
    pub heading: f32,
    pub health: i32,
    pub max_health: i32,
    pub score: u32,
    pub moving: bool,
    pub effects: Vec<EffectId>,
}

impl From<&Tank> for TankSnapshot {
    fn from(t: &Tank) -> Self {
        Self {
            id: t.id,
            class: t.class,
            position: t.position,
            heading: t.heading,
            health: t.health,
            max_health: t.max_health(),
            score: t.score,
            moving: t.movement.moving,
            effects: t.effects.clone(),
        }
    }
}

/// Tank waiting to respawn; kept out of the live list.
#[derive(Debug, Clone, PartialEq)]
pub struct EliminatedSnapshot {
    pub id: TankId,
    pub class: TankClass,
    pub score: u32,
    pub respawn_in: f32,
}

impl From<&Tank> for EliminatedSnapshot {
    fn from(t: &Tank) -> Self {
        Self {
            id: t.id,
            class: t.class,
            score: t.score,
            respawn_in: t.respawn_timer.max(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileSnapshot {
    pub id: ProjectileId,
    pub owner_id: TankId,
    pub class: TankClass,
    pub position: Vec2,
    pub heading: f32,
    pub radius: f32,
    pub homing: bool,
}

impl From<&Projectile> for ProjectileSnapshot {
    fn from(p: &Projectile) -> Self {
        Self {
            id: p.id,
            owner_id: p.owner_id,
            class: p.class,
            position: p.position,
            heading: p.heading,
            radius: p.radius,
            homing: p.homing,
        }
    }
}

/// Full world state at a tick boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub arena_width: f32,
    pub arena_height: f32,
    pub tanks: Vec<TankSnapshot>,
    pub eliminated: Vec<EliminatedSnapshot>,
    pub projectiles: Vec<ProjectileSnapshot>,
    pub effects: Vec<SpecialistEffect>,
    pub explosions: Vec<Explosion>,
}

impl WorldSnapshot {
    pub fn tank(&self, id: TankId) -> Option<&TankSnapshot> {
        self.tanks.iter().find(|t| t.id == id)
    }
}
