// Wire protocol DTOs and conversions for public arena server messages.
// Admin HTTP payloads live with their handler in `net::admin`.

use crate::domain::{
    AbilityKind, EffectPayload, EliminatedSnapshot, Explosion, PlayerIntent, ProjectileSnapshot,
    SpecialistEffect, TankClass, TankSnapshot, Vec2, WorldSnapshot,
};
use serde::{Deserialize, Serialize};

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    // Sent once, right after the join is accepted. `id` is null for spectators.
    Welcome {
        id: Option<String>,
        snapshot: SnapshotDto,
    },
    // Full world state for one tick, fields flattened next to `type`.
    Update(SnapshotDto),
}

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Move {
        moving: bool,
        /// Degrees; 0 points along +x.
        direction: f32,
    },
    Shoot,
    Activate {
        ability: AbilityDto,
        #[serde(default)]
        target: Option<PointDto>,
    },
}

impl From<ClientMessage> for PlayerIntent {
    fn from(msg: ClientMessage) -> Self {
        match msg {
            ClientMessage::Move { moving, direction } => PlayerIntent::Move { moving, direction },
            ClientMessage::Shoot => PlayerIntent::Shoot,
            ClientMessage::Activate { ability, target } => PlayerIntent::Activate {
                ability: ability.into(),
                target: target.map(Vec2::from),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointDto {
    pub x: f32,
    pub y: f32,
}

impl From<PointDto> for Vec2 {
    fn from(p: PointDto) -> Self {
        Vec2::new(p.x, p.y)
    }
}

impl From<Vec2> for PointDto {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TankClassDto {
    Sentinel,
    Guardian,
    Juggernaut,
    Shredder,
    Thunderbolt,
}

impl From<TankClassDto> for TankClass {
    fn from(class: TankClassDto) -> Self {
        match class {
            TankClassDto::Sentinel => TankClass::Sentinel,
            TankClassDto::Guardian => TankClass::Guardian,
            TankClassDto::Juggernaut => TankClass::Juggernaut,
            TankClassDto::Shredder => TankClass::Shredder,
            TankClassDto::Thunderbolt => TankClass::Thunderbolt,
        }
    }
}

impl From<TankClass> for TankClassDto {
    fn from(class: TankClass) -> Self {
        match class {
            TankClass::Sentinel => TankClassDto::Sentinel,
            TankClass::Guardian => TankClassDto::Guardian,
            TankClass::Juggernaut => TankClassDto::Juggernaut,
            TankClass::Shredder => TankClassDto::Shredder,
            TankClass::Thunderbolt => TankClassDto::Thunderbolt,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbilityDto {
    Dash,
    Shield,
    Homing,
    Decoy,
    Aoe,
}

impl From<AbilityDto> for AbilityKind {
    fn from(ability: AbilityDto) -> Self {
        match ability {
            AbilityDto::Dash => AbilityKind::Dash,
            AbilityDto::Shield => AbilityKind::Shield,
            AbilityDto::Homing => AbilityKind::Homing,
            AbilityDto::Decoy => AbilityKind::Decoy,
            AbilityDto::Aoe => AbilityKind::Aoe,
        }
    }
}

impl From<AbilityKind> for AbilityDto {
    fn from(kind: AbilityKind) -> Self {
        match kind {
            AbilityKind::Dash => AbilityDto::Dash,
            AbilityKind::Shield => AbilityDto::Shield,
            AbilityKind::Homing => AbilityDto::Homing,
            AbilityKind::Decoy => AbilityDto::Decoy,
            AbilityKind::Aoe => AbilityDto::Aoe,
        }
    }
}

/// Snapshot of the world sent to clients on each tick.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotDto {
    pub tick: u64,
    pub arena: ArenaDto,
    pub tanks: Vec<TankDto>,
    pub eliminated: Vec<EliminatedDto>,
    pub projectiles: Vec<ProjectileDto>,
    pub effects: Vec<EffectDto>,
    pub explosions: Vec<ExplosionDto>,
}

impl From<&WorldSnapshot> for SnapshotDto {
    fn from(snapshot: &WorldSnapshot) -> Self {
        Self {
            tick: snapshot.tick,
            arena: ArenaDto {
                width: snapshot.arena_width,
                height: snapshot.arena_height,
            },
            tanks: snapshot.tanks.iter().map(TankDto::from).collect(),
            eliminated: snapshot.eliminated.iter().map(EliminatedDto::from).collect(),
            projectiles: snapshot
                .projectiles
                .iter()
                .map(ProjectileDto::from)
                .collect(),
            effects: snapshot.effects.iter().map(EffectDto::from).collect(),
            explosions: snapshot.explosions.iter().map(ExplosionDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaDto {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TankDto {
    pub id: String,
    pub class: TankClassDto,
    pub x: f32,
    pub y: f32,
    pub heading: f32,
    pub health: i32,
    pub max_health: i32,
    pub score: u32,
    pub moving: bool,
    pub effects: Vec<String>,
}

impl From<&TankSnapshot> for TankDto {
    fn from(tank: &TankSnapshot) -> Self {
        Self {
            id: tank.id.to_string(),
            class: tank.class.into(),
            x: tank.position.x,
            y: tank.position.y,
            heading: tank.heading,
            health: tank.health,
            max_health: tank.max_health,
            score: tank.score,
            moving: tank.moving,
            effects: tank.effects.iter().map(u64::to_string).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EliminatedDto {
    pub id: String,
    pub class: TankClassDto,
    pub score: u32,
    pub respawn_in: f32,
}

impl From<&EliminatedSnapshot> for EliminatedDto {
    fn from(tank: &EliminatedSnapshot) -> Self {
        Self {
            id: tank.id.to_string(),
            class: tank.class.into(),
            score: tank.score,
            respawn_in: tank.respawn_in,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectileDto {
    pub id: String,
    pub owner_id: String,
    pub class: TankClassDto,
    pub x: f32,
    pub y: f32,
    pub heading: f32,
    pub radius: f32,
    pub homing: bool,
}

impl From<&ProjectileSnapshot> for ProjectileDto {
    fn from(p: &ProjectileSnapshot) -> Self {
        Self {
            id: p.id.to_string(),
            owner_id: p.owner_id.to_string(),
            class: p.class.into(),
            x: p.position.x,
            y: p.position.y,
            heading: p.heading,
            radius: p.radius,
            homing: p.homing,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EffectDto {
    pub id: String,
    pub owner_id: String,
    pub kind: AbilityDto,
    pub created_at: f64,
    pub duration: f32,
    pub payload: EffectPayloadDto,
}

/// Kind-specific data; `null` for kinds that carry none.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum EffectPayloadDto {
    Dash {
        speed_multiplier: f32,
        invulnerable_for: f32,
    },
    Decoy {
        positions: Vec<PointDto>,
    },
    Aoe {
        center: PointDto,
        radius: f32,
        damage: i32,
        delay: f32,
        detonated: bool,
    },
    None,
}

impl From<&SpecialistEffect> for EffectDto {
    fn from(effect: &SpecialistEffect) -> Self {
        let payload = match &effect.payload {
            EffectPayload::Dash {
                speed_multiplier,
                invulnerable_for,
            } => EffectPayloadDto::Dash {
                speed_multiplier: *speed_multiplier,
                invulnerable_for: *invulnerable_for,
            },
            EffectPayload::Decoy { positions } => EffectPayloadDto::Decoy {
                positions: positions.iter().copied().map(PointDto::from).collect(),
            },
            EffectPayload::Aoe {
                center,
                radius,
                damage,
                delay,
                detonated,
            } => EffectPayloadDto::Aoe {
                center: (*center).into(),
                radius: *radius,
                damage: *damage,
                delay: *delay,
                detonated: *detonated,
            },
            EffectPayload::Shield | EffectPayload::Homing => EffectPayloadDto::None,
        };
        Self {
            id: effect.id.to_string(),
            owner_id: effect.owner_id.to_string(),
            kind: effect.kind().into(),
            created_at: effect.created_at,
            duration: effect.duration,
            payload,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExplosionDto {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub created_at: f64,
    pub duration: f32,
}

impl From<&Explosion> for ExplosionDto {
    fn from(e: &Explosion) -> Self {
        Self {
            id: e.id.to_string(),
            x: e.position.x,
            y: e.position.y,
            radius: e.radius,
            created_at: e.created_at,
            duration: e.duration,
        }
    }
}
