// Domain layer: core simulation types and rules.

pub mod arena;
pub mod state;
pub mod store;
pub mod systems;
pub mod tuning;
pub mod vector;

pub use arena::{Arena, ArenaError};
pub use state::{
    EffectPayload, EliminatedSnapshot, Explosion, PlayerIntent, ProjectileSnapshot,
    SpecialistEffect, TankId, TankSnapshot, WorldSnapshot,
};
pub use store::EntityStore;
pub use tuning::{AbilityKind, RulesTuning, TankClass};
pub use vector::Vec2;
