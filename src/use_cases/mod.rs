// Use cases layer: application workflows for the arena server.

pub mod arena;
pub mod game;
pub mod types;

pub use arena::{ArenaClosed, ArenaHandle, ArenaSettings, ResizeError};
pub use types::{GameEvent, JoinRole, Welcome, WorldFrame, WorldUpdate};
