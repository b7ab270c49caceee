// Use-case level inputs/outputs for the game loop.

use crate::domain::{Arena, ArenaError, PlayerIntent, TankClass, TankId, WorldSnapshot};
use axum::extract::ws::Utf8Bytes;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Snapshot shared between the broadcast channel and welcome replies.
pub type WorldUpdate = Arc<WorldSnapshot>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinRole {
    Player(TankClass),
    /// Receives updates, never controls a tank.
    Spectator,
}

#[derive(Debug, Clone)]
pub struct Welcome {
    /// `None` for spectators.
    pub tank_id: Option<TankId>,
    pub snapshot: WorldUpdate,
}

#[derive(Debug)]
pub enum GameEvent {
    Join {
        role: JoinRole,
        reply: oneshot::Sender<Welcome>,
    },
    Leave {
        player_id: TankId,
    },
    Input {
        player_id: TankId,
        intent: PlayerIntent,
    },
    ResizeArena {
        width: f32,
        height: f32,
        reply: oneshot::Sender<Result<Arena, ArenaError>>,
    },
}

/// A serialized update shared by every connection.
///
/// The tick rides along so a connection can drop anything not newer than
/// what it already sent.
#[derive(Debug, Clone)]
pub struct WorldFrame {
    pub tick: u64,
    pub bytes: Utf8Bytes,
}

impl WorldFrame {
    /// Placeholder held by the latest-frame watch before the first tick.
    pub fn empty() -> Self {
        Self {
            tick: 0,
            bytes: Utf8Bytes::from(""),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
