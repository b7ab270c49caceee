// Arena orchestration: spawns the world task and exposes its channels.

use crate::domain::{Arena, ArenaError, RulesTuning};
use crate::use_cases::game::{Simulation, world_task};
use crate::use_cases::{GameEvent, JoinRole, Welcome, WorldFrame, WorldUpdate};
use std::fmt;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot, watch};

/// Settings for spawning the arena world.
#[derive(Debug, Clone)]
pub struct ArenaSettings {
    /// Capacity for inbound player events.
    pub input_channel_capacity: usize,
    /// Capacity for broadcast world updates.
    pub world_broadcast_capacity: usize,
    /// Fixed tick interval for the game loop.
    pub tick_interval: Duration,
    /// Initial arena bounds.
    pub arena: Arena,
    /// Seed for spawn and decoy placement.
    pub seed: u64,
    pub rules: RulesTuning,
}

/// The world task has stopped; nothing will answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaClosed;

impl fmt::Display for ArenaClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("arena world task is not running")
    }
}

impl std::error::Error for ArenaClosed {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeError {
    Invalid(ArenaError),
    Closed,
}

impl fmt::Display for ResizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResizeError::Invalid(e) => e.fmt(f),
            ResizeError::Closed => ArenaClosed.fmt(f),
        }
    }
}

impl std::error::Error for ResizeError {}

impl From<ArenaClosed> for ResizeError {
    fn from(_: ArenaClosed) -> Self {
        ResizeError::Closed
    }
}

/// Channels into and out of the arena world task.
#[derive(Clone)]
pub struct ArenaHandle {
    /// Sender for game events into the world task.
    pub input_tx: mpsc::Sender<GameEvent>,
    /// Broadcast sender for raw world updates.
    pub world_tx: broadcast::Sender<WorldUpdate>,
    /// Broadcast sender for serialized world updates.
    pub world_bytes_tx: broadcast::Sender<WorldFrame>,
    /// Watch sender holding the latest serialized world update.
    pub world_latest_tx: watch::Sender<WorldFrame>,
}

impl ArenaHandle {
    /// Wires the channels and spawns the authoritative world loop.
    pub fn spawn(settings: ArenaSettings) -> Self {
        let (input_tx, input_rx) = mpsc::channel::<GameEvent>(settings.input_channel_capacity);
        let (world_tx, _world_rx) =
            broadcast::channel::<WorldUpdate>(settings.world_broadcast_capacity);
        let (world_bytes_tx, _world_bytes_rx) =
            broadcast::channel::<WorldFrame>(settings.world_broadcast_capacity);
        let (world_latest_tx, _world_latest_rx) = watch::channel(WorldFrame::empty());

        let sim = Simulation::new(
            settings.arena,
            settings.rules,
            settings.seed,
            settings.tick_interval,
        );
        tokio::spawn(world_task(
            input_rx,
            world_tx.clone(),
            sim,
            settings.tick_interval,
        ));

        Self {
            input_tx,
            world_tx,
            world_bytes_tx,
            world_latest_tx,
        }
    }

    /// Queues a join for the next tick and waits for the welcome.
    pub async fn join(&self, role: JoinRole) -> Result<Welcome, ArenaClosed> {
        let (reply, rx) = oneshot::channel();
        self.input_tx
            .send(GameEvent::Join { role, reply })
            .await
            .map_err(|_| ArenaClosed)?;
        rx.await.map_err(|_| ArenaClosed)
    }

    /// Resizes the arena at the next tick boundary.
    pub async fn resize(&self, width: f32, height: f32) -> Result<Arena, ResizeError> {
        let (reply, rx) = oneshot::channel();
        self.input_tx
            .send(GameEvent::ResizeArena {
                width,
                height,
                reply,
            })
            .await
            .map_err(|_| ArenaClosed)?;
        rx.await
            .map_err(|_| ArenaClosed)?
            .map_err(ResizeError::Invalid)
    }
}
