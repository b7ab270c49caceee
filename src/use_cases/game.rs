use super::types::{GameEvent, JoinRole, Welcome, WorldUpdate};
use crate::domain::systems::{abilities, combat, input, movement, weapons};
use crate::domain::{Arena, EntityStore, RulesTuning, TankId};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace, warn};

const LOG_THROTTLE: Duration = Duration::from_secs(2);

/// The authoritative world: entity store plus the fixed tick step.
pub struct Simulation {
    store: EntityStore,
    rules: RulesTuning,
    dt: f32,
}

impl Simulation {
    pub fn new(arena: Arena, rules: RulesTuning, seed: u64, tick_interval: Duration) -> Self {
        Self {
            store: EntityStore::new(arena, seed),
            rules,
            dt: tick_interval.as_secs_f32(),
        }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }

    pub fn rules(&self) -> &RulesTuning {
        &self.rules
    }

    /// Runs one tick over `events` (in arrival order) and returns its snapshot.
    ///
    /// Join replies are sent after the snapshot is taken so a new client's
    /// welcome already contains its tank.
    pub fn step<I>(&mut self, events: I) -> WorldUpdate
    where
        I: IntoIterator<Item = GameEvent>,
    {
        let dt = self.dt;
        self.store.advance_clock(dt);
        combat::tick_timers(&mut self.store, dt);

        let mut welcomes = Vec::new();
        for event in events {
            self.handle_event(event, &mut welcomes);
        }

        movement::move_tanks(&mut self.store, dt);
        movement::move_projectiles(&mut self.store, &self.rules, dt);
        weapons::expire_projectiles(&mut self.store, &self.rules);
        abilities::resolve_effects(&mut self.store, &self.rules);
        combat::resolve_collisions(&mut self.store, &self.rules);
        combat::expire_explosions(&mut self.store);

        let update: WorldUpdate = Arc::new(self.store.snapshot());

        for (tank_id, reply) in welcomes {
            let welcome = Welcome {
                tank_id,
                snapshot: update.clone(),
            };
            if reply.send(welcome).is_err() {
                // The connection gave up before its welcome; release the tank.
                if let Some(id) = tank_id {
                    self.store.remove_tank(id);
                    debug!(player_id = id, "join abandoned; tank released");
                }
            }
        }

        update
    }

    fn handle_event(
        &mut self,
        event: GameEvent,
        welcomes: &mut Vec<(Option<TankId>, oneshot::Sender<Welcome>)>,
    ) {
        match event {
            GameEvent::Join { role, reply } => {
                let tank_id = match role {
                    JoinRole::Player(class) => {
                        let id = self.store.spawn_tank(class);
                        info!(player_id = id, ?class, "player joined");
                        Some(id)
                    }
                    JoinRole::Spectator => {
                        info!("spectator joined");
                        None
                    }
                };
                welcomes.push((tank_id, reply));
            }
            GameEvent::Leave { player_id } => {
                if self.store.remove_tank(player_id).is_some() {
                    info!(player_id, "player left");
                }
            }
            GameEvent::Input { player_id, intent } => {
                if !input::apply_intent(&mut self.store, &self.rules, player_id, &intent) {
                    trace!(player_id, ?intent, "intent rejected");
                }
            }
            GameEvent::ResizeArena {
                width,
                height,
                reply,
            } => {
                let result = self.store.resize_arena(width, height);
                match &result {
                    Ok(_) => info!(width, height, "arena resized"),
                    Err(e) => warn!(error = %e, "arena resize rejected"),
                }
                let _ = reply.send(result);
            }
        }
    }
}

/// Drives the simulation at a fixed rate and publishes one update per tick.
pub async fn world_task(
    mut input_rx: mpsc::Receiver<GameEvent>,
    world_tx: broadcast::Sender<WorldUpdate>,
    mut sim: Simulation,
    tick_interval: Duration,
) {
    // Late ticks fire back-to-back on the nominal schedule; no step is dropped.
    let mut interval = tokio::time::interval(tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Burst);

    let mut last_overrun_log: Option<Instant> = None;

    loop {
        interval.tick().await;
        let started = Instant::now();

        // Only what arrived before this boundary; later events wait a tick.
        let pending = input_rx.len();
        let mut events = Vec::with_capacity(pending);
        for _ in 0..pending {
            match input_rx.try_recv() {
                Ok(event) => events.push(event),
                Err(_) => break,
            }
        }

        let update = sim.step(events);
        let tick = update.tick;
        // No receivers is fine; nobody may be watching yet.
        let _ = world_tx.send(update);

        let elapsed = started.elapsed();
        let throttled = last_overrun_log.is_some_and(|at| at.elapsed() < LOG_THROTTLE);
        if elapsed > tick_interval && !throttled {
            last_overrun_log = Some(Instant::now());
            warn!(
                tick,
                elapsed_ms = elapsed.as_millis() as u64,
                budget_ms = tick_interval.as_millis() as u64,
                "tick overran its budget"
            );
        }

        if input_rx.is_closed() && input_rx.is_empty() {
            info!(tick, "input channel closed; world task exiting");
            break;
        }
    }
}
