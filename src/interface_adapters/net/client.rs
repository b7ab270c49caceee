use crate::domain::{PlayerIntent, TankClass, TankId};
use crate::interface_adapters::protocol::{ClientMessage, ServerMessage, SnapshotDto, TankClassDto};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::rng::rand_id;
use crate::use_cases::{ArenaHandle, GameEvent, JoinRole, WorldFrame, WorldUpdate};

use axum::{
    Error,
    extract::{
        Query, State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures::SinkExt;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::timeout;
use tracing::{Instrument, debug, error, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    InputClosed,
    WorldUpdatesClosed,
    ArenaClosed,
    JoinTimeout,
    SendTimeout,
}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

#[derive(Debug, serde::Deserialize)]
pub struct ConnectQuery {
    // Tank class to spawn; defaults to sentinel.
    #[serde(default)]
    class: Option<TankClassDto>,
    // Watch without a tank.
    #[serde(default)]
    spectate: bool,
}

impl ConnectQuery {
    fn role(&self) -> JoinRole {
        if self.spectate {
            JoinRole::Spectator
        } else {
            JoinRole::Player(self.class.map(TankClass::from).unwrap_or(TankClass::Sentinel))
        }
    }
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const JOIN_TIMEOUT: Duration = Duration::from_secs(5);
// A client that cannot take a frame within this window is dropped.
const SEND_TIMEOUT: Duration = Duration::from_secs(2);

pub async fn world_update_serializer(
    mut world_rx: broadcast::Receiver<WorldUpdate>,
    world_bytes_tx: broadcast::Sender<WorldFrame>,
    world_latest_tx: watch::Sender<WorldFrame>,
) {
    // Serialize each world update once and broadcast the shared bytes.
    loop {
        match world_rx.recv().await {
            Ok(update) => {
                let msg = ServerMessage::Update(SnapshotDto::from(&*update));
                let txt = match serde_json::to_string(&msg) {
                    Ok(txt) => txt,
                    Err(e) => {
                        error!(error = ?e, tick = update.tick, "failed to serialize world update");
                        continue;
                    }
                };

                let frame = WorldFrame {
                    tick: update.tick,
                    bytes: Utf8Bytes::from(txt),
                };
                // Store the latest frame for lag recovery.
                let _ = world_latest_tx.send(frame.clone());
                let _ = world_bytes_tx.send(frame);
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(
                    missed = n,
                    "world serializer lagged; skipping to latest update"
                );
            }
            Err(broadcast::error::RecvError::Closed) => {
                warn!("world updates channel closed; serializer exiting");
                break;
            }
        }
    }
}

pub fn spawn_arena_serializer(arena: &ArenaHandle) {
    tokio::spawn(world_update_serializer(
        arena.world_tx.subscribe(),
        arena.world_bytes_tx.clone(),
        arena.world_latest_tx.clone(),
    ));
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> impl IntoResponse {
    let role = query.role();
    let arena = state.arena.clone();
    ws.on_upgrade(move |socket| {
        // Separate connection id for correlating logs before/after a player_id exists.
        let conn_id = rand_id();
        let span = info_span!("conn", conn_id, player_id = tracing::field::Empty);
        handle_socket(socket, arena, role, span.clone()).instrument(span)
    })
}

async fn handle_socket(
    mut socket: WebSocket,
    arena: ArenaHandle,
    role: JoinRole,
    span: tracing::Span,
) {
    let mut ctx = match bootstrap_connection(&mut socket, &arena, role).await {
        Ok(ctx) => ctx,
        Err(e) => {
            error!(error = ?e, "failed to bootstrap connection");
            let _ = send_close_with_reason(&mut socket, close_code::AGAIN, "arena unavailable")
                .await;
            return;
        }
    };

    if let Some(player_id) = ctx.player_id {
        span.record("player_id", player_id);
    }
    info!(
        player_id = ctx.player_id,
        spectator = ctx.player_id.is_none(),
        "client connected"
    );

    // Main Client Loop
    if let Err(e) = run_client_loop(&mut socket, &mut ctx).await {
        warn!(error = ?e, "client loop exited with error");
    }
}

/// Sends one frame, treating a stalled peer as a failed send.
async fn send_with_timeout(socket: &mut WebSocket, msg: Message) -> Result<(), NetError> {
    match timeout(SEND_TIMEOUT, socket.send(msg)).await {
        Ok(result) => result.map_err(NetError::Ws),
        Err(_) => Err(NetError::SendTimeout),
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<usize, NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    let bytes = txt.len();
    send_with_timeout(socket, Message::Text(txt.into())).await?;
    Ok(bytes)
}

struct ConnCtx {
    // `None` for spectators.
    pub player_id: Option<TankId>,
    pub input_tx: mpsc::Sender<GameEvent>,
    pub world_bytes_rx: broadcast::Receiver<WorldFrame>,
    pub world_latest_rx: watch::Receiver<WorldFrame>,
    // Highest tick already delivered; older frames are skipped.
    pub last_tick: u64,
    // Count lag recovery snapshots sent to this client.
    pub lag_recovery_count: u64,

    pub msgs_in: u64,
    pub msgs_out: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,

    pub invalid_json: u32,

    pub last_input_full_log: Option<Instant>,
    pub last_world_lag_log: Option<Instant>,
    pub last_invalid_input_log: Option<Instant>,
}

async fn bootstrap_connection(
    socket: &mut WebSocket,
    arena: &ArenaHandle,
    role: JoinRole,
) -> Result<ConnCtx, NetError> {
    // Subscribe before joining so no tick after the welcome is missed.
    let world_bytes_rx = arena.world_bytes_tx.subscribe();
    let world_latest_rx = arena.world_latest_tx.subscribe();

    let welcome = match timeout(JOIN_TIMEOUT, arena.join(role)).await {
        Ok(result) => result.map_err(|_| NetError::ArenaClosed)?,
        Err(_) => return Err(NetError::JoinTimeout),
    };
    let player_id = welcome.tank_id;
    let last_tick = welcome.snapshot.tick;

    let welcome_msg = ServerMessage::Welcome {
        id: player_id.map(|id| id.to_string()),
        snapshot: SnapshotDto::from(&*welcome.snapshot),
    };
    let bytes_out = match send_message(socket, &welcome_msg).await {
        Ok(bytes) => bytes as u64,
        Err(err) => {
            // The tank is already in the world; take it back out.
            if let Some(player_id) = player_id {
                let _ = arena.input_tx.send(GameEvent::Leave { player_id }).await;
            }
            return Err(err);
        }
    };

    Ok(ConnCtx {
        player_id,
        input_tx: arena.input_tx.clone(),
        world_bytes_rx,
        world_latest_rx,
        last_tick,
        lag_recovery_count: 0,

        msgs_in: 0,
        msgs_out: 1,
        bytes_in: 0,
        bytes_out,

        invalid_json: 0,

        last_input_full_log: None,
        last_world_lag_log: None,
        last_invalid_input_log: None,
    })
}

enum LoopControl {
    Continue,
    Disconnect,
}

async fn send_close_with_reason(
    socket: &mut WebSocket,
    code: u16,
    reason: &'static str,
) -> Result<(), NetError> {
    send_with_timeout(
        socket,
        Message::Close(Some(CloseFrame {
            code,
            reason: reason.into(),
        })),
    )
    .await?;
    socket.close().await.map_err(NetError::Ws)
}

fn should_log(last: &mut Option<Instant>) -> bool {
    match last {
        Some(at) if at.elapsed() < LOG_THROTTLE => false,
        _ => {
            *last = Some(Instant::now());
            true
        }
    }
}

/// Drops intents carrying NaN/inf; the simulation never sees them.
fn sanitize_intent(intent: PlayerIntent) -> Option<PlayerIntent> {
    match intent {
        PlayerIntent::Move { direction, .. } if !direction.is_finite() => None,
        PlayerIntent::Activate {
            ability,
            target: Some(target),
        } if !target.is_finite() => Some(PlayerIntent::Activate {
            ability,
            target: None,
        }),
        other => Some(other),
    }
}

fn process_intent(
    player_id: TankId,
    input_tx: &mpsc::Sender<GameEvent>,
    intent: PlayerIntent,
    last_input_full_log: &mut Option<Instant>,
    last_invalid_input_log: &mut Option<Instant>,
) -> Result<LoopControl, NetError> {
    let Some(intent) = sanitize_intent(intent) else {
        if should_log(last_invalid_input_log) {
            warn!(player_id, "invalid intent values (NaN/inf); dropping");
        }
        return Ok(LoopControl::Continue);
    };

    match input_tx.try_send(GameEvent::Input { player_id, intent }) {
        Ok(()) => Ok(LoopControl::Continue),
        Err(mpsc::error::TrySendError::Full(_evt)) => {
            if should_log(last_input_full_log) {
                warn!(player_id, "input channel full; dropping intent");
            }
            Ok(LoopControl::Continue)
        }
        Err(mpsc::error::TrySendError::Closed(_evt)) => Err(NetError::InputClosed),
    }
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    let player_id = ctx.player_id;

    // Split borrows so `tokio::select!` can hold them concurrently.
    let ConnCtx {
        input_tx,
        world_bytes_rx,
        world_latest_rx,
        last_tick,
        lag_recovery_count,
        msgs_in,
        msgs_out,
        bytes_in,
        bytes_out,
        invalid_json,
        last_input_full_log,
        last_world_lag_log,
        last_invalid_input_log,
        ..
    } = ctx;

    let mut fatal: Option<NetError> = None;

    loop {
        // disconnect becomes true on error
        let disconnect: bool = tokio::select! {
            // Incoming Message from Client
            incoming = socket.recv() => {
                match handle_incoming_ws(
                    incoming,
                    player_id,
                    input_tx,
                    msgs_in,
                    bytes_in,
                    invalid_json,
                    last_input_full_log,
                    last_invalid_input_log,
                ) {
                    Ok(LoopControl::Continue) => false,
                    Ok(LoopControl::Disconnect) => true,
                    Err(e) => {
                        fatal = Some(e);
                        true
                    }
                }
            }

            // Outgoing World Update
            world_msg = world_bytes_rx.recv() => {
                match world_msg {
                    Ok(frame) => match forward_world_frame(frame, socket, last_tick, msgs_out, bytes_out).await {
                        LoopControl::Continue => false,
                        LoopControl::Disconnect => true,
                    },
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        if should_log(last_world_lag_log) {
                            warn!(missed = n, "world updates lagged; sending snapshot");
                        }

                        // Resync strategy: send the latest world snapshot.
                        let latest = world_latest_rx.borrow().clone();
                        if latest.is_empty() {
                            false
                        } else {
                            *lag_recovery_count += 1;
                            let bytes_len = latest.bytes.len();
                            let outcome =
                                forward_world_frame(latest, socket, last_tick, msgs_out, bytes_out).await;
                            debug!(
                                bytes = bytes_len,
                                count = *lag_recovery_count,
                                "sent lag recovery snapshot"
                            );
                            match outcome {
                                LoopControl::Continue => false,
                                LoopControl::Disconnect => true,
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        fatal = Some(NetError::WorldUpdatesClosed);
                        true
                    }
                }
            }
        };

        if disconnect {
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = ?err, "socket close error");
            }
            break;
        }
    }

    if let Err(e) = disconnect_cleanup(
        player_id,
        input_tx,
        *msgs_in,
        *msgs_out,
        *bytes_in,
        *bytes_out,
        *invalid_json,
        *lag_recovery_count,
    )
    .await
    {
        warn!(error = ?e, "error during disconnect cleanup");
        if fatal.is_none() {
            fatal = Some(e);
        }
    }

    match fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_incoming_ws(
    incoming: Option<Result<Message, Error>>,
    player_id: Option<TankId>,
    input_tx: &mpsc::Sender<GameEvent>,
    msgs_in: &mut u64,
    bytes_in: &mut u64,
    invalid_json: &mut u32,
    last_input_full_log: &mut Option<Instant>,
    last_invalid_input_log: &mut Option<Instant>,
) -> Result<LoopControl, NetError> {
    match incoming {
        Some(Ok(msg)) => match msg {
            Message::Text(text) => {
                *msgs_in += 1;
                *bytes_in += text.len() as u64;

                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(msg) => {
                        let Some(player_id) = player_id else {
                            // Spectators cannot control tanks.
                            if should_log(last_invalid_input_log) {
                                warn!("spectator input ignored");
                            }
                            return Ok(LoopControl::Continue);
                        };
                        process_intent(
                            player_id,
                            input_tx,
                            msg.into(),
                            last_input_full_log,
                            last_invalid_input_log,
                        )
                    }
                    Err(parse_err) => {
                        // Dropped; the connection stays open.
                        *invalid_json += 1;
                        if should_log(last_invalid_input_log) {
                            warn!(
                                bytes = text.len(),
                                total = *invalid_json,
                                error = %parse_err,
                                "failed to parse client message"
                            );
                        }
                        Ok(LoopControl::Continue)
                    }
                }
            }
            Message::Binary(bytes) => {
                *msgs_in += 1;
                *bytes_in += bytes.len() as u64;
                *invalid_json += 1;
                if should_log(last_invalid_input_log) {
                    warn!(bytes = bytes.len(), "binary client message ignored");
                }
                Ok(LoopControl::Continue)
            }
            Message::Ping(_) | Message::Pong(_) => Ok(LoopControl::Continue),
            Message::Close(_) => Ok(LoopControl::Disconnect),
        },
        Some(Err(e)) => {
            warn!(error = %e, "websocket recv error");
            Ok(LoopControl::Disconnect)
        }
        None => {
            info!("websocket closed");
            Ok(LoopControl::Disconnect)
        }
    }
}

async fn forward_world_frame(
    frame: WorldFrame,
    socket: &mut WebSocket,
    last_tick: &mut u64,
    msgs_out: &mut u64,
    bytes_out: &mut u64,
) -> LoopControl {
    // Never send tick N after tick N+1, nor the welcome tick twice.
    if frame.tick <= *last_tick {
        return LoopControl::Continue;
    }

    let bytes_len = frame.bytes.len();
    match send_with_timeout(socket, Message::Text(frame.bytes)).await {
        Ok(()) => {
            *last_tick = frame.tick;
            *msgs_out += 1;
            *bytes_out += bytes_len as u64;
            LoopControl::Continue
        }
        Err(NetError::SendTimeout) => {
            warn!(tick = frame.tick, "client too slow; dropping connection");
            LoopControl::Disconnect
        }
        Err(err) => {
            // Log unexpected send failures; disconnect will follow immediately.
            warn!(error = ?err, "failed to send world update");
            LoopControl::Disconnect
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn disconnect_cleanup(
    player_id: Option<TankId>,
    input_tx: &mpsc::Sender<GameEvent>,
    msgs_in: u64,
    msgs_out: u64,
    bytes_in: u64,
    bytes_out: u64,
    invalid_json: u32,
    lag_recovery_count: u64,
) -> Result<(), NetError> {
    if let Some(player_id) = player_id {
        // Releases the tank plus everything it owns at the next tick.
        input_tx
            .send(GameEvent::Leave { player_id })
            .await
            .map_err(|_| NetError::InputClosed)?;
    }

    debug!(
        msgs_in,
        msgs_out,
        bytes_in,
        bytes_out,
        invalid_json,
        lag_recovery_count,
        "connection stats"
    );
    info!("client disconnected");
    Ok(())
}
