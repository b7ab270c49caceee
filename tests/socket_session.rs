mod support;

use futures_util::SinkExt;
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;

fn find_tank<'a>(snapshot: &'a Value, id: &str) -> Option<&'a Value> {
    snapshot["tanks"]
        .as_array()?
        .iter()
        .find(|t| t["id"] == id)
}

async fn send(ws: &mut support::WsStream, msg: Value) {
    ws.send(Message::Text(msg.to_string().into()))
        .await
        .expect("send");
}

#[tokio::test]
async fn when_player_connects_then_welcome_contains_its_tank() {
    let mut ws = support::connect("class=juggernaut").await;
    let welcome = support::next_json(&mut ws).await;

    assert_eq!(welcome["type"], "welcome");
    let id = welcome["id"].as_str().expect("string id").to_string();
    let tank = find_tank(&welcome["snapshot"], &id).expect("own tank in snapshot");
    assert_eq!(tank["class"], "juggernaut");
    assert_eq!(tank["health"], tank["max_health"]);
}

#[tokio::test]
async fn when_spectator_connects_then_id_is_null() {
    let mut ws = support::connect("spectate=true").await;
    let welcome = support::next_json(&mut ws).await;
    assert_eq!(welcome["type"], "welcome");
    assert!(welcome["id"].is_null());
}

#[tokio::test]
async fn when_player_shoots_then_projectile_appears_in_updates() {
    let mut ws = support::connect("class=sentinel").await;
    let welcome = support::next_json(&mut ws).await;
    let id = welcome["id"].as_str().expect("string id").to_string();

    send(&mut ws, json!({"type": "shoot"})).await;

    let update = support::update_where(&mut ws, 60, |u| {
        u["projectiles"]
            .as_array()
            .is_some_and(|ps| ps.iter().any(|p| p["owner_id"] == id.as_str()))
    })
    .await;
    assert!(update["tick"].as_u64().expect("tick") > welcome["snapshot"]["tick"].as_u64().expect("tick"));
}

#[tokio::test]
async fn when_message_is_malformed_then_connection_stays_open() {
    let mut ws = support::connect("").await;
    let welcome = support::next_json(&mut ws).await;
    let id = welcome["id"].as_str().expect("string id").to_string();

    ws.send(Message::Text("{not json".into())).await.expect("send");
    send(&mut ws, json!({"type": "activate", "ability": "laser"})).await;
    send(&mut ws, json!({"type": "move", "moving": false, "direction": 90.0})).await;

    support::update_where(&mut ws, 60, |u| {
        find_tank(u, &id).is_some_and(|t| t["heading"] == 90.0)
    })
    .await;
}

#[tokio::test]
async fn when_many_malformed_frames_arrive_then_connection_stays_open() {
    let mut ws = support::connect("class=guardian").await;
    let welcome = support::next_json(&mut ws).await;
    let id = welcome["id"].as_str().expect("string id").to_string();

    for i in 0..25 {
        ws.send(Message::Text(format!("{{bad frame {i}").into()))
            .await
            .expect("send");
    }
    ws.send(Message::Binary(vec![0xde, 0xad, 0xbe, 0xef].into()))
        .await
        .expect("send");
    send(&mut ws, json!({"type": "move", "moving": false, "direction": 135.0})).await;

    // next_json panics on a close frame, so reaching the turn proves the socket survived.
    support::update_where(&mut ws, 90, |u| {
        find_tank(u, &id).is_some_and(|t| t["heading"] == 135.0)
    })
    .await;
}

#[tokio::test]
async fn when_updates_stream_then_ticks_strictly_increase() {
    let mut ws = support::connect("spectate=true").await;
    let welcome = support::next_json(&mut ws).await;
    let mut last = welcome["snapshot"]["tick"].as_u64().expect("tick");

    for _ in 0..10 {
        let update = support::next_json(&mut ws).await;
        let tick = update["tick"].as_u64().expect("tick");
        assert!(tick > last, "tick {tick} after {last}");
        last = tick;
    }
}

#[tokio::test]
async fn when_player_disconnects_then_tank_leaves_the_world() {
    let mut watcher = support::connect("spectate=true").await;
    support::next_json(&mut watcher).await;

    let mut ws = support::connect("class=shredder").await;
    let welcome = support::next_json(&mut ws).await;
    let id = welcome["id"].as_str().expect("string id").to_string();

    support::update_where(&mut watcher, 60, |u| find_tank(u, &id).is_some()).await;
    ws.close(None).await.expect("close");

    support::update_where(&mut watcher, 120, |u| {
        find_tank(u, &id).is_none()
            && u["eliminated"]
                .as_array()
                .is_some_and(|e| e.iter().all(|t| t["id"] != id.as_str()))
    })
    .await;
}
