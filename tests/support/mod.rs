// Shared server bootstrap and socket helpers for integration tests.
#![allow(dead_code)]

use futures_util::StreamExt;
use serde_json::Value;
use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// Base URL published once the server thread has bound its port.
static SERVER_URL: OnceLock<String> = OnceLock::new();
static SERVER_READY: OnceLock<()> = OnceLock::new();

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Starts the arena server once per test binary and returns its base URL.
pub fn ensure_server() -> &'static str {
    SERVER_READY.get_or_init(|| {
        let published_url = Arc::new(OnceLock::<String>::new());
        let published_url_thread = Arc::clone(&published_url);
        // Own OS thread + runtime so the server outlives each `#[tokio::test]` runtime.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                // Ephemeral port avoids collisions with a locally running server.
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_url_thread.set(format!("http://{addr}"));
                arena_server::run(listener).await.expect("server failed");
            });
        });
        wait_for_server(published_url);
    });

    SERVER_URL
        .get()
        .expect("server url should be initialized")
        .as_str()
}

fn wait_for_server(published_url: Arc<OnceLock<String>>) {
    let base_url = loop {
        if let Some(url) = published_url.get() {
            break url.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };
    let _ = SERVER_URL.set(base_url.clone());

    let addr = base_url
        .strip_prefix("http://")
        .expect("base url should use http://");
    for _ in 0..100 {
        if std::net::TcpStream::connect(addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    panic!("server did not become ready in time");
}

/// Opens a socket to `/ws` with the given query string (without `?`).
pub async fn connect(query: &str) -> WsStream {
    let base = ensure_server().replacen("http://", "ws://", 1);
    let url = if query.is_empty() {
        format!("{base}/ws")
    } else {
        format!("{base}/ws?{query}")
    };
    let (ws, _response) = tokio_tungstenite::connect_async(url)
        .await
        .expect("websocket connect");
    ws
}

/// Next text frame parsed as JSON; control frames are skipped.
pub async fn next_json(ws: &mut WsStream) -> Value {
    loop {
        let msg = tokio::time::timeout(RECV_TIMEOUT, ws.next())
            .await
            .expect("frame before timeout")
            .expect("stream open")
            .expect("frame ok");
        match msg {
            Message::Text(text) => return serde_json::from_str(&text).expect("server sends json"),
            Message::Close(frame) => panic!("socket closed: {frame:?}"),
            _ => continue,
        }
    }
}

/// Reads updates until one satisfies `pred`, giving up after `max_frames`.
pub async fn update_where<F>(ws: &mut WsStream, max_frames: usize, pred: F) -> Value
where
    F: Fn(&Value) -> bool,
{
    for _ in 0..max_frames {
        let msg = next_json(ws).await;
        assert_eq!(msg["type"], "update", "only updates follow the welcome");
        if pred(&msg) {
            return msg;
        }
    }
    panic!("no matching update within {max_frames} frames");
}
