//! Realtime delivery over a live websocket.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use realty_client::MemoryStore;
use realty_gateway::{create_router, AppState, GatewayConfig};
use realty_proto::Envelope;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(5);

async fn spawn_gateway() -> SocketAddr {
    let state = AppState::new(Arc::new(MemoryStore::new()), GatewayConfig::default());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, create_router(state)).await.unwrap();
    });
    addr
}

async fn open(addr: SocketAddr) -> Socket {
    let (socket, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    socket
}

async fn stats(addr: SocketAddr) -> Value {
    reqwest::get(format!("http://{addr}/realtime/stats"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

/// Poll the stats endpoint until `field` reaches `expected`.
async fn wait_for_stat(addr: SocketAddr, field: &str, expected: u64) {
    tokio::time::timeout(WAIT, async {
        loop {
            if stats(addr).await[field] == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("{field} never reached {expected}"));
}

async fn post(addr: SocketAddr, stream: &str, body: Value) -> Value {
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/api/{stream}"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    response.json().await.unwrap()
}

async fn next_envelope(socket: &mut Socket) -> Envelope {
    loop {
        let frame = tokio::time::timeout(WAIT, socket.next())
            .await
            .expect("no frame before timeout")
            .expect("socket closed")
            .unwrap();
        if let Message::Text(text) = frame {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

fn property(kind: &str) -> Value {
    json!({
        "createdBy": "agent-1",
        "createdAt": 1_700_000_000_000i64,
        "address": "12 Harbour St",
        "coordinates": {"lat": -34.9, "lng": -56.16},
        "type": kind,
    })
}

#[tokio::test]
async fn subscribed_socket_receives_matching_changes() {
    let addr = spawn_gateway().await;
    let mut socket = open(addr).await;

    socket
        .send(Message::Text(
            json!({"event": "properties-subscribe", "data": {"type": "house"}}).to_string(),
        ))
        .await
        .unwrap();
    wait_for_stat(addr, "properties", 1).await;

    post(addr, "properties", property("apartment")).await;
    let house = post(addr, "properties", property("house")).await;

    // The apartment is filtered out, so the first frame is the house.
    let envelope = next_envelope(&mut socket).await;
    assert_eq!(envelope.event, "new-property");
    assert_eq!(envelope.data["id"], house["id"]);
    assert_eq!(envelope.data["type"], "house");

    socket.close(None).await.unwrap();
    wait_for_stat(addr, "connections", 0).await;
    assert_eq!(stats(addr).await["properties"], 0);
}

#[tokio::test]
async fn unsubscribe_and_garbage_frames() {
    let addr = spawn_gateway().await;
    let mut socket = open(addr).await;

    for frame in [
        "not json".to_string(),
        json!({"event": "houses-subscribe"}).to_string(),
        json!({"event": "persons-subscribe"}).to_string(),
    ] {
        socket.send(Message::Text(frame)).await.unwrap();
    }
    wait_for_stat(addr, "persons", 1).await;

    socket
        .send(Message::Text(json!({"event": "persons-unsubscribe"}).to_string()))
        .await
        .unwrap();
    wait_for_stat(addr, "persons", 0).await;
    assert_eq!(stats(addr).await["connections"], 1);

    socket
        .send(Message::Text(json!({"event": "realtors-subscribe"}).to_string()))
        .await
        .unwrap();
    wait_for_stat(addr, "realtors", 1).await;
    post(addr, "persons", json!({"createdBy": "u1", "createdAt": 1, "name": "Ann"})).await;
    post(addr, "realtors", json!({"createdBy": "u1", "createdAt": 1, "name": "Acme"})).await;

    let envelope = next_envelope(&mut socket).await;
    assert_eq!(envelope.event, "new-realtor");
}

#[tokio::test]
async fn dropped_socket_is_released() {
    let addr = spawn_gateway().await;
    let mut socket = open(addr).await;
    socket
        .send(Message::Text(json!({"event": "realtors-subscribe"}).to_string()))
        .await
        .unwrap();
    wait_for_stat(addr, "realtors", 1).await;

    // No close handshake: the server sees the stream end.
    drop(socket);
    wait_for_stat(addr, "connections", 0).await;
    assert_eq!(stats(addr).await["realtors"], 0);
}
