// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for dashboard WebSocket sessions over a real socket.

#![cfg(feature = "server")]

use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use smartboard_sync::engine::SyncEngine;
use smartboard_sync::server;
use smartboard_sync::store::MemoryStore;
use smartboard_sync::types::PowerState;
use smartboard_sync::{Snapshot, User};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const FRAME_TIMEOUT: Duration = Duration::from_secs(5);

async fn start() -> (Arc<SyncEngine>, String) {
    let store = Arc::new(MemoryStore::new());
    let engine = SyncEngine::open(store, || {
        Snapshot::seed(User::new("admin", "admin", "admin"))
    })
    .unwrap();
    let engine = Arc::new(engine);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = server::router(Arc::clone(&engine));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (engine, format!("ws://{addr}/ws"))
}

async fn connect(url: &str) -> Client {
    let (client, _) = connect_async(url).await.unwrap();
    client
}

/// Waits for the next text frame and decodes it.
async fn next_frame(client: &mut Client) -> Value {
    loop {
        let message = tokio::time::timeout(FRAME_TIMEOUT, client.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("connection closed")
            .unwrap();
        if let Message::Text(text) = message {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

async fn send_text(client: &mut Client, text: &str) {
    client.send(Message::Text(text.into())).await.unwrap();
}

#[tokio::test]
async fn first_frame_is_current_snapshot() {
    let (engine, url) = start().await;
    let mut client = connect(&url).await;

    let frame = next_frame(&mut client).await;

    assert_eq!(frame["event"], "sync");
    assert_eq!(frame["data"], serde_json::to_value(&*engine.snapshot()).unwrap());
}

#[tokio::test]
async fn control_is_announced_before_sync() {
    let (engine, url) = start().await;
    let mut client = connect(&url).await;
    next_frame(&mut client).await;

    send_text(
        &mut client,
        r#"{"event":"control","data":{"id":"dev1","cmd":"ON"}}"#,
    )
    .await;

    let control = next_frame(&mut client).await;
    assert_eq!(
        control,
        json!({"event": "control", "data": {"id": "dev1", "cmd": "ON"}})
    );
    let sync = next_frame(&mut client).await;
    assert_eq!(sync["event"], "sync");
    assert_eq!(sync["data"]["devices"][0]["power"], "ON");
    assert_eq!(engine.device("dev1").unwrap().power, PowerState::On);
}

#[tokio::test]
async fn malformed_frame_keeps_session_open() {
    let (engine, url) = start().await;
    let mut client = connect(&url).await;
    next_frame(&mut client).await;

    send_text(&mut client, "definitely not json").await;
    send_text(&mut client, r#"{"event":"reboot","data":{}}"#).await;
    send_text(
        &mut client,
        r#"{"event":"alarmToggle","data":{"id":"dev1","state":false}}"#,
    )
    .await;

    let sync = next_frame(&mut client).await;
    assert_eq!(sync["event"], "sync");
    assert_eq!(sync["data"]["devices"][0]["alarmOn"], false);
    assert!(!engine.device("dev1").unwrap().alarm_enabled);
}

#[tokio::test]
async fn changes_reach_every_dashboard() {
    let (_, url) = start().await;
    let mut sender = connect(&url).await;
    let mut watcher = connect(&url).await;
    next_frame(&mut sender).await;
    next_frame(&mut watcher).await;

    send_text(&mut sender, r#"{"event":"clearLogs"}"#).await;

    let sync = next_frame(&mut watcher).await;
    assert_eq!(sync["event"], "sync");
    assert_eq!(sync["data"]["history"].as_array().unwrap().len(), 1);
}
