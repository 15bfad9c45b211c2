// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dashboard WebSocket sessions.
//!
//! Each session forwards hub messages to the client and applies the client's
//! command frames. A malformed frame is logged and skipped; the connection
//! stays open.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures::{Sink, SinkExt, StreamExt};
use uuid::Uuid;

use crate::command::Command;
use crate::engine::SyncEngine;
use crate::event::Subscription;

use super::on_engine;

pub(super) async fn upgrade(
    ws: WebSocketUpgrade,
    State(engine): State<Arc<SyncEngine>>,
) -> Response {
    ws.on_upgrade(move |socket| session(socket, engine))
}

async fn session(socket: WebSocket, engine: Arc<SyncEngine>) {
    let client_id = Uuid::new_v4();
    let subscription = engine.subscribe();
    tracing::info!(%client_id, clients = engine.subscriber_count(), "Client connected");

    let (sink, mut stream) = socket.split();
    let mut send_task = tokio::spawn(forward(subscription, sink, client_id));

    let recv_engine = Arc::clone(&engine);
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = stream.next().await {
            match message {
                Message::Text(text) => apply_frame(&recv_engine, client_id, &text).await,
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    tracing::info!(%client_id, "Client disconnected");
}

async fn forward<S>(mut subscription: Subscription, mut sink: S, client_id: Uuid)
where
    S: Sink<Message> + Unpin,
{
    while let Some(event) = subscription.recv().await {
        let text = match serde_json::to_string(&event) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(%client_id, error = %e, "Failed to encode outbound message");
                continue;
            }
        };
        if sink.send(Message::Text(text)).await.is_err() {
            break;
        }
    }
}

/// Frames of one client are applied in the order they arrive.
async fn apply_frame(engine: &Arc<SyncEngine>, client_id: Uuid, text: &str) {
    let command = match Command::parse(text) {
        Ok(command) => command,
        Err(e) => {
            tracing::warn!(%client_id, error = %e, "Ignoring malformed frame");
            return;
        }
    };

    let name = command.name();
    match on_engine(engine, move |engine| engine.dispatch(command)).await {
        Ok(Ok(outcome)) => {
            tracing::debug!(%client_id, command = name, %outcome, "Command handled");
        }
        Ok(Err(e)) if e.is_client_error() => {
            tracing::warn!(%client_id, command = name, error = %e, "Rejected command");
        }
        Ok(Err(e)) => tracing::error!(%client_id, command = name, error = %e, "Command failed"),
        Err(e) => tracing::error!(%client_id, command = name, error = %e, "Command task aborted"),
    }
}
