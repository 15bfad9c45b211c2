// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tokio::task::JoinError;

use crate::command::{Command, Heartbeat, Outcome};
use crate::engine::SyncEngine;
use crate::error::Error;
use crate::snapshot::Snapshot;
use crate::types::PowerState;

use super::on_engine;

/// A failed request rendered as an HTTP response.
///
/// Invalid input maps to `400`, an unknown device to `404`, storage
/// failures and aborted handler tasks to `500`. The body is
/// `{"error": <message>}`.
#[derive(Debug)]
pub enum ApiError {
    /// The engine refused or failed the request.
    Engine(Error),
    /// The task running the engine call panicked or was cancelled.
    Task(JoinError),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self::Engine(err)
    }
}

impl From<JoinError> for ApiError {
    fn from(err: JoinError) -> Self {
        Self::Task(err)
    }
}

impl ApiError {
    /// Returns the status code this error is reported with.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Engine(Error::UnknownDevice(_)) => StatusCode::NOT_FOUND,
            Self::Engine(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Engine(_) | Self::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Engine(err) => err.to_string(),
            Self::Task(_) => "internal error".to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Task(e) => tracing::error!(error = %e, "Request handler aborted"),
            Self::Engine(e) if status.is_server_error() => {
                tracing::error!(error = %e, "Request failed");
            }
            Self::Engine(e) => tracing::debug!(error = %e, "Request rejected"),
        }
        (
            status,
            Json(ErrorBody {
                error: self.message(),
            }),
        )
            .into_response()
    }
}

#[derive(Debug, Serialize)]
pub(super) struct RegisterResponse {
    status: &'static str,
    power: PowerState,
}

#[derive(Debug, Serialize)]
pub(super) struct CommandResponse {
    status: Outcome,
}

pub(super) async fn register(
    State(engine): State<Arc<SyncEngine>>,
    Json(heartbeat): Json<Heartbeat>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let Heartbeat { id, current } = heartbeat;
    let power = on_engine(&engine, move |engine| engine.heartbeat(&id, current)).await??;
    Ok(Json(RegisterResponse {
        status: "Success",
        power,
    }))
}

pub(super) async fn snapshot(State(engine): State<Arc<SyncEngine>>) -> Json<Arc<Snapshot>> {
    Json(engine.snapshot())
}

pub(super) async fn command(
    State(engine): State<Arc<SyncEngine>>,
    body: String,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = Command::parse(&body).map_err(Error::from)?;
    let status = on_engine(&engine, move |engine| engine.dispatch(command)).await??;
    Ok(Json(CommandResponse { status }))
}

pub(super) async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ParseError, StoreError, ValueError};

    #[test]
    fn status_mapping() {
        let parse = serde_json::from_str::<Command>("{").unwrap_err();

        assert_eq!(
            ApiError::from(Error::from(ValueError::EmptyDeviceId)).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(Error::from(ParseError::from(parse))).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(Error::UnknownDevice("x".to_string())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(Error::from(StoreError::Io(std::io::Error::other("disk")))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn aborted_task_is_internal_error() {
        let task = tokio::spawn(std::future::pending::<()>());
        task.abort();
        let join = task.await.unwrap_err();

        let err = ApiError::from(join);

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "internal error");
    }
}
