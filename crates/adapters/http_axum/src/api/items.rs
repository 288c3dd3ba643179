//! Command handlers for items.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use avsync_app::engine::CommandOutcome;
use avsync_app::ports::{BindingStore, DeviceProxy, EventSink};
use avsync_domain::command::CommandPayload;
use avsync_domain::id::ItemId;

use crate::error::ApiError;
use crate::state::AppState;

/// Body returned once a command cycle completes.
#[derive(Debug, Serialize)]
pub struct CommandBody {
    pub item: ItemId,
    /// `applied` or `ignored`.
    pub outcome: &'static str,
}

/// Possible responses from the command endpoints.
pub enum CommandResponse {
    Accepted(Json<CommandBody>),
}

impl IntoResponse for CommandResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Accepted(json) => (StatusCode::ACCEPTED, json).into_response(),
        }
    }
}

async fn run<P, B, S>(
    state: &AppState<P, B, S>,
    item: ItemId,
    payload: CommandPayload,
) -> Result<CommandResponse, ApiError>
where
    P: DeviceProxy + 'static,
    B: BindingStore + 'static,
    S: EventSink + 'static,
{
    let outcome = match state.engine.handle_command(&item, payload).await? {
        CommandOutcome::Applied => "applied",
        CommandOutcome::Ignored => "ignored",
    };
    Ok(CommandResponse::Accepted(Json(CommandBody { item, outcome })))
}

/// `POST /api/items/{item}` with a plain-text command such as `ON` or `35%`.
pub async fn send_text<P, B, S>(
    State(state): State<AppState<P, B, S>>,
    Path(item): Path<ItemId>,
    body: String,
) -> Result<CommandResponse, ApiError>
where
    P: DeviceProxy + 'static,
    B: BindingStore + 'static,
    S: EventSink + 'static,
{
    let Ok(payload) = CommandPayload::from_str(body.trim());
    run(&state, item, payload).await
}

/// `POST /api/items/{item}/command` with a tagged JSON payload.
pub async fn send_json<P, B, S>(
    State(state): State<AppState<P, B, S>>,
    Path(item): Path<ItemId>,
    Json(payload): Json<CommandPayload>,
) -> Result<CommandResponse, ApiError>
where
    P: DeviceProxy + 'static,
    B: BindingStore + 'static,
    S: EventSink + 'static,
{
    run(&state, item, payload).await
}
