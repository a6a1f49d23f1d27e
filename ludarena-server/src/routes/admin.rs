//! Operator API
//!
//! List, create, seed with bots, start, finish, and snapshot/restore
//! tournaments. Everything funnels through the coordinator so operator
//! actions serialize with live play.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::coordinator::AdminError;
use crate::ServerState;

type AdminResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn admin_err(e: AdminError) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTournamentRequest {
    pub game_id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub bot_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct AddBotsRequest {
    pub count: usize,
}

pub async fn list_tournaments(State(state): State<Arc<ServerState>>) -> Json<Value> {
    Json(json!({ "tournaments": state.coordinator.list_tournaments().await }))
}

pub async fn create_tournament(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<CreateTournamentRequest>,
) -> AdminResult {
    let snapshot = state
        .coordinator
        .create_tournament(&req.game_id, req.label, req.bot_count)
        .await
        .map_err(admin_err)?;
    Ok(Json(snapshot))
}

pub async fn add_bots(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    Json(req): Json<AddBotsRequest>,
) -> AdminResult {
    let snapshot = state
        .coordinator
        .add_bots(&id, req.count)
        .await
        .map_err(admin_err)?;
    Ok(Json(snapshot))
}

pub async fn start_tournament(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> AdminResult {
    state
        .coordinator
        .start_tournament(&id)
        .await
        .map_err(admin_err)?;
    Ok(Json(json!({ "started": id })))
}

pub async fn finish_tournament(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> AdminResult {
    state
        .coordinator
        .finish_tournament(&id)
        .await
        .map_err(admin_err)?;
    Ok(Json(json!({ "finished": id })))
}

pub async fn snapshot_tournament(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> AdminResult {
    let snapshot = state.coordinator.snapshot(&id).await.map_err(admin_err)?;
    Ok(Json(snapshot))
}

pub async fn restore_tournament(
    State(state): State<Arc<ServerState>>,
    Json(value): Json<Value>,
) -> AdminResult {
    let id = state.coordinator.restore(value).await.map_err(admin_err)?;
    Ok(Json(json!({ "restored": id })))
}
