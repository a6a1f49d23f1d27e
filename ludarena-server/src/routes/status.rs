//! Liveness endpoint

use axum::Json;
use serde_json::{json, Value};

use ludarena_core::GameId;

pub async fn status_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "engine": "rust",
        "games": GameId::ALL,
    }))
}
