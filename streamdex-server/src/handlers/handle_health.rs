use axum::{extract::State, response::Json};
use serde_json::{Value, json};

use crate::AppState;

pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let dispatcher = &state.services.dispatcher;
    Json(json!({
        "status": "ok",
        "dispatcher": {
            "capacity": dispatcher.capacity(),
            "in_flight": dispatcher.in_flight(),
            "queued": dispatcher.queued(),
        },
        "cache_write_failures": state.write_failure_count(),
    }))
}
