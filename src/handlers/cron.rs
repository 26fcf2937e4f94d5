use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::server::state::AppState;

/// Drain the queued PDF jobs; the route sits behind the cron token guard
pub async fn run_cron(State(state): State<AppState>) -> Json<Value> {
    let processed = state.jobs.run_pending().await;
    tracing::info!(processed, "cron run finished");
    Json(json!({ "success": true, "processed": processed }))
}
