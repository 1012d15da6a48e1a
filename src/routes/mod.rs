use axum::{routing::get, Extension, Json, Router};
use serde_json::{json, Value};

use crate::state::SharedHub;

pub mod ws;

pub fn router() -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(ws::router())
}

async fn health(Extension(hub): Extension<SharedHub>) -> Json<Value> {
    let hub = hub.lock().await;
    Json(json!({
        "status":   "ok",
        "rooms":    hub.rooms().len(),
        "sessions": hub.session_count(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Limits, state};

    #[tokio::test]
    async fn health_counts_rooms_and_sessions() {
        let hub = state::shared(Limits::default());
        {
            let mut h = hub.lock().await;
            let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
            h.connect("s1", tx);
        }
        let Json(body) = health(Extension(hub)).await;
        assert_eq!(body, json!({"status": "ok", "rooms": 0, "sessions": 1}));
    }
}
