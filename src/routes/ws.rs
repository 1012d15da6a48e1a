use axum::{
    extract::{ws::{Message, WebSocket, WebSocketUpgrade}, Extension},
    response::IntoResponse,
    routing::get,
    Router,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{protocol, state::SharedHub, utils::ids};

/// Largest inbound frame; strokes and chat lines are a few hundred bytes.
pub const MAX_FRAME: usize = 64 * 1024;

pub fn router() -> Router {
    Router::new().route("/ws", get(ws_handler))
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    Extension(hub): Extension<SharedHub>,
) -> impl IntoResponse {
    ws.max_message_size(MAX_FRAME)
        .on_upgrade(move |s| user_ws(s, hub))
}

/* ---------------- per session ---------------- */
async fn user_ws(sock: WebSocket, hub: SharedHub) {
    let id = ids::session_id();
    let (mut sink, mut stream) = sock.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    hub.lock().await.connect(&id, tx);

    /* 寫出：佇列 → socket */
    let writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sink.send(Message::Text(frame)).await.is_err() {
                break;
            }
        }
    });

    /* 讀入：一次處理一個事件 */
    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Text(raw)) => match protocol::decode(&raw) {
                Ok(event) => hub.lock().await.handle(&id, event),
                Err(e) => warn!(session = %id, %e, "malformed frame dropped"),
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(session = %id, %e, "socket error");
                break;
            }
        }
    }

    hub.lock().await.disconnect(&id);
    writer.abort();
}
