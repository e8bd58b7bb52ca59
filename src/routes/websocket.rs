use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};

use crate::{middleware::auth::verify_token, AppState};

#[derive(Debug, Deserialize)]
pub struct WsQueryParams {
    pub token: String,
}

/// GET /announcements/ws — the change-notification channel.
///
/// Browsers cannot set an Authorization header on a WebSocket upgrade, so
/// the token travels as a query parameter.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<WsQueryParams>,
) -> Response {
    let authorized = verify_token(&params.token, &state.config.operator_token);

    // Subscribe before the upgrade response goes out, so changes published
    // while the handshake finishes are not lost.
    let changes = state.changes.subscribe();

    ws.on_upgrade(move |socket| async move {
        if authorized {
            info!("Change channel connected");
            handle_socket(socket, changes).await;
        } else {
            warn!("Change channel auth failed");
        }
    })
}

async fn handle_socket(socket: WebSocket, mut changes: broadcast::Receiver<()>) {
    let (mut sender, mut receiver) = socket.split();

    // Change feed → WebSocket. The frame payload is not part of the
    // contract; any frame means "re-list", so a lagged receiver just sends
    // one frame for everything it missed.
    let mut push_task = tokio::spawn(async move {
        loop {
            match changes.recv().await {
                Ok(()) | Err(RecvError::Lagged(_)) => {
                    let frame = serde_json::json!({ "type": "announcements.changed" });
                    if sender
                        .send(Message::Text(frame.to_string().into()))
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Drain the client side so close frames are seen.
    let mut client_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = (&mut push_task) => client_task.abort(),
        _ = (&mut client_task) => push_task.abort(),
    }

    info!("Change channel disconnected");
}
