use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use db::events::BoardEvent;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio_stream::{StreamMap, wrappers::BroadcastStream};
use uuid::Uuid;

use crate::AppState;

/// Messages a client may send on the realtime socket. Joining a board's
/// channel is explicit; nothing is delivered before the first join.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    JoinBoard { board_id: Uuid },
    #[serde(rename_all = "camelCase")]
    LeaveBoard { board_id: Uuid },
}

pub async fn stream_events_ws(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        if let Err(e) = handle_events_ws(socket, state).await {
            tracing::warn!("events WS closed: {}", e);
        }
    })
}

async fn handle_events_ws(socket: WebSocket, state: AppState) -> anyhow::Result<()> {
    let (mut sender, mut receiver) = socket.split();
    let mut topics: StreamMap<Uuid, BroadcastStream<BoardEvent>> = StreamMap::new();

    loop {
        tokio::select! {
            client_msg = receiver.next() => {
                match client_msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(text.as_str()) {
                            Ok(ClientMessage::JoinBoard { board_id }) => {
                                if !topics.contains_key(&board_id) {
                                    topics.insert(
                                        board_id,
                                        BroadcastStream::new(state.events().subscribe(board_id)),
                                    );
                                    tracing::debug!(%board_id, "client joined board channel");
                                }
                            }
                            Ok(ClientMessage::LeaveBoard { board_id }) => {
                                topics.remove(&board_id);
                            }
                            Err(err) => {
                                tracing::debug!(error = %err, "ignoring malformed client message");
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    // Pings and pongs are answered by axum.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                }
            }
            Some((_, event)) = topics.next(), if !topics.is_empty() => {
                // A lagged subscriber just misses events; the channel itself
                // keeps going.
                let Ok(event) = event else { continue };
                let payload = serde_json::to_string(&event)?;
                if sender.send(Message::Text(payload.into())).await.is_err() {
                    break; // client disconnected
                }
            }
        }
    }

    let _ = sender.close().await;
    Ok(())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/events/ws", get(stream_events_ws))
}
