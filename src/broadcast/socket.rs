//! WebSocket endpoint (GET /ws)
//!
//! Each connection is a hub listener. Hub events are written to the socket as
//! JSON text frames; `newBook` frames sent by the client are relayed to every
//! other listener.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use super::{BroadcastEvent, BroadcastHub, ClientId, NEW_BOOK_EVENT};
use crate::api::AppState;

pub async fn socket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let hub = state.hub.clone();
    ws.on_upgrade(move |socket| serve_listener(socket, hub))
}

async fn serve_listener(socket: WebSocket, hub: Arc<BroadcastHub>) {
    let (client_id, mut events) = hub.register();
    info!("Listener connected: {}", client_id);

    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            received = events.recv() => match received {
                Ok(envelope) if envelope.is_for(client_id) => {
                    let text = match serde_json::to_string(&envelope.event) {
                        Ok(text) => text,
                        Err(e) => {
                            warn!("Dropping unserializable {} event: {}", envelope.event.event, e);
                            continue;
                        }
                    };
                    if sink.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Listener {} lagged, skipped {} events", client_id, skipped);
                }
                Err(RecvError::Closed) => break,
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => handle_frame(&hub, client_id, &text),
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!("Listener {} socket error: {}", client_id, e);
                    break;
                }
            },
        }
    }

    info!("Listener disconnected: {}", client_id);
}

fn handle_frame(hub: &BroadcastHub, client_id: ClientId, text: &str) {
    match parse_frame(text) {
        Some(event) => {
            debug!("Relaying {} event from listener {}", event.event, client_id);
            hub.relay(client_id, event);
        }
        None => debug!("Ignoring frame from listener {}", client_id),
    }
}

/// Accepts only well-formed `newBook` frames.
fn parse_frame(text: &str) -> Option<BroadcastEvent> {
    serde_json::from_str::<BroadcastEvent>(text)
        .ok()
        .filter(|event| event.event == NEW_BOOK_EVENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_new_book_frame() {
        let event = parse_frame(r#"{"event":"newBook","data":{"title":"Dune"}}"#).unwrap();
        assert_eq!(event.event, "newBook");
        assert_eq!(event.data["title"], "Dune");
    }

    #[test]
    fn test_other_frames_are_ignored() {
        assert!(parse_frame(r#"{"event":"deleteBook","data":{}}"#).is_none());
        assert!(parse_frame("not json").is_none());
        assert!(parse_frame(r#"{"data":{}}"#).is_none());
    }

    #[tokio::test]
    async fn test_handle_frame_relays_to_others() {
        let hub = BroadcastHub::new(8);
        let (sender, _sender_rx) = hub.register();
        let (other, mut other_rx) = hub.register();

        handle_frame(&hub, sender, r#"{"event":"newBook","data":{"title":"Emma"}}"#);

        let envelope = other_rx.recv().await.unwrap();
        assert!(envelope.is_for(other));
        assert_eq!(envelope.origin, Some(sender));
    }
}
