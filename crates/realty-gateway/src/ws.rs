//! Websocket glue between client sockets and the dispatcher.
//!
//! Each socket gets a connection id, a bounded outbound queue registered
//! as its sink, a writer task draining that queue, and a reader loop that
//! turns `{stream}-subscribe` / `{stream}-unsubscribe` frames into
//! registry calls.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use uuid::Uuid;

use realty_core::{ChannelSink, Dispatcher, EventReceiver};
use realty_proto::{ClientMessage, Envelope, Stream};

use crate::AppState;

/// WebSocket upgrade handler for realtime connections.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let dispatcher = Arc::clone(&state.dispatcher);
    let queue = state.config.outbound_queue;
    ws.on_upgrade(move |socket| handle_socket(socket, dispatcher, queue))
}

/// What an inbound frame did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    Subscribed(Stream),
    Unsubscribed(Stream),
    /// Unknown event, or not a JSON envelope.
    Ignored,
}

/// Apply one inbound text frame to the registry.
pub fn handle_frame(dispatcher: &Dispatcher, connection_id: &str, text: &str) -> FrameOutcome {
    let envelope: Envelope = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::debug!(connection_id, error = %e, "ignoring malformed frame");
            return FrameOutcome::Ignored;
        }
    };

    match ClientMessage::from_envelope(&envelope) {
        Some(ClientMessage::Subscribe { stream, filter }) => {
            dispatcher.registry().subscribe(connection_id, stream, filter);
            FrameOutcome::Subscribed(stream)
        }
        Some(ClientMessage::Unsubscribe { stream }) => {
            dispatcher.registry().unsubscribe(connection_id, stream);
            FrameOutcome::Unsubscribed(stream)
        }
        None => {
            tracing::debug!(connection_id, event = %envelope.event, "ignoring unknown event");
            FrameOutcome::Ignored
        }
    }
}

/// Releases the connection however the socket task ends.
struct ConnectionGuard {
    dispatcher: Arc<Dispatcher>,
    connection_id: String,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.dispatcher.disconnect(&self.connection_id);
        tracing::info!(connection_id = %self.connection_id, "realtime client disconnected");
    }
}

async fn handle_socket(socket: WebSocket, dispatcher: Arc<Dispatcher>, queue: usize) {
    let connection_id = Uuid::new_v4().to_string();
    let (sink, events) = ChannelSink::channel(queue);
    dispatcher.connect(connection_id.clone(), Arc::new(sink));
    let _guard = ConnectionGuard {
        dispatcher: Arc::clone(&dispatcher),
        connection_id: connection_id.clone(),
    };
    tracing::info!(connection_id = %connection_id, "realtime client connected");

    let (sender, mut receiver) = socket.split();
    let mut writer = tokio::spawn(write_events(sender, events, connection_id.clone()));

    loop {
        tokio::select! {
            frame = receiver.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    handle_frame(&dispatcher, &connection_id, &text);
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    tracing::warn!(connection_id = %connection_id, error = %e, "websocket read failed");
                    break;
                }
            },
            _ = &mut writer => break,
        }
    }

    writer.abort();
}

async fn write_events(
    mut sender: futures::stream::SplitSink<WebSocket, Message>,
    mut events: EventReceiver,
    connection_id: String,
) {
    while let Some(event) = events.recv().await {
        let frame = match event
            .envelope()
            .and_then(|envelope| serde_json::to_string(&envelope))
        {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(connection_id = %connection_id, error = %e, "failed to encode event");
                continue;
            }
        };

        if let Err(e) = sender.send(Message::Text(frame)).await {
            tracing::debug!(connection_id = %connection_id, error = %e, "websocket write failed");
            break;
        }
    }
}
