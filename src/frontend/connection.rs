use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::frontend::hub::SignalingHub;
use crate::frontend::messages::ServerMessage;
use crate::frontend::router;
use crate::shared_types::ClientId;

// -----------------------------------------------------------------------------
// ----- SignalingConnection ---------------------------------------------------

/// One browser WebSocket. Three tasks cooperate:
///
/// - the reader (this future) pulls frames off the socket and notices closure,
/// - a worker handles queued frames strictly in order,
/// - a writer drains the hub's outbox for this client into the socket.
///
/// Closure triggers the hub's disconnect right away, even while the worker
/// is still waiting on the gateway; whatever that handler produces afterwards
/// has nowhere to go and is dropped.
pub struct SignalingConnection {
    socket: WebSocket,
    hub: Arc<SignalingHub>,
}

// -----------------------------------------------------------------------------
// ----- SignalingConnection: Static -------------------------------------------

impl SignalingConnection {
    pub fn new(socket: WebSocket, hub: Arc<SignalingHub>) -> Self {
        Self { socket, hub }
    }
}

// -----------------------------------------------------------------------------
// ----- SignalingConnection: Public -------------------------------------------

impl SignalingConnection {
    pub async fn serve(self) {
        let (client_id, outbox) = self.hub.connect();
        let (sink, mut stream) = self.socket.split();

        spawn_writer_task(sink, outbox);
        let (frames, worker) = spawn_worker_task(self.hub.clone(), client_id.clone());

        while let Some(next) = stream.next().await {
            let message = match next {
                Ok(message) => message,
                Err(err) => {
                    debug!(client_id = %client_id, error = %err, "websocket read failed");
                    break;
                }
            };

            let frame = match message {
                Message::Text(text) => text.as_str().to_owned(),
                Message::Binary(bytes) => match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => text,
                    Err(_) => {
                        self.hub.send_to(
                            &client_id,
                            ServerMessage::error("malformed message: binary frame is not UTF-8"),
                        );
                        continue;
                    }
                },
                Message::Close(_) => break,
                Message::Ping(_) | Message::Pong(_) => continue,
            };

            if frames.send(frame).is_err() {
                break;
            }
        }

        drop(frames);
        self.hub.disconnect(&client_id).await;

        // Not awaited on purpose: an in-flight gateway call runs to completion
        // on its own, bounded by the gateway timeout.
        drop(worker);
    }
}

// -----------------------------------------------------------------------------
// ----- Internal: Helpers -----------------------------------------------------

fn spawn_worker_task(
    hub: Arc<SignalingHub>,
    client_id: ClientId,
) -> (mpsc::UnboundedSender<String>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let handle = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            router::dispatch(&hub, &client_id, &frame).await;
        }
    });

    (tx, handle)
}

fn spawn_writer_task(
    mut sink: SplitSink<WebSocket, Message>,
    mut outbox: mpsc::UnboundedReceiver<ServerMessage>,
) {
    tokio::spawn(async move {
        while let Some(message) = outbox.recv().await {
            if sink.send(Message::Text(message.to_json().into())).await.is_err() {
                break;
            }

            // coalesce bursts (join reply + peer events) into one flush
            while let Ok(more) = outbox.try_recv() {
                if sink.feed(Message::Text(more.to_json().into())).await.is_err() {
                    return;
                }
            }
            if sink.flush().await.is_err() {
                break;
            }
        }

        let _ = sink.close().await;
    });
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
