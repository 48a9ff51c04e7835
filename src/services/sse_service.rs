use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

use crate::{
    dto::sse::{Handshake, ServerEvent},
    state::{SharedState, feed::ChangeEvent},
};

/// Subscribe to one lobby's change feed. The returned receiver is a scoped
/// acquisition: dropping it releases the channel.
pub fn subscribe_lobby(state: &SharedState, lobby_id: Uuid) -> broadcast::Receiver<ChangeEvent> {
    state.feed().subscribe(lobby_id)
}

/// Convert a feed receiver into an SSE response, forwarding typed change
/// events and cleaning up once the client disconnects.
pub fn to_sse_stream(
    state: SharedState,
    lobby_id: Uuid,
    mut receiver: broadcast::Receiver<ChangeEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        let handshake = Handshake {
            lobby_id,
            message: "lobby stream connected".into(),
            degraded: state.is_degraded(),
        };
        if let Ok(payload) = ServerEvent::json(Some("handshake".to_string()), &handshake) {
            let mut event = Event::default().data(payload.data);
            if let Some(name) = payload.event {
                event = event.event(name);
            }
            if tx.send(Ok(event)).await.is_err() {
                return;
            }
        }

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(change) => {
                            let payload = match ServerEvent::from_change(&change) {
                                Ok(payload) => payload,
                                Err(err) => {
                                    tracing::warn!(
                                        lobby_id = %lobby_id,
                                        error = %err,
                                        "failed to serialize feed event"
                                    );
                                    continue;
                                }
                            };

                            let mut event = Event::default().data(payload.data);
                            if let Some(name) = payload.event {
                                event = event.event(name);
                            }

                            if tx.send(Ok(event)).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(skipped)) => {
                            // Skip lagged messages but keep the stream alive;
                            // the client re-fetches on the next snapshot.
                            tracing::debug!(lobby_id = %lobby_id, skipped, "feed subscriber lagged");
                            continue;
                        }
                    }
                }
            }
        }

        tracing::info!(lobby_id = %lobby_id, "lobby SSE stream disconnected");
    });

    // response stream reads from mpsc; when the client disconnects axum
    // drops this stream and the forwarder's receiver goes with it
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
