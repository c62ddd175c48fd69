//! Per-game SSE streams backed by the store's change notifications.

use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::info;
use uuid::Uuid;

use crate::{
    dao::game_store::StoreEvent,
    dto::sse::{Handshake, ServerEvent},
    error::ServiceError,
    services::{game_service::load_game, sse_events},
    state::SharedState,
};

/// Subscribe to change notifications for one game. Fails with `NotFound`
/// before any stream is opened when the game does not exist.
pub async fn subscribe(
    state: &SharedState,
    game_id: Uuid,
) -> Result<(broadcast::Receiver<StoreEvent>, Handshake), ServiceError> {
    let store = state.require_game_store().await?;
    load_game(&store, game_id).await?;

    let receiver = store.subscribe(game_id).await?;
    let handshake = Handshake {
        game_id: game_id.to_string(),
        message: "subscribed".into(),
        degraded: state.is_degraded(),
    };
    Ok((receiver, handshake))
}

/// Convert a store subscription into an SSE response, forwarding events and
/// logging once the client disconnects.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<StoreEvent>,
    handshake: Handshake,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    let game_id = handshake.game_id.clone();

    // forwarder task: reads from the store hub and pushes into mpsc
    tokio::spawn(async move {
        if let Ok(hello) = ServerEvent::json("handshake".to_string(), &handshake)
            && tx.send(Ok(to_axum_event(hello))).await.is_err()
        {
            return;
        }

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(change) => {
                            let Some(payload) = sse_events::from_store_event(change) else {
                                continue;
                            };
                            if tx.send(Ok(to_axum_event(payload))).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(_)) => {
                            // Skip lagged messages but keep the stream alive.
                            continue;
                        }
                    }
                }
            }
        }

        info!(game_id = %game_id, "SSE stream disconnected");
    });

    // response stream reads from mpsc; when the client disconnects axum drops this stream
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn to_axum_event(payload: ServerEvent) -> Event {
    let mut event = Event::default().data(payload.data);
    if let Some(name) = payload.event {
        event = event.event(name);
    }
    event
}
