//! Live view of a registry listing over a websocket
//!
//! The server sends a snapshot of the requested page right away and again
//! after every change to the collection. The client may send a new list
//! query (same fields as the query string) to change the view.
//!
//! Server → Client (JSON):
//! - `{"type": "snapshot", "data": [...], "pagination": {...}}`
//! - `{"type": "error", "message": "..."}`
//!
//! Client → Server (JSON):
//! - `{"search": "silva", "status": "active", "sort": "name:desc", "page": 2}`

use super::handlers::{list_page, query_params};
use super::{RegistryHooks, RegistryState};
use crate::auth::Auth;
use crate::core::error::BackofficeResult;
use crate::core::events::EventEnvelope;
use crate::core::query::{ListQuery, PaginationMeta};
use axum::extract::rejection::QueryRejection;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::SinkExt;
use futures::stream::{SplitSink, StreamExt};
use serde::Serialize;
use tokio::sync::broadcast;

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveMessage<T> {
    Snapshot {
        data: Vec<T>,
        pagination: PaginationMeta,
    },
    Error {
        message: String,
    },
}

/// `GET /{plural}/live`; the bearer token may travel as `?token=`
pub async fn live<T: RegistryHooks>(
    State(state): State<RegistryState<T>>,
    auth: Auth,
    query: Result<Query<ListQuery>, QueryRejection>,
    ws: WebSocketUpgrade,
) -> BackofficeResult<Response> {
    auth.require(&state.policies.read, &format!("watch {}", T::resource_name()))?;
    let query = query_params(query)?;
    let actor = auth.actor();

    Ok(ws.on_upgrade(move |socket| async move {
        tracing::debug!(
            collection = T::resource_name(),
            actor = actor.as_deref().unwrap_or("-"),
            "live view opened"
        );
        run(socket, state, query).await;
        tracing::debug!(collection = T::resource_name(), "live view closed");
    }))
}

/// Whether an event concerns the collection of `T`
fn concerns<T: RegistryHooks>(envelope: &EventEnvelope) -> bool {
    envelope.event.collection() == T::resource_name()
}

async fn send<T: Serialize>(
    sink: &mut SplitSink<WebSocket, Message>,
    message: &LiveMessage<T>,
) -> bool {
    match serde_json::to_string(message) {
        Ok(json) => sink.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize live message");
            true
        }
    }
}

async fn snapshot<T: RegistryHooks>(state: &RegistryState<T>, query: &ListQuery) -> LiveMessage<T> {
    match list_page(state, query).await {
        Ok(page) => LiveMessage::Snapshot {
            data: page.data,
            pagination: page.pagination,
        },
        Err(e) => LiveMessage::Error {
            message: e.to_string(),
        },
    }
}

async fn run<T: RegistryHooks>(socket: WebSocket, state: RegistryState<T>, mut query: ListQuery) {
    // Subscribe before the first snapshot so no change slips in between
    let mut events = state.events.subscribe();
    let (mut sink, mut stream) = socket.split();

    if !send(&mut sink, &snapshot(&state, &query).await).await {
        return;
    }

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(envelope) if concerns::<T>(&envelope) => {
                    if !send(&mut sink, &snapshot(&state, &query).await).await {
                        break;
                    }
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    tracing::warn!(count, collection = T::resource_name(), "live view lagged");
                    if !send(&mut sink, &snapshot(&state, &query).await).await {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            message = stream.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    let reply = match serde_json::from_str::<ListQuery>(&text) {
                        Ok(next) => {
                            query = next;
                            snapshot(&state, &query).await
                        }
                        Err(e) => LiveMessage::Error {
                            message: format!("Invalid message: {}", e),
                        },
                    };
                    if !send(&mut sink, &reply).await {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(error = %e, "live view read error");
                    break;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_shape() {
        let message: LiveMessage<u8> = LiveMessage::Snapshot {
            data: vec![1, 2],
            pagination: PaginationMeta::new(1, 20, 2),
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "snapshot");
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert_eq!(json["pagination"]["total"], 2);

        let error: LiveMessage<u8> = LiveMessage::Error {
            message: "boom".into(),
        };
        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            serde_json::json!({"type": "error", "message": "boom"})
        );
    }
}
