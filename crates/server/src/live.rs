// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Real-time ride updates over WebSocket.
//!
//! Every committed ride transition is published here after commit. Clients
//! may subscribe to all rides or to a single ride with `?ride_id=`. Messages
//! are informational only; no commands are accepted over the socket.

use axum::{
    extract::{
        Query, State as AxumState, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, stream::StreamExt};
use ride_dispatch_api::{BroadcastSink, DeliveryError, RideResponse, format_instant};
use ride_dispatch_domain::RideId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::AppState;

/// Maximum number of events to buffer in the broadcast channel.
/// If clients cannot keep up, older events will be dropped.
const EVENT_BUFFER_SIZE: usize = 100;

/// Live event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveEvent {
    /// A ride changed state.
    RideUpdated {
        /// The ride's id.
        ride_id: i64,
        /// The ride as committed.
        ride: Box<RideResponse>,
    },
    /// Connection confirmation (sent on initial connect).
    Connected {
        /// Server timestamp (RFC 3339).
        timestamp: String,
    },
}

impl LiveEvent {
    /// Returns true if a subscriber filtering on `ride_id` should see this event.
    fn is_for(&self, ride_id: Option<i64>) -> bool {
        match (self, ride_id) {
            (_, None) | (Self::Connected { .. }, _) => true,
            (Self::RideUpdated { ride_id: event_ride, .. }, Some(wanted)) => *event_ride == wanted,
        }
    }
}

/// Broadcaster for live ride events.
///
/// This is a lightweight wrapper around `tokio::sync::broadcast` that allows
/// multiple WebSocket clients to receive ride updates.
#[derive(Clone)]
pub struct LiveEventBroadcaster {
    /// The broadcast channel sender.
    tx: broadcast::Sender<LiveEvent>,
}

impl LiveEventBroadcaster {
    /// Creates a new event broadcaster.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self { tx }
    }

    /// Broadcasts an event to all connected clients.
    ///
    /// If no clients are connected, the event is silently dropped.
    pub fn broadcast(&self, event: &LiveEvent) {
        match self.tx.send(event.clone()) {
            Ok(count) => {
                debug!(receivers = count, "Broadcast live event");
            }
            Err(_) => {
                debug!("No receivers for live event");
            }
        }
    }

    /// Subscribes to the event stream.
    ///
    /// Events sent before subscription are not received.
    pub(crate) fn subscribe(&self) -> broadcast::Receiver<LiveEvent> {
        self.tx.subscribe()
    }
}

impl Default for LiveEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl BroadcastSink for LiveEventBroadcaster {
    fn broadcast_ride_update(
        &self,
        ride_id: RideId,
        ride: &RideResponse,
    ) -> Result<(), DeliveryError> {
        self.broadcast(&LiveEvent::RideUpdated {
            ride_id: ride_id.value(),
            ride: Box::new(ride.clone()),
        });
        Ok(())
    }
}

/// Query parameters of the live endpoint.
#[derive(Debug, Deserialize)]
pub struct LiveQuery {
    /// Restricts the stream to one ride.
    ride_id: Option<i64>,
}

/// Handles WebSocket upgrade requests for live ride updates.
///
/// # Arguments
///
/// * `ws` - WebSocket upgrade request
/// * `query` - Optional ride filter
/// * `app_state` - Application state holding the broadcaster
///
/// # Returns
///
/// An HTTP response that upgrades the connection to WebSocket
pub async fn live_events_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<LiveQuery>,
    AxumState(app_state): AxumState<AppState>,
) -> Response {
    let broadcaster: Arc<LiveEventBroadcaster> = app_state.broadcaster;
    ws.on_upgrade(move |socket| handle_socket(socket, broadcaster, query.ride_id))
}

/// Sends a connection confirmation, then streams matching events until the
/// client disconnects or an error occurs.
async fn handle_socket(
    socket: WebSocket,
    broadcaster: Arc<LiveEventBroadcaster>,
    ride_filter: Option<i64>,
) {
    info!(ride_filter = ?ride_filter, "Client connected to live ride stream");

    let (mut sender, mut receiver) = socket.split();
    let mut rx: broadcast::Receiver<LiveEvent> = broadcaster.subscribe();

    let connected_event: LiveEvent = LiveEvent::Connected {
        timestamp: format_instant(time::OffsetDateTime::now_utc()),
    };

    if let Ok(json) = serde_json::to_string(&connected_event)
        && sender.send(Message::Text(json.into())).await.is_err()
    {
        warn!("Failed to send connection confirmation");
        return;
    }

    let mut send_task = tokio::spawn(async move {
        loop {
            let event: LiveEvent = match rx.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Live subscriber lagged; events dropped");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };
            if !event.is_for(ride_filter) {
                continue;
            }
            match serde_json::to_string(&event) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    error!(?e, "Failed to serialize live event");
                }
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(_) | Message::Binary(_)) => {
                    warn!("Received unexpected message from client, ignoring");
                }
                Ok(Message::Close(_)) => {
                    debug!("Client sent close frame");
                    break;
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {}
                Err(e) => {
                    error!(?e, "WebSocket receive error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {
            debug!("Send task completed");
            recv_task.abort();
        }
        _ = &mut recv_task => {
            debug!("Receive task completed");
            send_task.abort();
        }
    }

    info!("Client disconnected from live ride stream");
}
