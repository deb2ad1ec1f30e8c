//! WebSocket transport adapter: accepts connections, feeds decoded frames
//! to the dispatcher, and relays responses and forwards back out.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::RwLock;

use waypoint_protocol::{recover_request_id, ClientMessage, RequestError, Response, ServerMessage};

use crate::connection::ConnectionHandle;
use crate::dispatcher::handle_inbound;
use crate::registry::AgentRegistry;

pub type SharedRegistry = Arc<RwLock<AgentRegistry>>;

#[derive(Clone)]
struct AppState {
    registry: SharedRegistry,
}

/// The rendezvous server: one WebSocket endpoint plus a health probe.
pub struct SignalServer {
    bind_addr: String,
    registry: SharedRegistry,
}

impl SignalServer {
    pub fn new(bind_addr: String, registry: SharedRegistry) -> Self {
        Self {
            bind_addr,
            registry,
        }
    }

    /// Build the router. Exposed separately so tests can serve it on an
    /// ephemeral port.
    pub fn router(registry: SharedRegistry) -> Router {
        Router::new()
            .route("/ws", get(ws_upgrade))
            .route("/api/health", get(api_health))
            .with_state(AppState { registry })
    }

    pub async fn run(self) -> Result<(), anyhow::Error> {
        let app = Self::router(Arc::clone(&self.registry));
        let listener = tokio::net::TcpListener::bind(&self.bind_addr).await?;
        tracing::info!(addr = %self.bind_addr, "signaling server listening");
        axum::serve(listener, app).await?;
        Ok(())
    }
}

async fn api_health(State(app): State<AppState>) -> Json<serde_json::Value> {
    let registry = app.registry.read().await;
    Json(serde_json::json!({
        "status": "ok",
        "registered_agents": registry.len(),
    }))
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(app): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| connection_loop(socket, app.registry))
}

/// Per-connection loop.
///
/// A writer task drains the connection's outbound channel into the sink,
/// so forwards from other handlers and this handler's own responses share
/// one ordered path to the socket. The read side decodes each text frame
/// and hands it to the dispatcher.
async fn connection_loop(socket: WebSocket, registry: SharedRegistry) {
    let (mut sink, mut stream) = socket.split();
    let (handle, mut outbound) = ConnectionHandle::channel();

    let writer = tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            let text = match message.to_json() {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!(error = %e, "failed to encode outbound message");
                    continue;
                }
            };
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(frame)) = stream.next().await {
        match frame {
            Message::Text(text) => handle_frame(&registry, &handle, &text).await,
            Message::Close(_) => break,
            // Pings are answered by axum; binary frames carry no protocol
            // meaning on this endpoint.
            _ => {}
        }
    }

    // The registry entry outlives the socket: removal is expiry-only, so
    // the agent can reconnect and announce again under the same id.
    tracing::debug!("connection closed");
    writer.abort();
}

async fn handle_frame(registry: &SharedRegistry, sender: &ConnectionHandle, text: &str) {
    let message = match ClientMessage::from_json(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!(error = %e, "malformed client message");
            sender.push(ServerMessage::response(
                recover_request_id(text),
                Response::error(RequestError::Malformed(e.to_string())),
            ));
            return;
        }
    };

    let outcome = {
        let mut registry = registry.write().await;
        handle_inbound(&mut registry, sender, message, Utc::now())
    };

    if let Some((target, push)) = outcome.forward {
        target.push(push);
    }
    sender.push(outcome.response);
}
