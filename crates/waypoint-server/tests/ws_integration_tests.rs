//! End-to-end tests over a real WebSocket: serve the router on an
//! ephemeral port and drive it with tokio-tungstenite clients.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::RwLock;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use waypoint_protocol::{
    Agent, AgentId, ClientMessage, Offer, Request, Response, ServerMessage, Signaling,
    SignalingEnvelope,
};
use waypoint_server::registry::AgentRegistry;
use waypoint_server::ws_server::SignalServer;

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_server() -> String {
    let registry = Arc::new(RwLock::new(AgentRegistry::new()));
    let app = SignalServer::router(registry);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("ws://{addr}/ws")
}

async fn connect(url: &str) -> WsClient {
    let (ws, _) = tokio_tungstenite::connect_async(url).await.unwrap();
    ws
}

async fn send(ws: &mut WsClient, message: &ClientMessage) {
    ws.send(Message::Text(message.to_json().unwrap())).await.unwrap();
}

async fn recv(ws: &mut WsClient) -> ServerMessage {
    loop {
        let frame = tokio::time::timeout(StdDuration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for server message")
            .expect("connection closed")
            .expect("websocket error");
        if let Message::Text(text) = frame {
            return ServerMessage::from_json(&text).unwrap();
        }
    }
}

async fn announce(ws: &mut WsClient, id: &str, name: &str) {
    let message = ClientMessage::request(Request::Announce {
        agent: Agent::new(id, name, Utc::now() + Duration::seconds(60)),
    });
    let ClientMessage::Request { id: request_id, .. } = message.clone();
    send(ws, &message).await;
    match recv(ws).await {
        ServerMessage::Response { id, response } => {
            assert_eq!(id, request_id);
            assert_eq!(response, Response::Announce);
        }
        other => panic!("expected announce response, got {other:?}"),
    }
}

#[tokio::test]
async fn test_announce_and_forward_offer_end_to_end() {
    let url = start_server().await;
    let mut alice = connect(&url).await;
    let mut bob = connect(&url).await;
    announce(&mut alice, "alice", "Alice").await;
    announce(&mut bob, "bob", "Bob").await;

    let envelope = SignalingEnvelope {
        sender: AgentId::new("alice"),
        receiver: AgentId::new("bob"),
        payload: Offer {
            sdp: "v=0\r\no=- 4611732 2 IN IP4 127.0.0.1\r\ns=-".into(),
        },
    };
    let request = ClientMessage::with_id(
        Value::String("offer-1".into()),
        Request::SendOffer {
            offer: envelope.clone(),
        },
    );
    send(&mut alice, &request).await;

    match recv(&mut alice).await {
        ServerMessage::Response { id, response } => {
            assert_eq!(id, Value::String("offer-1".into()));
            assert_eq!(response, Response::SendOffer);
        }
        other => panic!("expected send-offer response, got {other:?}"),
    }

    match recv(&mut bob).await {
        ServerMessage::Signaling { signaling } => {
            assert_eq!(signaling, Signaling::Offer(envelope));
        }
        other => panic!("expected signaling push, got {other:?}"),
    }
}

#[tokio::test]
async fn test_get_all_agents_lists_both_peers() {
    let url = start_server().await;
    let mut alice = connect(&url).await;
    let mut bob = connect(&url).await;
    announce(&mut alice, "alice", "Alice").await;
    announce(&mut bob, "bob", "Bob").await;

    send(
        &mut alice,
        &ClientMessage::with_id(Value::String("list-1".into()), Request::GetAllAgents),
    )
    .await;

    match recv(&mut alice).await {
        ServerMessage::Response { id, response } => {
            assert_eq!(id, Value::String("list-1".into()));
            let Response::GetAllAgents { agents } = response else {
                panic!("expected agent list, got {response:?}");
            };
            let mut ids: Vec<&str> = agents.iter().map(|a| a.id.as_str()).collect();
            ids.sort();
            assert_eq!(ids, vec!["alice", "bob"]);
        }
        other => panic!("expected list response, got {other:?}"),
    }
}

#[tokio::test]
async fn test_offer_to_unregistered_target_yields_error() {
    let url = start_server().await;
    let mut alice = connect(&url).await;
    announce(&mut alice, "alice", "Alice").await;

    let request = ClientMessage::with_id(
        Value::String("offer-x".into()),
        Request::SendOffer {
            offer: SignalingEnvelope {
                sender: AgentId::new("alice"),
                receiver: AgentId::new("nobody"),
                payload: Offer { sdp: "v=0".into() },
            },
        },
    );
    send(&mut alice, &request).await;

    match recv(&mut alice).await {
        ServerMessage::Response { id, response } => {
            assert_eq!(id, Value::String("offer-x".into()));
            assert_eq!(
                response,
                Response::Error {
                    message: "Target agent not registered on server".to_string()
                }
            );
        }
        other => panic!("expected error response, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_frame_gets_structured_error() {
    let url = start_server().await;
    let mut client = connect(&url).await;

    // Valid JSON, invalid schema: the id is still recoverable.
    client
        .send(Message::Text(
            r#"{"type":"request","id":"bad-2","request":{"no":"tag"}}"#.into(),
        ))
        .await
        .unwrap();

    match recv(&mut client).await {
        ServerMessage::Response { id, response } => {
            assert_eq!(id, Value::String("bad-2".into()));
            let Response::Error { message } = response else {
                panic!("expected error response, got {response:?}");
            };
            assert!(message.starts_with("Malformed message:"), "got: {message}");
        }
        other => panic!("expected error response, got {other:?}"),
    }

    // Not JSON at all: no id to recover, error comes back with a null id.
    client
        .send(Message::Text("definitely not json".into()))
        .await
        .unwrap();

    match recv(&mut client).await {
        ServerMessage::Response { id, response } => {
            assert_eq!(id, Value::Null);
            assert!(matches!(response, Response::Error { .. }));
        }
        other => panic!("expected error response, got {other:?}"),
    }
}

#[tokio::test]
async fn test_request_level_error_keeps_connection_open() {
    let url = start_server().await;
    let mut client = connect(&url).await;

    client
        .send(Message::Text("broken".into()))
        .await
        .unwrap();
    let _ = recv(&mut client).await;

    // The connection must still dispatch normally after an error.
    announce(&mut client, "alice", "Alice").await;
}
