use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ProtocolError, RequestError};
use crate::identity::AgentId;
use crate::types::{Agent, Answer, IceCandidate, Offer, SignalingEnvelope};

/// Top-level message sent by an agent to the server.
///
/// The `id` is caller-chosen and opaque; the server echoes it verbatim on
/// the correlated response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    Request { id: Value, request: Request },
}

impl ClientMessage {
    /// Wrap a request with a fresh UUID id.
    pub fn request(request: Request) -> Self {
        Self::Request {
            id: Value::String(uuid::Uuid::new_v4().to_string()),
            request,
        }
    }

    pub fn with_id(id: Value, request: Request) -> Self {
        Self::Request { id, request }
    }

    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Top-level message sent by the server: either a response correlated to
/// a request, or a one-way signaling push with no id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    Response { id: Value, response: Response },
    Signaling { signaling: Signaling },
}

impl ServerMessage {
    pub fn response(id: Value, response: Response) -> Self {
        Self::Response { id, response }
    }

    pub fn error(id: Value, error: RequestError) -> Self {
        Self::Response {
            id,
            response: Response::error(error),
        }
    }

    pub fn signaling(signaling: Signaling) -> Self {
        Self::Signaling { signaling }
    }

    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Every operation an agent can ask of the server.
///
/// Tags outside the protocol decode into [`Request::Unknown`] so the
/// dispatcher can answer them with a structured error instead of dropping
/// the message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Request {
    /// Register or refresh this agent's registry entry.
    Announce { agent: Agent },
    /// List every live registration.
    GetAllAgents,
    /// Forward a session offer to `offer.receiver`.
    SendOffer { offer: SignalingEnvelope<Offer> },
    /// Forward a session answer to `answer.receiver`.
    SendAnswer { answer: SignalingEnvelope<Answer> },
    /// Forward a network-path candidate to `candidate.receiver`.
    SendIceCandidate { candidate: SignalingEnvelope<IceCandidate> },
    #[serde(other)]
    Unknown,
}

/// Exactly one per request. Successful sends and announces carry no
/// payload beyond their tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Response {
    Announce,
    GetAllAgents { agents: Vec<Agent> },
    SendOffer,
    SendAnswer,
    SendIceCandidate,
    Error { message: String },
}

impl Response {
    pub fn error(error: RequestError) -> Self {
        Self::Error {
            message: error.to_string(),
        }
    }
}

/// Payload pushed to the receiving agent. A push, not a call: it carries
/// no id and no reply is expected from the target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Signaling {
    Offer(SignalingEnvelope<Offer>),
    Answer(SignalingEnvelope<Answer>),
    IceCandidate(SignalingEnvelope<IceCandidate>),
}

impl Signaling {
    pub fn sender(&self) -> &AgentId {
        match self {
            Self::Offer(envelope) => &envelope.sender,
            Self::Answer(envelope) => &envelope.sender,
            Self::IceCandidate(envelope) => &envelope.sender,
        }
    }

    pub fn receiver(&self) -> &AgentId {
        match self {
            Self::Offer(envelope) => &envelope.receiver,
            Self::Answer(envelope) => &envelope.receiver,
            Self::IceCandidate(envelope) => &envelope.receiver,
        }
    }
}

/// Best-effort extraction of the request id from a frame that failed to
/// decode, so the malformed-message error can still be correlated.
pub fn recover_request_id(text: &str) -> Value {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|value| value.get("id").cloned())
        .unwrap_or(Value::Null)
}
