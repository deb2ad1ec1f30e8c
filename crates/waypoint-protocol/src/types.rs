use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::AgentId;

/// A registered client. `expiry` travels on the wire as Unix epoch
/// milliseconds; after it elapses the registry entry is eligible for
/// removal on the next prune.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub expiry: DateTime<Utc>,
}

impl Agent {
    pub fn new(id: impl Into<AgentId>, name: impl Into<String>, expiry: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            expiry,
        }
    }
}

/// Addressed container for one negotiation message. The server inspects
/// only `sender` and `receiver`; the payload is forwarded verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalingEnvelope<T> {
    pub sender: AgentId,
    pub receiver: AgentId,
    pub payload: T,
}

/// Session offer from the initiating peer. The SDP blob is opaque here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub sdp: String,
}

/// Session answer from the accepting peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub sdp: String,
}

/// Network-path candidate. Mirrors the structure peers produce during
/// negotiation; none of the fields are interpreted by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_mid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_m_line_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_fragment: Option<String>,
}
