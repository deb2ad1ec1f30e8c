//! Stateless per-message protocol logic.
//!
//! One invocation per decoded inbound message: classify the request,
//! validate it against registry state, perform the registry operation or
//! forwarding action, and produce exactly one response to the sender
//! (plus, for forwards, one push to a third party).

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use waypoint_protocol::{
    ClientMessage, Request, RequestError, Response, ServerMessage, Signaling, MAX_EXPIRY_MS,
};

use crate::connection::ConnectionHandle;
use crate::registry::AgentRegistry;

/// What the transport adapter must do after one dispatch: reply to the
/// sender, and optionally push a signaling message to the forward target.
#[derive(Debug)]
pub struct DispatchOutcome {
    pub response: ServerMessage,
    pub forward: Option<(ConnectionHandle, ServerMessage)>,
}

impl DispatchOutcome {
    fn reply(id: Value, response: Response) -> Self {
        Self {
            response: ServerMessage::response(id, response),
            forward: None,
        }
    }

    fn reject(id: Value, error: RequestError) -> Self {
        Self::reply(id, Response::error(error))
    }
}

/// Single entry point for one decoded inbound message.
///
/// Expired agents are pruned before anything else so no read below can
/// observe a stale registration. The caller must hold the registry lock
/// across the whole call: prune + operate are one atomic step with respect
/// to concurrent message handlers.
pub fn handle_inbound(
    registry: &mut AgentRegistry,
    sender: &ConnectionHandle,
    message: ClientMessage,
    now: DateTime<Utc>,
) -> DispatchOutcome {
    registry.prune(now);

    let ClientMessage::Request { id, request } = message;
    match request {
        Request::Announce { agent } => {
            if agent.expiry > now + Duration::milliseconds(MAX_EXPIRY_MS) {
                tracing::warn!(agent = %agent.id, "announce rejected: expiry beyond bound");
                return DispatchOutcome::reject(id, RequestError::ExpiryExceeded(MAX_EXPIRY_MS));
            }
            tracing::debug!(agent = %agent.id, name = %agent.name, "agent announced");
            registry.register(agent, sender.clone());
            DispatchOutcome::reply(id, Response::Announce)
        }
        Request::GetAllAgents => DispatchOutcome::reply(
            id,
            Response::GetAllAgents {
                agents: registry.list_active(),
            },
        ),
        Request::SendOffer { offer } => {
            forward(registry, id, Signaling::Offer(offer), Response::SendOffer)
        }
        Request::SendAnswer { answer } => {
            forward(registry, id, Signaling::Answer(answer), Response::SendAnswer)
        }
        Request::SendIceCandidate { candidate } => forward(
            registry,
            id,
            Signaling::IceCandidate(candidate),
            Response::SendIceCandidate,
        ),
        Request::Unknown => {
            tracing::warn!("unknown request type");
            DispatchOutcome::reject(id, RequestError::UnknownRequestType)
        }
    }
}

/// Route a signaling envelope to its receiver's live connection.
///
/// The sender is answered from local registry state alone; the push to the
/// target is queued fire-and-forget and no acknowledgment is awaited.
fn forward(
    registry: &AgentRegistry,
    id: Value,
    signaling: Signaling,
    ok: Response,
) -> DispatchOutcome {
    let Some(entry) = registry.lookup(signaling.receiver()) else {
        tracing::debug!(receiver = %signaling.receiver(), "forward rejected: target not registered");
        return DispatchOutcome::reject(id, RequestError::UnregisteredTarget);
    };
    let target = entry.connection.clone();
    tracing::debug!(
        sender = %signaling.sender(),
        receiver = %signaling.receiver(),
        "forwarding signaling message"
    );
    DispatchOutcome {
        response: ServerMessage::response(id, ok),
        forward: Some((target, ServerMessage::signaling(signaling))),
    }
}
