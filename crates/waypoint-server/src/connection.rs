use tokio::sync::mpsc;

use waypoint_protocol::ServerMessage;

/// Cloneable handle for pushing outbound messages to one live socket.
///
/// The writer task on the other end of the channel owns the actual
/// socket; once the peer hangs up the receiver is dropped and further
/// pushes are discarded. Delivery is best-effort only.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    tx: mpsc::UnboundedSender<ServerMessage>,
}

impl ConnectionHandle {
    /// New handle plus the receiving end the writer task drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Fire-and-forget push. A send onto a closed connection is lost
    /// silently; the caller never waits on the peer.
    pub fn push(&self, message: ServerMessage) {
        let _ = self.tx.send(message);
    }
}
