//! The agent registry: the sole piece of shared mutable state.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use waypoint_protocol::{Agent, AgentId};

use crate::connection::ConnectionHandle;

/// A live registration: the announced agent plus the connection to reach it.
///
/// The connection handle is a borrowed reference into the transport layer;
/// the registry never closes sockets.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    pub agent: Agent,
    pub connection: ConnectionHandle,
}

/// Maps agent id to its live registration.
///
/// Entries are removed only by [`AgentRegistry::prune`]; a disconnect
/// leaves the entry in place until its expiry elapses, so an agent may
/// reconnect and announce again under the same id.
#[derive(Debug, Default)]
pub struct AgentRegistry {
    entries: HashMap<AgentId, RegistryEntry>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconditional insert/overwrite. Announcing an already-registered id
    /// is how an agent refreshes its expiry, so last write wins.
    pub fn register(&mut self, agent: Agent, connection: ConnectionHandle) {
        self.entries
            .insert(agent.id.clone(), RegistryEntry { agent, connection });
    }

    pub fn lookup(&self, id: &AgentId) -> Option<&RegistryEntry> {
        self.entries.get(id)
    }

    /// Snapshot of every registered agent at call time. Does not check
    /// expiry itself; callers prune first.
    pub fn list_active(&self) -> Vec<Agent> {
        self.entries.values().map(|entry| entry.agent.clone()).collect()
    }

    /// Drop every entry whose expiry has elapsed as of `now`. Must run
    /// before any other registry read in the same message-handling step so
    /// reads never observe stale agents.
    pub fn prune(&mut self, now: DateTime<Utc>) {
        self.entries.retain(|_, entry| entry.agent.expiry > now);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
