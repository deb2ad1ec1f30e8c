//! Waypoint server - agent registry and signaling relay
//!
//! Agents announce themselves over a WebSocket connection, then exchange
//! opaque negotiation payloads addressed by agent id. The server forwards
//! control-plane messages only; it never participates in the connection
//! the agents negotiate.

pub mod config;
pub mod connection;
pub mod dispatcher;
pub mod registry;
pub mod ws_server;
