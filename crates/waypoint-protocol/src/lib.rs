//! Waypoint Protocol - wire envelopes and signaling types
//!
//! Defines the JSON message format spoken between agents and the
//! rendezvous server: request/response envelopes correlated by an opaque
//! id, and one-way signaling pushes addressed by agent identifier.

pub mod constants;
pub mod error;
pub mod identity;
pub mod messages;
pub mod types;

pub use constants::*;
pub use error::*;
pub use identity::*;
pub use messages::*;
pub use types::*;
