//! Protocol-wide constants.

/// Upper bound on how far in the future an announce may set its expiry.
/// Announces beyond this bound are rejected without touching the registry.
pub const MAX_EXPIRY_MS: i64 = 300_000;
