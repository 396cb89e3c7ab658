//! Destination tokens supplied by callers (`chat_id`).

use std::fmt;
use std::str::FromStr;

use crate::constants::SELF_DESTINATION;

/// Where an upload is delivered on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    /// The authenticated account's own chat ("me").
    SelfChat,
    /// A numeric chat, group or channel identifier.
    NumericId(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DestinationError {
    #[error("Invalid chat id '{token}': {reason}")]
    Invalid { token: String, reason: String },
}

impl Destination {
    /// Parse a raw token. "me" (any case, surrounding whitespace ignored) is the
    /// account itself; anything else must be a base-10 signed 64-bit integer.
    /// No range or sign convention is enforced beyond that.
    pub fn resolve(token: &str) -> Result<Self, DestinationError> {
        let trimmed = token.trim();
        if trimmed.eq_ignore_ascii_case(SELF_DESTINATION) {
            return Ok(Destination::SelfChat);
        }

        trimmed
            .parse::<i64>()
            .map(Destination::NumericId)
            .map_err(|e| DestinationError::Invalid {
                token: token.to_string(),
                reason: e.to_string(),
            })
    }
}

impl FromStr for Destination {
    type Err = DestinationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Destination::resolve(s)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::SelfChat => write!(f, "{}", SELF_DESTINATION),
            Destination::NumericId(id) => write!(f, "{}", id),
        }
    }
}
