//! The change signal exchanged over the realtime socket.
//!
//! A client sends `change` after it mutates something; the server passes it
//! on to every other connected client, which should refetch. The signal has
//! no payload and no delivery guarantee.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum RealtimeMessage {
    Change,
}

impl RealtimeMessage {
    /// Text frame for this message.
    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Read a text frame. Unknown or malformed frames yield `None`.
    pub fn decode(frame: &str) -> Option<Self> {
        serde_json::from_str(frame).ok()
    }
}
