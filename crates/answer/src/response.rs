//! Externally visible reply payload.

use crate::types::Decision;
use serde::{Deserialize, Serialize};

/// `{ "reply": ..., "needsHandoff": ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,

    #[serde(rename = "needsHandoff")]
    pub needs_handoff: bool,
}

impl ChatReply {
    /// The fixed handoff payload.
    pub fn handoff(message: impl Into<String>) -> Self {
        Self {
            reply: message.into(),
            needs_handoff: true,
        }
    }
}

/// Shape a decision into the reply payload. Pure mapping.
pub fn assemble(decision: &Decision) -> ChatReply {
    ChatReply {
        reply: decision.reply.clone(),
        needs_handoff: decision.needs_handoff(),
    }
}

impl From<Decision> for ChatReply {
    fn from(decision: Decision) -> Self {
        let needs_handoff = decision.needs_handoff();
        Self {
            reply: decision.reply,
            needs_handoff,
        }
    }
}
