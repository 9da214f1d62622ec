//! Session and extracted-data models.

use serde::{Deserialize, Serialize};

use super::state::IntakeState;

/// Opaque per-conversation identifier, scoped by channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Build an id from the channel name and the channel's conversation key
    /// (Telegram chat id, "local" for the CLI).
    pub fn new(channel: &str, conversation: &str) -> Self {
        Self(format!("{channel}:{conversation}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Fields pulled from the submitted documents by the extraction service.
///
/// Never modified after creation; a new extraction replaces the whole record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedData {
    pub name: String,
    pub passport_number: String,
    pub vehicle_number: String,
}

impl ExtractedData {
    pub fn new(
        name: impl Into<String>,
        passport_number: impl Into<String>,
        vehicle_number: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            passport_number: passport_number.into(),
            vehicle_number: vehicle_number.into(),
        }
    }
}

/// One user's progress through the intake flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub state: IntakeState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted: Option<ExtractedData>,
}

impl Session {
    /// A fresh session in the `Initial` state.
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            state: IntakeState::Initial,
            extracted: None,
        }
    }

    /// Go back to document collection, dropping any cached extraction.
    pub fn restart(&mut self) {
        self.state = IntakeState::AwaitingIdentityDocument;
        self.extracted = None;
    }

    /// Whether cached data is present exactly when the state requires it.
    pub fn is_consistent(&self) -> bool {
        self.extracted.is_some() == self.state.holds_extraction()
    }
}
