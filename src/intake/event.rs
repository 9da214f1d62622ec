//! Inbound events as seen by the state machine.

use super::model::ExtractedData;

/// Text command that (re)starts the flow from any state.
pub const RESTART_COMMAND: &str = "/start";

/// What the transport delivered, reduced to what the flow cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Text,
    Document,
    Other,
}

/// An event fed to [`step`](super::machine::step).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The restart command.
    Restart,
    /// A photo or document attachment. Content is never inspected here.
    Document,
    /// Any other text.
    Text(String),
    /// Stickers, voice notes, locations, ...
    Other,
    /// The extraction service produced a record.
    ExtractionCompleted(ExtractedData),
    /// The extraction service could not read the documents.
    ExtractionFailed,
}

impl Event {
    /// Classify a transport message.
    pub fn from_message(kind: EventKind, text: &str) -> Self {
        match kind {
            EventKind::Text if text.trim().eq_ignore_ascii_case(RESTART_COMMAND) => Self::Restart,
            EventKind::Text => Self::Text(text.to_string()),
            EventKind::Document => Self::Document,
            EventKind::Other => Self::Other,
        }
    }

    pub fn is_extraction_outcome(&self) -> bool {
        matches!(self, Self::ExtractionCompleted(_) | Self::ExtractionFailed)
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Restart => "restart",
            Self::Document => "document",
            Self::Text(_) => "text",
            Self::Other => "other",
            Self::ExtractionCompleted(_) => "extraction_completed",
            Self::ExtractionFailed => "extraction_failed",
        }
    }
}

/// Reading of an event in a yes/no state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Unrecognized,
}

impl Answer {
    /// Case-insensitive, whitespace-trimmed match on "yes"/"no". Anything else,
    /// including empty text and non-text events, is unrecognized.
    pub fn of(event: &Event) -> Self {
        let Event::Text(text) = event else {
            return Self::Unrecognized;
        };
        let trimmed = text.trim();
        if trimmed.eq_ignore_ascii_case("yes") {
            Self::Yes
        } else if trimmed.eq_ignore_ascii_case("no") {
            Self::No
        } else {
            Self::Unrecognized
        }
    }
}
