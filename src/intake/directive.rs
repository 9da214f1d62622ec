//! Directives: what the driver must do after a state-machine step.

use serde::{Deserialize, Serialize};

use super::model::ExtractedData;
use super::prompts::PromptKey;

/// Rendering hint passed through to the transport. Transports may ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyboardHint {
    /// Offer "Yes" / "No" quick replies.
    YesNo,
}

/// A side effect requested by the state machine. Pure data; the machine never
/// performs I/O itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Send a fixed text.
    SendFixedText {
        text: String,
        keyboard: Option<KeyboardHint>,
    },
    /// Generate a reply from the catalog instruction for `prompt` and send it.
    SendGeneratedText { prompt: PromptKey },
    /// Run the extraction service and feed its outcome back as an event.
    RequestExtraction,
    /// Fill the policy template with `data`, generate the policy text, send it.
    RequestFinalization { data: ExtractedData },
    /// Nothing to do.
    Noop,
}

impl Directive {
    pub fn fixed(text: impl Into<String>) -> Self {
        Self::SendFixedText {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn fixed_with_keyboard(text: impl Into<String>, keyboard: KeyboardHint) -> Self {
        Self::SendFixedText {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }

    pub fn generated(prompt: PromptKey) -> Self {
        Self::SendGeneratedText { prompt }
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::SendFixedText { .. } => "send_fixed_text",
            Self::SendGeneratedText { .. } => "send_generated_text",
            Self::RequestExtraction => "request_extraction",
            Self::RequestFinalization { .. } => "request_finalization",
            Self::Noop => "noop",
        }
    }
}
