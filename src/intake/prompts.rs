//! Prompt catalog: fixed instructions handed to the language model.
//!
//! The catalog is a lookup table: one system prompt for the assistant's tone,
//! one for policy generation, and one user instruction per conversation
//! branch. The built-in entries can be overridden from a JSON file shaped like
//! `{"systemPrompt": {...}, "userPrompt": {...}, "policyTemplate": "..."}`.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::directive::KeyboardHint;
use super::template;
use crate::error::ConfigError;

/// Per-intent instruction keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PromptKey {
    IdentityDocRequested,
    VehicleDocRequested,
    DataConfirmed,
    DataRejected,
    ReaskConfirmation,
    PriceRejected,
    ReaskPrice,
}

impl PromptKey {
    pub const ALL: [PromptKey; 7] = [
        Self::IdentityDocRequested,
        Self::VehicleDocRequested,
        Self::DataConfirmed,
        Self::DataRejected,
        Self::ReaskConfirmation,
        Self::PriceRejected,
        Self::ReaskPrice,
    ];

    /// Keyboard to attach to the generated reply. Replies that end in a yes/no
    /// question offer yes/no buttons.
    pub fn keyboard_hint(&self) -> Option<KeyboardHint> {
        match self {
            Self::DataConfirmed
            | Self::ReaskConfirmation
            | Self::PriceRejected
            | Self::ReaskPrice => Some(KeyboardHint::YesNo),
            Self::IdentityDocRequested | Self::VehicleDocRequested | Self::DataRejected => None,
        }
    }

    fn builtin_instruction(&self) -> &'static str {
        match self {
            Self::IdentityDocRequested => {
                "The user has not sent a photo of their passport yet. Politely ask them to send \
                 a clear photo of their passport so the insurance application can continue."
            }
            Self::VehicleDocRequested => {
                "We still need a readable photo of the user's vehicle identification document. \
                 Politely ask them to send a clear photo of it."
            }
            Self::DataConfirmed => {
                "The user confirmed that the data extracted from their documents is correct. \
                 Thank them and tell them the fixed price of the car insurance is 100 USD. \
                 Ask whether they agree with the price (yes or no)."
            }
            Self::DataRejected => {
                "The user said the extracted data is wrong. Apologize and ask them to send a new, \
                 clear photo of their passport to start over."
            }
            Self::ReaskConfirmation => {
                "The user did not answer whether the extracted data is correct. Ask them to reply \
                 yes if the data is correct or no if it is not."
            }
            Self::PriceRejected => {
                "The user does not agree with the price. Apologize and explain that 100 USD is the \
                 only available price for this insurance. Ask again whether they agree (yes or no)."
            }
            Self::ReaskPrice => {
                "The user did not answer whether they agree with the 100 USD price. Ask them to \
                 reply yes to accept the price or no to decline."
            }
        }
    }
}

impl std::fmt::Display for PromptKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::IdentityDocRequested => "identityDocRequested",
            Self::VehicleDocRequested => "vehicleDocRequested",
            Self::DataConfirmed => "dataConfirmed",
            Self::DataRejected => "dataRejected",
            Self::ReaskConfirmation => "reaskConfirmation",
            Self::PriceRejected => "priceRejected",
            Self::ReaskPrice => "reaskPrice",
        };
        write!(f, "{s}")
    }
}

/// System-level instruction keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SystemPromptKey {
    /// Tone/persona instruction for every per-intent reply.
    Persona,
    /// Instruction for turning the filled policy template into the final text.
    Finalization,
}

impl SystemPromptKey {
    fn builtin_instruction(&self) -> &'static str {
        match self {
            Self::Persona => {
                "You are a friendly, professional car insurance assistant talking to a customer \
                 in a chat. Reply in one to three short sentences. Never invent personal data, \
                 document numbers or prices."
            }
            Self::Finalization => {
                "You generate car insurance policy confirmations. Rewrite the provided policy \
                 draft as a short, formal policy document. Keep every name, passport number, \
                 vehicle number and amount exactly as given and do not add new facts."
            }
        }
    }
}

const BUILTIN_POLICY_TEMPLATE: &str = "\
CAR INSURANCE POLICY
Policy holder: {{name}}
Passport number: {{passport_number}}
Vehicle identification number: {{vehicle_number}}
Premium: 100 USD
Coverage: 12 months from the date of issue.";

/// On-disk overlay format.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct CatalogFile {
    #[serde(default)]
    system_prompt: HashMap<SystemPromptKey, String>,
    #[serde(default)]
    user_prompt: HashMap<PromptKey, String>,
    #[serde(default)]
    policy_template: Option<String>,
}

/// Static prompt lookup table.
#[derive(Debug, Clone)]
pub struct PromptCatalog {
    system: HashMap<SystemPromptKey, String>,
    user: HashMap<PromptKey, String>,
    policy_template: String,
}

impl PromptCatalog {
    /// The catalog compiled into the binary.
    pub fn builtin() -> Self {
        let system = [SystemPromptKey::Persona, SystemPromptKey::Finalization]
            .into_iter()
            .map(|k| (k, k.builtin_instruction().to_string()))
            .collect();
        let user = PromptKey::ALL
            .into_iter()
            .map(|k| (k, k.builtin_instruction().to_string()))
            .collect();
        Self {
            system,
            user,
            policy_template: BUILTIN_POLICY_TEMPLATE.to_string(),
        }
    }

    /// Built-in catalog overlaid with the entries in `json`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let file: CatalogFile = serde_json::from_str(json)
            .map_err(|e| ConfigError::ParseError(format!("prompt catalog: {e}")))?;

        let mut catalog = Self::builtin();
        catalog.system.extend(file.system_prompt);
        catalog.user.extend(file.user_prompt);
        if let Some(template) = file.policy_template {
            catalog.policy_template = template;
        }

        let missing = template::missing_placeholders(&catalog.policy_template);
        if !missing.is_empty() {
            tracing::warn!(
                missing = ?missing,
                "Policy template is missing placeholders; they will be left out of the policy"
            );
        }

        Ok(catalog)
    }

    /// Read and overlay a catalog file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        tracing::info!(path = %path.display(), "Loaded prompt catalog");
        Ok(catalog)
    }

    pub fn system(&self, key: SystemPromptKey) -> &str {
        self.system
            .get(&key)
            .map(String::as_str)
            .unwrap_or_else(|| key.builtin_instruction())
    }

    pub fn instruction(&self, key: PromptKey) -> &str {
        self.user
            .get(&key)
            .map(String::as_str)
            .unwrap_or_else(|| key.builtin_instruction())
    }

    pub fn policy_template(&self) -> &str {
        &self.policy_template
    }
}

impl Default for PromptCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
