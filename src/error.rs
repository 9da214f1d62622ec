//! Error types for the car insurance bot.

use std::time::Duration;

/// Top-level error type for the bot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Transport (channel) errors. Never surfaced to the user.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("Failed to send response on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("No channel registered under name {name}")]
    UnknownChannel { name: String },

    #[error("Channel {name} still failing after {attempts} attempts (retry delay {delay:?})")]
    RetriesExhausted {
        name: String,
        attempts: u32,
        delay: Duration,
    },
}

/// Language-model provider errors (the upstream class: the user gets an apology
/// and may retry).
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} returned HTTP {status}: {body}")]
    HttpStatus {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Provider {provider} returned an empty reply")]
    EmptyResponse { provider: String },

    #[error("Failed to create {provider} client: {reason}")]
    ClientBuild { provider: String, reason: String },
}

/// Document extraction errors. Treated as "not a valid document" by the
/// conversation flow.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("Document could not be read by {extractor}: {reason}")]
    Unreadable { extractor: String, reason: String },
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
