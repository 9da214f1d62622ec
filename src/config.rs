//! Configuration types.
//!
//! Everything comes from `CARINSURANCEBOT_*` environment variables. Parsing
//! goes through a lookup function so tests can feed a map instead of the
//! process environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::intake::ExtractedData;
use crate::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL, LlmConfig};

const PREFIX: &str = "CARINSURANCEBOT_";

/// Driver tuning.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Sessions idle this long are evicted.
    pub session_ttl: Duration,
    /// How often the eviction sweep runs.
    pub prune_interval: Duration,
    /// A per-session worker with nothing queued for this long exits.
    pub worker_idle_timeout: Duration,
    /// Delay between channel start attempts.
    pub retry_delay: Duration,
    /// Channel start attempts before giving up.
    pub start_attempts: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            session_ttl: Duration::from_secs(3600), // 1 hour
            prune_interval: Duration::from_secs(300), // 5 minutes
            worker_idle_timeout: Duration::from_secs(60),
            retry_delay: Duration::from_millis(1000),
            start_attempts: 5,
        }
    }
}

/// Telegram bot settings.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub token: SecretString,
    /// Usernames or numeric ids; `*` allows everyone.
    pub allowed_users: Vec<String>,
}

/// Full bot configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub llm: LlmConfig,
    /// `None` runs the CLI channel instead.
    pub telegram: Option<TelegramConfig>,
    /// Prompt catalog overlay; built-in prompts when unset.
    pub prompts_path: Option<PathBuf>,
    /// Directory for the daily log file.
    pub log_dir: Option<PathBuf>,
    pub driver: DriverConfig,
    /// Record returned by the static extractor.
    pub sample: ExtractedData,
}

/// Record the static extractor returns unless overridden.
pub fn default_sample() -> ExtractedData {
    ExtractedData::new("John Smith", "AB1234567", "WVWZZZ1JZXW000001")
}

impl BotConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which maps a full variable name to
    /// its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env { lookup };

        let api_key = env
            .string("OPENAI_API_KEY")
            .ok_or_else(|| ConfigError::MissingEnvVar(format!("{PREFIX}OPENAI_API_KEY")))?;

        let llm = LlmConfig {
            api_key: SecretString::from(api_key),
            model: env
                .string("OPENAI_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: env
                .string("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        };

        let telegram = env.string("TELEGRAM_API_KEY").map(|token| TelegramConfig {
            token: SecretString::from(token),
            allowed_users: env
                .string("TELEGRAM_ALLOWED_USERS")
                .map(|raw| split_list(&raw))
                .unwrap_or_else(|| vec!["*".to_string()]),
        });

        let defaults = DriverConfig::default();
        let driver = DriverConfig {
            session_ttl: env
                .number("SESSION_TTL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.session_ttl),
            prune_interval: env
                .number("PRUNE_INTERVAL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.prune_interval),
            worker_idle_timeout: env
                .number("WORKER_IDLE_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.worker_idle_timeout),
            retry_delay: env
                .number("RETRY_DELAY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry_delay),
            start_attempts: env
                .number("START_ATTEMPTS")?
                .unwrap_or(defaults.start_attempts),
        };

        if driver.session_ttl.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: format!("{PREFIX}SESSION_TTL_SECS"),
                message: "must be greater than zero".into(),
            });
        }
        if driver.prune_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: format!("{PREFIX}PRUNE_INTERVAL_SECS"),
                message: "must be greater than zero".into(),
            });
        }
        if driver.start_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                key: format!("{PREFIX}START_ATTEMPTS"),
                message: "must be at least 1".into(),
            });
        }

        let fallback = default_sample();
        let sample = ExtractedData::new(
            env.string("SAMPLE_NAME").unwrap_or(fallback.name),
            env.string("SAMPLE_PASSPORT")
                .unwrap_or(fallback.passport_number),
            env.string("SAMPLE_VEHICLE")
                .unwrap_or(fallback.vehicle_number),
        );

        Ok(Self {
            llm,
            telegram,
            prompts_path: env.string("PROMPTS_PATH").map(PathBuf::from),
            log_dir: env.string("LOG_DIR").map(PathBuf::from),
            driver,
            sample,
        })
    }
}

/// Prefixed, trimmed variable access. Blank values count as unset.
struct Env<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn string(&self, name: &str) -> Option<String> {
        (self.lookup)(&format!("{PREFIX}{name}"))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn number<T>(&self, name: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let Some(raw) = self.string(name) else {
            return Ok(None);
        };
        raw.parse()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                key: format!("{PREFIX}{name}"),
                message: format!("{raw:?}: {e}"),
            })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
