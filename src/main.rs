use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use carinsurance_bot::agent::{Driver, DriverDeps};
use carinsurance_bot::channels::{ChannelManager, CliChannel, TelegramChannel};
use carinsurance_bot::config::BotConfig;
use carinsurance_bot::extraction::StaticExtractor;
use carinsurance_bot::intake::PromptCatalog;
use carinsurance_bot::llm::create_provider;

/// Console logging plus, when a directory is given, a daily rolling file.
/// The returned guard must live until exit so buffered lines are flushed.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(filter());

    let (file, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "carinsurance-bot.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .init();

    guard
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = BotConfig::from_env().context("Failed to load configuration")?;

    let _log_guard = init_tracing(config.log_dir.as_deref());

    eprintln!("🚗 Car Insurance Bot v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.llm.model);
    eprintln!("   Endpoint: {}", config.llm.base_url);

    let llm = create_provider(&config.llm).context("Failed to create LLM provider")?;

    let prompts = match &config.prompts_path {
        Some(path) => {
            eprintln!("   Prompts: {}", path.display());
            PromptCatalog::load(path)
                .with_context(|| format!("Failed to load prompts from {}", path.display()))?
        }
        None => {
            eprintln!("   Prompts: built-in");
            PromptCatalog::builtin()
        }
    };

    if let Some(dir) = &config.log_dir {
        eprintln!("   Log dir: {}", dir.display());
    }

    let deps = DriverDeps {
        llm,
        extractor: Arc::new(StaticExtractor::new(config.sample.clone())),
        prompts: Arc::new(prompts),
    };

    // Telegram when a bot token is set, otherwise a local REPL
    let mut channels = ChannelManager::new();
    match &config.telegram {
        Some(telegram) => {
            eprintln!(
                "   Telegram: enabled (allowed: {})",
                if telegram.allowed_users.iter().any(|u| u == "*") {
                    "everyone".to_string()
                } else {
                    telegram.allowed_users.join(", ")
                }
            );
            channels.add(Box::new(
                TelegramChannel::new(telegram.token.clone(), telegram.allowed_users.clone())
                    .with_retry_delay(config.driver.retry_delay),
            ));
        }
        None => {
            eprintln!("   Telegram: disabled (CARINSURANCEBOT_TELEGRAM_API_KEY not set)");
            channels.add(Box::new(CliChannel::new()));
        }
    }
    eprintln!("   Channels: {}\n", channels.names().join(", "));

    let driver = Driver::new(config.driver.clone(), deps, channels, None);
    driver.run().await?;

    Ok(())
}
