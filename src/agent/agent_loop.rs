//! Main driver loop.
//!
//! Starts the channels (retrying transport faults), spawns the idle-session
//! sweep, and hands every inbound message to its session's worker until
//! Ctrl+C or until all channel streams end.

use std::sync::Arc;

use futures::StreamExt;

use crate::agent::{HandleOutcome, Interpreter, SessionWorkers};
use crate::channels::{ChannelManager, IncomingMessage, MessageStream};
use crate::config::DriverConfig;
use crate::error::{self, ChannelError};
use crate::extraction::Extractor;
use crate::intake::{PromptCatalog, SessionStore, spawn_pruning_task};
use crate::llm::LlmProvider;

/// Collaborators the driver calls out to.
///
/// Bundles the shared components to reduce argument count.
pub struct DriverDeps {
    pub llm: Arc<dyn LlmProvider>,
    pub extractor: Arc<dyn Extractor>,
    pub prompts: Arc<PromptCatalog>,
}

/// Connects channels to the intake flow.
pub struct Driver {
    config: DriverConfig,
    channels: Arc<ChannelManager>,
    interpreter: Arc<Interpreter>,
}

impl Driver {
    /// Create a new driver. Pass a store to share sessions with the caller.
    pub fn new(
        config: DriverConfig,
        deps: DriverDeps,
        channels: ChannelManager,
        store: Option<Arc<SessionStore>>,
    ) -> Self {
        let store = store.unwrap_or_else(SessionStore::new);
        let channels = Arc::new(channels);
        let interpreter = Arc::new(Interpreter::new(deps, Arc::clone(&channels), store));

        Self {
            config,
            channels,
            interpreter,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        self.interpreter.store()
    }

    /// Handle one message inline, bypassing the per-session workers.
    pub async fn handle_message(&self, msg: &IncomingMessage) -> HandleOutcome {
        self.interpreter.handle(msg).await
    }

    /// Start all channels, retrying transport faults up to the configured
    /// number of attempts.
    async fn start_channels(&self) -> Result<MessageStream, ChannelError> {
        let attempts = self.config.start_attempts.max(1);
        let delay = self.config.retry_delay;

        for attempt in 1..=attempts {
            let started = match self.channels.health_check_all().await {
                Ok(()) => self.channels.start_all().await,
                Err(e) => Err(e),
            };
            match started {
                Ok(stream) => return Ok(stream),
                Err(e) if attempt < attempts => {
                    tracing::warn!(
                        attempt,
                        attempts,
                        "Channel startup failed: {e}; retrying in {delay:?}"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::error!(attempt, "Channel startup failed: {e}; giving up");
                }
            }
        }

        Err(ChannelError::RetriesExhausted {
            name: self.channels.names().join(","),
            attempts,
            delay,
        })
    }

    // ── Main loop ───────────────────────────────────────────────────

    /// Run the driver until Ctrl+C or until every channel stream ends.
    /// Messages already queued are handled before this returns.
    pub async fn run(self) -> error::Result<()> {
        let mut message_stream = self.start_channels().await?;

        let pruning_handle = spawn_pruning_task(
            Arc::clone(self.store()),
            self.config.prune_interval,
            self.config.session_ttl,
        );

        let mut workers =
            SessionWorkers::new(Arc::clone(&self.interpreter), self.config.worker_idle_timeout);

        tracing::info!(
            "Car insurance bot ready and listening on: {}",
            self.channels.names().join(", ")
        );

        loop {
            let message = tokio::select! {
                biased;
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received, shutting down...");
                    break;
                }
                msg = message_stream.next() => {
                    match msg {
                        Some(m) => m,
                        None => {
                            tracing::info!("All channel streams ended, shutting down...");
                            break;
                        }
                    }
                }
            };

            tracing::debug!(
                session = %message.session_id(),
                kind = ?message.kind,
                "Message received"
            );
            workers.dispatch(message).await;
        }

        // Cleanup
        workers.shutdown().await;
        pruning_handle.abort();
        self.channels.shutdown_all().await?;

        tracing::info!("Driver stopped");
        Ok(())
    }
}
