//! Directive interpreter: runs one inbound message through the state
//! machine and performs the resulting side effect.
//!
//! The session stays locked for the whole message, including collaborator
//! calls. The new session is committed only when its directive succeeded; on
//! failure the session keeps its previous state.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::agent::DriverDeps;
use crate::channels::{ChannelManager, IncomingMessage, OutgoingResponse, StatusUpdate};
use crate::error::{ChannelError, LlmError};
use crate::intake::template;
use crate::intake::{
    Directive, Event, IntakeState, SessionGuard, SessionStore, SystemPromptKey, step,
};
use crate::intake::messages::{PROCESSING_DOCUMENTS, UPSTREAM_APOLOGY};

/// What happened to the session after one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    /// The directive succeeded and the session moved to this state.
    Committed(IntakeState),
    /// The directive failed; the session is still in this state.
    Retained(IntakeState),
}

#[derive(Debug, thiserror::Error)]
enum DirectiveError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Channel(#[from] ChannelError),
}

pub struct Interpreter {
    deps: DriverDeps,
    channels: Arc<ChannelManager>,
    store: Arc<SessionStore>,
}

impl Interpreter {
    pub fn new(deps: DriverDeps, channels: Arc<ChannelManager>, store: Arc<SessionStore>) -> Self {
        Self {
            deps,
            channels,
            store,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Handle one inbound message end to end.
    pub async fn handle(&self, msg: &IncomingMessage) -> HandleOutcome {
        let id = msg.session_id();
        let mut guard = self.store.lock(&id).await;
        let mut event = Event::from_message(msg.kind, &msg.content);

        loop {
            let from = guard.session().state;
            let transition = step(guard.session().clone(), &event);
            debug!(
                session = %id,
                state = %from,
                event = event.label(),
                directive = transition.directive.label(),
                "Step"
            );

            if transition.directive == Directive::RequestExtraction {
                guard.commit(transition.session);
                event = self.run_extraction(msg).await;
                continue;
            }

            return match self.execute(msg, &transition.directive).await {
                Ok(()) => {
                    let to = transition.session.state;
                    if to != from {
                        info!(session = %id, from = %from, to = %to, "Session advanced");
                    }
                    guard.commit(transition.session);
                    HandleOutcome::Committed(to)
                }
                Err(e) => self.recover(msg, &guard, e).await,
            };
        }
    }

    /// Call the extractor and turn its result into the follow-up event.
    async fn run_extraction(&self, msg: &IncomingMessage) -> Event {
        if let Err(e) = self
            .channels
            .send_status(msg, StatusUpdate::Status(PROCESSING_DOCUMENTS.to_string()))
            .await
        {
            debug!("Could not send processing status: {e}");
        }
        if let Err(e) = self.channels.send_status(msg, StatusUpdate::Typing).await {
            debug!("Could not send typing indicator: {e}");
        }

        match self.deps.extractor.extract().await {
            Ok(data) => Event::ExtractionCompleted(data),
            Err(e) => {
                warn!(
                    session = %msg.session_id(),
                    extractor = self.deps.extractor.name(),
                    "Extraction failed: {e}"
                );
                Event::ExtractionFailed
            }
        }
    }

    async fn execute(
        &self,
        msg: &IncomingMessage,
        directive: &Directive,
    ) -> Result<(), DirectiveError> {
        let prompts = &self.deps.prompts;
        let response = match directive {
            Directive::Noop | Directive::RequestExtraction => return Ok(()),
            Directive::SendFixedText { text, keyboard } => {
                OutgoingResponse::text(text.clone()).with_keyboard(*keyboard)
            }
            Directive::SendGeneratedText { prompt } => {
                let text = self
                    .deps
                    .llm
                    .generate(prompts.system(SystemPromptKey::Persona), prompts.instruction(*prompt))
                    .await?;
                OutgoingResponse::text(text).with_keyboard(prompt.keyboard_hint())
            }
            Directive::RequestFinalization { data } => {
                let filled = template::fill(prompts.policy_template(), data);
                if !filled.missing.is_empty() {
                    warn!(missing = ?filled.missing, "Policy template lacks placeholders");
                }
                if !filled.unresolved.is_empty() {
                    warn!(unresolved = ?filled.unresolved, "Policy template has unknown placeholders");
                }
                let text = self
                    .deps
                    .llm
                    .generate(prompts.system(SystemPromptKey::Finalization), &filled.text)
                    .await?;
                OutgoingResponse::text(text)
            }
        };

        self.channels.respond(msg, response).await?;
        Ok(())
    }

    async fn recover(
        &self,
        msg: &IncomingMessage,
        guard: &SessionGuard,
        error: DirectiveError,
    ) -> HandleOutcome {
        let state = guard.session().state;
        match error {
            DirectiveError::Llm(e) => {
                warn!(session = %msg.session_id(), state = %state, "Language model call failed: {e}");
                if let Err(e) = self
                    .channels
                    .respond(msg, OutgoingResponse::text(UPSTREAM_APOLOGY))
                    .await
                {
                    warn!(session = %msg.session_id(), "Could not send apology: {e}");
                }
            }
            DirectiveError::Channel(e) => {
                warn!(session = %msg.session_id(), state = %state, "Reply not delivered: {e}");
            }
        }
        HandleOutcome::Retained(state)
    }
}
