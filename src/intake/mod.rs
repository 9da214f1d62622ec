//! Intake flow: the per-session conversation that collects documents,
//! confirms the extracted data and the price, and issues the policy.
//!
//! The state machine in [`machine`] is pure. The driver in `crate::agent`
//! feeds it events, executes the returned [`Directive`], and only then
//! commits the new [`Session`] to the [`SessionStore`].

pub mod directive;
pub mod event;
pub mod machine;
pub mod messages;
pub mod model;
pub mod prompts;
pub mod state;
pub mod store;
pub mod template;

pub use directive::{Directive, KeyboardHint};
pub use event::{Answer, Event, EventKind, RESTART_COMMAND};
pub use machine::{Transition, step};
pub use model::{ExtractedData, Session, SessionId};
pub use prompts::{PromptCatalog, PromptKey, SystemPromptKey};
pub use state::IntakeState;
pub use store::{SessionGuard, SessionStore, spawn_pruning_task};
pub use template::FilledTemplate;
