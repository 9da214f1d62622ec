//! Conversation driver: receives channel messages, runs the intake state
//! machine, and carries out its directives.

pub mod agent_loop;
pub mod interpreter;
pub mod workers;

pub use agent_loop::{Driver, DriverDeps};
pub use interpreter::{HandleOutcome, Interpreter};
pub use workers::SessionWorkers;
