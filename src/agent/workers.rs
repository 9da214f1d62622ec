//! Per-session workers.
//!
//! Every active session has one task draining its own queue, so messages of a
//! session are handled in arrival order while different sessions run in
//! parallel. A worker exits after sitting idle; the next message for that
//! session starts a new one.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::agent::Interpreter;
use crate::channels::IncomingMessage;
use crate::intake::SessionId;

type Senders = Arc<Mutex<HashMap<SessionId, UnboundedSender<IncomingMessage>>>>;

pub struct SessionWorkers {
    interpreter: Arc<Interpreter>,
    idle_timeout: Duration,
    senders: Senders,
    tasks: JoinSet<()>,
}

impl SessionWorkers {
    pub fn new(interpreter: Arc<Interpreter>, idle_timeout: Duration) -> Self {
        Self {
            interpreter,
            idle_timeout,
            senders: Arc::new(Mutex::new(HashMap::new())),
            tasks: JoinSet::new(),
        }
    }

    /// Queue a message on its session's worker, starting one if needed.
    pub async fn dispatch(&mut self, msg: IncomingMessage) {
        self.reap();

        let id = msg.session_id();
        let mut senders = self.senders.lock().await;

        let msg = match senders.get(&id) {
            Some(tx) => match tx.send(msg) {
                Ok(()) => return,
                // The worker died without deregistering; replace it.
                Err(mpsc::error::SendError(msg)) => msg,
            },
            None => msg,
        };

        let (tx, rx) = mpsc::unbounded_channel();
        // `rx` is alive, so this cannot fail.
        let _ = tx.send(msg);
        senders.insert(id.clone(), tx);
        drop(senders);

        debug!(session = %id, "Starting session worker");
        self.tasks.spawn(run_worker(
            id,
            rx,
            Arc::clone(&self.interpreter),
            Arc::clone(&self.senders),
            self.idle_timeout,
        ));
    }

    /// Number of live workers.
    pub async fn active(&self) -> usize {
        self.senders.lock().await.len()
    }

    /// Collect workers that have already exited.
    fn reap(&mut self) {
        while let Some(result) = self.tasks.try_join_next() {
            if let Err(e) = result {
                warn!("Session worker failed: {e}");
            }
        }
    }

    /// Stop accepting messages and wait until every queued one is handled.
    pub async fn shutdown(mut self) {
        self.senders.lock().await.clear();
        while let Some(result) = self.tasks.join_next().await {
            if let Err(e) = result {
                warn!("Session worker failed: {e}");
            }
        }
    }
}

async fn run_worker(
    id: SessionId,
    mut rx: UnboundedReceiver<IncomingMessage>,
    interpreter: Arc<Interpreter>,
    senders: Senders,
    idle_timeout: Duration,
) {
    loop {
        let msg = match tokio::time::timeout(idle_timeout, rx.recv()).await {
            Ok(Some(msg)) => msg,
            Ok(None) => break,
            Err(_) => {
                // Sends happen under this lock, so an empty queue here stays
                // empty until the entry is gone.
                let mut map = senders.lock().await;
                match rx.try_recv() {
                    Ok(msg) => msg,
                    Err(_) => {
                        map.remove(&id);
                        break;
                    }
                }
            }
        };

        let waited_ms = (Utc::now() - msg.received_at).num_milliseconds();
        let outcome = interpreter.handle(&msg).await;
        debug!(
            session = %id,
            message = %msg.id,
            waited_ms,
            outcome = ?outcome,
            "Message handled"
        );
    }
    debug!(session = %id, "Session worker stopped");
}
