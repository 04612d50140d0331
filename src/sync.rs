use crate::{
    session::{
        GameSnapshot,
        SessionId,
    },
    session_client::SessionApi,
};
use std::sync::{
    Arc,
    atomic::{
        AtomicU64,
        Ordering,
    },
};
use tokio::sync::mpsc;
use tracing::{
    debug,
    warn,
};

/// Messages from background sync and dispatch tasks to the event loop.
#[derive(Debug)]
pub enum SyncEvent {
    Snapshot { ticket: u64, snapshot: GameSnapshot },
    Notice(Notice),
}

/// A blocking notification the user has to acknowledge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    Rejected(String),
    CommunicationError,
    UndoFailed(String),
}

impl Notice {
    pub fn text(&self) -> String {
        match self {
            Notice::Rejected(message) => format!("Action Failed: {message}"),
            Notice::CommunicationError => "Communication Error".to_string(),
            Notice::UndoFailed(message) => message.clone(),
        }
    }
}

/// Fetches the state of one session and publishes it, stamped with a ticket.
///
/// Clones share the ticket counter, so tickets are ordered across the poll
/// worker and every dispatch-triggered resync.
pub struct Syncer<A> {
    api: Arc<A>,
    session: SessionId,
    tickets: Arc<AtomicU64>,
    events: mpsc::UnboundedSender<SyncEvent>,
}

impl<A> Clone for Syncer<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            session: self.session.clone(),
            tickets: self.tickets.clone(),
            events: self.events.clone(),
        }
    }
}

impl<A: SessionApi> Syncer<A> {
    pub fn new(
        api: Arc<A>,
        session: SessionId,
        events: mpsc::UnboundedSender<SyncEvent>,
    ) -> Self {
        Self {
            api,
            session,
            tickets: Arc::new(AtomicU64::new(0)),
            events,
        }
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn events(&self) -> &mpsc::UnboundedSender<SyncEvent> {
        &self.events
    }

    /// One fetch. Failures are logged and otherwise dropped; the next tick supersedes them.
    pub async fn sync(&self) -> bool {
        let ticket = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;
        match self.api.fetch_state(&self.session).await {
            Ok(snapshot) => {
                debug!(session = %self.session, ticket, "fetched snapshot");
                self.events
                    .send(SyncEvent::Snapshot { ticket, snapshot })
                    .is_ok()
            }
            Err(err) => {
                warn!(session = %self.session, ticket, %err, "snapshot fetch failed");
                false
            }
        }
    }
}

/// Rejects snapshots that were requested before the one already on screen.
#[derive(Debug, Default)]
pub struct SnapshotGate {
    last_applied: Option<u64>,
}

impl SnapshotGate {
    pub fn accept(&mut self, ticket: u64) -> bool {
        if self.last_applied.is_some_and(|last| ticket <= last) {
            debug!(ticket, last = ?self.last_applied, "dropping stale snapshot");
            return false;
        }
        self.last_applied = Some(ticket);
        true
    }
}
