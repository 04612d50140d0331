//! Repeating sync of a session's state.

use crate::{
    session::SessionId,
    session_client::SessionApi,
    sync::Syncer,
};
use std::{
    collections::HashMap,
    time::Duration,
};
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time,
};
use tracing::{
    info,
    warn,
};

pub const POLL_INTERVAL: Duration = Duration::from_millis(2000);

pub enum PollCommand {
    SyncNow,
    Shutdown,
}

struct PollHandle {
    commands: mpsc::UnboundedSender<PollCommand>,
    task: JoinHandle<()>,
}

/// At most one running poll worker per session.
#[derive(Default)]
pub struct PollScheduler {
    workers: HashMap<SessionId, PollHandle>,
}

impl PollScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Syncs immediately, then every [`POLL_INTERVAL`]. A worker already running
    /// for the same session is cancelled first.
    pub fn start<A: SessionApi>(&mut self, syncer: Syncer<A>) {
        let session = syncer.session().clone();
        if self.stop(&session) {
            info!(%session, "restarting poll worker");
        }
        let (commands, cmd_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(poll_worker(syncer, cmd_rx));
        self.workers.insert(session, PollHandle { commands, task });
    }

    pub fn sync_now(&self, session: &SessionId) {
        if let Some(handle) = self.workers.get(session)
            && handle.commands.send(PollCommand::SyncNow).is_err()
        {
            warn!(%session, "poll worker is gone");
        }
    }

    /// Returns whether a worker was running.
    pub fn stop(&mut self, session: &SessionId) -> bool {
        match self.workers.remove(session) {
            Some(handle) => {
                let _ = handle.commands.send(PollCommand::Shutdown);
                handle.task.abort();
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self, session: &SessionId) -> bool {
        self.workers
            .get(session)
            .is_some_and(|handle| !handle.task.is_finished())
    }

    pub fn active_sessions(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        for (_, handle) in self.workers.drain() {
            handle.task.abort();
        }
    }
}

async fn poll_worker<A: SessionApi>(
    syncer: Syncer<A>,
    mut cmd_rx: mpsc::UnboundedReceiver<PollCommand>,
) {
    let mut ticker = time::interval(POLL_INTERVAL);
    ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
    info!(session = %syncer.session(), "poll worker started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                syncer.sync().await;
            }
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(PollCommand::SyncNow) => {
                        syncer.sync().await;
                    }
                    Some(PollCommand::Shutdown) | None => break,
                }
            }
        }
    }
    info!(session = %syncer.session(), "poll worker stopped");
}
