use crate::{
    session::{
        Action,
        ActionResult,
        AdminCommand,
    },
    session_client::SessionApi,
    sync::{
        Notice,
        SyncEvent,
        Syncer,
    },
};
use tracing::{
    error,
    info,
    warn,
};

const NO_REASON: &str = "no reason given";

/// Where a single dispatch ended up.
///
/// `Idle -> Sent -> {Applied | Rejected | Failed} -> Idle`. Only `Applied`
/// triggers a resync.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    Applied,
    Rejected(String),
    Failed,
    NotSent,
}

/// Sends player and admin intents to one session.
pub struct Dispatcher<A> {
    syncer: Syncer<A>,
}

impl<A> Clone for Dispatcher<A> {
    fn clone(&self) -> Self {
        Self {
            syncer: self.syncer.clone(),
        }
    }
}

impl<A: SessionApi> Dispatcher<A> {
    pub fn new(syncer: Syncer<A>) -> Self {
        Self { syncer }
    }

    fn notify(&self, notice: Notice) {
        if self.syncer.events().send(SyncEvent::Notice(notice)).is_err() {
            warn!("event loop gone; notice dropped");
        }
    }

    pub async fn dispatch(&self, action: &Action) -> DispatchOutcome {
        let session = self.syncer.session();
        info!(%session, %action, "sending action");
        match self.syncer.api().send_action(session, action).await {
            Ok(ActionResult { success: true, .. }) => {
                self.syncer.sync().await;
                DispatchOutcome::Applied
            }
            Ok(ActionResult {
                success: false,
                message,
            }) => {
                let message = message.unwrap_or_else(|| NO_REASON.to_string());
                warn!(%session, %action, %message, "action rejected");
                self.notify(Notice::Rejected(message.clone()));
                DispatchOutcome::Rejected(message)
            }
            Err(err) => {
                error!(%session, %action, error = %err, "action failed");
                self.notify(Notice::CommunicationError);
                DispatchOutcome::Failed
            }
        }
    }

    /// Sends an admin command that has already passed its confirmation gate.
    pub async fn admin(&self, command: &AdminCommand) -> DispatchOutcome {
        let session = self.syncer.session();
        match command {
            AdminCommand::Message(message) if message.is_empty() => DispatchOutcome::NotSent,
            AdminCommand::Undo => match self.syncer.api().undo(session).await {
                Ok(ActionResult { success: true, .. }) => {
                    info!(%session, "undo applied");
                    self.syncer.sync().await;
                    DispatchOutcome::Applied
                }
                Ok(ActionResult {
                    success: false,
                    message,
                }) => {
                    let message = message.unwrap_or_else(|| NO_REASON.to_string());
                    self.notify(Notice::UndoFailed(message.clone()));
                    DispatchOutcome::Rejected(message)
                }
                Err(err) => {
                    error!(%session, error = %err, "undo failed");
                    DispatchOutcome::Failed
                }
            },
            _ => match self.syncer.api().send_admin(session, command).await {
                Ok(()) => {
                    info!(%session, endpoint = command.endpoint(), "admin command sent");
                    self.syncer.sync().await;
                    DispatchOutcome::Applied
                }
                Err(err) => {
                    error!(%session, endpoint = command.endpoint(), error = %err, "admin command failed");
                    DispatchOutcome::Failed
                }
            },
        }
    }
}
