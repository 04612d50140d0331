use crate::ui;
use chrono::Local;
use color_eyre::eyre::{
    Result,
    WrapErr,
};
use roulette_client::{
    config::{
        AppConfig,
        Mode,
    },
    dispatch::Dispatcher,
    poll::PollScheduler,
    session::{
        GameSummary,
        SessionId,
    },
    session_client::{
        SessionApi,
        SessionClient,
    },
    sync::{
        SnapshotGate,
        SyncEvent,
        Syncer,
    },
    view::{
        self,
        GameView,
    },
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{
    info,
    warn,
};

/// Everything the event loop owns for one attached session.
pub struct AppController {
    session: SessionId,
    server: String,
    scheduler: PollScheduler,
    syncer: Syncer<SessionClient>,
    dispatcher: Dispatcher<SessionClient>,
    gate: SnapshotGate,
    view: Option<GameView>,
    last_sync: Option<String>,
}

impl AppController {
    fn new(
        client: SessionClient,
        session: SessionId,
        events: mpsc::UnboundedSender<SyncEvent>,
    ) -> Self {
        let server = client.base_url().to_string();
        let syncer = Syncer::new(Arc::new(client), session.clone(), events);
        let dispatcher = Dispatcher::new(syncer.clone());
        Self {
            session,
            server,
            scheduler: PollScheduler::new(),
            syncer,
            dispatcher,
            gate: SnapshotGate::default(),
            view: None,
            last_sync: None,
        }
    }

    fn start_polling(&mut self) {
        info!(session = %self.session, "starting poll loop");
        self.scheduler.start(self.syncer.clone());
    }

    fn apply(&mut self, event: SyncEvent, ui_state: &mut ui::UiState) {
        match event {
            SyncEvent::Snapshot { ticket, snapshot } => {
                if self.gate.accept(ticket) {
                    self.view = Some(view::render(&snapshot));
                    self.last_sync = Some(Local::now().format("%H:%M:%S").to_string());
                }
            }
            SyncEvent::Notice(notice) => ui::show_notice(ui_state, notice.text()),
        }
    }

    fn draw(&self, ui_state: &mut ui::UiState) -> Result<()> {
        let status = ui::StatusView {
            session: self.session.as_str(),
            server: &self.server,
            last_sync: self.last_sync.as_deref(),
        };
        ui::draw(ui_state, self.view.as_ref(), &status)
    }

    fn spawn_dispatch(&self, event: ui::UserEvent) {
        let dispatcher = self.dispatcher.clone();
        match event {
            ui::UserEvent::Send(action) => {
                tokio::spawn(async move {
                    dispatcher.dispatch(&action).await;
                });
            }
            ui::UserEvent::Admin(command) => {
                tokio::spawn(async move {
                    dispatcher.admin(&command).await;
                });
            }
            _ => {}
        }
    }
}

pub async fn run_app(config: AppConfig) -> Result<()> {
    let client = SessionClient::new(config.server_url.clone())
        .wrap_err("failed to build HTTP client for game server")?;
    let session = match config.mode {
        Mode::ListGames => return list_games(&client).await,
        Mode::Attach(session) => session,
    };

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let controller = AppController::new(client, session, events_tx);
    let mut ui_state = ui::UiState::default();
    let mut input_events = ui::input_event_stream();

    tracing::info!("Starting UI");
    ui::terminal_enter(&mut ui_state)?;
    let res = run_loop(controller, events_rx, &mut ui_state, &mut input_events).await;
    ui::terminal_exit()?;
    res
}

async fn list_games(client: &SessionClient) -> Result<()> {
    let games = client
        .list_games()
        .await
        .wrap_err_with(|| format!("failed to list sessions on {client}"))?;
    if games.is_empty() {
        println!("No sessions hosted on {client}");
    }
    for game in &games {
        println!("{}", format_summary(game));
    }
    Ok(())
}

fn format_summary(game: &GameSummary) -> String {
    let mut flags = Vec::new();
    if game.is_over {
        flags.push("over");
    }
    if game.is_terminated {
        flags.push("terminated");
    }
    let flags = if flags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", flags.join(", "))
    };
    format!(
        "{} | round {} | {} players | turn {} | live {} / blank {}{}",
        game.id,
        game.round,
        game.players,
        game.current_turn,
        game.shell_counts.live,
        game.shell_counts.blank,
        flags
    )
}

async fn run_loop(
    mut controller: AppController,
    mut events_rx: mpsc::UnboundedReceiver<SyncEvent>,
    ui_state: &mut ui::UiState,
    input_events: &mut ui::InputEventReceiver,
) -> Result<()> {
    tracing::info!("Running app loop");
    controller.draw(ui_state).wrap_err("initial draw failed")?;
    controller.start_polling();

    loop {
        tokio::select! {
            maybe_event = events_rx.recv() => {
                let Some(event) = maybe_event else {
                    warn!("sync channel closed");
                    break;
                };
                controller.apply(event, ui_state);
                controller.draw(ui_state).wrap_err("draw after sync failed")?;
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
            raw_ev = ui::next_raw_event(input_events) => {
                let event = raw_ev?;
                let Some(ev) = ui::interpret_event(ui_state, event) else {
                    continue;
                };
                match ev {
                    ui::UserEvent::Quit => break,
                    ui::UserEvent::Redraw => {}
                    ui::UserEvent::Refresh => controller.scheduler.sync_now(&controller.session),
                    other => controller.spawn_dispatch(other),
                }
                controller.draw(ui_state).wrap_err("draw after input failed")?;
            }
        }
    }
    controller.scheduler.stop(&controller.session);
    info!(session = %controller.session, "left session");
    Ok(())
}
