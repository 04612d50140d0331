use crate::{
    error::{
        Result,
        SessionError,
    },
    session::{
        Action,
        ActionResult,
        AdminCommand,
        GameSnapshot,
        GameSummary,
        LogEntry,
        PlayerView,
        SessionId,
        ShotgunState,
    },
    session_client::SessionApi,
};
use proptest::prelude::*;
use reqwest::StatusCode;
use std::sync::{
    Mutex,
    atomic::{
        AtomicUsize,
        Ordering,
    },
};

pub fn player(id: i64, name: &str, lives: i64, items: &[&str], is_skipped: bool) -> PlayerView {
    PlayerView {
        id,
        name: name.to_string(),
        lives,
        items: items.iter().map(|i| i.to_string()).collect(),
        is_skipped,
    }
}

/// Round 3, sawed-off shotgun, living player A on turn holding a Beer, dead player B.
pub fn scenario_snapshot() -> GameSnapshot {
    GameSnapshot {
        round: 3,
        shotgun: ShotgunState {
            live_shells: 2,
            blank_shells: 1,
            is_sawed_off: true,
        },
        players: vec![
            player(1, "A", 2, &["Beer"], false),
            player(2, "B", 0, &[], false),
        ],
        current_player_id: Some(1),
        logs: Vec::new(),
        is_terminated: false,
    }
}

const ITEM_NAMES: [&str; 6] = ["Beer", "Saw", "Handcuffs", "Cigarette", "Magnifier", "<b>"];

fn arb_player() -> impl Strategy<Value = (String, i64, Vec<String>, bool)> {
    (
        prop::sample::select(vec!["A", "Bo", "<i>x</i>", "\u{1b}[31m", "Zoë"]),
        -2i64..6,
        prop::collection::vec(prop::sample::select(ITEM_NAMES.to_vec()), 0..6),
        any::<bool>(),
    )
        .prop_map(|(name, lives, items, skipped)| {
            (
                name.to_string(),
                lives,
                items.into_iter().map(String::from).collect(),
                skipped,
            )
        })
}

/// Snapshots with unique player ids and a current id that may or may not resolve.
pub fn arb_snapshot() -> impl Strategy<Value = GameSnapshot> {
    (
        0u32..20,
        (0u32..8, 0u32..8, any::<bool>()),
        prop::collection::vec(arb_player(), 0..5),
        prop::option::of(0i64..7),
        prop::collection::vec(
            prop::sample::select(vec!["bang", "<script>", "click", "\u{7}"]),
            0..4,
        ),
        any::<bool>(),
    )
        .prop_map(
            |(round, (live, blank, sawed), players, current, logs, terminated)| {
                GameSnapshot {
                    round,
                    shotgun: ShotgunState {
                        live_shells: live,
                        blank_shells: blank,
                        is_sawed_off: sawed,
                    },
                    players: players
                        .into_iter()
                        .enumerate()
                        .map(|(idx, (name, lives, items, is_skipped))| PlayerView {
                            id: idx as i64 + 1,
                            name,
                            lives,
                            items,
                            is_skipped,
                        })
                        .collect(),
                    current_player_id: current,
                    logs: logs
                        .into_iter()
                        .enumerate()
                        .map(|(idx, message)| LogEntry {
                            timestamp: format!("00:0{idx}"),
                            message: message.to_string(),
                        })
                        .collect(),
                    is_terminated: terminated,
                }
            },
        )
}

pub fn server_error() -> SessionError {
    SessionError::Status {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: "boom".to_string(),
    }
}

/// In-memory session that records what it was asked.
pub struct FakeSession {
    state: Mutex<Option<GameSnapshot>>,
    action_reply: Mutex<Option<ActionResult>>,
    undo_reply: Mutex<Option<ActionResult>>,
    admin_fails: Mutex<bool>,
    fetches: AtomicUsize,
    actions: Mutex<Vec<Action>>,
    admin: Mutex<Vec<AdminCommand>>,
}

impl FakeSession {
    pub fn new(snapshot: GameSnapshot) -> Self {
        Self {
            state: Mutex::new(Some(snapshot)),
            action_reply: Mutex::new(Some(ActionResult {
                success: true,
                message: None,
            })),
            undo_reply: Mutex::new(Some(ActionResult {
                success: true,
                message: None,
            })),
            admin_fails: Mutex::new(false),
            fetches: AtomicUsize::new(0),
            actions: Mutex::new(Vec::new()),
            admin: Mutex::new(Vec::new()),
        }
    }

    /// `None` makes every fetch fail.
    pub fn set_state(&self, snapshot: Option<GameSnapshot>) {
        *self.state.lock().unwrap() = snapshot;
    }

    /// `None` makes the action endpoint fail at transport level.
    pub fn set_action_reply(&self, reply: Option<ActionResult>) {
        *self.action_reply.lock().unwrap() = reply;
    }

    pub fn set_undo_reply(&self, reply: Option<ActionResult>) {
        *self.undo_reply.lock().unwrap() = reply;
    }

    pub fn fail_admin(&self) {
        *self.admin_fails.lock().unwrap() = true;
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn sent_actions(&self) -> Vec<Action> {
        self.actions.lock().unwrap().clone()
    }

    pub fn sent_admin(&self) -> Vec<AdminCommand> {
        self.admin.lock().unwrap().clone()
    }
}

impl SessionApi for FakeSession {
    async fn fetch_state(&self, _session: &SessionId) -> Result<GameSnapshot> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.state.lock().unwrap().clone().ok_or_else(server_error)
    }

    async fn send_action(&self, _session: &SessionId, action: &Action) -> Result<ActionResult> {
        self.actions.lock().unwrap().push(action.clone());
        self.action_reply.lock().unwrap().clone().ok_or_else(server_error)
    }

    async fn send_admin(&self, _session: &SessionId, command: &AdminCommand) -> Result<()> {
        self.admin.lock().unwrap().push(command.clone());
        if *self.admin_fails.lock().unwrap() {
            return Err(server_error());
        }
        Ok(())
    }

    async fn undo(&self, _session: &SessionId) -> Result<ActionResult> {
        self.admin.lock().unwrap().push(AdminCommand::Undo);
        self.undo_reply.lock().unwrap().clone().ok_or_else(server_error)
    }

    async fn list_games(&self) -> Result<Vec<GameSummary>> {
        Ok(Vec::new())
    }
}
