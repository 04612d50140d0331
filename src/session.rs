//! Wire types exchanged with the remote game session.

use serde::{
    Deserialize,
    Serialize,
};
use std::fmt;

pub type PlayerId = i64;

/// Identifier of one hosted game, used in every endpoint path.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Authoritative state of a session at the moment it was fetched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub round: u32,
    pub shotgun: ShotgunState,
    pub players: Vec<PlayerView>,
    #[serde(default)]
    pub current_player_id: Option<PlayerId>,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
    #[serde(default)]
    pub is_terminated: bool,
}

impl GameSnapshot {
    /// The player whose turn it is, if the id resolves to anyone in the roster.
    pub fn current_player(&self) -> Option<&PlayerView> {
        let id = self.current_player_id?;
        self.players.iter().find(|p| p.id == id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotgunState {
    pub live_shells: u32,
    pub blank_shells: u32,
    pub is_sawed_off: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub lives: i64,
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub is_skipped: bool,
}

impl PlayerView {
    pub fn is_alive(&self) -> bool {
        self.lives > 0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub message: String,
}

/// Structured reply to the generic action and undo endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// A player intent adjudicated by the session.
///
/// Serializes flat, with the action name merged into the payload:
/// `{"action": "shoot", "target_id": 2}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Action {
    Shoot {
        target_id: PlayerId,
    },
    #[serde(rename = "use")]
    UseItem {
        item_name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        target_id: Option<PlayerId>,
    },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Shoot { .. } => "shoot",
            Action::UseItem { .. } => "use",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Shoot { target_id } => write!(f, "shoot player {target_id}"),
            Action::UseItem {
                item_name,
                target_id: Some(target),
            } => write!(f, "use {item_name} on player {target}"),
            Action::UseItem { item_name, .. } => write!(f, "use {item_name}"),
        }
    }
}

/// Administrative operations routed to dedicated endpoints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdminCommand {
    Message(String),
    Terminate,
    Reset,
    Undo,
}

impl AdminCommand {
    /// Text of the confirmation gate a user must accept before the request is sent.
    pub fn confirmation_prompt(&self) -> Option<&'static str> {
        match self {
            AdminCommand::Message(_) => None,
            AdminCommand::Terminate => {
                Some("WARNING: This will forcibly end the game session. Continue?")
            }
            AdminCommand::Reset => Some("Are you sure you want to reset this session?"),
            AdminCommand::Undo => Some("Undo last action?"),
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            AdminCommand::Message(_) => "message",
            AdminCommand::Terminate => "terminate",
            AdminCommand::Reset => "reset",
            AdminCommand::Undo => "undo",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct GameSummary {
    pub id: String,
    pub round: u32,
    pub players: u32,
    pub is_over: bool,
    pub is_terminated: bool,
    pub shell_counts: ShellCounts,
    #[serde(default)]
    pub current_turn: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ShellCounts {
    pub live: u32,
    pub blank: u32,
}

#[derive(Deserialize)]
pub(crate) struct GameListDto {
    pub games: Vec<GameSummary>,
}
