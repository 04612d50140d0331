//! Projection of a [`GameSnapshot`] into everything the terminal draws.
//!
//! Rendering is a pure function of the snapshot: the previous view is discarded
//! and rebuilt on every sync, so two renders of the same snapshot are equal.

use crate::{
    controls::{
        Controls,
        build_controls,
    },
    session::{
        GameSnapshot,
        PlayerId,
        PlayerView,
    },
};

pub const LIFE_GLYPH: char = '⚡';
pub const SAWED_OFF_LABEL: &str = "SAWED-OFF";
pub const NORMAL_LABEL: &str = "NORMAL";
pub const NO_ITEMS_PLACEHOLDER: &str = "No Items";
pub const RESTRAINED_MARKER: &str = "[HANDCUFFED]";
pub const WAITING_TEXT: &str = "WAITING FOR START...";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameView {
    pub header: HeaderView,
    pub shotgun: ShotgunView,
    pub roster: Vec<PlayerCard>,
    pub turn: String,
    pub log: LogView,
    pub controls: Controls,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderView {
    pub round: u32,
    pub terminated: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShotgunView {
    pub live_shells: u32,
    pub blank_shells: u32,
    pub status: &'static str,
    /// Drawn in the alert colour.
    pub emphasized: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerCard {
    pub id: PlayerId,
    pub name: String,
    pub lives: String,
    pub items: ItemTags,
    pub active: bool,
    pub dead: bool,
    pub restrained: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemTags {
    Empty,
    /// One tag per held copy, in inventory order.
    Tags(Vec<String>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogView {
    pub lines: Vec<LogLine>,
    /// Always pinned to the newest entry.
    pub follow_newest: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogLine {
    pub timestamp: String,
    pub message: String,
}

pub fn render(snapshot: &GameSnapshot) -> GameView {
    let header = HeaderView {
        round: snapshot.round,
        terminated: snapshot.is_terminated,
    };
    let shotgun = ShotgunView {
        live_shells: snapshot.shotgun.live_shells,
        blank_shells: snapshot.shotgun.blank_shells,
        status: if snapshot.shotgun.is_sawed_off {
            SAWED_OFF_LABEL
        } else {
            NORMAL_LABEL
        },
        emphasized: snapshot.shotgun.is_sawed_off,
    };
    let roster = snapshot
        .players
        .iter()
        .map(|p| player_card(p, snapshot.current_player_id))
        .collect();
    let log = LogView {
        lines: snapshot
            .logs
            .iter()
            .map(|entry| LogLine {
                timestamp: plain_text(&entry.timestamp),
                message: plain_text(&entry.message),
            })
            .collect(),
        follow_newest: true,
    };

    GameView {
        header,
        shotgun,
        roster,
        turn: turn_text(snapshot),
        log,
        controls: build_controls(snapshot),
    }
}

fn player_card(player: &PlayerView, current: Option<PlayerId>) -> PlayerCard {
    let items = if player.items.is_empty() {
        ItemTags::Empty
    } else {
        ItemTags::Tags(player.items.iter().map(|i| plain_text(i)).collect())
    };
    PlayerCard {
        id: player.id,
        name: plain_text(&player.name),
        lives: life_glyphs(player.lives),
        items,
        active: current == Some(player.id),
        dead: !player.is_alive(),
        restrained: player.is_skipped,
    }
}

pub fn life_glyphs(lives: i64) -> String {
    let count = usize::try_from(lives).unwrap_or(0);
    std::iter::repeat_n(LIFE_GLYPH, count).collect()
}

pub fn turn_text(snapshot: &GameSnapshot) -> String {
    match snapshot.current_player() {
        Some(player) => format!(
            "CURRENT TURN: {} (ID: {})",
            plain_text(&player.name),
            player.id
        ),
        None => WAITING_TEXT.to_string(),
    }
}

/// Makes server-supplied text inert for the terminal.
///
/// Control characters, escape sequences included, are shown as visible escapes
/// instead of being written to the terminal. Everything else, markup-looking
/// text included, is displayed literally.
pub fn plain_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_control() {
            out.extend(c.escape_default());
        } else {
            out.push(c);
        }
    }
    out
}
