//! Interactive affordances derived from a snapshot.

use crate::session::{
    Action,
    GameSnapshot,
    PlayerId,
};
use itertools::Itertools;
use std::fmt;

pub const TARGETED_ITEM: &str = "handcuffs";
pub const TARGET_PROMPT: &str = "Enter Target Player ID for Handcuffs:";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub targets: Vec<TargetControl>,
    pub items: Vec<ItemControl>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetControl {
    pub target_id: PlayerId,
    pub label: TargetLabel,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetLabel {
    SelfTarget,
    Player(PlayerId),
}

impl fmt::Display for TargetLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetLabel::SelfTarget => f.write_str("SELF"),
            TargetLabel::Player(id) => write!(f, "PLAYER {id}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemControl {
    pub name: String,
}

/// What activating a control asks of the client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    Send(Action),
    /// A target id must be collected from the user before anything is sent.
    NeedsTarget { item_name: String },
}

impl TargetControl {
    pub fn activate(&self) -> Action {
        Action::Shoot {
            target_id: self.target_id,
        }
    }
}

impl ItemControl {
    pub fn activate(&self) -> Intent {
        if self.name.eq_ignore_ascii_case(TARGETED_ITEM) {
            Intent::NeedsTarget {
                item_name: self.name.clone(),
            }
        } else {
            Intent::Send(Action::UseItem {
                item_name: self.name.clone(),
                target_id: None,
            })
        }
    }
}

/// Completes a [`Intent::NeedsTarget`] with the user's answer.
///
/// Cancelling, an empty answer, or one that is not a player id sends nothing.
pub fn resolve_target(item_name: &str, answer: Option<&str>) -> Option<Action> {
    let target_id = answer?.trim().parse::<PlayerId>().ok()?;
    Some(Action::UseItem {
        item_name: item_name.to_string(),
        target_id: Some(target_id),
    })
}

pub fn build_controls(snapshot: &GameSnapshot) -> Controls {
    let targets = snapshot
        .players
        .iter()
        .filter(|p| p.is_alive())
        .map(|p| TargetControl {
            target_id: p.id,
            label: if snapshot.current_player_id == Some(p.id) {
                TargetLabel::SelfTarget
            } else {
                TargetLabel::Player(p.id)
            },
        })
        .collect();

    let items = snapshot
        .current_player()
        .map(|current| {
            current
                .items
                .iter()
                .unique()
                .map(|name| ItemControl { name: name.clone() })
                .collect()
        })
        .unwrap_or_default();

    Controls { targets, items }
}
