//! What the player is currently doing, with the allowed transitions between activities.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerActivity {
    #[default]
    Idle,
    InDungeon,
    InCombat,
    Shopping,
    Crafting,
    InTavern,
    InArena,
    ManagingCharacter,
}

impl PlayerActivity {
    pub fn allowed_transitions(self) -> &'static [PlayerActivity] {
        use PlayerActivity::*;
        match self {
            Idle => &[InDungeon, Shopping, Crafting, InTavern, InArena, ManagingCharacter],
            InDungeon => &[InCombat, Idle],
            InCombat => &[InDungeon, Idle],
            InArena => &[InCombat, Idle],
            Shopping | Crafting | InTavern | ManagingCharacter => &[Idle],
        }
    }

    pub fn can_transition_to(self, to: PlayerActivity) -> bool {
        self.allowed_transitions().contains(&to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot move from {from:?} to {to:?}")]
pub struct ActivityError {
    pub from: PlayerActivity,
    pub to: PlayerActivity,
}

/// Owned per-session activity state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActivityTracker {
    current: PlayerActivity,
    previous: Option<PlayerActivity>,
}

impl ActivityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlayerActivity {
        self.current
    }

    pub fn previous(&self) -> Option<PlayerActivity> {
        self.previous
    }

    pub fn can_transition(&self, to: PlayerActivity) -> bool {
        self.current.can_transition_to(to)
    }

    pub fn transition(&mut self, to: PlayerActivity) -> Result<(), ActivityError> {
        if !self.can_transition(to) {
            return Err(ActivityError { from: self.current, to });
        }
        debug!(from = ?self.current, ?to, "activity transition");
        self.previous = Some(self.current);
        self.current = to;
        Ok(())
    }

    /// Sets the activity without checking the table, e.g. when restoring a saved session.
    pub fn force(&mut self, to: PlayerActivity) {
        self.previous = Some(self.current);
        self.current = to;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
