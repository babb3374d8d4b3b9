//! In-memory record of a combat's starting roster and every input applied to it.

use serde::{Deserialize, Serialize};

use crate::combat::{CombatAction, Combatant};

pub const JOURNAL_FORMAT_VERSION: u16 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatJournal {
    pub format_version: u16,
    pub build_id: String,
    pub seed: u64,
    pub player: Combatant,
    pub enemies: Vec<Combatant>,
    pub inputs: Vec<JournalRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRecord {
    pub seq: u64,
    pub payload: JournalPayload,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum JournalPayload {
    PlayerAction(CombatAction),
    EnemyTurn,
}

impl CombatJournal {
    pub fn new(seed: u64, player: Combatant, enemies: Vec<Combatant>) -> Self {
        Self {
            format_version: JOURNAL_FORMAT_VERSION,
            build_id: env!("CARGO_PKG_VERSION").to_string(),
            seed,
            player,
            enemies,
            inputs: Vec::new(),
        }
    }

    pub fn next_seq(&self) -> u64 {
        self.inputs.len() as u64
    }

    pub fn append(&mut self, payload: JournalPayload) -> &JournalRecord {
        let seq = self.next_seq();
        self.inputs.push(JournalRecord { seq, payload });
        &self.inputs[self.inputs.len() - 1]
    }

    pub fn player_actions(&self) -> impl Iterator<Item = &CombatAction> {
        self.inputs.iter().filter_map(|record| match &record.payload {
            JournalPayload::PlayerAction(action) => Some(action),
            JournalPayload::EnemyTurn => None,
        })
    }
}
