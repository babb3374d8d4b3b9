//! Re-runs a journaled combat from its starting roster and seed.

use thiserror::Error;

use crate::combat::{CombatError, CombatState, CombatSummary, initialize_combat};
use crate::journal::{CombatJournal, JournalPayload};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("journal roster is invalid: {0}")]
    InvalidRoster(CombatError),
    #[error("input {seq} was rejected: {source}")]
    RejectedInput { seq: u64, source: CombatError },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayResult {
    pub final_state: CombatState,
    pub final_snapshot_hash: u64,
    pub applied_inputs: u64,
    pub summary: CombatSummary,
    pub log: Vec<String>,
}

pub fn replay_combat(journal: &CombatJournal) -> Result<ReplayResult, ReplayError> {
    let mut combat =
        initialize_combat(journal.player.clone(), journal.enemies.clone(), journal.seed)
            .map_err(ReplayError::InvalidRoster)?;
    combat.start();

    for record in &journal.inputs {
        let applied = match &record.payload {
            JournalPayload::PlayerAction(action) => combat.process_action(action.clone()),
            JournalPayload::EnemyTurn => combat.process_enemy_turn(),
        };
        applied.map_err(|source| ReplayError::RejectedInput { seq: record.seq, source })?;
    }

    Ok(ReplayResult {
        final_state: combat.state(),
        final_snapshot_hash: combat.snapshot_hash(),
        applied_inputs: journal.inputs.len() as u64,
        summary: combat.summary(),
        log: combat.log().to_vec(),
    })
}
