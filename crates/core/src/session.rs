//! Drives one combat from the player's side: the player acts, then every
//! enemy whose slot comes up acts, and each input is journaled.

use std::io;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::combat::{
    Combat, CombatAction, CombatActionResult, CombatError, CombatRewards, CombatState,
    CombatSummary, Combatant,
};
use crate::content::ContentPack;
use crate::journal::{CombatJournal, JournalPayload};
use crate::messages::MessageCatalog;
use crate::recording::CombatRecorder;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Combat(#[from] CombatError),
    #[error("it is not the player's turn (combat is in {0})")]
    NotPlayerTurn(CombatState),
    #[error("failed to append to the combat journal: {0}")]
    Journal(#[from] io::Error),
}

/// Results of one player action and the enemy turns that followed it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionStep {
    pub player_result: CombatActionResult,
    pub enemy_results: Vec<CombatActionResult>,
    pub state: CombatState,
}

#[derive(Debug)]
pub struct CombatSession {
    combat: Combat,
    journal: CombatJournal,
    recorder: Option<CombatRecorder>,
}

impl CombatSession {
    pub fn new(
        player: Combatant,
        enemies: Vec<Combatant>,
        seed: u64,
        catalog: Arc<MessageCatalog>,
    ) -> Result<Self, CombatError> {
        let journal = CombatJournal::new(seed, player.clone(), enemies.clone());
        let combat = Combat::new(player, enemies, seed, catalog)?;
        Ok(Self { combat, journal, recorder: None })
    }

    /// Starts a recording at `path` holding the inputs so far, then mirrors every later input into it.
    pub fn record_to(&mut self, path: &Path) -> io::Result<()> {
        self.recorder = Some(CombatRecorder::create(path, &self.journal)?);
        Ok(())
    }

    pub fn combat(&self) -> &Combat {
        &self.combat
    }

    pub fn journal(&self) -> &CombatJournal {
        &self.journal
    }

    pub fn into_journal(self) -> CombatJournal {
        self.journal
    }

    pub fn is_over(&self) -> bool {
        self.combat.is_over()
    }

    pub fn summary(&self) -> CombatSummary {
        self.combat.summary()
    }

    /// Leaves `Initializing` and lets faster enemies act before the player's first turn.
    /// Also finishes an enemy phase that a failed recording write interrupted.
    pub fn begin(&mut self) -> Result<Vec<CombatActionResult>, SessionError> {
        self.combat.start();
        self.run_enemy_phase()
    }

    pub fn execute_player_action(
        &mut self,
        action: CombatAction,
    ) -> Result<SessionStep, SessionError> {
        self.combat.start();
        if !self.combat.is_player_turn() {
            return Err(SessionError::NotPlayerTurn(self.combat.state()));
        }

        let player_result = self.combat.process_action(action.clone())?;
        self.record(JournalPayload::PlayerAction(action))?;
        let enemy_results = self.run_enemy_phase()?;
        Ok(SessionStep { player_result, enemy_results, state: self.combat.state() })
    }

    /// Rolls loot for a won fight and stores it in the rewards. The roll is
    /// seeded from the combat, so collecting twice yields the same items.
    pub fn collect_loot(&mut self, content: &ContentPack) -> Option<&CombatRewards> {
        if self.combat.state() != CombatState::Victory {
            return None;
        }
        let items = content.roll_loot(self.combat.enemies(), self.combat.seed());
        info!(items = items.len(), "loot collected");
        self.combat.grant_loot(items)
    }

    fn run_enemy_phase(&mut self) -> Result<Vec<CombatActionResult>, SessionError> {
        let mut results = Vec::new();
        while self.combat.state() == CombatState::EnemyTurn {
            results.push(self.combat.process_enemy_turn()?);
            self.record(JournalPayload::EnemyTurn)?;
        }
        Ok(results)
    }

    /// The in-memory journal always takes the input, since the combat has already applied it.
    fn record(&mut self, payload: JournalPayload) -> io::Result<()> {
        let record = self.journal.append(payload);
        match self.recorder.as_mut() {
            Some(recorder) => recorder.record(&record.payload),
            None => Ok(()),
        }
    }
}
