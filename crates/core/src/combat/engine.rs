//! Combat state machine: turn order, action processing, and end-state evaluation.

use std::mem;
use std::sync::Arc;

use tracing::{debug, info};

use crate::messages::{MessageCatalog, MessageKey};
use crate::seed::unix_millis;

use super::error::CombatError;
use super::rewards::calculate_rewards;
use super::roll::CombatRng;
use super::status::tick_effects;
use super::types::{
    CombatAction, CombatActionResult, CombatRewards, CombatState, CombatSummary, CombatTurn,
    Combatant, CombatantId, RewardItem, Side,
};

#[derive(Clone, Debug)]
pub struct Combat {
    id: String,
    seed: u64,
    pub(super) state: CombatState,
    pub(super) player: Combatant,
    pub(super) enemies: Vec<Combatant>,
    turn_order: Vec<CombatantId>,
    current_turn_index: usize,
    turns: Vec<CombatTurn>,
    log: Vec<String>,
    rewards: Option<CombatRewards>,
    created_at_unix_ms: u64,
    ended_at_unix_ms: Option<u64>,
    pub(super) rng: CombatRng,
    pub(super) catalog: Arc<MessageCatalog>,
}

/// Starts a combat with the built-in English messages.
pub fn initialize_combat(
    player: Combatant,
    enemies: Vec<Combatant>,
    seed: u64,
) -> Result<Combat, CombatError> {
    Combat::new(player, enemies, seed, Arc::new(MessageCatalog::default()))
}

impl Combat {
    pub fn new(
        player: Combatant,
        enemies: Vec<Combatant>,
        seed: u64,
        catalog: Arc<MessageCatalog>,
    ) -> Result<Self, CombatError> {
        validate_participants(&player, &enemies)?;

        let mut participants: Vec<&Combatant> = Vec::with_capacity(enemies.len() + 1);
        participants.push(&player);
        participants.extend(enemies.iter());
        // Stable: earlier-listed participants keep precedence on speed ties.
        participants.sort_by(|left, right| right.speed.cmp(&left.speed));
        let turn_order: Vec<CombatantId> =
            participants.into_iter().map(|combatant| combatant.id.clone()).collect();

        info!(seed, enemies = enemies.len(), first = %turn_order[0], "combat initialized");

        let log = vec![catalog.render(MessageKey::CombatStarted, &[])];
        Ok(Self {
            id: format!("combat-{seed:016x}"),
            seed,
            state: CombatState::Initializing,
            player,
            enemies,
            turn_order,
            current_turn_index: 0,
            turns: Vec::new(),
            log,
            rewards: None,
            created_at_unix_ms: unix_millis(),
            ended_at_unix_ms: None,
            rng: CombatRng::new(seed),
            catalog,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn state(&self) -> CombatState {
        self.state
    }

    pub fn player(&self) -> &Combatant {
        &self.player
    }

    pub fn enemies(&self) -> &[Combatant] {
        &self.enemies
    }

    pub fn turn_order(&self) -> &[CombatantId] {
        &self.turn_order
    }

    pub fn current_turn_index(&self) -> usize {
        self.current_turn_index
    }

    pub fn turns(&self) -> &[CombatTurn] {
        &self.turns
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn rewards(&self) -> Option<&CombatRewards> {
        self.rewards.as_ref()
    }

    pub fn created_at_unix_ms(&self) -> u64 {
        self.created_at_unix_ms
    }

    pub fn ended_at_unix_ms(&self) -> Option<u64> {
        self.ended_at_unix_ms
    }

    pub fn is_over(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn is_player_turn(&self) -> bool {
        self.state == CombatState::PlayerTurn
    }

    pub fn active_combatant_id(&self) -> &CombatantId {
        &self.turn_order[self.current_turn_index]
    }

    pub fn combatant(&self, id: &CombatantId) -> Option<&Combatant> {
        if self.player.id == *id {
            return Some(&self.player);
        }
        self.enemies.iter().find(|enemy| enemy.id == *id)
    }

    pub(super) fn combatant_mut(&mut self, id: &CombatantId) -> Option<&mut Combatant> {
        if self.player.id == *id {
            return Some(&mut self.player);
        }
        self.enemies.iter_mut().find(|enemy| enemy.id == *id)
    }

    pub fn living_enemies(&self) -> impl Iterator<Item = &Combatant> {
        self.enemies.iter().filter(|enemy| enemy.is_alive())
    }

    /// Leaves `Initializing` for whichever side holds the first slot.
    pub fn start(&mut self) -> CombatState {
        if self.state == CombatState::Initializing {
            self.refresh_turn_state();
        }
        self.state
    }

    /// Resolves one action and advances the round-robin turn pointer.
    pub fn process_action(
        &mut self,
        action: CombatAction,
    ) -> Result<CombatActionResult, CombatError> {
        if self.state.is_terminal() {
            return Err(CombatError::CombatOver { state: self.state });
        }
        let actor = self
            .combatant(&action.actor_id)
            .ok_or_else(|| CombatError::UnknownActor(action.actor_id.clone()))?;
        if !actor.is_alive() {
            return Err(CombatError::ActorDefeated(action.actor_id.clone()));
        }
        let eligible_effects = actor.status_effects.len();

        let previous_state = mem::replace(&mut self.state, CombatState::Processing);
        let result = match self.dispatch(&action) {
            Ok(result) => result,
            Err(error) => {
                self.state = previous_state;
                return Err(error);
            }
        };
        debug!(
            actor = %action.actor_id,
            kind = ?action.kind,
            success = result.success,
            damage = ?result.damage,
            "combat action resolved"
        );

        self.turns.push(CombatTurn {
            turn_number: self.turns.len() as u32 + 1,
            actor_id: action.actor_id.clone(),
            action: action.clone(),
            result: result.clone(),
            timestamp_unix_ms: unix_millis(),
        });
        self.log.push(result.message.clone());

        if self.state == CombatState::Fled {
            self.ended_at_unix_ms = Some(unix_millis());
            info!(turns = self.turns.len(), "player fled combat");
            return Ok(result);
        }

        let worn_off_for = self.combatant_mut(&action.actor_id).and_then(|actor| {
            let expired = tick_effects(actor, eligible_effects);
            (!expired.is_empty()).then(|| actor.name.clone())
        });
        if let Some(name) = worn_off_for {
            let line = self.catalog.render(MessageKey::EffectsWornOff, &[("actor", &name)]);
            self.log.push(line);
        }

        self.current_turn_index = (self.current_turn_index + 1) % self.turn_order.len();
        self.check_combat_end();
        Ok(result)
    }

    /// Defeat wins over victory. Otherwise the active slot moves past defeated
    /// enemies and the state follows whoever holds it.
    pub fn check_combat_end(&mut self) -> CombatState {
        if self.state.is_terminal() {
            return self.state;
        }
        if !self.player.is_alive() {
            self.state = CombatState::Defeat;
            self.ended_at_unix_ms = Some(unix_millis());
            info!(turns = self.turns.len(), "combat lost");
        } else if self.enemies.iter().all(|enemy| !enemy.is_alive()) {
            let rewards = calculate_rewards(&self.enemies);
            info!(
                turns = self.turns.len(),
                experience = rewards.experience,
                gold = rewards.gold,
                "combat won"
            );
            self.state = CombatState::Victory;
            self.ended_at_unix_ms = Some(unix_millis());
            self.rewards = Some(rewards);
        } else {
            self.refresh_turn_state();
        }
        self.state
    }

    fn refresh_turn_state(&mut self) {
        self.skip_defeated_enemy_slots();
        self.state = if *self.active_combatant_id() == self.player.id {
            CombatState::PlayerTurn
        } else {
            CombatState::EnemyTurn
        };
    }

    /// Advances past slots held by defeated enemies. The player's slot is never skipped.
    fn skip_defeated_enemy_slots(&mut self) {
        for _ in 0..self.turn_order.len() {
            let active = self.active_combatant_id();
            let defeated_enemy =
                self.enemies.iter().any(|enemy| enemy.id == *active && !enemy.is_alive());
            if !defeated_enemy {
                break;
            }
            self.current_turn_index = (self.current_turn_index + 1) % self.turn_order.len();
        }
    }

    /// The enemy holding the active slot attacks the player. Slots of defeated
    /// enemies are passed over, but reaching the player's slot is an error.
    pub fn process_enemy_turn(&mut self) -> Result<CombatActionResult, CombatError> {
        if self.state.is_terminal() {
            return Err(CombatError::CombatOver { state: self.state });
        }
        if self.living_enemies().next().is_none() {
            return Err(CombatError::NoLivingEnemy);
        }

        self.skip_defeated_enemy_slots();
        if *self.active_combatant_id() == self.player.id {
            self.refresh_turn_state();
            return Err(CombatError::NotEnemyTurn(self.player.id.clone()));
        }

        let enemy_id = self.active_combatant_id().clone();
        let action = CombatAction::attack(enemy_id, self.player.id.clone());
        self.process_action(action)
    }

    /// Runs enemy turns until the player is up again or the fight ends. Each
    /// living enemy acts at most once.
    pub fn run_enemy_phase(&mut self) -> Result<Vec<CombatActionResult>, CombatError> {
        self.start();
        let mut results = Vec::new();
        while self.state == CombatState::EnemyTurn {
            results.push(self.process_enemy_turn()?);
        }
        Ok(results)
    }

    /// Replaces the item list of a won fight's rewards.
    pub(crate) fn grant_loot(&mut self, items: Vec<RewardItem>) -> Option<&CombatRewards> {
        let rewards = self.rewards.as_mut()?;
        rewards.items = items;
        Some(&*rewards)
    }

    pub fn summary(&self) -> CombatSummary {
        CombatSummary {
            state: self.state,
            player_hp: self.player.current_hp,
            player_mp: self.player.current_mp,
            turns: self.turns.len() as u32,
            rewards: self.rewards.clone(),
        }
    }
}

fn validate_participants(player: &Combatant, enemies: &[Combatant]) -> Result<(), CombatError> {
    if enemies.is_empty() {
        return Err(CombatError::NoEnemies);
    }
    if player.side != Side::Player {
        return Err(CombatError::WrongSide(player.id.clone()));
    }
    for (index, enemy) in enemies.iter().enumerate() {
        if enemy.side != Side::Enemy {
            return Err(CombatError::WrongSide(enemy.id.clone()));
        }
        let repeats_player = enemy.id == player.id;
        let repeats_enemy = enemies[..index].iter().any(|earlier| earlier.id == enemy.id);
        if repeats_player || repeats_enemy {
            return Err(CombatError::DuplicateCombatant(enemy.id.clone()));
        }
    }
    Ok(())
}
