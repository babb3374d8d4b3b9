//! Stable snapshot hashing for deterministic verification.
//! Message text is left out so catalogs do not change the hash.

use std::hash::Hasher;
use std::iter;

use xxhash_rust::xxh3::Xxh3;

use super::engine::Combat;
use super::types::{ActionKind, CombatState};

impl Combat {
    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_u64(self.seed());
        hasher.write_u8(state_code(self.state()));
        hasher.write_u64(self.current_turn_index() as u64);

        for combatant in iter::once(self.player()).chain(self.enemies()) {
            hasher.write(combatant.id.as_str().as_bytes());
            hasher.write_u32(combatant.current_hp);
            hasher.write_u32(combatant.current_mp);
            hasher.write_i32(combatant.attack);
            hasher.write_i32(combatant.defense);
            hasher.write_i32(combatant.speed);
            hasher.write_u64(combatant.status_effects.len() as u64);
        }

        for turn in self.turns() {
            hasher.write_u32(turn.turn_number);
            hasher.write(turn.actor_id.as_str().as_bytes());
            hasher.write_u8(kind_code(turn.action.kind));
            hasher.write_u8(u8::from(turn.result.success));
            hasher.write_u8(u8::from(turn.result.is_miss));
            hasher.write_u8(u8::from(turn.result.is_critical));
            hasher.write_u32(turn.result.damage.unwrap_or(0));
        }

        if let Some(rewards) = self.rewards() {
            hasher.write_u32(rewards.experience);
            hasher.write_u32(rewards.gold);
        }
        hasher.finish()
    }
}

fn state_code(state: CombatState) -> u8 {
    match state {
        CombatState::Initializing => 0,
        CombatState::PlayerTurn => 1,
        CombatState::EnemyTurn => 2,
        CombatState::Processing => 3,
        CombatState::Victory => 4,
        CombatState::Defeat => 5,
        CombatState::Fled => 6,
    }
}

fn kind_code(kind: ActionKind) -> u8 {
    match kind {
        ActionKind::Attack => 0,
        ActionKind::Defend => 1,
        ActionKind::UseSkill => 2,
        ActionKind::UseItem => 3,
        ActionKind::Flee => 4,
    }
}
