use super::types::{CombatRewards, Combatant};

pub const EXPERIENCE_PER_LEVEL: u32 = 50;
pub const GOLD_PER_LEVEL: u32 = 10;

/// Rewards for every enemy in the encounter, alive or not.
pub fn calculate_rewards(enemies: &[Combatant]) -> CombatRewards {
    let mut rewards = CombatRewards::default();
    for enemy in enemies {
        rewards.experience =
            rewards.experience.saturating_add(enemy.level.saturating_mul(EXPERIENCE_PER_LEVEL));
        rewards.gold = rewards.gold.saturating_add(enemy.level.saturating_mul(GOLD_PER_LEVEL));
    }
    rewards
}
