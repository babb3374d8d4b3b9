//! Turn-based combat: participants, formulas, status effects, and the combat state machine.

pub mod formula;
pub mod rewards;
pub mod roll;
pub mod status;
pub mod types;

mod actions;
mod engine;
mod error;
mod hash;

pub use engine::{Combat, initialize_combat};
pub use error::CombatError;
pub use rewards::calculate_rewards;
pub use types::{
    ActionKind, CombatAction, CombatActionResult, CombatRewards, CombatState, CombatStats,
    CombatSummary, CombatTurn, Combatant, CombatantId, EffectKind, RewardItem, Side, StatModifiers,
    StatusEffect,
};
