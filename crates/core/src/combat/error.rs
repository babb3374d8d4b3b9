use thiserror::Error;

use super::types::{CombatState, CombatantId};

/// Caller-contract violations. Misses, failed escapes and unsupported
/// actions are ordinary results, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombatError {
    #[error("combat needs at least one enemy")]
    NoEnemies,
    #[error("combatant `{0}` is not on the expected side")]
    WrongSide(CombatantId),
    #[error("combatant id `{0}` appears more than once")]
    DuplicateCombatant(CombatantId),
    #[error("unknown actor `{0}`")]
    UnknownActor(CombatantId),
    #[error("actor `{0}` has been defeated and cannot act")]
    ActorDefeated(CombatantId),
    #[error("attack by `{0}` has no target")]
    MissingTarget(CombatantId),
    #[error("unknown target `{0}`")]
    UnknownTarget(CombatantId),
    #[error("target `{0}` has already been defeated")]
    TargetDefeated(CombatantId),
    #[error("only the player can flee, not `{0}`")]
    FleeByEnemy(CombatantId),
    #[error("the active slot belongs to `{0}`, not to an enemy")]
    NotEnemyTurn(CombatantId),
    #[error("no living enemy is left to act")]
    NoLivingEnemy,
    #[error("combat is already over ({state})")]
    CombatOver { state: CombatState },
}
