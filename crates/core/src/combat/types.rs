//! Combat participants, actions, results, and the combat state machine states.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CombatantId(pub String);

impl CombatantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CombatantId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Enemy,
}

/// Resolved combat numbers for one participant, equipment and level already folded in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatStats {
    pub max_hp: u32,
    pub max_mp: u32,
    pub attack: i32,
    pub defense: i32,
    pub magic_attack: i32,
    pub magic_defense: i32,
    pub speed: i32,
    /// Percent, 0..=100.
    pub critical_rate: u32,
    /// Percent, 0..=100.
    pub evasion: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: CombatantId,
    pub name: String,
    pub side: Side,
    pub level: u32,
    pub current_hp: u32,
    pub max_hp: u32,
    pub current_mp: u32,
    pub max_mp: u32,
    pub attack: i32,
    pub defense: i32,
    pub magic_attack: i32,
    pub magic_defense: i32,
    pub speed: i32,
    pub critical_rate: u32,
    pub evasion: u32,
    pub status_effects: Vec<StatusEffect>,
    /// Monster template this enemy was spawned from, used to find its loot table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
}

impl Combatant {
    /// Builds a combatant at full HP and MP.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        side: Side,
        level: u32,
        stats: CombatStats,
    ) -> Self {
        Self {
            id: CombatantId::new(id),
            name: name.into(),
            side,
            level,
            current_hp: stats.max_hp,
            max_hp: stats.max_hp,
            current_mp: stats.max_mp,
            max_mp: stats.max_mp,
            attack: stats.attack,
            defense: stats.defense,
            magic_attack: stats.magic_attack,
            magic_defense: stats.magic_defense,
            speed: stats.speed,
            critical_rate: stats.critical_rate,
            evasion: stats.evasion,
            status_effects: Vec::new(),
            template_id: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.current_hp > 0
    }

    pub fn is_player(&self) -> bool {
        self.side == Side::Player
    }

    /// Subtracts up to `amount` HP, never going below zero. Returns the HP actually lost.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let applied = amount.min(self.current_hp);
        self.current_hp -= applied;
        applied
    }

    pub(crate) fn adjust_hp(&mut self, delta: i32) {
        self.current_hp = clamp_pool(self.current_hp, delta, self.max_hp);
    }

    pub(crate) fn adjust_mp(&mut self, delta: i32) {
        self.current_mp = clamp_pool(self.current_mp, delta, self.max_mp);
    }

    pub fn hp_ratio(&self) -> f64 {
        if self.max_hp == 0 { 0.0 } else { f64::from(self.current_hp) / f64::from(self.max_hp) }
    }
}

fn clamp_pool(current: u32, delta: i32, max: u32) -> u32 {
    (i64::from(current) + i64::from(delta)).clamp(0, i64::from(max)) as u32
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Buff,
    Debuff,
}

/// Deltas an effect applied to its owner; reversal subtracts exactly these.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatModifiers {
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
    pub hp_regen: i32,
    pub mp_regen: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub id: String,
    pub name: String,
    pub kind: EffectKind,
    /// Remaining owner actions before expiry.
    pub duration: i32,
    pub modifiers: StatModifiers,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Attack,
    Defend,
    UseSkill,
    UseItem,
    Flee,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatAction {
    pub actor_id: CombatantId,
    pub kind: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<CombatantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
}

impl CombatAction {
    fn bare(actor_id: CombatantId, kind: ActionKind) -> Self {
        Self { actor_id, kind, target_id: None, skill_id: None, item_id: None }
    }

    pub fn attack(actor_id: CombatantId, target_id: CombatantId) -> Self {
        Self { target_id: Some(target_id), ..Self::bare(actor_id, ActionKind::Attack) }
    }

    pub fn defend(actor_id: CombatantId) -> Self {
        Self::bare(actor_id, ActionKind::Defend)
    }

    pub fn flee(actor_id: CombatantId) -> Self {
        Self::bare(actor_id, ActionKind::Flee)
    }

    pub fn use_skill(
        actor_id: CombatantId,
        skill_id: impl Into<String>,
        target_id: Option<CombatantId>,
    ) -> Self {
        Self {
            target_id,
            skill_id: Some(skill_id.into()),
            ..Self::bare(actor_id, ActionKind::UseSkill)
        }
    }

    pub fn use_item(
        actor_id: CombatantId,
        item_id: impl Into<String>,
        target_id: Option<CombatantId>,
    ) -> Self {
        Self { target_id, item_id: Some(item_id.into()), ..Self::bare(actor_id, ActionKind::UseItem) }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatActionResult {
    pub action: CombatAction,
    pub success: bool,
    pub damage: Option<u32>,
    pub healing: Option<u32>,
    pub is_critical: bool,
    pub is_miss: bool,
    pub message: String,
    pub status_effect_applied: Option<StatusEffect>,
}

impl CombatActionResult {
    pub(crate) fn new(action: CombatAction, success: bool, message: String) -> Self {
        Self {
            action,
            success,
            damage: None,
            healing: None,
            is_critical: false,
            is_miss: false,
            message,
            status_effect_applied: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatTurn {
    /// 1-based and gapless.
    pub turn_number: u32,
    pub actor_id: CombatantId,
    pub action: CombatAction,
    pub result: CombatActionResult,
    pub timestamp_unix_ms: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatState {
    Initializing,
    PlayerTurn,
    EnemyTurn,
    Processing,
    Victory,
    Defeat,
    Fled,
}

impl CombatState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Victory | Self::Defeat | Self::Fled)
    }
}

impl fmt::Display for CombatState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Initializing => "initializing",
            Self::PlayerTurn => "player turn",
            Self::EnemyTurn => "enemy turn",
            Self::Processing => "processing",
            Self::Victory => "victory",
            Self::Defeat => "defeat",
            Self::Fled => "fled",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardItem {
    pub item_id: String,
    pub quantity: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatRewards {
    pub experience: u32,
    pub gold: u32,
    /// The engine leaves this empty. `CombatSession::collect_loot` fills it after a victory.
    pub items: Vec<RewardItem>,
}

/// What the character layer needs to persist once combat is over.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatSummary {
    pub state: CombatState,
    pub player_hp: u32,
    pub player_mp: u32,
    pub turns: u32,
    pub rewards: Option<CombatRewards>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Combatant {
        Combatant::new(
            "hero",
            "Hero",
            Side::Player,
            3,
            CombatStats { max_hp: 40, max_mp: 10, attack: 12, ..CombatStats::default() },
        )
    }

    #[test]
    fn new_combatant_starts_at_full_pools() {
        let hero = sample();
        assert_eq!(hero.current_hp, 40);
        assert_eq!(hero.current_mp, 10);
        assert!(hero.is_alive());
        assert!(hero.is_player());
    }

    #[test]
    fn damage_never_drives_hp_below_zero() {
        let mut hero = sample();
        assert_eq!(hero.take_damage(15), 15);
        assert_eq!(hero.take_damage(100), 25, "only the remaining HP is lost");
        assert_eq!(hero.current_hp, 0);
        assert!(!hero.is_alive());
    }

    #[test]
    fn pool_adjustments_clamp_to_bounds() {
        let mut hero = sample();
        hero.adjust_hp(-10);
        hero.adjust_hp(50);
        assert_eq!(hero.current_hp, 40);
        hero.adjust_mp(-25);
        assert_eq!(hero.current_mp, 0);
    }

    #[test]
    fn only_victory_defeat_and_fled_are_terminal() {
        let terminal: Vec<CombatState> = [
            CombatState::Initializing,
            CombatState::PlayerTurn,
            CombatState::EnemyTurn,
            CombatState::Processing,
            CombatState::Victory,
            CombatState::Defeat,
            CombatState::Fled,
        ]
        .into_iter()
        .filter(|state| state.is_terminal())
        .collect();
        assert_eq!(terminal, vec![CombatState::Victory, CombatState::Defeat, CombatState::Fled]);
    }

    #[test]
    fn actions_serialize_without_empty_optionals() {
        let action = CombatAction::defend(CombatantId::new("hero"));
        let json = serde_json::to_string(&action).unwrap();
        assert_eq!(json, r#"{"actor_id":"hero","kind":"Defend"}"#);
    }
}
