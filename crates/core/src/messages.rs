//! Keyed message templates for combat log lines with `{placeholder}` substitution.
//!
//! English defaults are built in; a nested TOML table can override any subset,
//! e.g. `[combat.log] fled = "{actor} ran away!"`.

use std::collections::HashMap;

use thiserror::Error;
use toml::{Table, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageKey {
    CombatStarted,
    AttackMissed,
    AttackHit,
    AttackCritical,
    Defend,
    DefendEffectName,
    Fled,
    FleeFailed,
    EffectsWornOff,
    SkillUnsupported,
    ItemUnsupported,
}

impl MessageKey {
    pub const ALL: [Self; 11] = [
        Self::CombatStarted,
        Self::AttackMissed,
        Self::AttackHit,
        Self::AttackCritical,
        Self::Defend,
        Self::DefendEffectName,
        Self::Fled,
        Self::FleeFailed,
        Self::EffectsWornOff,
        Self::SkillUnsupported,
        Self::ItemUnsupported,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CombatStarted => "combat.log.started",
            Self::AttackMissed => "combat.log.attack_missed",
            Self::AttackHit => "combat.log.attack_hit",
            Self::AttackCritical => "combat.log.attack_critical",
            Self::Defend => "combat.log.defend",
            Self::DefendEffectName => "combat.effect.defending",
            Self::Fled => "combat.log.fled",
            Self::FleeFailed => "combat.log.flee_failed",
            Self::EffectsWornOff => "combat.log.effects_worn_off",
            Self::SkillUnsupported => "combat.log.skill_unsupported",
            Self::ItemUnsupported => "combat.log.item_unsupported",
        }
    }

    pub fn from_dotted(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|candidate| candidate.as_str() == key)
    }

    fn default_template(self) -> &'static str {
        match self {
            Self::CombatStarted => "Combat started!",
            Self::AttackMissed => "{attacker}'s attack missed!",
            Self::AttackHit => "{attacker} attacked {target} for {damage} damage!",
            Self::AttackCritical => "{attacker} attacked {target} for {damage} damage (Critical!)!",
            Self::Defend => "{actor} takes a defensive stance! Defense increased by {amount}!",
            Self::DefendEffectName => "Defending",
            Self::Fled => "{actor} fled from battle!",
            Self::FleeFailed => "{actor} couldn't escape!",
            Self::EffectsWornOff => "{actor}'s buffs/debuffs have worn off.",
            Self::SkillUnsupported => {
                "{actor} tried to use a skill, but skills are not supported yet!"
            }
            Self::ItemUnsupported => {
                "{actor} tried to use an item, but items are not supported yet!"
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse message catalog: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unknown message key `{0}`")]
    UnknownKey(String),
    #[error("message `{0}` must be a string")]
    NotAString(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageCatalog {
    templates: HashMap<MessageKey, String>,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        let templates =
            MessageKey::ALL.into_iter().map(|key| (key, key.default_template().to_string())).collect();
        Self { templates }
    }
}

impl MessageCatalog {
    /// Defaults overlaid with every string found in the nested TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, CatalogError> {
        let table: Table = toml::from_str(source)?;
        let mut catalog = Self::default();
        let mut overrides = Vec::new();
        flatten_table("", &table, &mut overrides)?;
        for (dotted, template) in overrides {
            let key = MessageKey::from_dotted(&dotted).ok_or(CatalogError::UnknownKey(dotted))?;
            catalog.templates.insert(key, template);
        }
        Ok(catalog)
    }

    pub fn with_template(mut self, key: MessageKey, template: impl Into<String>) -> Self {
        self.templates.insert(key, template.into());
        self
    }

    pub fn template(&self, key: MessageKey) -> &str {
        self.templates.get(&key).map_or_else(|| key.default_template(), String::as_str)
    }

    /// Substitutes `{name}` with the matching argument. Unmatched placeholders stay verbatim.
    pub fn render(&self, key: MessageKey, args: &[(&str, &str)]) -> String {
        substitute(self.template(key), args)
    }
}

fn flatten_table(
    prefix: &str,
    table: &Table,
    out: &mut Vec<(String, String)>,
) -> Result<(), CatalogError> {
    for (name, value) in table {
        let dotted = if prefix.is_empty() { name.clone() } else { format!("{prefix}.{name}") };
        match value {
            Value::String(template) => out.push((dotted, template.clone())),
            Value::Table(nested) => flatten_table(&dotted, nested, out)?,
            _ => return Err(CatalogError::NotAString(dotted)),
        }
    }
    Ok(())
}

fn substitute(template: &str, args: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];
        let Some(close) = after_open.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let name = &after_open[..close];
        match args.iter().find(|(arg_name, _)| *arg_name == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[open..open + close + 2]),
        }
        rest = &after_open[close + 1..];
    }
    out.push_str(rest);
    out
}
