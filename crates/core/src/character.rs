//! Player characters: class starting stats, equipment bonuses, and the
//! conversion into a combat participant.

use serde::{Deserialize, Serialize};

use crate::combat::{CombatStats, Combatant, Side};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterClass {
    Warrior,
    Mage,
    Rogue,
    Cleric,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterAttributes {
    pub strength: i32,
    pub dexterity: i32,
    pub intelligence: i32,
    pub vitality: i32,
    #[serde(default)]
    pub luck: i32,
}

/// Starting attributes and pool sizes for a freshly created character.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClassBaseStats {
    pub attributes: CharacterAttributes,
    pub health: u32,
    pub mana: u32,
}

impl CharacterClass {
    pub fn base_stats(self) -> ClassBaseStats {
        let (strength, dexterity, intelligence, vitality, health, mana) = match self {
            Self::Warrior => (8, 5, 4, 8, 120, 30),
            Self::Mage => (4, 5, 10, 6, 80, 100),
            Self::Rogue => (6, 10, 5, 6, 90, 50),
            Self::Cleric => (6, 5, 7, 7, 100, 80),
        };
        ClassBaseStats {
            attributes: CharacterAttributes { strength, dexterity, intelligence, vitality, luck: 0 },
            health,
            mana,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentSlot {
    MainHand,
    OffHand,
    Head,
    Chest,
    Legs,
    Feet,
    Hands,
    Neck,
    Ring1,
    Ring2,
}

/// Flat bonuses an item grants while equipped. Missing fields count as zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemStats {
    pub strength: i32,
    pub dexterity: i32,
    pub intelligence: i32,
    pub vitality: i32,
    pub luck: i32,
    pub attack: i32,
    pub defense: i32,
    pub magic_attack: i32,
    pub magic_defense: i32,
    pub speed: i32,
    pub critical_rate: i32,
    pub evasion: i32,
    pub hp_bonus: i32,
    pub mp_bonus: i32,
}

impl ItemStats {
    fn saturating_add(self, other: Self) -> Self {
        Self {
            strength: self.strength.saturating_add(other.strength),
            dexterity: self.dexterity.saturating_add(other.dexterity),
            intelligence: self.intelligence.saturating_add(other.intelligence),
            vitality: self.vitality.saturating_add(other.vitality),
            luck: self.luck.saturating_add(other.luck),
            attack: self.attack.saturating_add(other.attack),
            defense: self.defense.saturating_add(other.defense),
            magic_attack: self.magic_attack.saturating_add(other.magic_attack),
            magic_defense: self.magic_defense.saturating_add(other.magic_defense),
            speed: self.speed.saturating_add(other.speed),
            critical_rate: self.critical_rate.saturating_add(other.critical_rate),
            evasion: self.evasion.saturating_add(other.evasion),
            hp_bonus: self.hp_bonus.saturating_add(other.hp_bonus),
            mp_bonus: self.mp_bonus.saturating_add(other.mp_bonus),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentItem {
    pub item_id: String,
    pub slot: EquipmentSlot,
    #[serde(default)]
    pub stats: ItemStats,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    pub name: String,
    pub class: CharacterClass,
    pub level: u32,
    pub attributes: CharacterAttributes,
    /// Pool sizes before vitality, intelligence and equipment bonuses.
    pub base_max_health: u32,
    pub base_max_mana: u32,
    pub health: u32,
    pub mana: u32,
    #[serde(default)]
    pub equipment: Vec<EquipmentItem>,
}

/// Attributes with equipment folded in, plus the derived combat numbers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharacterStats {
    pub attributes: CharacterAttributes,
    pub combat: CombatStats,
    pub equipment_bonuses: ItemStats,
}

impl Character {
    /// Level 1 character with its class's starting attributes and full pools.
    pub fn new(id: impl Into<String>, name: impl Into<String>, class: CharacterClass) -> Self {
        let base = class.base_stats();
        Self {
            id: id.into(),
            name: name.into(),
            class,
            level: 1,
            attributes: base.attributes,
            base_max_health: base.health,
            base_max_mana: base.mana,
            health: base.health,
            mana: base.mana,
            equipment: Vec::new(),
        }
    }

    /// Puts `item` in its slot and hands back whatever it displaced.
    pub fn equip(&mut self, item: EquipmentItem) -> Option<EquipmentItem> {
        let displaced = self
            .equipment
            .iter()
            .position(|equipped| equipped.slot == item.slot)
            .map(|index| self.equipment.remove(index));
        self.equipment.push(item);
        displaced
    }

    pub fn unequip(&mut self, slot: EquipmentSlot) -> Option<EquipmentItem> {
        let index = self.equipment.iter().position(|equipped| equipped.slot == slot)?;
        Some(self.equipment.remove(index))
    }

    pub fn stats(&self) -> CharacterStats {
        calculate_character_stats(self)
    }

    /// Player-side combatant carrying the character's current health and mana,
    /// capped at the equipment-adjusted maximums.
    pub fn to_combatant(&self) -> Combatant {
        let stats = self.stats();
        let mut combatant =
            Combatant::new(self.id.clone(), self.name.clone(), Side::Player, self.level, stats.combat);
        combatant.current_hp = self.health.min(combatant.max_hp);
        combatant.current_mp = self.mana.min(combatant.max_mp);
        combatant
    }
}

pub fn equipment_bonuses(equipment: &[EquipmentItem]) -> ItemStats {
    equipment.iter().fold(ItemStats::default(), |total, item| total.saturating_add(item.stats))
}

/// Applies the character formulas. Fractional multipliers are evaluated in
/// integer tenths and floored, so `1.5 * vitality` never picks up float error.
pub fn calculate_character_stats(character: &Character) -> CharacterStats {
    let bonuses = equipment_bonuses(&character.equipment);
    let base = character.attributes;
    let attributes = CharacterAttributes {
        strength: base.strength.saturating_add(bonuses.strength),
        dexterity: base.dexterity.saturating_add(bonuses.dexterity),
        intelligence: base.intelligence.saturating_add(bonuses.intelligence),
        vitality: base.vitality.saturating_add(bonuses.vitality),
        luck: base.luck.saturating_add(bonuses.luck),
    };

    let level = i64::from(character.level);
    let strength = i64::from(attributes.strength);
    let dexterity = i64::from(attributes.dexterity);
    let intelligence = i64::from(attributes.intelligence);
    let vitality = i64::from(attributes.vitality);
    let luck = i64::from(attributes.luck);
    let tenths = |value: i64| value.div_euclid(10);

    let vitality_bonus = (vitality - 10).div_euclid(2);
    let intelligence_bonus = (intelligence - 10).div_euclid(2);
    let max_hp = i64::from(character.base_max_health)
        + vitality_bonus * 5
        + i64::from(bonuses.hp_bonus);
    let max_mp = i64::from(character.base_max_mana)
        + intelligence_bonus * 3
        + i64::from(bonuses.mp_bonus);

    let combat = CombatStats {
        max_hp: to_pool(max_hp),
        max_mp: to_pool(max_mp),
        attack: to_stat(strength * 2 + level + i64::from(bonuses.attack)),
        defense: to_stat(tenths(vitality * 15 + level * 5) + i64::from(bonuses.defense)),
        magic_attack: to_stat(intelligence * 2 + level + i64::from(bonuses.magic_attack)),
        magic_defense: to_stat(
            tenths(intelligence * 15 + level * 5) + i64::from(bonuses.magic_defense),
        ),
        speed: to_stat(tenths(dexterity * 15 + level * 3) + i64::from(bonuses.speed)),
        critical_rate: to_percent(
            tenths(dexterity * 5 + level * 2 + luck * 3) + i64::from(bonuses.critical_rate),
        ),
        evasion: to_percent(tenths(dexterity * 3 + level + luck * 2) + i64::from(bonuses.evasion)),
    };

    CharacterStats { attributes, combat, equipment_bonuses: bonuses }
}

fn to_pool(value: i64) -> u32 {
    value.clamp(0, i64::from(u32::MAX)) as u32
}

fn to_stat(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

fn to_percent(value: i64) -> u32 {
    value.clamp(0, 100) as u32
}
