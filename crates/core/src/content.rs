//! Monster and dungeon template tables consumed by the session layer.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::combat::roll::CombatRng;
use crate::combat::{CombatStats, Combatant, RewardItem, Side};
use crate::dungeon::DungeonConfig;
use crate::seed::derive_floor_seed;

pub mod keys {
    pub const MONSTER_GOBLIN_SCOUT: &str = "goblin_scout";
    pub const MONSTER_GOBLIN_BRUTE: &str = "goblin_brute";
    pub const MONSTER_GOBLIN_SHAMAN: &str = "goblin_shaman";
    pub const MONSTER_GOBLIN_KING: &str = "goblin_king";

    pub const DUNGEON_GOBLIN_CAVE: &str = "goblin_cave";

    pub const LOOT_GOBLIN_COMMON: &str = "goblin_common_loot";
    pub const LOOT_GOBLIN_KING: &str = "goblin_king_loot";

    pub const ITEM_GOLD_COINS: &str = "gold_coins";
    pub const ITEM_HEALING_POTION_WEAK: &str = "healing_potion_weak";
    pub const ITEM_LEATHER_ARMOR: &str = "leather_armor";
    pub const ITEM_WOODEN_SHIELD: &str = "wooden_shield";
    pub const ITEM_SHORT_SWORD: &str = "short_sword";
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    pub strength: u32,
    pub dexterity: u32,
    pub intelligence: u32,
    pub vitality: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterTemplate {
    pub id: String,
    pub name: String,
    pub level: u32,
    pub attributes: Attributes,
    #[serde(default)]
    pub is_boss: bool,
    pub experience_reward: u32,
    pub gold_reward: u32,
    #[serde(default)]
    pub loot_table_id: Option<String>,
}

impl MonsterTemplate {
    pub fn combat_stats(&self) -> CombatStats {
        monster_stats(self.attributes, self.level)
    }

    /// Enemy combatant for one encounter slot; `instance` keeps ids unique within a fight.
    pub fn spawn(&self, instance: usize) -> Combatant {
        let mut enemy = Combatant::new(
            format!("enemy_{}_{instance}", self.id),
            self.name.clone(),
            Side::Enemy,
            self.level,
            self.combat_stats(),
        );
        enemy.template_id = Some(self.id.clone());
        enemy
    }
}

/// Derived combat numbers, scaled by `1 + 0.1 * level`.
pub fn monster_stats(attributes: Attributes, level: u32) -> CombatStats {
    let level_f = f64::from(level);
    let multiplier = 1.0 + level_f * 0.1;
    let strength = f64::from(attributes.strength);
    let dexterity = f64::from(attributes.dexterity);
    let intelligence = f64::from(attributes.intelligence);
    let vitality = f64::from(attributes.vitality);

    let scaled = |base: f64| (base * multiplier).floor();
    CombatStats {
        max_hp: scaled(vitality * 10.0 + level_f * 5.0) as u32,
        max_mp: scaled(intelligence * 5.0 + level_f * 3.0) as u32,
        attack: scaled(strength * 2.0 + level_f) as i32,
        defense: scaled(vitality * 1.5 + level_f * 0.5) as i32,
        magic_attack: scaled(intelligence * 2.0 + level_f) as i32,
        magic_defense: scaled(intelligence * 1.5 + level_f * 0.5) as i32,
        speed: scaled(dexterity * 1.5 + level_f * 0.3) as i32,
        critical_rate: (dexterity * 0.5 + level_f * 0.2).floor() as u32,
        evasion: (dexterity * 0.3 + level_f * 0.1).floor() as u32,
    }
}

/// A fixed count, or an inclusive `[min, max]` range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LootQuantity {
    Exactly(u32),
    Between(u32, u32),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LootEntry {
    pub item_id: String,
    pub quantity: LootQuantity,
    /// Probability in `0.0..=1.0` that the entry drops.
    pub chance: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LootTable {
    pub id: String,
    pub entries: Vec<LootEntry>,
}

impl LootTable {
    /// Rolls each entry independently, in table order.
    pub fn roll(&self, rng: &mut CombatRng) -> Vec<RewardItem> {
        let mut drops = Vec::new();
        for entry in &self.entries {
            if !rng.chance(entry.chance) {
                continue;
            }
            let quantity = match entry.quantity {
                LootQuantity::Exactly(count) => count,
                LootQuantity::Between(min, max) => rng.between(min, max),
            };
            drops.push(RewardItem { item_id: entry.item_id.clone(), quantity });
        }
        drops
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub min_level: u32,
    pub max_level: u32,
    pub floor_count: u32,
    pub monster_ids: Vec<String>,
    #[serde(default)]
    pub boss_id: Option<String>,
    #[serde(default)]
    pub theme: String,
    pub generation: DungeonConfig,
}

impl DungeonTemplate {
    /// Config for floor `floor` (0-based). Each floor gets its own seed derived from
    /// `base_seed`, and its dungeon level grows with depth.
    pub fn floor_config(&self, base_seed: u64, floor: u32) -> DungeonConfig {
        DungeonConfig {
            dungeon_level: self.generation.dungeon_level + floor,
            seed: Some(derive_floor_seed(base_seed, floor)),
            ..self.generation.clone()
        }
    }

    pub fn is_last_floor(&self, floor: u32) -> bool {
        floor + 1 >= self.floor_count
    }

    pub fn suits_level(&self, level: u32) -> bool {
        (self.min_level..=self.max_level).contains(&level)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContentPack {
    #[serde(default)]
    pub monsters: Vec<MonsterTemplate>,
    #[serde(default)]
    pub dungeons: Vec<DungeonTemplate>,
    #[serde(default)]
    pub loot_tables: Vec<LootTable>,
}

impl ContentPack {
    pub fn build_default() -> Self {
        let monster = |id: &str, name: &str, level, attributes, is_boss, exp, gold| {
            let loot = if is_boss { keys::LOOT_GOBLIN_KING } else { keys::LOOT_GOBLIN_COMMON };
            MonsterTemplate {
                id: id.to_string(),
                name: name.to_string(),
                level,
                attributes,
                is_boss,
                experience_reward: exp,
                gold_reward: gold,
                loot_table_id: Some(loot.to_string()),
            }
        };
        let attrs = |strength, dexterity, intelligence, vitality| Attributes {
            strength,
            dexterity,
            intelligence,
            vitality,
        };

        let monsters = vec![
            monster(keys::MONSTER_GOBLIN_SCOUT, "Goblin Scout", 1, attrs(6, 10, 4, 7), false, 25, 5),
            monster(keys::MONSTER_GOBLIN_BRUTE, "Goblin Brute", 2, attrs(12, 6, 3, 14), false, 40, 8),
            monster(
                keys::MONSTER_GOBLIN_SHAMAN,
                "Goblin Shaman",
                3,
                attrs(5, 8, 12, 9),
                false,
                60,
                12,
            ),
            monster(keys::MONSTER_GOBLIN_KING, "Goblin King", 5, attrs(16, 12, 10, 20), true, 200, 50),
        ];

        let goblin_cave = DungeonTemplate {
            id: keys::DUNGEON_GOBLIN_CAVE.to_string(),
            name: "Goblin Cave".to_string(),
            description: "A damp, dark cave overrun by goblin raiders.".to_string(),
            min_level: 1,
            max_level: 5,
            floor_count: 3,
            monster_ids: vec![
                keys::MONSTER_GOBLIN_SCOUT.to_string(),
                keys::MONSTER_GOBLIN_BRUTE.to_string(),
                keys::MONSTER_GOBLIN_SHAMAN.to_string(),
            ],
            boss_id: Some(keys::MONSTER_GOBLIN_KING.to_string()),
            theme: "cave".to_string(),
            generation: DungeonConfig {
                width: 60,
                height: 60,
                min_rooms: 8,
                max_rooms: 12,
                min_room_size: 6,
                max_room_size: 12,
                dungeon_level: 1,
                seed: None,
            },
        };

        let entry = |item_id: &str, quantity, chance| LootEntry {
            item_id: item_id.to_string(),
            quantity,
            chance,
        };
        let loot_tables = vec![
            LootTable {
                id: keys::LOOT_GOBLIN_COMMON.to_string(),
                entries: vec![
                    entry(keys::ITEM_GOLD_COINS, LootQuantity::Between(5, 10), 0.8),
                    entry(keys::ITEM_HEALING_POTION_WEAK, LootQuantity::Exactly(1), 0.15),
                    entry(keys::ITEM_LEATHER_ARMOR, LootQuantity::Exactly(1), 0.03),
                    entry(keys::ITEM_WOODEN_SHIELD, LootQuantity::Exactly(1), 0.05),
                ],
            },
            LootTable {
                id: keys::LOOT_GOBLIN_KING.to_string(),
                entries: vec![
                    entry(keys::ITEM_GOLD_COINS, LootQuantity::Between(40, 60), 1.0),
                    entry(keys::ITEM_SHORT_SWORD, LootQuantity::Exactly(1), 0.5),
                    entry(keys::ITEM_LEATHER_ARMOR, LootQuantity::Exactly(1), 0.6),
                    entry(keys::ITEM_WOODEN_SHIELD, LootQuantity::Exactly(1), 0.4),
                    entry(keys::ITEM_HEALING_POTION_WEAK, LootQuantity::Between(2, 4), 0.7),
                ],
            },
        ];

        Self { monsters, dungeons: vec![goblin_cave], loot_tables }
    }

    /// Parses a pack from TOML (`[[monsters]]` / `[[dungeons]]` arrays).
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    pub fn monster(&self, id: &str) -> Option<&MonsterTemplate> {
        self.monsters.iter().find(|monster| monster.id == id)
    }

    pub fn monsters_in_level_range(&self, min: u32, max: u32) -> Vec<&MonsterTemplate> {
        self.monsters.iter().filter(|monster| (min..=max).contains(&monster.level)).collect()
    }

    pub fn boss_monsters(&self) -> Vec<&MonsterTemplate> {
        self.monsters.iter().filter(|monster| monster.is_boss).collect()
    }

    pub fn dungeon(&self, id: &str) -> Option<&DungeonTemplate> {
        self.dungeons.iter().find(|dungeon| dungeon.id == id)
    }

    pub fn dungeons_for_level(&self, level: u32) -> Vec<&DungeonTemplate> {
        self.dungeons.iter().filter(|dungeon| dungeon.suits_level(level)).collect()
    }

    pub fn loot_table(&self, id: &str) -> Option<&LootTable> {
        self.loot_tables.iter().find(|table| table.id == id)
    }

    /// Loot for every defeated enemy, rolled in roster order from the combat seed.
    /// Drops of the same item are merged. Enemies without a template or a known
    /// loot table drop nothing.
    pub fn roll_loot(&self, enemies: &[Combatant], seed: u64) -> Vec<RewardItem> {
        let mut rng = CombatRng::loot(seed);
        let mut items: Vec<RewardItem> = Vec::new();
        for enemy in enemies.iter().filter(|enemy| !enemy.is_alive()) {
            let table = enemy
                .template_id
                .as_deref()
                .and_then(|template| self.monster(template))
                .and_then(|monster| monster.loot_table_id.as_deref())
                .and_then(|table_id| {
                    let table = self.loot_table(table_id);
                    if table.is_none() {
                        warn!(table_id, enemy = %enemy.id, "loot table not found");
                    }
                    table
                });
            let Some(table) = table else { continue };
            for dropped in table.roll(&mut rng) {
                match items.iter_mut().find(|item| item.item_id == dropped.item_id) {
                    Some(item) => item.quantity = item.quantity.saturating_add(dropped.quantity),
                    None => items.push(dropped),
                }
            }
        }
        items
    }
}

impl Default for ContentPack {
    fn default() -> Self {
        Self::build_default()
    }
}
