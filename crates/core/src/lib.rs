pub mod activity;
pub mod character;
pub mod combat;
pub mod content;
pub mod dungeon;
pub mod journal;
pub mod messages;
pub mod recording;
pub mod replay;
pub mod seed;
pub mod session;

pub use activity::{ActivityError, ActivityTracker, PlayerActivity};
pub use combat::{
    ActionKind, Combat, CombatAction, CombatActionResult, CombatError, CombatRewards, CombatState,
    CombatStats, CombatSummary, Combatant, CombatantId, Side, initialize_combat,
};
pub use character::{Character, CharacterClass, EquipmentItem, EquipmentSlot, ItemStats};
pub use content::{ContentPack, DungeonTemplate, LootTable, MonsterTemplate};
pub use dungeon::{Dungeon, DungeonConfig, DungeonError, DungeonGenerator, Tile, generate_dungeon};
pub use journal::{CombatJournal, JournalPayload, JournalRecord};
pub use messages::{MessageCatalog, MessageKey};
pub use replay::{ReplayError, ReplayResult, replay_combat};
pub use session::{CombatSession, SessionError, SessionStep};
