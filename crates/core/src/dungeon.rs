//! Seeded procedural dungeon generation: rooms, corridors, entrance and exit.

pub mod model;
pub mod rng;

mod generator;
mod layout;

use thiserror::Error;

pub use generator::DungeonGenerator;
pub use model::{ChestSpawn, Dungeon, DungeonConfig, EnemySpawn, Pos, Room, Tile};
pub use rng::SeededRandom;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DungeonError {
    #[error("min_rooms must be at least 1")]
    NoRoomsRequested,
    #[error("min_rooms ({min}) exceeds max_rooms ({max})")]
    RoomCountRange { min: usize, max: usize },
    #[error("room size {size} is below the minimum of {minimum}")]
    RoomTooSmall { size: usize, minimum: usize },
    #[error("min_room_size ({min}) exceeds max_room_size ({max})")]
    RoomSizeRange { min: usize, max: usize },
    #[error("a {width}x{height} grid cannot hold rooms of size {max_room_size} with a 1-tile margin")]
    GridTooSmall { width: usize, height: usize, max_room_size: usize },
    #[error("a {width}x{height} grid has more cells than can be addressed")]
    GridTooLarge { width: usize, height: usize },
}

pub fn generate_dungeon(config: &DungeonConfig) -> Result<Dungeon, DungeonError> {
    Ok(DungeonGenerator::new(config.clone())?.generate())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_dungeon_matches_generator_output() {
        let config = DungeonConfig {
            width: 40,
            height: 40,
            min_rooms: 4,
            max_rooms: 7,
            min_room_size: 4,
            max_room_size: 8,
            dungeon_level: 2,
            seed: Some(123),
        };

        let from_helper = generate_dungeon(&config).unwrap();
        let from_generator = DungeonGenerator::new(config).unwrap().generate();

        assert_eq!(from_helper.fingerprint(), from_generator.fingerprint());
        assert_eq!(from_helper.id, from_generator.id);
    }
}
