//! Dungeon generation orchestrator that composes placement and carving stages.

use tracing::{info, warn};

use crate::seed::{generate_runtime_seed, unix_millis};

use super::DungeonError;
use super::layout::{PLACEMENT_ATTEMPTS, RoomRect, carve_corridors, carve_room, place_rooms};
use super::model::{Dungeon, DungeonConfig, Pos, Room, Tile};
use super::rng::SeededRandom;

const MIN_ROOM_SIZE: usize = 3;

pub struct DungeonGenerator {
    config: DungeonConfig,
}

impl DungeonGenerator {
    pub fn new(config: DungeonConfig) -> Result<Self, DungeonError> {
        validate_config(&config)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DungeonConfig {
        &self.config
    }

    pub fn generate(&self) -> Dungeon {
        let seed = self.config.seed.unwrap_or_else(generate_runtime_seed);
        self.generate_with_seed(seed)
    }

    fn generate_with_seed(&self, seed: u64) -> Dungeon {
        let config = &self.config;
        let mut rng = SeededRandom::new(seed);
        let mut tiles = vec![Tile::Empty; config.width * config.height];

        let placement = place_rooms(&mut rng, config);
        if placement.exhausted() {
            warn!(
                seed,
                accepted = placement.rooms.len(),
                target = placement.target_count,
                budget = PLACEMENT_ATTEMPTS,
                "room placement budget exhausted before reaching the target count"
            );
        }

        for rect in &placement.rooms {
            carve_room(&mut tiles, config.width, rect);
        }
        carve_corridors(&mut tiles, config.width, &mut rng, &placement.rooms);

        let mut rooms: Vec<Room> =
            placement.rooms.iter().enumerate().map(|(index, rect)| build_room(index, rect)).collect();
        let connected = rooms.len() > 1;
        for room in &mut rooms {
            room.connected = connected;
        }

        let entrance = rooms.first().map_or_else(Pos::default, |room| room.center);
        let exit = rooms.last().map_or_else(Pos::default, |room| room.center);
        if let Some(first) = rooms.first_mut() {
            first.has_entrance = true;
            tiles[entrance.y * config.width + entrance.x] = Tile::Entrance;
        }
        if let Some(last) = rooms.last_mut() {
            last.has_exit = true;
            tiles[exit.y * config.width + exit.x] = Tile::Exit;
        }

        info!(seed, rooms = rooms.len(), level = config.dungeon_level, "dungeon generated");

        Dungeon {
            id: format!("dungeon-{}-{seed:016x}", config.dungeon_level),
            config: config.clone(),
            seed,
            width: config.width,
            height: config.height,
            explored: vec![false; tiles.len()],
            tiles,
            rooms,
            entrance,
            exit,
            placement_exhausted: placement.exhausted(),
            created_at_unix_ms: unix_millis(),
        }
    }
}

fn build_room(index: usize, rect: &RoomRect) -> Room {
    Room {
        id: format!("room-{index}"),
        x: rect.x,
        y: rect.y,
        width: rect.width,
        height: rect.height,
        center: rect.center(),
        connected: false,
        has_entrance: false,
        has_exit: false,
        enemies: Vec::new(),
        chests: Vec::new(),
    }
}

pub(super) fn validate_config(config: &DungeonConfig) -> Result<(), DungeonError> {
    if config.min_rooms == 0 {
        return Err(DungeonError::NoRoomsRequested);
    }
    if config.min_rooms > config.max_rooms {
        return Err(DungeonError::RoomCountRange { min: config.min_rooms, max: config.max_rooms });
    }
    if config.min_room_size < MIN_ROOM_SIZE {
        return Err(DungeonError::RoomTooSmall {
            size: config.min_room_size,
            minimum: MIN_ROOM_SIZE,
        });
    }
    if config.min_room_size > config.max_room_size {
        return Err(DungeonError::RoomSizeRange {
            min: config.min_room_size,
            max: config.max_room_size,
        });
    }
    let fits = config
        .max_room_size
        .checked_add(2)
        .is_some_and(|span| span <= config.width && span <= config.height);
    if !fits {
        return Err(DungeonError::GridTooSmall {
            width: config.width,
            height: config.height,
            max_room_size: config.max_room_size,
        });
    }
    if config.width.checked_mul(config.height).is_none() {
        return Err(DungeonError::GridTooLarge { width: config.width, height: config.height });
    }
    Ok(())
}
