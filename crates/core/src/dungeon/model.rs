//! Public data models for generated dungeons: tiles, rooms, and the floor grid.

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub y: usize,
    pub x: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Empty,
    Floor,
    Wall,
    Door,
    Corridor,
    Entrance,
    Exit,
    Chest,
    Enemy,
}

impl Tile {
    pub fn glyph(self) -> char {
        match self {
            Self::Empty => ' ',
            Self::Floor | Self::Corridor => '.',
            Self::Wall => '#',
            Self::Door => '+',
            Self::Entrance => 'E',
            Self::Exit => 'X',
            Self::Chest => 'C',
            Self::Enemy => 'M',
        }
    }

    pub fn is_walkable(self) -> bool {
        !matches!(self, Self::Empty | Self::Wall)
    }

    fn code(self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Floor => 1,
            Self::Wall => 2,
            Self::Door => 3,
            Self::Corridor => 4,
            Self::Entrance => 5,
            Self::Exit => 6,
            Self::Chest => 7,
            Self::Enemy => 8,
        }
    }
}

/// Generation parameters for one dungeon floor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonConfig {
    pub width: usize,
    pub height: usize,
    pub min_rooms: usize,
    pub max_rooms: usize,
    pub min_room_size: usize,
    pub max_room_size: usize,
    pub dungeon_level: u32,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub monster_id: String,
    pub pos: Pos,
    pub defeated: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChestSpawn {
    pub pos: Pos,
    pub opened: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
    pub center: Pos,
    pub connected: bool,
    pub has_entrance: bool,
    pub has_exit: bool,
    pub enemies: Vec<EnemySpawn>,
    pub chests: Vec<ChestSpawn>,
}

impl Room {
    pub fn right(&self) -> usize {
        self.x + self.width - 1
    }

    pub fn bottom(&self) -> usize {
        self.y + self.height - 1
    }

    /// Whether `pos` lies inside the bounding box, walls included.
    pub fn contains(&self, pos: Pos) -> bool {
        pos.x >= self.x && pos.x <= self.right() && pos.y >= self.y && pos.y <= self.bottom()
    }

    pub fn is_perimeter(&self, pos: Pos) -> bool {
        self.contains(pos)
            && (pos.x == self.x || pos.x == self.right() || pos.y == self.y || pos.y == self.bottom())
    }

    pub fn interior_contains(&self, pos: Pos) -> bool {
        self.contains(pos) && !self.is_perimeter(pos)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dungeon {
    pub id: String,
    pub config: DungeonConfig,
    /// Seed actually used, which differs from `config.seed` only when none was given.
    pub seed: u64,
    pub width: usize,
    pub height: usize,
    pub tiles: Vec<Tile>,
    pub rooms: Vec<Room>,
    pub entrance: Pos,
    pub exit: Pos,
    pub explored: Vec<bool>,
    /// Set when the placement budget ran out before the target room count was reached.
    pub placement_exhausted: bool,
    pub created_at_unix_ms: u64,
}

impl Dungeon {
    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    fn index(&self, pos: Pos) -> Option<usize> {
        self.in_bounds(pos).then(|| pos.y * self.width + pos.x)
    }

    pub fn tile_at(&self, pos: Pos) -> Tile {
        self.index(pos).map_or(Tile::Empty, |index| self.tiles[index])
    }

    /// Returns `false` and leaves the grid untouched when `pos` is out of bounds.
    pub fn set_tile(&mut self, pos: Pos, tile: Tile) -> bool {
        match self.index(pos) {
            Some(index) => {
                self.tiles[index] = tile;
                true
            }
            None => false,
        }
    }

    pub fn is_walkable(&self, pos: Pos) -> bool {
        self.tile_at(pos).is_walkable()
    }

    pub fn is_explored(&self, pos: Pos) -> bool {
        self.index(pos).is_some_and(|index| self.explored[index])
    }

    pub fn mark_explored(&mut self, pos: Pos) {
        if let Some(index) = self.index(pos) {
            self.explored[index] = true;
        }
    }

    /// Marks every in-bounds cell within Chebyshev distance `radius` of `center`.
    pub fn reveal_radius(&mut self, center: Pos, radius: usize) {
        let min_y = center.y.saturating_sub(radius);
        let min_x = center.x.saturating_sub(radius);
        let max_y = center.y.saturating_add(radius).min(self.height.saturating_sub(1));
        let max_x = center.x.saturating_add(radius).min(self.width.saturating_sub(1));
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                self.mark_explored(Pos { y, x });
            }
        }
    }

    pub fn room_containing(&self, pos: Pos) -> Option<&Room> {
        self.rooms.iter().find(|room| room.contains(pos))
    }

    pub fn render_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for row in self.tiles.chunks(self.width.max(1)) {
            out.extend(row.iter().map(|tile| tile.glyph()));
            out.push('\n');
        }
        out
    }

    /// Layout bytes excluding ids and timestamps; equal layouts give equal bytes.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.tiles.len() + 64);
        bytes.extend((self.width as u32).to_le_bytes());
        bytes.extend((self.height as u32).to_le_bytes());
        bytes.extend(self.tiles.iter().map(|tile| tile.code()));

        bytes.extend((self.rooms.len() as u32).to_le_bytes());
        for room in &self.rooms {
            for value in [room.x, room.y, room.width, room.height] {
                bytes.extend((value as u32).to_le_bytes());
            }
            bytes.push(u8::from(room.connected));
            bytes.push(u8::from(room.has_entrance));
            bytes.push(u8::from(room.has_exit));
        }

        for pos in [self.entrance, self.exit] {
            bytes.extend((pos.y as u32).to_le_bytes());
            bytes.extend((pos.x as u32).to_le_bytes());
        }
        bytes
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }
}
