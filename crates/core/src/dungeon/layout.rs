//! Room placement and corridor carving.

use tracing::debug;

use super::model::{DungeonConfig, Pos, Tile};
use super::rng::SeededRandom;

pub(super) const PLACEMENT_ATTEMPTS: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct RoomRect {
    pub(super) x: usize,
    pub(super) y: usize,
    pub(super) width: usize,
    pub(super) height: usize,
}

impl RoomRect {
    fn right(self) -> usize {
        self.x + self.width - 1
    }

    fn bottom(self) -> usize {
        self.y + self.height - 1
    }

    pub(super) fn center(self) -> Pos {
        Pos { y: self.y + self.height / 2, x: self.x + self.width / 2 }
    }

    pub(super) fn expanded(self, margin: usize) -> Self {
        let expanded_x = self.x.saturating_sub(margin);
        let expanded_y = self.y.saturating_sub(margin);
        let expanded_right = self.right().saturating_add(margin);
        let expanded_bottom = self.bottom().saturating_add(margin);
        Self {
            x: expanded_x,
            y: expanded_y,
            width: expanded_right - expanded_x + 1,
            height: expanded_bottom - expanded_y + 1,
        }
    }

    pub(super) fn intersects(self, other: &Self) -> bool {
        self.x <= other.right()
            && self.right() >= other.x
            && self.y <= other.bottom()
            && self.bottom() >= other.y
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct Placement {
    pub(super) rooms: Vec<RoomRect>,
    pub(super) target_count: usize,
    pub(super) attempts: usize,
}

impl Placement {
    pub(super) fn exhausted(&self) -> bool {
        self.rooms.len() < self.target_count
    }
}

/// Proposes rooms in acceptance order until the target count or the attempt budget is reached.
/// The config must already be validated so every proposal fits inside the grid margin.
pub(super) fn place_rooms(rng: &mut SeededRandom, config: &DungeonConfig) -> Placement {
    let target_count = rng.next_int(config.min_rooms, config.max_rooms);
    let mut rooms: Vec<RoomRect> = Vec::with_capacity(target_count.min(PLACEMENT_ATTEMPTS));
    let mut attempts = 0;

    while rooms.len() < target_count && attempts < PLACEMENT_ATTEMPTS {
        attempts += 1;
        let width = rng.next_int(config.min_room_size, config.max_room_size);
        let height = rng.next_int(config.min_room_size, config.max_room_size);
        let x = rng.next_int(1, config.width - width - 1);
        let y = rng.next_int(1, config.height - height - 1);

        let candidate = RoomRect { x, y, width, height };
        let candidate_with_margin = candidate.expanded(1);
        if rooms.iter().any(|existing| existing.expanded(1).intersects(&candidate_with_margin)) {
            continue;
        }
        debug!(index = rooms.len(), x, y, width, height, attempts, "room accepted");
        rooms.push(candidate);
    }

    Placement { rooms, target_count, attempts }
}

pub(super) fn carve_room(tiles: &mut [Tile], grid_width: usize, room: &RoomRect) {
    for y in room.y..=room.bottom() {
        for x in room.x..=room.right() {
            let on_perimeter = x == room.x || x == room.right() || y == room.y || y == room.bottom();
            tiles[y * grid_width + x] = if on_perimeter { Tile::Wall } else { Tile::Floor };
        }
    }
}

/// Joins each room to the next one in acceptance order, picking the bend per pair.
pub(super) fn carve_corridors(
    tiles: &mut [Tile],
    grid_width: usize,
    rng: &mut SeededRandom,
    rooms: &[RoomRect],
) {
    for pair in rooms.windows(2) {
        let horizontal_first = rng.next() > 0.5;
        carve_l_shaped_corridor(
            tiles,
            grid_width,
            pair[0].center(),
            pair[1].center(),
            horizontal_first,
        );
    }
}

fn carve_l_shaped_corridor(
    tiles: &mut [Tile],
    grid_width: usize,
    start: Pos,
    end: Pos,
    horizontal_first: bool,
) {
    if horizontal_first {
        carve_horizontal_line(tiles, grid_width, start.y, start.x, end.x);
        carve_vertical_line(tiles, grid_width, end.x, start.y, end.y);
    } else {
        carve_vertical_line(tiles, grid_width, start.x, start.y, end.y);
        carve_horizontal_line(tiles, grid_width, end.y, start.x, end.x);
    }
}

fn carve_horizontal_line(tiles: &mut [Tile], grid_width: usize, y: usize, from: usize, to: usize) {
    for x in from.min(to)..=from.max(to) {
        carve_corridor_cell(tiles, y * grid_width + x);
    }
}

fn carve_vertical_line(tiles: &mut [Tile], grid_width: usize, x: usize, from: usize, to: usize) {
    for y in from.min(to)..=from.max(to) {
        carve_corridor_cell(tiles, y * grid_width + x);
    }
}

// Room walls and floors are never overwritten.
fn carve_corridor_cell(tiles: &mut [Tile], index: usize) {
    if tiles[index] == Tile::Empty {
        tiles[index] = Tile::Corridor;
    }
}
