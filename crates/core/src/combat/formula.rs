//! Pure combat formulas: hit, critical, mitigation, variance, and flee odds.

pub const MIN_HIT_CHANCE: f64 = 0.5;
pub const MAX_DEFENSE_MITIGATION: f64 = 0.75;
pub const DEFENSE_SCALE: f64 = 100.0;
pub const VARIANCE_MIN: f64 = 0.85;
pub const VARIANCE_SPAN: f64 = 0.30;
pub const CRITICAL_MULTIPLIER: f64 = 2.0;
pub const MIN_FLEE_CHANCE: f64 = 0.1;
pub const MAX_FLEE_CHANCE: f64 = 0.9;

/// `max(0.5, 1 - evasion/100)`.
pub fn hit_chance(target_evasion: u32) -> f64 {
    (1.0 - f64::from(target_evasion) / 100.0).max(MIN_HIT_CHANCE)
}

pub fn critical_chance(critical_rate: u32) -> f64 {
    (f64::from(critical_rate) / 100.0).min(1.0)
}

/// Multiplier left after armor: `1 - min(0.75, d / (d + 100))`. Negative defense counts as zero.
pub fn defense_reduction(defense: i32) -> f64 {
    let defense = f64::from(defense.max(0));
    1.0 - (defense / (defense + DEFENSE_SCALE)).min(MAX_DEFENSE_MITIGATION)
}

/// Maps a uniform roll in `[0, 1)` onto `[0.85, 1.15)`.
pub fn variance_multiplier(roll: f64) -> f64 {
    VARIANCE_MIN + roll * VARIANCE_SPAN
}

/// Damage of a landed hit; never below 1.
pub fn attack_damage(attack: i32, defense: i32, variance_roll: f64, critical: bool) -> u32 {
    let critical_multiplier = if critical { CRITICAL_MULTIPLIER } else { 1.0 };
    let raw = f64::from(attack)
        * defense_reduction(defense)
        * variance_multiplier(variance_roll)
        * critical_multiplier;
    // Float-to-int casts saturate, so negative raw damage lands on 0 before the floor of 1.
    (raw.floor() as u32).max(1)
}

/// Stat gain granted by Defend.
pub fn defend_bonus(defense: i32) -> i32 {
    defense.max(0) / 2
}

/// `clamp(player_speed / mean(enemy_speeds), 0.1, 0.9)`; a non-positive mean gives the cap.
pub fn flee_chance(player_speed: i32, enemy_speeds: &[i32]) -> f64 {
    if enemy_speeds.is_empty() {
        return MAX_FLEE_CHANCE;
    }
    let total: f64 = enemy_speeds.iter().map(|&speed| f64::from(speed)).sum();
    let average = total / enemy_speeds.len() as f64;
    if average <= 0.0 {
        return MAX_FLEE_CHANCE;
    }
    (f64::from(player_speed) / average).clamp(MIN_FLEE_CHANCE, MAX_FLEE_CHANCE)
}
