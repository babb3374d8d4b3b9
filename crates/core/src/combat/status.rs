//! Status effect application and per-action ticking.

use std::mem;

use super::types::{Combatant, StatModifiers, StatusEffect};

/// Applies the effect's stat deltas to `owner` and starts tracking it.
/// Deltas are clamped to the `i32` range and the stored effect keeps the part
/// that was actually applied, so expiry restores the stat exactly.
pub fn apply_effect(owner: &mut Combatant, mut effect: StatusEffect) -> &StatusEffect {
    let modifiers = &mut effect.modifiers;
    modifiers.attack = shift_stat(&mut owner.attack, i64::from(modifiers.attack));
    modifiers.defense = shift_stat(&mut owner.defense, i64::from(modifiers.defense));
    modifiers.speed = shift_stat(&mut owner.speed, i64::from(modifiers.speed));
    let index = owner.status_effects.len();
    owner.status_effects.push(effect);
    &owner.status_effects[index]
}

/// Ticks the first `eligible` effects on `owner`, the ones it carried before
/// its current action. Regeneration applies to effects still running; any
/// effect whose duration reaches zero (or already sat at or below zero) is
/// removed and its stored deltas are reversed. Returns the expired effects in
/// their original order.
pub fn tick_effects(owner: &mut Combatant, eligible: usize) -> Vec<StatusEffect> {
    let eligible = eligible.min(owner.status_effects.len());
    let carried_over = owner.status_effects.split_off(eligible);
    let ticking = mem::take(&mut owner.status_effects);

    let mut expired = Vec::new();
    let mut remaining = Vec::with_capacity(ticking.len() + carried_over.len());
    for mut effect in ticking {
        if effect.duration > 0 {
            owner.adjust_hp(effect.modifiers.hp_regen);
            owner.adjust_mp(effect.modifiers.mp_regen);
            effect.duration -= 1;
        }
        if effect.duration <= 0 {
            revert_stats(owner, &effect.modifiers);
            expired.push(effect);
        } else {
            remaining.push(effect);
        }
    }

    remaining.extend(carried_over);
    owner.status_effects = remaining;
    expired
}

fn revert_stats(owner: &mut Combatant, modifiers: &StatModifiers) {
    shift_stat(&mut owner.attack, -i64::from(modifiers.attack));
    shift_stat(&mut owner.defense, -i64::from(modifiers.defense));
    shift_stat(&mut owner.speed, -i64::from(modifiers.speed));
}

/// Moves `stat` by `delta`, clamped to the `i32` range. Returns the applied change.
fn shift_stat(stat: &mut i32, delta: i64) -> i32 {
    let before = i64::from(*stat);
    let after = (before + delta).clamp(i64::from(i32::MIN), i64::from(i32::MAX));
    *stat = after as i32;
    // Always fits when applying, since |after - before| <= |delta| and delta came from an i32.
    (after - before).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::types::{CombatStats, EffectKind, Side};

    fn owner() -> Combatant {
        let stats = CombatStats {
            max_hp: 50,
            max_mp: 20,
            attack: 10,
            defense: 10,
            speed: 10,
            ..CombatStats::default()
        };
        Combatant::new("hero", "Hero", Side::Player, 1, stats)
    }

    fn effect(id: &str, duration: i32, modifiers: StatModifiers) -> StatusEffect {
        StatusEffect {
            id: id.to_string(),
            name: id.to_string(),
            kind: EffectKind::Buff,
            duration,
            modifiers,
        }
    }

    #[test]
    fn expiry_reverses_the_stored_delta_even_if_base_stat_moved() {
        let mut hero = owner();
        apply_effect(&mut hero, effect("guard", 1, StatModifiers { defense: 5, ..Default::default() }));
        assert_eq!(hero.defense, 15);

        hero.defense += 3;
        let expired = tick_effects(&mut hero, 1);
        assert_eq!(expired.len(), 1);
        assert_eq!(hero.defense, 13, "only the stored +5 is removed");
        assert!(hero.status_effects.is_empty());
    }

    #[test]
    fn effects_added_after_the_snapshot_do_not_tick() {
        let mut hero = owner();
        apply_effect(&mut hero, effect("old", 2, StatModifiers::default()));
        apply_effect(&mut hero, effect("new", 1, StatModifiers { attack: 4, ..Default::default() }));

        let expired = tick_effects(&mut hero, 1);
        assert!(expired.is_empty());
        let durations: Vec<(String, i32)> =
            hero.status_effects.iter().map(|e| (e.id.clone(), e.duration)).collect();
        assert_eq!(durations, vec![("old".to_string(), 1), ("new".to_string(), 1)]);
        assert_eq!(hero.attack, 14);
    }

    #[test]
    fn non_positive_duration_expires_without_regen() {
        let mut hero = owner();
        hero.current_hp = 20;
        apply_effect(&mut hero, effect("stale", 0, StatModifiers { hp_regen: 10, ..Default::default() }));

        let expired = tick_effects(&mut hero, 1);
        assert_eq!(expired.len(), 1);
        assert_eq!(hero.current_hp, 20);
    }

    #[test]
    fn extreme_modifiers_neither_overflow_nor_drift_on_expiry() {
        let mut hero = owner();
        let crushing = StatModifiers { attack: i32::MIN, defense: i32::MAX, ..Default::default() };
        let stored = apply_effect(&mut hero, effect("curse", 1, crushing)).modifiers;
        assert_eq!(hero.attack, 10 + i32::MIN);
        assert_eq!(hero.defense, i32::MAX, "defense saturates");
        assert_eq!(stored.defense, i32::MAX - 10, "only the applied part is stored");

        tick_effects(&mut hero, 1);
        assert_eq!(hero.attack, 10);
        assert_eq!(hero.defense, 10);
    }

    #[test]
    fn saturated_buff_reverts_to_the_exact_base() {
        let mut hero = owner();
        hero.speed = i32::MAX - 5;
        apply_effect(&mut hero, effect("haste", 1, StatModifiers { speed: 100, ..Default::default() }));
        assert_eq!(hero.speed, i32::MAX);
        assert_eq!(hero.status_effects[0].modifiers.speed, 5);

        tick_effects(&mut hero, 1);
        assert_eq!(hero.speed, i32::MAX - 5);
    }

    #[test]
    fn regen_is_clamped_to_pool_bounds() {
        let mut hero = owner();
        hero.current_hp = 45;
        hero.current_mp = 2;
        let modifiers = StatModifiers { hp_regen: 10, mp_regen: -5, ..Default::default() };
        apply_effect(&mut hero, effect("mixed", 3, modifiers));

        tick_effects(&mut hero, 1);
        assert_eq!(hero.current_hp, 50);
        assert_eq!(hero.current_mp, 0);
        assert_eq!(hero.status_effects[0].duration, 2);
    }
}
