use std::iter;

use crawler_core::combat::formula;
use crawler_core::{
    ActionKind, Combat, CombatAction, CombatState, CombatStats, Combatant, CombatantId, Side,
    initialize_combat,
};
use proptest::prelude::*;

fn player(attack: i32, defense: i32, speed: i32, max_hp: u32) -> Combatant {
    Combatant::new(
        "hero",
        "Hero",
        Side::Player,
        5,
        CombatStats { max_hp, attack, defense, speed, ..Default::default() },
    )
}

fn enemy(id: &str, level: u32, stats: CombatStats) -> Combatant {
    Combatant::new(id, "Goblin", Side::Enemy, level, stats)
}

fn hero_id() -> CombatantId {
    CombatantId::new("hero")
}

#[test]
fn test_scenario_single_goblin_victory_pays_level_scaled_rewards() {
    let goblin = enemy(
        "goblin",
        2,
        CombatStats { max_hp: 50, attack: 8, defense: 5, speed: 10, ..Default::default() },
    );
    let mut combat = initialize_combat(player(20, 15, 15, 100), vec![goblin], 11).unwrap();
    assert_eq!(combat.start(), CombatState::PlayerTurn);

    let mut player_attacks = 0;
    while !combat.is_over() {
        let result = combat
            .process_action(CombatAction::attack(hero_id(), CombatantId::new("goblin")))
            .unwrap();
        // No evasion and no critical rate: every swing lands for 16..=21.
        let damage = result.damage.unwrap();
        assert!((16..=21).contains(&damage), "damage {damage} outside the variance band");
        assert!(!result.is_miss && !result.is_critical);
        player_attacks += 1;
        combat.run_enemy_phase().unwrap();
    }

    assert!((3..=4).contains(&player_attacks));
    assert_eq!(combat.state(), CombatState::Victory);
    let rewards = combat.rewards().unwrap();
    assert_eq!(rewards.experience, 100);
    assert_eq!(rewards.gold, 20);
    assert!(rewards.items.is_empty());
    assert!(combat.player().current_hp > 50);
    assert!(combat.ended_at_unix_ms().is_some());
}

fn flee_rate(player_speed: i32, enemy_speed: i32, samples: u64) -> f64 {
    let mut escaped = 0_u64;
    for seed in 0..samples {
        let goblin = enemy(
            "goblin",
            1,
            CombatStats { max_hp: 30, attack: 5, defense: 2, speed: enemy_speed, ..Default::default() },
        );
        let mut combat =
            initialize_combat(player(10, 5, player_speed, 60), vec![goblin], seed).unwrap();
        combat.start();
        let result = combat.process_action(CombatAction::flee(hero_id())).unwrap();
        assert_eq!(result.success, combat.state() == CombatState::Fled);
        if result.success {
            escaped += 1;
        }
    }
    escaped as f64 / samples as f64
}

#[test]
fn test_scenario_fast_player_flees_at_the_capped_rate() {
    assert_eq!(formula::flee_chance(100, &[10]), 0.9);
    let rate = flee_rate(100, 10, 2000);
    assert!((rate - 0.9).abs() <= 0.03, "observed flee rate {rate}");
}

#[test]
fn test_scenario_half_speed_player_flees_about_half_the_time() {
    assert_eq!(formula::flee_chance(5, &[10]), 0.5);
    let rate = flee_rate(5, 10, 2000);
    assert!((rate - 0.5).abs() <= 0.05, "observed flee rate {rate}");
}

#[test]
fn test_failed_flee_keeps_the_combat_running() {
    for seed in 0..64 {
        let goblin = enemy(
            "goblin",
            1,
            CombatStats { max_hp: 30, attack: 5, defense: 2, speed: 1000, ..Default::default() },
        );
        let mut combat = initialize_combat(player(10, 5, 1, 60), vec![goblin], seed).unwrap();
        let result = combat.process_action(CombatAction::flee(hero_id())).unwrap();
        if !result.success {
            assert!(!combat.is_over());
            assert_eq!(combat.turns().len(), 1);
            return;
        }
    }
    panic!("a 10% flee chance should fail within 64 seeds");
}

#[test]
fn test_terminal_states_reject_further_actions() {
    let goblin = enemy(
        "goblin",
        1,
        CombatStats { max_hp: 1, attack: 1, defense: 0, speed: 1, ..Default::default() },
    );
    let mut combat = initialize_combat(player(50, 5, 20, 60), vec![goblin], 3).unwrap();
    combat.process_action(CombatAction::attack(hero_id(), CombatantId::new("goblin"))).unwrap();
    assert_eq!(combat.state(), CombatState::Victory);

    let turns_before = combat.turns().len();
    assert!(combat.process_action(CombatAction::defend(hero_id())).is_err());
    assert!(combat.process_enemy_turn().is_err());
    assert_eq!(combat.turns().len(), turns_before);
    assert_eq!(combat.check_combat_end(), CombatState::Victory);
}

fn stats_strategy() -> impl Strategy<Value = CombatStats> {
    (1_u32..=200, -10_i32..=60, -10_i32..=80, 1_i32..=40, 0_u32..=100, 0_u32..=100).prop_map(
        |(max_hp, attack, defense, speed, critical_rate, evasion)| CombatStats {
            max_hp,
            attack,
            defense,
            speed,
            critical_rate,
            evasion,
            ..Default::default()
        },
    )
}

fn roster_strategy() -> impl Strategy<Value = (CombatStats, Vec<CombatStats>)> {
    (stats_strategy(), prop::collection::vec(stats_strategy(), 1..=4))
}

fn build(player_stats: CombatStats, enemy_stats: Vec<CombatStats>, seed: u64) -> Combat {
    let hero = Combatant::new("hero", "Hero", Side::Player, 3, player_stats);
    let enemies = enemy_stats
        .into_iter()
        .enumerate()
        .map(|(index, stats)| enemy(&format!("enemy_{index}"), 1, stats))
        .collect();
    initialize_combat(hero, enemies, seed).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]
    #[test]
    fn turn_order_is_sorted_by_descending_speed((hero, foes) in roster_strategy(), seed in any::<u64>()) {
        let combat = build(hero, foes, seed);
        let speeds: Vec<i32> = combat
            .turn_order()
            .iter()
            .map(|id| combat.combatant(id).unwrap().speed)
            .collect();
        prop_assert_eq!(speeds.len(), combat.enemies().len() + 1);
        prop_assert!(speeds.windows(2).all(|pair| pair[0] >= pair[1]), "speeds={speeds:?}");
    }

    #[test]
    fn landed_attacks_deal_at_least_one_and_never_overdraw_hp(
        (hero, foes) in roster_strategy(),
        seed in any::<u64>(),
    ) {
        let mut combat = build(hero, foes, seed);
        combat.run_enemy_phase().unwrap();
        for _ in 0..30 {
            if combat.is_over() {
                break;
            }
            let target = combat.living_enemies().next().unwrap().id.clone();
            let hp_before = combat.combatant(&target).unwrap().current_hp;
            let result = combat.process_action(CombatAction::attack(hero_id(), target.clone())).unwrap();
            let hp_after = combat.combatant(&target).unwrap().current_hp;
            match result.damage {
                Some(damage) => {
                    prop_assert!(damage >= 1);
                    prop_assert_eq!(hp_after, hp_before.saturating_sub(damage));
                }
                None => {
                    prop_assert!(result.is_miss);
                    prop_assert_eq!(hp_after, hp_before);
                }
            }
            for combatant in iter::once(combat.player()).chain(combat.enemies()) {
                prop_assert!(combatant.current_hp <= combatant.max_hp);
            }
            combat.run_enemy_phase().unwrap();
        }
    }

    #[test]
    fn defend_bonus_is_reverted_on_the_next_own_action(
        (hero, foes) in roster_strategy(),
        seed in any::<u64>(),
    ) {
        let mut combat = build(hero, foes, seed);
        combat.run_enemy_phase().unwrap();
        prop_assume!(!combat.is_over());

        let base_defense = combat.player().defense;
        let result = combat.process_action(CombatAction::defend(hero_id())).unwrap();
        prop_assert!(result.success);
        prop_assert_eq!(combat.player().defense, base_defense + formula::defend_bonus(base_defense));
        prop_assert_eq!(combat.player().status_effects.len(), 1);

        combat.run_enemy_phase().unwrap();
        prop_assume!(!combat.is_over());
        let second = combat.process_action(CombatAction::defend(hero_id())).unwrap();
        let second_bonus = second.status_effect_applied.unwrap().modifiers.defense;
        // The first bonus is gone; only the second Defend's bonus remains.
        prop_assert_eq!(combat.player().status_effects.len(), 1);
        prop_assert_eq!(combat.player().defense, base_defense + second_bonus);
    }

    #[test]
    fn combat_ends_in_exactly_one_terminal_state(
        (hero, foes) in roster_strategy(),
        seed in any::<u64>(),
    ) {
        let mut combat = build(hero, foes, seed);
        combat.run_enemy_phase().unwrap();
        for _ in 0..200 {
            if combat.is_over() {
                break;
            }
            let target = combat.living_enemies().next().unwrap().id.clone();
            combat.process_action(CombatAction::attack(hero_id(), target)).unwrap();
            combat.run_enemy_phase().unwrap();
        }
        let state = combat.state();
        if state.is_terminal() {
            let player_alive = combat.player().is_alive();
            let any_enemy_alive = combat.living_enemies().next().is_some();
            match state {
                CombatState::Defeat => prop_assert!(!player_alive),
                CombatState::Victory => prop_assert!(player_alive && !any_enemy_alive),
                _ => prop_assert!(false, "attacks alone cannot end in {state}"),
            }
            prop_assert_eq!(combat.rewards().is_some(), state == CombatState::Victory);
        }
        for (index, turn) in combat.turns().iter().enumerate() {
            prop_assert_eq!(turn.turn_number as usize, index + 1);
            prop_assert!(turn.action.kind == ActionKind::Attack);
        }
    }
}
