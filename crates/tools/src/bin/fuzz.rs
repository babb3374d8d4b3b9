use std::iter;

use anyhow::{Result, bail};
use clap::Parser;
use crawler_core::content::keys;
use crawler_core::{
    Combat, CombatAction, CombatState, CombatStats, Combatant, ContentPack, Side,
    initialize_combat,
};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    /// Number of combats to play
    #[arg(short, long, default_value_t = 200)]
    combats: u32,
    /// Action cap per combat
    #[arg(short, long, default_value_t = 300)]
    actions: u32,
}

fn choose<T: Clone>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p].clone()
}

fn check_invariants(combat: &Combat) -> Result<()> {
    if combat.current_turn_index() >= combat.turn_order().len() {
        bail!("Invariant failed: turn index out of bounds");
    }
    for combatant in iter::once(combat.player()).chain(combat.enemies()) {
        if combatant.current_hp > combatant.max_hp {
            bail!("Invariant failed: {} HP > Max HP", combatant.id);
        }
    }
    let player_alive = combat.player().is_alive();
    let enemies_alive = combat.living_enemies().next().is_some();
    let consistent = match combat.state() {
        CombatState::Victory => player_alive && !enemies_alive,
        CombatState::Defeat => !player_alive,
        CombatState::Fled => player_alive,
        CombatState::Processing => false,
        _ => player_alive && enemies_alive,
    };
    if !consistent {
        bail!("Invariant failed: state {} contradicts the roster", combat.state());
    }
    Ok(())
}

fn random_hero(rng: &mut ChaCha8Rng) -> Combatant {
    let mut roll = |span: u64| (rng.next_u64() % span) as i32;
    let stats = CombatStats {
        max_hp: 60 + roll(140) as u32,
        max_mp: 20,
        attack: 8 + roll(30),
        defense: roll(25),
        speed: 1 + roll(30),
        critical_rate: roll(40) as u32,
        evasion: roll(40) as u32,
        ..Default::default()
    };
    Combatant::new("hero", "Hero", Side::Player, 3, stats)
}

fn play(content: &ContentPack, rng: &mut ChaCha8Rng, max_actions: u32) -> Result<CombatState> {
    let monster_ids = [
        keys::MONSTER_GOBLIN_SCOUT,
        keys::MONSTER_GOBLIN_BRUTE,
        keys::MONSTER_GOBLIN_SHAMAN,
        keys::MONSTER_GOBLIN_KING,
    ];
    let enemy_count = 1 + (rng.next_u64() % 4) as usize;
    let enemies: Vec<Combatant> = (0..enemy_count)
        .filter_map(|instance| content.monster(choose(rng, &monster_ids)).map(|m| m.spawn(instance)))
        .collect();
    let hero = random_hero(rng);
    let mut combat = initialize_combat(hero, enemies, rng.next_u64())?;

    combat.run_enemy_phase()?;
    check_invariants(&combat)?;
    for _ in 0..max_actions {
        if combat.is_over() {
            break;
        }
        let hero_id = combat.player().id.clone();
        let living: Vec<_> = combat.living_enemies().map(|enemy| enemy.id.clone()).collect();
        let action = match rng.next_u64() % 6 {
            0 => CombatAction::defend(hero_id),
            1 => CombatAction::flee(hero_id),
            2 => CombatAction::use_item(hero_id, "potion", None),
            _ => CombatAction::attack(hero_id, choose(rng, &living)),
        };
        combat.process_action(action)?;
        check_invariants(&combat)?;
        let living_before = combat.living_enemies().count();
        let enemy_turns = combat.run_enemy_phase()?.len();
        check_invariants(&combat)?;
        if enemy_turns > living_before {
            bail!("Invariant failed: {enemy_turns} enemy turns with {living_before} living enemies");
        }
        if !combat.is_over() && !combat.is_player_turn() {
            bail!("Invariant failed: player never got the turn back ({})", combat.state());
        }
    }
    Ok(combat.state())
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Starting combat fuzz on seed {} for {} combats...", args.seed, args.combats);
    let content = ContentPack::default();
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    let (mut victories, mut defeats, mut escapes, mut unfinished) = (0, 0, 0, 0);
    for _ in 0..args.combats {
        match play(&content, &mut rng, args.actions)? {
            CombatState::Victory => victories += 1,
            CombatState::Defeat => defeats += 1,
            CombatState::Fled => escapes += 1,
            _ => unfinished += 1,
        }
    }

    println!(
        "Fuzzing completed successfully: {victories} victories, {defeats} defeats, \
         {escapes} escapes, {unfinished} unfinished."
    );
    Ok(())
}
