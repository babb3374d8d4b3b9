use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Args, Parser, Subcommand};
use crawler_core::content::keys;
use crawler_core::recording::read_recording;
use crawler_core::seed::generate_runtime_seed;
use crawler_core::{
    Character, CharacterClass, CombatAction, CombatSession, ContentPack, DungeonGenerator,
    EquipmentItem, EquipmentSlot, ItemStats, MessageCatalog, replay_combat,
};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Health ratio under which the autopilot defends instead of attacking.
const DEFEND_BELOW_HP_RATIO: f64 = 0.3;
const MAX_PLAYER_ACTIONS: usize = 500;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate one dungeon floor and print it as ASCII
    Generate(GenerateArgs),
    /// Auto-play a combat against content-pack monsters
    Simulate(SimulateArgs),
    /// Re-run a recorded combat journal and report its final state
    Replay(ReplayArgs),
}

#[derive(Args)]
struct GenerateArgs {
    #[arg(short, long, default_value = keys::DUNGEON_GOBLIN_CAVE)]
    template: String,
    /// TOML content pack to read templates from instead of the built-in one
    #[arg(long)]
    template_file: Option<PathBuf>,
    /// 0-based floor index
    #[arg(short, long, default_value_t = 0)]
    floor: u32,
    /// Run seed; a runtime seed is drawn when omitted
    #[arg(short, long)]
    seed: Option<u64>,
    /// Print a JSON report instead of the ASCII map
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct SimulateArgs {
    /// Comma-separated monster ids
    #[arg(short, long, value_delimiter = ',', default_values = [
        keys::MONSTER_GOBLIN_SCOUT,
        keys::MONSTER_GOBLIN_BRUTE,
    ])]
    monsters: Vec<String>,
    #[arg(short, long)]
    seed: Option<u64>,
    /// Record every input to this JSONL journal
    #[arg(short, long)]
    journal: Option<PathBuf>,
    /// TOML message catalog overriding the built-in English lines
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// TOML content pack to read monsters and loot tables from
    #[arg(long)]
    content_file: Option<PathBuf>,
    /// JSON character sheet; overrides --class, --level and --starter-gear
    #[arg(long)]
    character: Option<PathBuf>,
    /// warrior, mage, rogue or cleric
    #[arg(long, default_value = "warrior")]
    class: String,
    #[arg(long, default_value_t = 3)]
    level: u32,
    /// Equip a short sword and leather armor
    #[arg(long)]
    starter_gear: bool,
}

#[derive(Args)]
struct ReplayArgs {
    #[arg(short, long)]
    journal: PathBuf,
}

#[derive(Serialize)]
struct FloorReport<'a> {
    id: &'a str,
    seed: u64,
    level: u32,
    rooms: usize,
    placement_exhausted: bool,
    entrance: (usize, usize),
    exit: (usize, usize),
    fingerprint: String,
    map: Vec<&'a str>,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn load_content(path: Option<&Path>) -> Result<ContentPack> {
    let Some(path) = path else {
        return Ok(ContentPack::default());
    };
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read content pack: {}", path.display()))?;
    ContentPack::from_toml_str(&source)
        .with_context(|| format!("Failed to parse content pack: {}", path.display()))
}

fn load_catalog(path: Option<&Path>) -> Result<MessageCatalog> {
    let Some(path) = path else {
        return Ok(MessageCatalog::default());
    };
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read message catalog: {}", path.display()))?;
    MessageCatalog::from_toml_str(&source)
        .with_context(|| format!("Failed to parse message catalog: {}", path.display()))
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    let content = load_content(args.template_file.as_deref())?;
    let template = content
        .dungeon(&args.template)
        .with_context(|| format!("Unknown dungeon template: {}", args.template))?;
    if args.floor >= template.floor_count {
        bail!(
            "{} has {} floors; floor {} does not exist",
            template.name,
            template.floor_count,
            args.floor
        );
    }

    let base_seed = args.seed.unwrap_or_else(generate_runtime_seed);
    let config = template.floor_config(base_seed, args.floor);
    let dungeon = DungeonGenerator::new(config)?.generate();
    info!(id = %dungeon.id, rooms = dungeon.rooms.len(), "floor generated");

    let map = dungeon.render_ascii();
    if args.json {
        let report = FloorReport {
            id: &dungeon.id,
            seed: dungeon.seed,
            level: dungeon.config.dungeon_level,
            rooms: dungeon.rooms.len(),
            placement_exhausted: dungeon.placement_exhausted,
            entrance: (dungeon.entrance.y, dungeon.entrance.x),
            exit: (dungeon.exit.y, dungeon.exit.x),
            fingerprint: format!("{:016x}", dungeon.fingerprint()),
            map: map.lines().collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{map}");
    println!("Dungeon: {} (run seed {base_seed}, floor {})", dungeon.id, args.floor);
    let exhausted = if dungeon.placement_exhausted { " (placement exhausted)" } else { "" };
    println!("Rooms: {}{exhausted}", dungeon.rooms.len());
    println!("Entrance: {:?}  Exit: {:?}", dungeon.entrance, dungeon.exit);
    println!("Fingerprint: {:016x}", dungeon.fingerprint());
    Ok(())
}

fn parse_class(name: &str) -> Result<CharacterClass> {
    Ok(match name.to_ascii_lowercase().as_str() {
        "warrior" => CharacterClass::Warrior,
        "mage" => CharacterClass::Mage,
        "rogue" => CharacterClass::Rogue,
        "cleric" => CharacterClass::Cleric,
        other => bail!("Unknown character class: {other}"),
    })
}

fn load_character(args: &SimulateArgs) -> Result<Character> {
    if let Some(path) = &args.character {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read character: {}", path.display()))?;
        return serde_json::from_str(&source)
            .with_context(|| format!("Failed to parse character: {}", path.display()));
    }

    let mut hero = Character::new("hero", "Hero", parse_class(&args.class)?);
    hero.level = args.level.max(1);
    if args.starter_gear {
        hero.equip(EquipmentItem {
            item_id: keys::ITEM_SHORT_SWORD.to_string(),
            slot: EquipmentSlot::MainHand,
            stats: ItemStats { attack: 8, critical_rate: 5, ..ItemStats::default() },
        });
        hero.equip(EquipmentItem {
            item_id: keys::ITEM_LEATHER_ARMOR.to_string(),
            slot: EquipmentSlot::Chest,
            stats: ItemStats { defense: 8, evasion: 2, ..ItemStats::default() },
        });
    }
    let stats = hero.stats().combat;
    hero.health = stats.max_hp;
    hero.mana = stats.max_mp;
    Ok(hero)
}

fn autopilot(session: &CombatSession) -> Result<CombatAction> {
    let combat = session.combat();
    let hero = combat.player();
    if hero.hp_ratio() < DEFEND_BELOW_HP_RATIO {
        return Ok(CombatAction::defend(hero.id.clone()));
    }
    let target = combat.living_enemies().next().context("No living enemy to attack")?;
    Ok(CombatAction::attack(hero.id.clone(), target.id.clone()))
}

fn run_simulate(args: SimulateArgs) -> Result<()> {
    let content = load_content(args.content_file.as_deref())?;
    let catalog = Arc::new(load_catalog(args.catalog.as_deref())?);
    let hero = load_character(&args)?.to_combatant();

    let enemies = args
        .monsters
        .iter()
        .enumerate()
        .map(|(instance, id)| {
            content
                .monster(id)
                .map(|monster| monster.spawn(instance))
                .with_context(|| format!("Unknown monster: {id}"))
        })
        .collect::<Result<Vec<_>>>()?;

    let seed = args.seed.unwrap_or_else(generate_runtime_seed);
    let mut session = CombatSession::new(hero, enemies, seed, catalog)?;
    if let Some(path) = &args.journal {
        session
            .record_to(path)
            .with_context(|| format!("Failed to create journal: {}", path.display()))?;
    }

    session.begin()?;
    let mut actions = 0;
    while !session.is_over() && actions < MAX_PLAYER_ACTIONS {
        let action = autopilot(&session)?;
        debug!(kind = ?action.kind, "autopilot chose an action");
        session.execute_player_action(action)?;
        actions += 1;
    }
    session.collect_loot(&content);

    for line in session.combat().log() {
        println!("{line}");
    }
    let summary = session.summary();
    println!("Seed: {seed}");
    println!("Snapshot Hash: {:016x}", session.combat().snapshot_hash());
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn run_replay(args: ReplayArgs) -> Result<()> {
    let journal = read_recording(&args.journal)
        .with_context(|| format!("Failed to load journal file: {}", args.journal.display()))?;
    let result = replay_combat(&journal).context("Replay failed during execution")?;

    println!("Replay complete.");
    println!("Inputs: {}", result.applied_inputs);
    println!("Outcome: {}", result.final_state);
    println!("Snapshot Hash: {:016x}", result.final_snapshot_hash);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Simulate(args) => run_simulate(args),
        Command::Replay(args) => run_replay(args),
    }
}
